//! Prompt template expansion.

use cantastoria_error::{CantastoriaResult, EngineError, EngineErrorKind};
use std::collections::HashMap;

/// Expand `{name}` placeholders in `template` from a value map.
///
/// Placeholder names are single-brace, lowercase with underscores, so
/// prose braces and JSON snippets in a prompt pass through untouched.
///
/// # Errors
///
/// Returns an error if the template names a placeholder the map has no
/// value for.
pub fn expand(template: &str, values: &HashMap<String, String>) -> CantastoriaResult<String> {
    let pattern = regex::Regex::new(r"\{([a-z_]+)\}").map_err(|e| {
        EngineError::new(EngineErrorKind::Template(format!(
            "invalid placeholder pattern: {e}"
        )))
    })?;

    let mut result = template.to_string();
    for cap in pattern.captures_iter(template) {
        let placeholder = &cap[0];
        let name = &cap[1];
        let replacement = values.get(name).ok_or_else(|| {
            let available: Vec<&str> = values.keys().map(String::as_str).collect();
            EngineError::new(EngineErrorKind::Template(format!(
                "'{}' (available: {})",
                name,
                if available.is_empty() {
                    "none".to_string()
                } else {
                    available.join(", ")
                }
            )))
        })?;
        result = result.replace(placeholder, replacement);
    }
    Ok(result)
}
