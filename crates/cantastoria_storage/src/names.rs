//! Deterministic artifact names.
//!
//! Every artifact a run produces gets a predictable name, so reruns
//! overwrite their predecessors and callers can locate outputs without
//! a manifest.

/// Name of the assembled script text.
pub const SCRIPT_NAME: &str = "script.txt";

/// Name of the assembled narration file.
pub fn complete_audio_name(extension: &str) -> String {
    format!("COMPLETE_AUDIO.{extension}")
}

/// Name of one intermediate narration fragment, 1-based.
pub fn fragment_name(index: usize, extension: &str) -> String {
    format!("chunk_{index}.{extension}")
}

/// Name of one generated image, all indices 1-based.
pub fn image_name(section: usize, prompt: usize, variant: usize, extension: &str) -> String {
    format!("section_{section}_prompt_{prompt}_image_{variant}.{extension}")
}

/// File extension for an image MIME type. Unknown types fall back to
/// png, which is what the image models emit by default.
pub fn image_extension(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_encode_their_indices() {
        assert_eq!(fragment_name(3, "wav"), "chunk_3.wav");
        assert_eq!(complete_audio_name("wav"), "COMPLETE_AUDIO.wav");
        assert_eq!(
            image_name(2, 1, 4, "png"),
            "section_2_prompt_1_image_4.png"
        );
    }

    #[test]
    fn image_extensions_follow_mime() {
        assert_eq!(image_extension("image/png"), "png");
        assert_eq!(image_extension("image/jpeg"), "jpg");
        assert_eq!(image_extension("image/webp"), "webp");
        assert_eq!(image_extension("application/octet-stream"), "png");
    }
}
