//! Sentence-aligned text chunking.
//!
//! Speech models cap request length, so long scripts are cut into
//! chunks before synthesis. Cuts land only on sentence boundaries,
//! never mid-sentence, and concatenating the chunks reproduces the
//! input byte for byte.

/// Split `text` into chunks of at most `max_chunk_size` bytes.
///
/// A sentence boundary is terminal punctuation (`.`, `!`, `?`) followed
/// by whitespace; the whitespace run belongs to the preceding sentence.
/// Sentences are packed greedily into the current chunk until the next
/// one would overflow the limit. A single sentence longer than the
/// limit becomes its own oversized chunk rather than being cut.
///
/// # Examples
///
/// ```
/// use cantastoria_core::chunking;
///
/// let chunks = chunking::split("One. Two. Three.", 10);
/// assert_eq!(chunks, vec!["One. Two. ", "Three."]);
/// ```
pub fn split(text: &str, max_chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for unit in sentence_units(text) {
        if !current.is_empty() && current.len() + unit.len() > max_chunk_size {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(unit);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Partition `text` into sentence units whose concatenation is `text`.
///
/// Each unit runs from the end of the previous unit through its
/// terminal punctuation and any trailing whitespace. Text after the
/// last boundary forms a final unit even without punctuation.
fn sentence_units(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if !chars.peek().is_some_and(|&(_, next)| next.is_whitespace()) {
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }
        units.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        units.push(&text[start..]);
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenation_is_verbatim() {
        let text = "First sentence. Second one!  Third, with a pause? And a tail without punctuation";
        let chunks = split(text, 20);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn respects_max_size() {
        let text = "Alpha beta. Gamma delta. Epsilon zeta. Eta theta.";
        for chunk in split(text, 25) {
            assert!(chunk.len() <= 25, "chunk too long: {chunk:?}");
        }
    }

    #[test]
    fn packs_greedily() {
        let chunks = split("One. Two. Three.", 10);
        assert_eq!(chunks, vec!["One. Two. ", "Three."]);
    }

    #[test]
    fn oversized_sentence_kept_whole() {
        let long = "This single sentence is far longer than the limit allows. ";
        let chunks = split(&format!("{long}Short one."), 20);
        assert_eq!(chunks[0], long);
        assert_eq!(chunks[1], "Short one.");
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split("", 100).is_empty());
    }

    #[test]
    fn abbreviation_mid_text_is_a_boundary() {
        // The rule is punctuation plus whitespace, nothing smarter.
        let chunks = split("Dr. Who arrived. Then left.", 12);
        assert_eq!(chunks.concat(), "Dr. Who arrived. Then left.");
    }

    #[test]
    fn punctuation_without_whitespace_does_not_split() {
        let chunks = split("version 2.5 shipped", 100);
        assert_eq!(chunks, vec!["version 2.5 shipped"]);
    }

    #[test]
    fn whitespace_run_stays_with_its_sentence() {
        let chunks = split("One.\n\nTwo.", 6);
        assert_eq!(chunks, vec!["One.\n\n", "Two."]);
    }
}
