//! Chat line tokenizer.

/// Invisible "tag" characters some chat extensions append to defeat duplicate
/// message filters (U+E0000 block).
fn is_invisible_tag(c: char) -> bool {
    ('\u{E0000}'..='\u{E007F}').contains(&c)
}

/// Split a chat line into whitespace-separated segments.
///
/// Invisible tag characters are removed before splitting, so they never
/// produce empty or look-alike segments.
pub fn parse_message(message: &str) -> Vec<String> {
    let cleaned: String = message.chars().filter(|c| !is_invisible_tag(*c)).collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}
