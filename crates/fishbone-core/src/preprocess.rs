use regex::Regex;
use std::sync::OnceLock;

fn fenced_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_+.-]*[ \t]*\r?\n?(.*?)```").expect("valid regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessResult {
    pub text: String,
    /// A fenced-code wrapper (```` ``` ```` / ```` ```json ````) was removed.
    pub stripped_fence: bool,
    /// Prose around the outermost `{ ... }` span was dropped.
    pub stripped_prose: bool,
}

/// Strips the non-content wrappers language models put around structured replies.
///
/// Handles a leading BOM, surrounding whitespace, a complete fenced block (also when it sits
/// between chatter), an unterminated opening fence, and prose around a bare `{ ... }` span.
pub fn preprocess_taxonomy_text(raw: &str) -> PreprocessResult {
    let mut text = raw.trim_start_matches('\u{feff}').trim();
    let mut stripped_fence = false;

    if let Some(caps) = fenced_block_regex().captures(text) {
        text = caps.get(1).map_or("", |m| m.as_str()).trim();
        stripped_fence = true;
    } else if let Some(rest) = text.strip_prefix("```") {
        // Unterminated fence (the reply was cut off): drop the info-string line.
        text = match rest.find('\n') {
            Some(idx) => rest[idx + 1..].trim(),
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim(),
        };
        stripped_fence = true;
    }

    let mut stripped_prose = false;
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        let surrounded = start > 0 || end + 1 < text.len();
        if start < end && surrounded {
            text = text[start..=end].trim();
            stripped_prose = true;
        }
    }

    PreprocessResult {
        text: text.to_string(),
        stripped_fence,
        stripped_prose,
    }
}
