//! Raw text normalization applied before any structural repair.
//!
//! Model output routinely arrives wrapped in markdown fences, salted with
//! zero-width characters, and with mixed line endings. [`normalize`] strips
//! all of that in one deterministic pass. Pure, total — never fails.

/// Normalize raw model output: strip code fences and invisible characters,
/// convert CRLF/CR to LF, and trim.
///
/// # Examples
///
/// ```
/// use scaffold_pipeline::repair::normalize;
///
/// let input = "```json\r\n{\"a\": 1}\r\n```";
/// assert_eq!(normalize(input), "{\"a\": 1}");
/// ```
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            // Zero-width space/joiners, word joiner, BOM.
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => {}
            _ => out.push(ch),
        }
    }
    strip_fences(&out).trim().to_string()
}

/// Drop fence-delimiter lines: a line whose content is ``` optionally
/// followed by a language tag.
fn strip_fences(text: &str) -> String {
    if !text.contains("```") {
        return text.to_string();
    }
    text.lines()
        .filter(|line| !is_fence_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_fence_line(line: &str) -> bool {
    let trimmed = line.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
        None => false,
    }
}
