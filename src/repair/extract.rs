//! Structural extraction of candidate JSON spans.
//!
//! Locates every top-level `{...}` span in the input using the character
//! classifier, so brace characters inside string literals never confuse the
//! scan. Malformed input falls back to a single low-confidence span.

use super::classify::CharState;

/// Extract candidate JSON object spans from text.
///
/// Walks the text with [`CharState`]; a span starts where depth transitions
/// 0 -> 1 at a `{` and ends where the matching `}` returns depth to 0. If no
/// depth-tracked span closes (truncated or unbalanced input), the fallback is
/// the single span from the first `{` to the last `}` — or to end of input
/// when no `}` follows.
///
/// Returns an empty vector only when the text contains no `{` at all; the
/// orchestrator treats that as "not JSON-shaped".
///
/// # Examples
///
/// ```
/// use scaffold_pipeline::repair::extract_candidates;
///
/// let text = r#"First {"a": 1} then {"b": 2}"#;
/// let spans = extract_candidates(text);
/// assert_eq!(spans, vec![r#"{"a": 1}"#, r#"{"b": 2}"#]);
/// ```
pub fn extract_candidates(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut state = CharState::new();
    let mut start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if !state.in_string() && !state.pending_escape() {
            if ch == '{' && state.depth() == 0 {
                start = Some(i);
            } else if ch == '}' && state.depth() == 1 {
                if let Some(s) = start.take() {
                    spans.push(&text[s..i + ch.len_utf8()]);
                }
            }
        }
        state.advance(ch);
    }

    if spans.is_empty() {
        if let Some(first) = text.find('{') {
            match text.rfind('}') {
                Some(last) if last > first => spans.push(&text[first..=last]),
                _ => spans.push(&text[first..]),
            }
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_object() {
        let text = r#"Result: {"a": 1} done"#;
        assert_eq!(extract_candidates(text), vec![r#"{"a": 1}"#]);
    }

    #[test]
    fn nested_object_is_one_span() {
        let text = r#"{"outer": {"inner": [1]}}"#;
        assert_eq!(extract_candidates(text), vec![text]);
    }

    #[test]
    fn multiple_top_level_spans() {
        let text = r#"{"a": 1} and {"b": 2}"#;
        assert_eq!(extract_candidates(text), vec![r#"{"a": 1}"#, r#"{"b": 2}"#]);
    }

    #[test]
    fn braces_in_strings_ignored() {
        let text = r#"{"code": "fn main() { }"} trailing"#;
        assert_eq!(extract_candidates(text), vec![r#"{"code": "fn main() { }"}"#]);
    }

    #[test]
    fn unbalanced_falls_back_to_widest() {
        let text = r#"prefix {"a": {"b": 1} suffix"#;
        // No top-level span closes; first { to last }.
        assert_eq!(extract_candidates(text), vec![r#"{"a": {"b": 1}"#]);
    }

    #[test]
    fn truncated_without_closer_runs_to_end() {
        let text = r#"{"modules": ["#;
        assert_eq!(extract_candidates(text), vec![r#"{"modules": ["#]);
    }

    #[test]
    fn no_brace_yields_empty() {
        assert!(extract_candidates("just plain prose").is_empty());
        assert!(extract_candidates("").is_empty());
    }

    #[test]
    fn stray_closer_before_open_does_not_panic() {
        let text = r#"} noise {"a": 1}"#;
        assert_eq!(extract_candidates(text), vec![r#"{"a": 1}"#]);
    }
}
