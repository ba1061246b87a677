//! Bracket balancing and comma/hole cleanup.
//!
//! Tracks an explicit stack of open brackets (strings ignored via the
//! classifier). At end of input the missing closers are synthesized in
//! last-opened-first-closed order. Also collapses trailing commas, runs of
//! commas, and null-fills empty value holes so the result is syntactically
//! well-formed JSON.

use super::classify::CharState;
use crate::diagnostics::RepairDiagnostics;

/// Balance brackets in a span and clean up comma/hole artifacts.
///
/// Guarantees that every `{`/`[` opened outside a string is matched by a
/// closer in the output; unmatched stray closers are dropped. Synthesized
/// closers are counted in `diag` with a warning.
///
/// # Examples
///
/// ```
/// use scaffold_pipeline::repair::balance_brackets;
/// use scaffold_pipeline::RepairDiagnostics;
///
/// let mut diag = RepairDiagnostics::default();
/// let out = balance_brackets(r#"{"a": [1, 2"#, &mut diag);
/// assert_eq!(out, r#"{"a": [1, 2]}"#);
/// assert_eq!(diag.synthesized_brackets, 2);
/// ```
pub fn balance_brackets(span: &str, diag: &mut RepairDiagnostics) -> String {
    let chars: Vec<char> = span.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(span.len() + 8);
    let mut stack: Vec<char> = Vec::new();
    let mut state = CharState::new();
    let mut i = 0;

    while i < len {
        let ch = chars[i];

        if state.in_string() || state.pending_escape() {
            out.push(ch);
            state.advance(ch);
            i += 1;
            continue;
        }

        match ch {
            '{' => {
                stack.push('}');
                out.push(ch);
            }
            '[' => {
                stack.push(']');
                out.push(ch);
            }
            '}' | ']' => {
                if stack.last() == Some(&ch) {
                    stack.pop();
                    out.push(ch);
                } else {
                    diag.warn(format!("dropped unmatched '{}'", ch));
                }
            }
            ',' => {
                // Emit a comma only when a value actually follows: drop
                // duplicates in a run, trailing commas before a closer, and
                // a dangling comma at end of input.
                let next = next_non_whitespace(&chars, i + 1);
                match next {
                    Some(',') | Some('}') | Some(']') | None => {}
                    Some(_) => out.push(','),
                }
            }
            ':' => {
                out.push(':');
                // Empty value hole: null-fill.
                let next = next_non_whitespace(&chars, i + 1);
                if matches!(next, Some(',') | Some('}') | Some(']') | None) {
                    out.push_str(" null");
                }
            }
            c => out.push(c),
        }

        state.advance(ch);
        i += 1;
    }

    if state.in_string() {
        out.push('"');
        diag.warn("unterminated string at end of input; closed");
        // A dangling comma may now precede the synthesized closers.
    }

    while out.trim_end().ends_with(',') {
        let trimmed_len = out.trim_end().len();
        out.truncate(trimmed_len - 1);
    }

    if !stack.is_empty() {
        diag.synthesized_brackets += stack.len() as u32;
        diag.warn(format!(
            "appended {} missing closing bracket(s)",
            stack.len()
        ));
        while let Some(closer) = stack.pop() {
            out.push(closer);
        }
    }

    out
}

fn next_non_whitespace(chars: &[char], from: usize) -> Option<char> {
    chars[from.min(chars.len())..]
        .iter()
        .copied()
        .find(|c| !c.is_whitespace())
}
