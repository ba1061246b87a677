//! String-level repair of an extracted JSON span.
//!
//! Re-walks the span character by character: raw control characters inside
//! strings are re-escaped, accidental double-escaping is collapsed,
//! single-quoted and backtick-quoted values are rewritten to double-quoted
//! form, and a runaway unterminated string is force-closed at a fixed bound.

use crate::diagnostics::RepairDiagnostics;

/// Longest quoted string tolerated before forced closure.
///
/// Guards against a model emitting an unterminated string that would
/// otherwise swallow the rest of the document. The source systems used
/// bounds between 10,000 and 50,000; this implementation fixes one value.
pub const MAX_STRING_LEN: usize = 20_000;

/// Repair string literals within a span.
///
/// Inside double-quoted strings: `\n`/`\r`/`\t` are re-escaped, other
/// C0/C1 control characters are dropped, doubled quotes glued to further
/// content collapse to an escaped quote, and stray backslashes are escaped.
/// Outside strings, single-quoted and backtick-quoted values at value
/// boundaries are rewritten to double-quoted escaped form.
///
/// A string running past [`MAX_STRING_LEN`] without a closing quote is
/// force-closed at the boundary and recorded in `diag` as a warning.
pub fn repair_strings(span: &str, diag: &mut RepairDiagnostics) -> String {
    let chars: Vec<char> = span.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(span.len());
    let mut i = 0;
    let mut in_string = false;
    let mut string_len = 0usize;

    while i < len {
        let ch = chars[i];

        if in_string {
            if string_len >= MAX_STRING_LEN {
                out.push('"');
                in_string = false;
                diag.forced_string_closes += 1;
                diag.warn(format!(
                    "quoted string exceeded {} chars without closing quote; force-closed",
                    MAX_STRING_LEN
                ));
                continue; // current char is reprocessed outside the string
            }
            match ch {
                '\\' => {
                    // Collapse double-escaped quotes: `\\"` glued to more
                    // string content was meant as an escaped quote.
                    if i + 2 < len
                        && chars[i + 1] == '\\'
                        && chars[i + 2] == '"'
                        && !closes_value(&chars, i + 3)
                    {
                        out.push_str("\\\"");
                        string_len += 1;
                        i += 3;
                        continue;
                    }
                    match chars.get(i + 1) {
                        Some(&next) if is_escape_char(next) => {
                            out.push('\\');
                            out.push(next);
                            string_len += 2;
                            i += 2;
                        }
                        _ => {
                            // Lone backslash before a non-escape char.
                            out.push_str("\\\\");
                            string_len += 1;
                            i += 1;
                        }
                    }
                }
                '"' => {
                    // Doubled quote glued to further content collapses to an
                    // escaped quote rather than close-and-reopen.
                    if i + 1 < len && chars[i + 1] == '"' && !closes_value(&chars, i + 2) {
                        out.push_str("\\\"");
                        string_len += 1;
                        i += 2;
                        continue;
                    }
                    out.push('"');
                    in_string = false;
                    i += 1;
                }
                '\n' => {
                    out.push_str("\\n");
                    string_len += 1;
                    i += 1;
                }
                '\r' => {
                    out.push_str("\\r");
                    string_len += 1;
                    i += 1;
                }
                '\t' => {
                    out.push_str("\\t");
                    string_len += 1;
                    i += 1;
                }
                c if is_control(c) => {
                    // Other C0/C1 controls are dropped outright.
                    i += 1;
                }
                c => {
                    out.push(c);
                    string_len += 1;
                    i += 1;
                }
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                string_len = 0;
                out.push('"');
                i += 1;
            }
            '\'' | '`' => {
                if is_boundary_before(&chars, i) {
                    if let Some(close) = find_matching_quote(&chars, i + 1, ch) {
                        if is_boundary_after(&chars, close) {
                            out.push('"');
                            for &c in &chars[i + 1..close] {
                                push_escaped(&mut out, c);
                            }
                            out.push('"');
                            i = close + 1;
                            continue;
                        }
                    }
                }
                out.push(ch);
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    if in_string {
        out.push('"');
        diag.warn("unterminated string at end of input; closed");
    }

    out
}

fn is_escape_char(c: char) -> bool {
    matches!(c, '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u')
}

fn is_control(c: char) -> bool {
    let code = c as u32;
    code < 0x20 || (0x7F..=0x9F).contains(&code)
}

/// Escape one character while copying a quoted value into double-quoted form.
fn push_escaped(out: &mut String, c: char) {
    match c {
        '"' => out.push_str("\\\""),
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if is_control(c) => {}
        c => out.push(c),
    }
}

/// Does the first non-whitespace char at/after `j` terminate a value?
fn closes_value(chars: &[char], j: usize) -> bool {
    let mut k = j;
    while k < chars.len() && chars[k].is_whitespace() {
        k += 1;
    }
    k >= chars.len() || matches!(chars[k], ',' | '}' | ']' | ':')
}

/// Check if the character before position `i` suggests a value boundary.
fn is_boundary_before(chars: &[char], i: usize) -> bool {
    let mut j = i;
    while j > 0 {
        j -= 1;
        if chars[j].is_whitespace() {
            continue;
        }
        return matches!(chars[j], '{' | '[' | ':' | ',');
    }
    true
}

/// Check if the character after position `i` suggests a value boundary.
fn is_boundary_after(chars: &[char], i: usize) -> bool {
    closes_value(chars, i + 1)
}

/// Find the matching closing quote of the same style, skipping escapes.
fn find_matching_quote(chars: &[char], start: usize, quote: char) -> Option<usize> {
    let mut i = start;
    while i < chars.len() {
        if chars[i] == '\\' {
            i += 2;
            continue;
        }
        if chars[i] == quote {
            return Some(i);
        }
        i += 1;
    }
    None
}
