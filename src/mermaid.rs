//! Mermaid diagram extraction and structural validation.
//!
//! Model responses carrying a diagram get the same fence/noise cleanup as
//! JSON output, then a structural check: the start token for the requested
//! kind must be present, and class diagrams must have balanced braces. This
//! deliberately stops short of a Mermaid grammar; rendering is the
//! consumer's concern.

use thiserror::Error;

use crate::repair::normalize;
use crate::schema::DiagramKind;

/// Structural problems in a candidate diagram.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagramSyntaxError {
    /// The response never mentions the start token for the requested kind.
    #[error("diagram is missing required start token '{token}'")]
    MissingStartToken { token: &'static str },

    /// Class diagram with mismatched brace counts.
    #[error("unbalanced braces in class diagram: {open} open, {close} close")]
    UnbalancedBraces { open: usize, close: usize },
}

/// Extract and validate a diagram of the given kind from raw model output.
///
/// Applies fence/noise normalization, requires the kind's start token to
/// appear somewhere in the text, trims trailing whitespace per line, and
/// moves the start token to the front when the model buried it under
/// preamble. The preamble is dropped rather than the token copied in front
/// of it, so the token never appears twice; either way the returned source
/// begins with the token. Class diagrams additionally get a brace-balance
/// check.
///
/// # Examples
///
/// ```
/// use scaffold_pipeline::mermaid::extract_diagram;
/// use scaffold_pipeline::schema::DiagramKind;
///
/// let raw = "```mermaid\nerDiagram\n  USER ||--o{ ORDER : places\n```";
/// let source = extract_diagram(raw, DiagramKind::EntityRelationship).unwrap();
/// assert!(source.starts_with("erDiagram"));
/// ```
pub fn extract_diagram(
    raw: &str,
    kind: DiagramKind,
) -> Result<String, DiagramSyntaxError> {
    let token = kind.start_token();
    let cleaned = normalize(raw);

    if !cleaned.contains(token) {
        return Err(DiagramSyntaxError::MissingStartToken { token });
    }

    // Drop any preamble before the start token, then tidy line endings.
    let from_token = match cleaned.find(token) {
        Some(pos) => &cleaned[pos..],
        None => cleaned.as_str(),
    };
    let tidied: String = from_token
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    let tidied = tidied.trim().to_string();

    if kind == DiagramKind::Class {
        let open = tidied.matches('{').count();
        let close = tidied.matches('}').count();
        if open != close {
            return Err(DiagramSyntaxError::UnbalancedBraces { open, close });
        }
    }

    Ok(tidied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_er_diagram_passes() {
        let raw = "erDiagram\n  USER ||--o{ ORDER : places";
        let out = extract_diagram(raw, DiagramKind::EntityRelationship).unwrap();
        assert!(out.starts_with("erDiagram"));
        assert!(out.contains("USER"));
    }

    #[test]
    fn fenced_diagram_unwrapped() {
        let raw = "```mermaid\nsequenceDiagram\n  A->>B: hello\n```";
        let out = extract_diagram(raw, DiagramKind::Sequence).unwrap();
        assert_eq!(out, "sequenceDiagram\n  A->>B: hello");
    }

    #[test]
    fn preamble_before_token_stripped() {
        let raw = "Here is your flowchart:\n\ngraph TD\n  A --> B";
        let out = extract_diagram(raw, DiagramKind::Flowchart).unwrap();
        assert!(out.starts_with("graph TD"));
        assert!(!out.contains("Here is"));
        // Token at the front exactly once, never duplicated.
        assert_eq!(out.matches("graph TD").count(), 1);
    }

    #[test]
    fn missing_token_rejected() {
        let err = extract_diagram("just some text", DiagramKind::Class).unwrap_err();
        assert_eq!(
            err,
            DiagramSyntaxError::MissingStartToken { token: "classDiagram" }
        );
    }

    #[test]
    fn wrong_kind_rejected() {
        // A sequence diagram is not a state diagram.
        let raw = "sequenceDiagram\n  A->>B: hi";
        assert!(extract_diagram(raw, DiagramKind::State).is_err());
    }

    #[test]
    fn class_diagram_balanced_braces_pass() {
        let raw = "classDiagram\n  class User {\n    +name: string\n  }";
        let out = extract_diagram(raw, DiagramKind::Class).unwrap();
        assert!(out.ends_with('}'));
    }

    #[test]
    fn class_diagram_unbalanced_braces_rejected() {
        let raw = "classDiagram\n  class User {\n    +name: string";
        let err = extract_diagram(raw, DiagramKind::Class).unwrap_err();
        assert_eq!(err, DiagramSyntaxError::UnbalancedBraces { open: 1, close: 0 });
    }

    #[test]
    fn trailing_whitespace_trimmed_per_line() {
        let raw = "graph TD   \n  A --> B   ";
        let out = extract_diagram(raw, DiagramKind::Flowchart).unwrap();
        assert_eq!(out, "graph TD\n  A --> B");
    }

    #[test]
    fn state_diagram_token_is_versioned() {
        let raw = "stateDiagram-v2\n  [*] --> Idle";
        assert!(extract_diagram(raw, DiagramKind::State).is_ok());
        // Bare "stateDiagram" without the v2 suffix is not the token.
        assert!(extract_diagram("stateDiagram\n  [*] --> Idle", DiagramKind::State).is_err());
    }
}
