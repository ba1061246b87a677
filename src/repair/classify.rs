//! Per-character stream classification.
//!
//! [`CharState`] is the shared primitive every repair routine composes: a
//! pure fold over the input tracking whether the cursor is inside a quoted
//! string, whether the previous character was an unconsumed escape, and the
//! current bracket-nesting depth.

/// Fold state for one pass over a character stream.
///
/// Feed characters through [`advance`](CharState::advance) in order. The
/// state *after* advancing on a character reflects that character's effect:
/// advancing on an opening `"` leaves the state inside a string, advancing
/// on `{` increments the depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharState {
    in_string: bool,
    pending_escape: bool,
    depth: i32,
}

impl CharState {
    /// Fresh state at the start of input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one character to the state.
    ///
    /// A backslash inside a string marks exactly the next character as
    /// escaped; an escaped character has no structural effect. A `"` toggles
    /// the string flag only when not escaped. Brackets adjust depth only
    /// outside strings.
    pub fn advance(&mut self, ch: char) {
        if self.pending_escape {
            self.pending_escape = false;
            return;
        }
        if self.in_string {
            match ch {
                '\\' => self.pending_escape = true,
                '"' => self.in_string = false,
                _ => {}
            }
            return;
        }
        match ch {
            '"' => self.in_string = true,
            '{' | '[' => self.depth += 1,
            '}' | ']' => self.depth -= 1,
            _ => {}
        }
    }

    /// Whether the cursor is inside a double-quoted string.
    pub fn in_string(&self) -> bool {
        self.in_string
    }

    /// Whether the next character is consumed by a preceding backslash.
    pub fn pending_escape(&self) -> bool {
        self.pending_escape
    }

    /// Current bracket-nesting depth. May go negative on stray closers.
    pub fn depth(&self) -> i32 {
        self.depth
    }
}
