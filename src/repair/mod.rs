//! Tolerant JSON recovery for model output.
//!
//! Language models wrap JSON in prose and code fences, leave strings
//! unterminated, truncate mid-document, and mix quote styles. This module
//! recovers a usable document from all of that instead of failing. The entry
//! point is [`repair_json`]; the stages it composes are public for targeted
//! use:
//!
//! - [`classify::CharState`] — string/escape/depth tracking shared by every stage
//! - [`normalize`] — line endings, zero-width characters, code fences
//! - [`extract_candidates`] — candidate JSON spans in surrounding prose
//! - [`repair_strings`] — control characters, runaway and mixed-quote strings
//! - [`balance_brackets`] — synthesized closers, comma and hole cleanup

pub mod balance;
pub mod classify;
pub mod extract;
pub mod normalize;
pub mod orchestrator;
pub mod strings;

pub use balance::balance_brackets;
pub use classify::CharState;
pub use extract::extract_candidates;
pub use normalize::normalize;
pub use orchestrator::{repair_json, RepairOutcome};
pub use strings::{repair_strings, MAX_STRING_LEN};
