//! Multi-strategy repair orchestration.
//!
//! Runs the repair ladder over raw model output: parse as-is, normalize,
//! extract candidate spans, repair strings, balance brackets, and finally a
//! best-effort pass over the widest span. The first stage that yields a
//! parseable document wins. If everything fails, an empty object is
//! substituted so the caller always receives a value.

use serde_json::Value;

use super::balance::balance_brackets;
use super::extract::extract_candidates;
use super::normalize::normalize;
use super::strings::repair_strings;
use crate::diagnostics::RepairDiagnostics;

/// The recovered document plus a record of how it was recovered.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// The recovered JSON value. An empty object when every strategy failed.
    pub value: Value,
    /// What the repair ladder did to get here.
    pub diagnostics: RepairDiagnostics,
}

/// Recover a JSON document from raw model output.
///
/// Never fails: when no strategy yields parseable JSON the outcome carries
/// an empty object with `defaulted` set and the original parse error
/// retained in the diagnostics.
///
/// # Examples
///
/// ```
/// use scaffold_pipeline::repair::repair_json;
///
/// let out = repair_json("```json\n{\"name\": \"auth\",}\n```");
/// assert_eq!(out.value["name"], "auth");
/// assert!(out.diagnostics.repaired);
/// ```
pub fn repair_json(raw: &str) -> RepairOutcome {
    let mut diag = RepairDiagnostics::default();

    // Stage 1: the happy path. Well-behaved models produce this.
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        diag.stage = Some("raw");
        return RepairOutcome { value, diagnostics: diag };
    }
    // Retained only if everything below fails too.
    let initial_error = serde_json::from_str::<Value>(raw).unwrap_err().to_string();

    // Stage 2: strip fences, line endings, zero-width characters.
    let normalized = normalize(raw);
    if let Ok(value) = serde_json::from_str::<Value>(&normalized) {
        diag.stage = Some("normalized");
        diag.repaired = true;
        return RepairOutcome { value, diagnostics: diag };
    }

    // Stage 3+: per-candidate ladder, widest span first.
    let mut candidates = extract_candidates(&normalized);
    candidates.sort_by_key(|c| std::cmp::Reverse(c.len()));

    for candidate in &candidates {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            diag.stage = Some("extracted");
            diag.repaired = true;
            return RepairOutcome { value, diagnostics: diag };
        }

        let mut local = diag.clone();
        let strings_fixed = repair_strings(candidate, &mut local);
        if let Ok(value) = serde_json::from_str::<Value>(&strings_fixed) {
            local.stage = Some("string_repaired");
            local.repaired = true;
            return RepairOutcome { value, diagnostics: local };
        }

        let balanced = balance_brackets(&strings_fixed, &mut local);
        if let Ok(value) = serde_json::from_str::<Value>(&balanced) {
            local.stage = Some("bracket_balanced");
            local.repaired = true;
            return RepairOutcome { value, diagnostics: local };
        }
    }

    // Last resort: the longest possible candidate, from the first brace to
    // the end of the normalized text. Extraction truncates its fallback span
    // at the last closer, which can cut a quoted value short; this span keeps
    // the tail so string repair sees the closing quote.
    if let Some(first) = normalized.find('{') {
        let widest = &normalized[first..];
        let mut local = diag.clone();
        let chained = balance_brackets(&repair_strings(widest, &mut local), &mut local);
        if let Ok(value) = serde_json::from_str::<Value>(&chained) {
            local.stage = Some("best_effort");
            local.repaired = true;
            return RepairOutcome { value, diagnostics: local };
        }
    }

    diag.stage = Some("defaulted");
    diag.repaired = true;
    diag.defaulted = true;
    diag.parse_error = Some(initial_error);
    diag.warn("no strategy produced parseable JSON; substituted empty object");
    RepairOutcome {
        value: Value::Object(serde_json::Map::new()),
        diagnostics: diag,
    }
}
