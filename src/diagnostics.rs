//! Repair diagnostics and telemetry.
//!
//! [`RepairDiagnostics`] records what happened while recovering a document
//! from model output — which stage of the repair ladder produced the value,
//! whether defaults were substituted, and every warning-level signal (forced
//! string closes, synthesized brackets, dropped array items).

/// Records what happened during repair and coercion of one response.
///
/// Attached to every [`GenerationOutput`](crate::generate::GenerationOutput)
/// and returned by [`repair_json`](crate::repair::repair_json). Tells the
/// caller how degraded the model output was; the pipeline itself never fails
/// on malformed output.
///
/// # Example
///
/// ```
/// use scaffold_pipeline::RepairDiagnostics;
///
/// let diag = RepairDiagnostics::default();
/// assert!(diag.ok()); // nothing defaulted, no parse error
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepairDiagnostics {
    /// Which repair stage ultimately produced the value.
    /// e.g. `"raw"`, `"normalized"`, `"extracted"`, `"string_repaired"`,
    /// `"bracket_balanced"`, `"best_effort"`, `"defaulted"`.
    pub stage: Option<&'static str>,

    /// The original parse error, retained only when every strategy failed
    /// and the default document was substituted.
    pub parse_error: Option<String>,

    /// Whether any repair stage beyond plain extraction was applied.
    pub repaired: bool,

    /// Whether the fixed empty/default document was substituted.
    pub defaulted: bool,

    /// Number of strings force-closed at the length threshold.
    pub forced_string_closes: u32,

    /// Number of closing brackets synthesized at end of input.
    pub synthesized_brackets: u32,

    /// Number of malformed array items dropped during coercion.
    pub dropped_items: u32,

    /// Number of transport retries (429, 5xx) before the request succeeded.
    pub transport_retries: u32,

    /// Total time spent in backoff delays (milliseconds).
    pub backoff_total_ms: u64,

    /// Warning-level messages describing each lossy repair action.
    pub warnings: Vec<String>,
}

impl RepairDiagnostics {
    /// Quick check: was a real (non-default) document recovered?
    pub fn ok(&self) -> bool {
        !self.defaulted && self.parse_error.is_none()
    }

    /// Record a warning-level diagnostic message.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}
