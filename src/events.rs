//! Event system for generation lifecycle and repair warnings.
//!
//! Provides an optional, non-intrusive way to observe pipeline execution.
//! The generator emits events when an upstream call starts, retries, and
//! finishes, and forwards warning-level repair signals (forced string
//! closes, bracket synthesis, dropped diagrams). Users implement
//! [`EventHandler`] to receive these for logging or progress tracking.

use std::sync::Arc;

/// Events emitted during generation and repair.
#[derive(Debug, Clone)]
pub enum Event {
    /// An upstream generation call has started.
    GenerationStart {
        /// Name of the generation task (e.g. `"project"`, `"diagram:classDiagram"`).
        name: String,
    },
    /// An upstream generation call has finished.
    GenerationEnd {
        /// Name of the generation task.
        name: String,
        /// Whether the call (including retries) succeeded.
        ok: bool,
    },
    /// A transport-level retry due to a transient HTTP error.
    TransportRetry {
        /// Name of the generation task being retried.
        name: String,
        /// The retry attempt number (1-indexed).
        attempt: u32,
        /// Delay before this retry attempt in milliseconds.
        delay_ms: u64,
        /// Reason for the retry (error description).
        reason: String,
    },
    /// A lossy repair action was applied to model output.
    RepairWarning {
        /// Name of the generation task whose output was repaired.
        name: String,
        /// Description of the repair action (forced close, bracket synthesis, ...).
        detail: String,
    },
    /// A diagram failed generation or validation and was dropped from the batch.
    DiagramDropped {
        /// The diagram kind (e.g. `"classDiagram"`).
        kind: String,
        /// Why the diagram was dropped.
        reason: String,
    },
}

/// Handler for pipeline lifecycle events.
///
/// Implement this trait to receive retry notices, repair warnings, and
/// lifecycle signals during generation. Entirely optional — the pipeline
/// works without a handler.
///
/// # Example
///
/// ```
/// use scaffold_pipeline::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         match event {
///             Event::RepairWarning { name, detail } => {
///                 eprintln!("[warn] {}: {}", name, detail)
///             }
///             Event::GenerationEnd { name, ok } => {
///                 eprintln!("[end] {} ok={}", name, ok)
///             }
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called when the pipeline emits an event.
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
///
/// # Example
///
/// ```
/// use scaffold_pipeline::events::{Event, FnEventHandler};
/// use std::sync::Arc;
///
/// let handler = Arc::new(FnEventHandler(|event: Event| {
///     if let Event::DiagramDropped { kind, reason } = event {
///         eprintln!("dropped {}: {}", kind, reason);
///     }
/// }));
/// ```
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}
