//! High-level generation entry points.
//!
//! [`Generator`] ties the layers together: it sends a prompt through the
//! backend (with bounded transport retry), runs the repair ladder over the
//! response, coerces the recovered JSON into typed records, and reports
//! everything it did through [`RepairDiagnostics`] and the event handler.
//!
//! Structured output never fails on malformed responses; diagram
//! generation fails per-diagram, and the batch entry point
//! [`Generator::diagrams`] isolates those failures so one bad diagram
//! never sinks the rest.

use std::time::Duration;

use crate::backend::{with_backoff, GenConfig, GenRequest};
use crate::diagnostics::RepairDiagnostics;
use crate::error::{Result, ScaffoldError};
use crate::events::{emit, Event};
use crate::exec_ctx::ExecCtx;
use crate::mermaid::extract_diagram;
use crate::repair::repair_json;
use crate::schema::{
    coerce_project, coerce_requirements, DiagramKind, DiagramRecord, GeneratedProject,
    RequirementRecord,
};

/// A typed generation result plus the raw response and repair telemetry.
#[derive(Debug)]
pub struct GenerationOutput<T> {
    /// The coerced, typed value.
    pub value: T,
    /// The raw response text as the provider returned it.
    pub raw_response: String,
    /// Everything the repair ladder and coercion layer did.
    pub diagnostics: RepairDiagnostics,
}

/// One diagram to produce in a batch.
#[derive(Debug, Clone)]
pub struct DiagramRequest {
    /// The diagram kind to validate against.
    pub kind: DiagramKind,
    /// Title attached to the resulting record.
    pub title: String,
    /// The full prompt describing what to diagram.
    pub prompt: String,
}

/// High-level generator for scaffolding output.
///
/// # Example
///
/// ```no_run
/// use scaffold_pipeline::{ExecCtx, Generator};
///
/// # async fn run() -> scaffold_pipeline::Result<()> {
/// let ctx = ExecCtx::builder().gemini_with_key("secret").build();
/// let gen = Generator::new("gemini-1.5-flash");
/// let output = gen.project(&ctx, "Generate a NestJS backend for a shop").await?;
/// println!("{} modules", output.value.modules.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    model: String,
    config: GenConfig,
}

impl Generator {
    /// Create a generator for the given model with JSON mode enabled.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            config: GenConfig::default().with_json_mode(true),
        }
    }

    /// Override the generation configuration.
    pub fn with_config(mut self, config: GenConfig) -> Self {
        self.config = config;
        self
    }

    /// Send one prompt through the backend with bounded transport retry.
    ///
    /// Returns the raw response text plus retry telemetry. Emits
    /// `GenerationStart`/`GenerationEnd` around the call and a
    /// `TransportRetry` event per retry.
    async fn generate_raw(
        &self,
        ctx: &ExecCtx,
        name: &str,
        prompt: &str,
        json_mode: bool,
    ) -> Result<(String, u32, u64)> {
        ctx.check_cancelled()?;
        emit(&ctx.event_handler, Event::GenerationStart { name: name.to_string() });

        let request = GenRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            config: self.config.clone().with_json_mode(json_mode),
        };

        let mut retries = 0u32;
        let mut backoff_total_ms = 0u64;
        let result = {
            let handler = ctx.event_handler.clone();
            let task = name.to_string();
            let mut on_retry = |attempt: u32, delay: Duration, reason: &str| {
                retries = attempt;
                backoff_total_ms += delay.as_millis() as u64;
                emit(
                    &handler,
                    Event::TransportRetry {
                        name: task.clone(),
                        attempt,
                        delay_ms: delay.as_millis() as u64,
                        reason: reason.to_string(),
                    },
                );
            };
            with_backoff(
                &ctx.backend,
                &ctx.client,
                &ctx.base_url,
                &request,
                &ctx.backoff,
                ctx.cancel_flag(),
                Some(&mut on_retry),
            )
            .await
        };

        emit(
            &ctx.event_handler,
            Event::GenerationEnd { name: name.to_string(), ok: result.is_ok() },
        );

        let response = result.map_err(|e| match e {
            ScaffoldError::Cancelled => ScaffoldError::Cancelled,
            other => ScaffoldError::Generation {
                name: name.to_string(),
                message: other.to_string(),
            },
        })?;
        Ok((response.text, retries, backoff_total_ms))
    }

    /// Forward every repair warning to the event handler.
    fn forward_warnings(ctx: &ExecCtx, name: &str, diag: &RepairDiagnostics) {
        for warning in &diag.warnings {
            emit(
                &ctx.event_handler,
                Event::RepairWarning {
                    name: name.to_string(),
                    detail: warning.clone(),
                },
            );
        }
    }

    /// Generate a project tree.
    ///
    /// Transport failures surface as errors; malformed output does not.
    /// In the worst case the project is empty and the diagnostics say why.
    pub async fn project(
        &self,
        ctx: &ExecCtx,
        prompt: &str,
    ) -> Result<GenerationOutput<GeneratedProject>> {
        let (raw, retries, backoff_ms) = self.generate_raw(ctx, "project", prompt, true).await?;
        let outcome = repair_json(&raw);
        let mut diag = outcome.diagnostics;
        diag.transport_retries = retries;
        diag.backoff_total_ms = backoff_ms;
        let value = coerce_project(&outcome.value, &mut diag);
        Self::forward_warnings(ctx, "project", &diag);
        Ok(GenerationOutput { value, raw_response: raw, diagnostics: diag })
    }

    /// Generate a requirements list.
    pub async fn requirements(
        &self,
        ctx: &ExecCtx,
        prompt: &str,
    ) -> Result<GenerationOutput<Vec<RequirementRecord>>> {
        let (raw, retries, backoff_ms) =
            self.generate_raw(ctx, "requirements", prompt, true).await?;
        let outcome = repair_json(&raw);
        let mut diag = outcome.diagnostics;
        diag.transport_retries = retries;
        diag.backoff_total_ms = backoff_ms;
        let value = coerce_requirements(&outcome.value, &mut diag);
        Self::forward_warnings(ctx, "requirements", &diag);
        Ok(GenerationOutput { value, raw_response: raw, diagnostics: diag })
    }

    /// Generate and validate one diagram.
    async fn diagram(&self, ctx: &ExecCtx, request: &DiagramRequest) -> Result<DiagramRecord> {
        let name = format!("diagram:{}", request.kind);
        let (raw, _, _) = self.generate_raw(ctx, &name, &request.prompt, false).await?;
        let source_text = extract_diagram(&raw, request.kind)?;
        Ok(DiagramRecord {
            kind: request.kind,
            title: request.title.clone(),
            source_text,
        })
    }

    /// Generate a batch of diagrams concurrently.
    ///
    /// Failures are isolated per diagram: a diagram that fails generation
    /// or validation is dropped (with a `DiagramDropped` event) and the
    /// rest of the batch is returned. Results keep the request order.
    pub async fn diagrams(
        &self,
        ctx: &ExecCtx,
        requests: &[DiagramRequest],
    ) -> Vec<DiagramRecord> {
        let tasks = requests.iter().map(|request| self.diagram(ctx, request));
        let results = futures::future::join_all(tasks).await;

        let mut records = Vec::with_capacity(requests.len());
        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(record) => records.push(record),
                Err(e) => emit(
                    &ctx.event_handler,
                    Event::DiagramDropped {
                        kind: request.kind.to_string(),
                        reason: e.to_string(),
                    },
                ),
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackoffConfig, MockBackend};
    use crate::events::{Event, FnEventHandler};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    fn ctx_with(backend: MockBackend) -> ExecCtx {
        ExecCtx::builder()
            .backend(Arc::new(backend))
            .backoff(BackoffConfig {
                initial_delay: Duration::from_millis(1),
                ..BackoffConfig::linear()
            })
            .build()
    }

    #[tokio::test]
    async fn project_from_clean_response() {
        let backend = MockBackend::new()
            .with_response(r#"{"modules": [{"name": "auth", "files": []}]}"#);
        let ctx = ctx_with(backend);
        let gen = Generator::new("test-model");

        let out = gen.project(&ctx, "scaffold it").await.unwrap();
        assert_eq!(out.value.modules.len(), 1);
        assert_eq!(out.value.modules[0].name, "auth");
        assert!(out.diagnostics.ok());
        assert_eq!(out.diagnostics.stage, Some("raw"));
    }

    #[tokio::test]
    async fn project_from_damaged_response() {
        let backend = MockBackend::new()
            .with_response("```json\n{\"modules\": [{\"name\": \"shop\", \"files\": [");
        let ctx = ctx_with(backend);
        let gen = Generator::new("test-model");

        let out = gen.project(&ctx, "scaffold it").await.unwrap();
        assert_eq!(out.value.modules[0].name, "shop");
        assert!(out.diagnostics.repaired);
    }

    #[tokio::test]
    async fn project_never_fails_on_garbage_output() {
        let backend = MockBackend::new().with_response("I cannot help with that.");
        let ctx = ctx_with(backend);
        let gen = Generator::new("test-model");

        let out = gen.project(&ctx, "scaffold it").await.unwrap();
        assert!(out.value.modules.is_empty());
        assert!(out.diagnostics.defaulted);
        assert!(out.diagnostics.parse_error.is_some());
    }

    #[tokio::test]
    async fn project_records_transport_retries() {
        let backend = MockBackend::new()
            .with_failures(2, 503)
            .with_response(r#"{"modules": []}"#);
        let ctx = ctx_with(backend);
        let gen = Generator::new("test-model");

        let out = gen.project(&ctx, "scaffold it").await.unwrap();
        assert_eq!(out.diagnostics.transport_retries, 2);
        assert!(out.diagnostics.backoff_total_ms > 0);
    }

    #[tokio::test]
    async fn transport_exhaustion_is_an_error() {
        let backend = MockBackend::new().with_failures(10, 503);
        let ctx = ctx_with(backend);
        let gen = Generator::new("test-model");

        let err = gen.project(&ctx, "scaffold it").await.unwrap_err();
        assert!(matches!(err, ScaffoldError::Generation { .. }));
    }

    #[tokio::test]
    async fn cancellation_short_circuits() {
        let backend = MockBackend::new().with_response("{}");
        let flag = Arc::new(AtomicBool::new(true));
        let ctx = ExecCtx::builder()
            .backend(Arc::new(backend))
            .cancellation(Some(flag))
            .build();
        let gen = Generator::new("test-model");

        let err = gen.project(&ctx, "scaffold it").await.unwrap_err();
        assert!(matches!(err, ScaffoldError::Cancelled));
    }

    #[tokio::test]
    async fn requirements_coerced_and_repaired() {
        let backend = MockBackend::new().with_response(
            r#"[{"id": "bogus", "description": "Users can register", "priority": "high"}]"#,
        );
        let ctx = ctx_with(backend);
        let gen = Generator::new("test-model");

        let out = gen.requirements(&ctx, "list requirements").await.unwrap();
        assert_eq!(out.value.len(), 1);
        assert_eq!(out.value[0].id, "REQ-001");
        assert!(!out.diagnostics.warnings.is_empty());
    }

    #[tokio::test]
    async fn diagram_batch_isolates_failures() {
        // First response is a valid ER diagram, second is prose (no token).
        let backend = MockBackend::new().with_responses([
            "erDiagram\n  USER ||--o{ ORDER : places",
            "Sorry, I can't draw that.",
        ]);
        let dropped = Arc::new(AtomicU32::new(0));
        let dropped_clone = dropped.clone();
        let ctx = ExecCtx::builder()
            .backend(Arc::new(backend))
            .event_handler(Arc::new(FnEventHandler(move |event: Event| {
                if matches!(event, Event::DiagramDropped { .. }) {
                    dropped_clone.fetch_add(1, Ordering::Relaxed);
                }
            })))
            .build();
        let gen = Generator::new("test-model");

        let requests = vec![
            DiagramRequest {
                kind: DiagramKind::EntityRelationship,
                title: "Data model".into(),
                prompt: "draw the ER diagram".into(),
            },
            DiagramRequest {
                kind: DiagramKind::Sequence,
                title: "Login flow".into(),
                prompt: "draw the sequence diagram".into(),
            },
        ];
        let records = gen.diagrams(&ctx, &requests).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, DiagramKind::EntityRelationship);
        assert!(records[0].source_text.starts_with("erDiagram"));
        assert_eq!(dropped.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn repair_warnings_forwarded_as_events() {
        let backend = MockBackend::new()
            .with_response(r#"{"modules": [{"name": "a", "files": ["#);
        let warnings = Arc::new(Mutex::new(Vec::new()));
        let warnings_clone = warnings.clone();
        let ctx = ExecCtx::builder()
            .backend(Arc::new(backend))
            .event_handler(Arc::new(FnEventHandler(move |event: Event| {
                if let Event::RepairWarning { detail, .. } = event {
                    warnings_clone.lock().unwrap().push(detail);
                }
            })))
            .build();
        let gen = Generator::new("test-model");

        let out = gen.project(&ctx, "scaffold it").await.unwrap();
        assert!(out.diagnostics.synthesized_brackets > 0);
        assert!(!warnings.lock().unwrap().is_empty());
    }
}
