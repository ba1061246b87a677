//! Tolerant generation pipeline for AI scaffolding output.
//!
//! Language models asked for structured output return JSON wrapped in
//! prose, fenced in markdown, truncated mid-document, or riddled with
//! unescaped control characters. This crate recovers usable data from all
//! of that instead of failing:
//!
//! - **Repair** ([`repair`]) — a ladder of strategies from "parse as-is"
//!   down to string surgery and bracket synthesis. Total: the worst input
//!   yields an empty document plus diagnostics, never an error.
//! - **Schema** ([`schema`]) — typed project/requirement records and a
//!   coercion layer that turns loose JSON into them, dropping and counting
//!   malformed items.
//! - **Diagrams** ([`mermaid`]) — extraction and structural validation of
//!   Mermaid sources, with per-diagram failure isolation in batches.
//! - **Transport** ([`backend`]) — a provider abstraction with bounded
//!   retry, Retry-After support, and a mock for tests.
//!
//! # Quick start
//!
//! ```no_run
//! use scaffold_pipeline::{ExecCtx, Generator};
//! use scaffold_pipeline::backend::MockBackend;
//! use std::sync::Arc;
//!
//! # async fn run() -> scaffold_pipeline::Result<()> {
//! let ctx = ExecCtx::builder()
//!     .backend(Arc::new(MockBackend::new().with_response(
//!         r#"{"modules": [{"name": "auth", "files": []}]}"#,
//!     )))
//!     .build();
//!
//! let generator = Generator::new("gemini-1.5-flash");
//! let output = generator.project(&ctx, "Scaffold a NestJS shop backend").await?;
//!
//! assert_eq!(output.value.modules[0].name, "auth");
//! assert!(output.diagnostics.ok());
//! # Ok(())
//! # }
//! ```
//!
//! The repair ladder is also usable on its own:
//!
//! ```
//! use scaffold_pipeline::repair::repair_json;
//!
//! let out = repair_json("```json\n{\"name\": \"shop\", \"files\": [\n```");
//! assert_eq!(out.value["name"], "shop");
//! ```

pub mod backend;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod exec_ctx;
pub mod generate;
pub mod mermaid;
pub mod repair;
pub mod schema;

pub use diagnostics::RepairDiagnostics;
pub use error::{Result, ScaffoldError};
pub use events::{Event, EventHandler, FnEventHandler};
pub use exec_ctx::ExecCtx;
pub use generate::{DiagramRequest, GenerationOutput, Generator};
pub use mermaid::{extract_diagram, DiagramSyntaxError};
pub use repair::{repair_json, RepairOutcome};
pub use schema::{
    DiagramKind, DiagramRecord, FileCategory, GeneratedFile, GeneratedProject, ModuleBundle,
    Priority, RequirementKind, RequirementRecord,
};
