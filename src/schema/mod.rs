//! Typed output schema and the coercion layer that guards it.
//!
//! [`model`] holds the record types the pipeline emits; [`coerce`] turns
//! repaired-but-loose JSON into those types without ever failing.

pub mod coerce;
pub mod model;

pub use coerce::{coerce_file, coerce_module, coerce_project, coerce_requirements};
pub use model::{
    DiagramKind, DiagramRecord, FileCategory, GeneratedFile, GeneratedProject, ModuleBundle,
    Priority, RequirementKind, RequirementRecord,
};
