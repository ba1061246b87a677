//! Typed records produced by the pipeline.
//!
//! All entities are plain data records created fresh per generation request
//! from repaired/coerced text and never mutated after construction. The
//! export/storage collaborators consume exactly these shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of file categories in a generated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Controller,
    Service,
    Model,
    Component,
    Config,
    Test,
    Other,
}

impl FileCategory {
    /// Parse a category name leniently. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "controller" => Some(Self::Controller),
            "service" => Some(Self::Service),
            "model" | "entity" => Some(Self::Model),
            "component" => Some(Self::Component),
            "config" | "configuration" => Some(Self::Config),
            "test" | "spec" => Some(Self::Test),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Infer a category from a file path when no valid explicit category
    /// was given. Matches the naming conventions of generated backend and
    /// frontend trees (`users.controller.ts`, `auth.service.ts`, ...).
    pub fn infer_from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.contains(".controller.") {
            Self::Controller
        } else if lower.contains(".service.") {
            Self::Service
        } else if lower.contains(".model.") || lower.contains(".entity.") || lower.contains(".schema.") {
            Self::Model
        } else if lower.contains(".spec.") || lower.contains(".test.") || lower.contains("__tests__") {
            Self::Test
        } else if lower.contains(".component.")
            || lower.ends_with(".tsx")
            || lower.ends_with(".jsx")
            || lower.ends_with(".vue")
        {
            Self::Component
        } else if lower.contains(".config.")
            || lower.ends_with("package.json")
            || lower.ends_with("tsconfig.json")
            || lower.ends_with(".env")
        {
            Self::Config
        } else {
            Self::Other
        }
    }
}

/// One generated source file.
///
/// Invariant after coercion: `path` is non-empty and `category` is always a
/// valid member of the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
    pub category: FileCategory,
}

/// A named bundle of files plus its setup commands.
///
/// Invariant after coercion: `name` is non-empty; `files` and
/// `setup_commands` are present (possibly empty), never absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleBundle {
    pub name: String,
    pub files: Vec<GeneratedFile>,
    pub setup_commands: Vec<String>,
}

/// A generated project tree (one side: backend or frontend).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedProject {
    pub modules: Vec<ModuleBundle>,
    pub common_files: Vec<GeneratedFile>,
    pub setup_commands: Vec<String>,
}

/// The five diagram kinds the pipeline generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagramKind {
    #[serde(rename = "classDiagram")]
    Class,
    #[serde(rename = "sequenceDiagram")]
    Sequence,
    #[serde(rename = "flowchart")]
    Flowchart,
    #[serde(rename = "erDiagram")]
    EntityRelationship,
    #[serde(rename = "stateDiagram")]
    State,
}

impl DiagramKind {
    /// All kinds, in the order the batch generator fans out.
    pub const ALL: [DiagramKind; 5] = [
        DiagramKind::Class,
        DiagramKind::Sequence,
        DiagramKind::Flowchart,
        DiagramKind::EntityRelationship,
        DiagramKind::State,
    ];

    /// The Mermaid start token a valid diagram of this kind must carry.
    pub fn start_token(self) -> &'static str {
        match self {
            DiagramKind::Class => "classDiagram",
            DiagramKind::Sequence => "sequenceDiagram",
            DiagramKind::Flowchart => "graph TD",
            DiagramKind::EntityRelationship => "erDiagram",
            DiagramKind::State => "stateDiagram-v2",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagramKind::Class => "classDiagram",
            DiagramKind::Sequence => "sequenceDiagram",
            DiagramKind::Flowchart => "flowchart",
            DiagramKind::EntityRelationship => "erDiagram",
            DiagramKind::State => "stateDiagram",
        };
        f.write_str(name)
    }
}

/// One validated Mermaid diagram.
///
/// Invariant: `source_text` begins with the kind's start token; for class
/// diagrams, brace counts are balanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecord {
    pub kind: DiagramKind,
    pub title: String,
    pub source_text: String,
}

/// Functional vs. non-functional requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementKind {
    #[serde(rename = "functional")]
    Functional,
    #[serde(rename = "non-functional")]
    NonFunctional,
}

/// Requirement priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One IEEE-830 style requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementRecord {
    /// Identifier matching `REQ-` followed by exactly three digits.
    pub id: String,
    pub kind: RequirementKind,
    pub description: String,
    pub priority: Priority,
    pub dependencies: Vec<String>,
}

impl RequirementRecord {
    /// Check the `REQ-NNN` identifier pattern.
    pub fn is_valid_id(id: &str) -> bool {
        match id.strip_prefix("REQ-") {
            Some(digits) => digits.len() == 3 && digits.chars().all(|c| c.is_ascii_digit()),
            None => false,
        }
    }
}
