//! Total coercion from loosely-shaped JSON to typed records.
//!
//! The repair ladder guarantees *syntactically* valid JSON; this layer
//! guarantees *shape*. Every function here is total: wrong types become
//! defaults, malformed array items are dropped (and counted), missing
//! fields are filled in. Field lookup tolerates both camelCase and
//! snake_case since models drift between the two.

use serde_json::Value;

use super::model::{
    FileCategory, GeneratedFile, GeneratedProject, ModuleBundle, Priority, RequirementKind,
    RequirementRecord,
};
use crate::diagnostics::RepairDiagnostics;

/// Look up a field under its camelCase name, falling back to snake_case.
fn get_field<'a>(obj: &'a Value, camel: &str, snake: &str) -> Option<&'a Value> {
    obj.get(camel).or_else(|| obj.get(snake))
}

/// Kept string fields are trimmed; blank or non-string values take the default.
fn as_string_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Collect the string items of an array value, dropping everything else.
fn string_vec(value: Option<&Value>, diag: &mut RepairDiagnostics) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                _ => {
                    diag.dropped_items += 1;
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Coerce one file record. Returns `None` (counted as dropped) when the
/// value is not an object.
pub fn coerce_file(value: &Value, diag: &mut RepairDiagnostics) -> Option<GeneratedFile> {
    if !value.is_object() {
        diag.dropped_items += 1;
        return None;
    }
    let path = as_string_or(get_field(value, "path", "path"), "unnamed-file.txt");
    if path == "unnamed-file.txt" {
        diag.warn("file record had no usable path; placeholder assigned");
    }
    // File contents are kept byte-for-byte: leading whitespace is code.
    let content = match get_field(value, "content", "content") {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };

    let category = get_field(value, "category", "category")
        .and_then(Value::as_str)
        .and_then(FileCategory::parse)
        .unwrap_or_else(|| FileCategory::infer_from_path(&path));

    Some(GeneratedFile { path, content, category })
}

/// Coerce one module bundle. Returns `None` (counted as dropped) when the
/// value is not an object.
pub fn coerce_module(value: &Value, diag: &mut RepairDiagnostics) -> Option<ModuleBundle> {
    if !value.is_object() {
        diag.dropped_items += 1;
        return None;
    }
    let name = as_string_or(get_field(value, "name", "name"), "unnamed-module");
    if name == "unnamed-module" {
        diag.warn("module record had no usable name; placeholder assigned");
    }

    let files = match get_field(value, "files", "files") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| coerce_file(item, diag))
            .collect(),
        _ => Vec::new(),
    };

    let setup_commands = string_vec(get_field(value, "setupCommands", "setup_commands"), diag);

    Some(ModuleBundle { name, files, setup_commands })
}

/// Coerce a whole project document.
///
/// Total: any input value yields a [`GeneratedProject`], possibly empty. A
/// bare top-level array is treated as the modules list, a shape some models
/// produce when asked for "the modules".
pub fn coerce_project(value: &Value, diag: &mut RepairDiagnostics) -> GeneratedProject {
    let modules_value = match value {
        Value::Array(_) => Some(value),
        Value::Object(_) => get_field(value, "modules", "modules"),
        _ => None,
    };

    let modules = match modules_value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| coerce_module(item, diag))
            .collect(),
        _ => Vec::new(),
    };

    let (common_files, setup_commands) = match value {
        Value::Object(_) => {
            let common_files = match get_field(value, "commonFiles", "common_files") {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|item| coerce_file(item, diag))
                    .collect(),
                _ => Vec::new(),
            };
            let setup_commands =
                string_vec(get_field(value, "setupCommands", "setup_commands"), diag);
            (common_files, setup_commands)
        }
        _ => (Vec::new(), Vec::new()),
    };

    GeneratedProject { modules, common_files, setup_commands }
}

/// Coerce a requirements document into validated records.
///
/// Accepts either a bare array or an object with a `requirements` field.
/// Records with an empty description are dropped; invalid identifiers are
/// replaced with a sequential `REQ-NNN` id.
pub fn coerce_requirements(value: &Value, diag: &mut RepairDiagnostics) -> Vec<RequirementRecord> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => match get_field(value, "requirements", "requirements") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        if !item.is_object() {
            diag.dropped_items += 1;
            continue;
        }
        let description = as_string_or(get_field(item, "description", "description"), "");
        if description.is_empty() {
            diag.dropped_items += 1;
            diag.warn(format!("requirement at index {} had no description; dropped", idx));
            continue;
        }

        let raw_id = as_string_or(get_field(item, "id", "id"), "");
        let id = if RequirementRecord::is_valid_id(&raw_id) {
            raw_id
        } else {
            let assigned = format!("REQ-{:03}", idx + 1);
            diag.warn(format!("requirement id '{}' invalid; reassigned {}", raw_id, assigned));
            assigned
        };

        let kind = match get_field(item, "kind", "kind")
            .or_else(|| get_field(item, "type", "type"))
            .and_then(Value::as_str)
            .map(str::trim)
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("non-functional") | Some("nonfunctional") | Some("non_functional") => {
                RequirementKind::NonFunctional
            }
            _ => RequirementKind::Functional,
        };

        let priority = match get_field(item, "priority", "priority")
            .and_then(Value::as_str)
            .map(str::trim)
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("high") => Priority::High,
            Some("low") => Priority::Low,
            _ => Priority::Medium,
        };

        let dependencies = string_vec(get_field(item, "dependencies", "dependencies"), diag);

        records.push(RequirementRecord { id, kind, description, priority, dependencies });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_formed_project_passes_through() {
        let value = json!({
            "modules": [{
                "name": "auth",
                "files": [{
                    "path": "src/auth/auth.service.ts",
                    "content": "export class AuthService {}",
                    "category": "service"
                }],
                "setupCommands": ["npm i @nestjs/jwt"]
            }],
            "commonFiles": [],
            "setupCommands": ["npm install"]
        });
        let mut diag = RepairDiagnostics::default();
        let project = coerce_project(&value, &mut diag);
        assert_eq!(project.modules.len(), 1);
        assert_eq!(project.modules[0].name, "auth");
        assert_eq!(project.modules[0].files[0].category, FileCategory::Service);
        assert_eq!(project.setup_commands, vec!["npm install"]);
        assert_eq!(diag.dropped_items, 0);
    }

    #[test]
    fn snake_case_fields_accepted() {
        let value = json!({
            "modules": [{
                "name": "core",
                "files": [],
                "setup_commands": ["cargo build"]
            }],
            "common_files": [{"path": "a.txt", "content": ""}],
            "setup_commands": []
        });
        let mut diag = RepairDiagnostics::default();
        let project = coerce_project(&value, &mut diag);
        assert_eq!(project.modules[0].setup_commands, vec!["cargo build"]);
        assert_eq!(project.common_files.len(), 1);
    }

    #[test]
    fn top_level_array_treated_as_modules() {
        let value = json!([{"name": "m1", "files": []}, {"name": "m2"}]);
        let mut diag = RepairDiagnostics::default();
        let project = coerce_project(&value, &mut diag);
        assert_eq!(project.modules.len(), 2);
        assert_eq!(project.modules[1].name, "m2");
    }

    #[test]
    fn malformed_items_dropped_and_counted() {
        let value = json!({
            "modules": [
                {"name": "good", "files": ["not-an-object", {"path": "x.ts", "content": ""}]},
                "not-a-module",
                42
            ]
        });
        let mut diag = RepairDiagnostics::default();
        let project = coerce_project(&value, &mut diag);
        assert_eq!(project.modules.len(), 1);
        assert_eq!(project.modules[0].files.len(), 1);
        assert_eq!(diag.dropped_items, 3);
    }

    #[test]
    fn missing_names_get_placeholders() {
        let value = json!({"modules": [{"files": [{"content": "x"}]}]});
        let mut diag = RepairDiagnostics::default();
        let project = coerce_project(&value, &mut diag);
        assert_eq!(project.modules[0].name, "unnamed-module");
        assert_eq!(project.modules[0].files[0].path, "unnamed-file.txt");
        assert!(!diag.warnings.is_empty());
    }

    #[test]
    fn kept_strings_trimmed_but_content_preserved() {
        let value = json!({
            "modules": [{
                "name": "  auth  ",
                "files": [{
                    "path": "  src/auth/auth.service.ts ",
                    "content": "  export class AuthService {}\n"
                }]
            }]
        });
        let mut diag = RepairDiagnostics::default();
        let project = coerce_project(&value, &mut diag);
        assert_eq!(project.modules[0].name, "auth");
        assert_eq!(project.modules[0].files[0].path, "src/auth/auth.service.ts");
        assert_eq!(
            project.modules[0].files[0].content,
            "  export class AuthService {}\n"
        );
    }

    #[test]
    fn requirement_fields_trimmed() {
        let value = json!([{"id": " REQ-007 ", "description": "  Users can log in  "}]);
        let mut diag = RepairDiagnostics::default();
        let reqs = coerce_requirements(&value, &mut diag);
        assert_eq!(reqs[0].id, "REQ-007");
        assert_eq!(reqs[0].description, "Users can log in");
    }

    #[test]
    fn invalid_category_falls_back_to_path_inference() {
        let value = json!({
            "path": "src/users/users.controller.ts",
            "content": "",
            "category": "banana"
        });
        let mut diag = RepairDiagnostics::default();
        let file = coerce_file(&value, &mut diag).unwrap();
        assert_eq!(file.category, FileCategory::Controller);
    }

    #[test]
    fn empty_object_yields_empty_project() {
        let mut diag = RepairDiagnostics::default();
        let project = coerce_project(&json!({}), &mut diag);
        assert!(project.modules.is_empty());
        assert!(project.common_files.is_empty());
        assert!(project.setup_commands.is_empty());
    }

    #[test]
    fn requirements_bare_array_accepted() {
        let value = json!([
            {"id": "REQ-001", "kind": "functional", "description": "Users can log in", "priority": "high"},
            {"id": "bogus", "type": "non-functional", "description": "P95 under 200ms"}
        ]);
        let mut diag = RepairDiagnostics::default();
        let reqs = coerce_requirements(&value, &mut diag);
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].id, "REQ-001");
        assert_eq!(reqs[0].priority, Priority::High);
        assert_eq!(reqs[1].id, "REQ-002");
        assert_eq!(reqs[1].kind, RequirementKind::NonFunctional);
        assert_eq!(reqs[1].priority, Priority::Medium);
    }

    #[test]
    fn requirement_without_description_dropped() {
        let value = json!({"requirements": [
            {"id": "REQ-001", "description": ""},
            {"id": "REQ-002", "description": "Real requirement"}
        ]});
        let mut diag = RepairDiagnostics::default();
        let reqs = coerce_requirements(&value, &mut diag);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].description, "Real requirement");
        assert_eq!(diag.dropped_items, 1);
    }

    #[test]
    fn requirement_dependencies_filtered() {
        let value = json!([{
            "id": "REQ-003",
            "description": "Depends on others",
            "dependencies": ["REQ-001", 7, "REQ-002"]
        }]);
        let mut diag = RepairDiagnostics::default();
        let reqs = coerce_requirements(&value, &mut diag);
        assert_eq!(reqs[0].dependencies, vec!["REQ-001", "REQ-002"]);
        assert_eq!(diag.dropped_items, 1);
    }

    #[test]
    fn scalar_document_yields_empty_results() {
        let mut diag = RepairDiagnostics::default();
        assert!(coerce_project(&json!("oops"), &mut diag).modules.is_empty());
        assert!(coerce_requirements(&json!(42), &mut diag).is_empty());
    }
}
