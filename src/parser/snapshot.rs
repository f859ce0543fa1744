//! JSON program snapshot produced by the reflection tool.

use crate::model::*;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported snapshot format: .{0} (expected .json)")]
    UnsupportedFormat(String),
}

/// Parse snapshot text into a [`Program`].
pub fn parse(content: &str) -> Result<Program, SnapshotError> {
    let program: Program = serde_json::from_str(content)?;
    Ok(link_owners(program))
}

/// Build a [`Program`] from an already-parsed JSON value.
pub fn from_value(value: serde_json::Value) -> Result<Program, SnapshotError> {
    let program: Program = serde_json::from_value(value)?;
    Ok(link_owners(program))
}

/// Fill in the owning library of every type declaration.
fn link_owners(mut program: Program) -> Program {
    let mut seen = HashSet::new();
    for library in &mut program.libraries {
        if !seen.insert(library.name.clone()) {
            log::warn!("duplicate library name in snapshot: {}", library.name);
        }
        for ty in &mut library.types {
            ty.library = library.name.clone();
        }
    }
    program
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_minimal_program() {
        let program = parse(r#"{"libraries": [{"name": "L"}]}"#).unwrap();
        assert_eq!(program.libraries.len(), 1);
        assert_eq!(program.root.name, "Object");
        assert_eq!(program.root.library, "core");
    }

    #[test]
    fn owners_are_linked() {
        let program = from_value(json!({
            "libraries": [{
                "name": "L",
                "types": [{"name": "C", "kind": "class"}]
            }]
        }))
        .unwrap();
        assert_eq!(program.libraries[0].types[0].library, "L");
    }

    #[test]
    fn tagged_kinds_deserialize() {
        let program = from_value(json!({
            "libraries": [{
                "name": "L",
                "types": [
                    {"name": "I", "kind": "interface",
                     "default_class": {"kind": "named", "library": "L", "name": "C"}},
                    {"name": "F", "kind": "typedef",
                     "return_type": {"kind": "void"},
                     "parameters": [{"name": "x", "type": {"kind": "dynamic"}}]}
                ],
                "members": [
                    {"name": "count", "kind": "field", "is_static": true, "is_final": true,
                     "type": {"kind": "named", "library": "core", "name": "int"}},
                    {"name": "run", "kind": "method", "is_static": true,
                     "parameters": [{"name": "n", "is_optional": true, "default_value": "3"}]}
                ]
            }]
        }))
        .unwrap();
        let lib = &program.libraries[0];
        assert!(matches!(lib.types[0].kind, TypeKind::Interface { default_class: Some(_) }));
        assert!(lib.types[1].is_typedef());
        assert!(lib.members[0].is_field());
        let params = lib.members[1].parameters();
        assert_eq!(params[0].default_value.as_deref(), Some("3"));
        assert!(matches!(params[0].ty, TypeRef::Dynamic));
    }

    #[test]
    fn unknown_kind_is_malformed() {
        let err = parse(r#"{"libraries": [{"name": "L", "types": [{"name": "X", "kind": "mixin"}]}]}"#)
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed(_)));
    }
}
