//! Program snapshot loading and doc comment lookup.

pub mod comments;
pub mod snapshot;

use crate::model::Program;
use snapshot::SnapshotError;
use std::fs;
use std::path::Path;

/// Load a program snapshot from disk.
pub fn load_program(path: &Path) -> Result<Program, SnapshotError> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") | None => snapshot::parse(&content),
        Some(other) => Err(SnapshotError::UnsupportedFormat(other.to_string())),
    }
}
