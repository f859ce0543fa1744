//! Test helpers: fixture programs, in-memory comments, and page capture.

use crate::generate::PageSink;
use crate::model::{Program, SourceLocation};
use crate::parser::comments::CommentLocator;
use crate::parser::snapshot;
use anyhow::Result;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Build a program from a JSON array of libraries.
pub fn program(libraries: Value) -> Program {
    snapshot::from_value(json!({ "libraries": libraries })).expect("fixture program")
}

/// JSON for a reference to a named type.
pub fn named(library: &str, name: &str) -> Value {
    json!({"kind": "named", "library": library, "name": name})
}

/// JSON for the root type reference.
pub fn object() -> Value {
    named("core", "Object")
}

/// Comments keyed by `path:line`.
#[derive(Default)]
pub struct MemoryComments {
    pub comments: BTreeMap<String, String>,
    pub sources: BTreeMap<String, String>,
}

impl MemoryComments {
    fn key(location: &SourceLocation) -> String {
        format!("{}:{}", location.path, location.line)
    }
}

impl CommentLocator for MemoryComments {
    fn find(&self, location: &SourceLocation) -> Option<String> {
        self.comments.get(&Self::key(location)).cloned()
    }

    fn find_library(&self, location: &SourceLocation) -> Option<String> {
        self.find(location)
    }

    fn source(&self, location: &SourceLocation) -> Option<String> {
        self.sources.get(&Self::key(location)).cloned()
    }
}

/// Captures finished pages instead of writing them to disk.
#[derive(Default)]
pub struct MemorySink {
    pub pages: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn page(&self, path: &str) -> &str {
        self.pages
            .get(path)
            .unwrap_or_else(|| panic!("no page {path}; have {:?}", self.pages.keys()))
    }
}

impl PageSink for MemorySink {
    fn write_page(&mut self, path: &str, contents: &str) -> Result<()> {
        assert!(
            self.pages.insert(path.to_string(), contents.to_string()).is_none(),
            "page {path} written twice"
        );
        Ok(())
    }
}
