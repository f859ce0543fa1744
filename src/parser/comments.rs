//! Doc comment locator.
//!
//! Maps a declaration's source location to the doc comment written just
//! above it:
//! - `/// text` line comments, contiguous
//! - `/** ... */` block comments, with leading `*` gutters stripped
//! - `@annotation` lines between comment and declaration are skipped

use crate::model::SourceLocation;
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::LazyLock;

static RE_LINE_DOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*///\s?(.*)$").unwrap());

static RE_BLOCK_GUTTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*(?:\s(.*)|$)").unwrap());

static RE_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@\w").unwrap());

/// Looks up raw comment and source text for declarations.
pub trait CommentLocator {
    /// Doc comment immediately preceding the declaration at `location`.
    fn find(&self, location: &SourceLocation) -> Option<String>;

    /// Doc comment for a whole library: the one preceding its declaration,
    /// else the leading doc comment of the file.
    fn find_library(&self, location: &SourceLocation) -> Option<String>;

    /// Source text spanning `line..=end_line`.
    fn source(&self, location: &SourceLocation) -> Option<String>;
}

/// Reads comments from source files, relative to a base directory.
///
/// Files are read at most once per run and cached.
pub struct SourceComments {
    base: PathBuf,
    files: RefCell<HashMap<PathBuf, Option<Rc<Vec<String>>>>>,
}

impl SourceComments {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            files: RefCell::new(HashMap::new()),
        }
    }

    fn lines(&self, path: &str) -> Option<Rc<Vec<String>>> {
        let full = resolve_path(&self.base, path);
        if let Some(cached) = self.files.borrow().get(&full) {
            return cached.clone();
        }
        let loaded = match fs::read_to_string(&full) {
            Ok(text) => Some(Rc::new(text.lines().map(str::to_string).collect())),
            Err(e) => {
                log::debug!("no source for comments at {}: {}", full.display(), e);
                None
            }
        };
        self.files.borrow_mut().insert(full, loaded.clone());
        loaded
    }
}

fn resolve_path(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

impl CommentLocator for SourceComments {
    fn find(&self, location: &SourceLocation) -> Option<String> {
        let lines = self.lines(&location.path)?;
        comment_before(&lines, location.line)
    }

    fn find_library(&self, location: &SourceLocation) -> Option<String> {
        let lines = self.lines(&location.path)?;
        comment_before(&lines, location.line).or_else(|| leading_comment(&lines))
    }

    fn source(&self, location: &SourceLocation) -> Option<String> {
        let lines = self.lines(&location.path)?;
        let start = location.line.checked_sub(1)?;
        let end = location.end_line.unwrap_or(location.line).min(lines.len());
        if start >= end {
            return None;
        }
        Some(unindent(&lines[start..end]))
    }
}

/// Collect the doc comment ending just above 1-based `line`.
fn comment_before(lines: &[String], line: usize) -> Option<String> {
    let mut i = line.checked_sub(1)?.min(lines.len());
    // Skip metadata annotations between the comment and the declaration.
    while i > 0 && RE_ANNOTATION.is_match(&lines[i - 1]) {
        i -= 1;
    }
    if i == 0 {
        return None;
    }
    let above = lines[i - 1].trim_end();
    if RE_LINE_DOC.is_match(above) {
        let mut start = i - 1;
        while start > 0 && RE_LINE_DOC.is_match(&lines[start - 1]) {
            start -= 1;
        }
        return Some(strip_line_comments(&lines[start..i]));
    }
    if above.ends_with("*/") {
        let mut start = i - 1;
        loop {
            let trimmed = lines[start].trim_start();
            if trimmed.starts_with("/**") {
                return Some(strip_block_comment(&lines[start..i]));
            }
            if trimmed.starts_with("/*") || start == 0 {
                // A plain block comment, not documentation.
                return None;
            }
            start -= 1;
        }
    }
    None
}

/// The first doc comment in a file, if nothing but blank lines precede it.
fn leading_comment(lines: &[String]) -> Option<String> {
    let first = lines.iter().position(|l| !l.trim().is_empty())?;
    let trimmed = lines[first].trim_start();
    if trimmed.starts_with("///") {
        let end = lines[first..]
            .iter()
            .position(|l| !RE_LINE_DOC.is_match(l))
            .map_or(lines.len(), |n| first + n);
        return Some(strip_line_comments(&lines[first..end]));
    }
    if trimmed.starts_with("/**") {
        let end = lines[first..].iter().position(|l| l.contains("*/"))?;
        return Some(strip_block_comment(&lines[first..=first + end]));
    }
    None
}

fn strip_line_comments(lines: &[String]) -> String {
    lines
        .iter()
        .filter_map(|l| RE_LINE_DOC.captures(l).map(|c| c[1].to_string()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn strip_block_comment(lines: &[String]) -> String {
    let joined = lines.join("\n");
    let body = joined
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");
    body.lines()
        .map(|l| match RE_BLOCK_GUTTER.captures(l) {
            Some(caps) => caps.get(1).map_or("", |m| m.as_str()).to_string(),
            None => l.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Remove the common leading indentation of a block of source lines.
///
/// Indentation is counted in characters, so any whitespace works.
fn unindent(lines: &[String]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| {
            let skip = indent.min(indent_width(l));
            l.char_indices()
                .nth(skip)
                .map_or("", |(start, _)| &l[start..])
                .trim_end()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
