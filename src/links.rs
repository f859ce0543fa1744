//! URL, anchor, and relative-link generation for output pages.

use crate::model::{Member, MemberKind};
use regex::Regex;
use std::sync::LazyLock;

static RE_ABSOLUTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+:").unwrap());

/// Whether `url` carries its own scheme and must not be rewritten.
pub fn is_absolute(url: &str) -> bool {
    RE_ABSOLUTE.is_match(url)
}

/// Make `url` (relative to the output root) relative to the page at
/// `from_page`, by climbing one directory per `/` in the page path.
pub fn relative_path(from_page: &str, url: &str) -> String {
    if is_absolute(url) {
        return url.to_string();
    }
    let depth = from_page.matches('/').count();
    format!("{}{}", "../".repeat(depth), url)
}

/// File-name-safe form of a library name: `:` and `/` become `_`.
pub fn sanitize(name: &str) -> String {
    name.replace([':', '/'], "_")
}

/// Anchor id for a member on its host page.
///
/// - field → `name`
/// - getter / setter → `get:name` / `set:name`
/// - unnamed constructor → `Type`, named constructor → `Type.name`
pub fn member_anchor(host_name: &str, member: &Member) -> String {
    match &member.kind {
        MemberKind::Field { .. } => member.name.clone(),
        MemberKind::Constructor {
            constructor_name, ..
        } => {
            if constructor_name.is_empty() {
                host_name.to_string()
            } else {
                format!("{}.{}", host_name, constructor_name)
            }
        }
        MemberKind::Method {
            is_getter: true, ..
        } => format!("get:{}", member.name),
        MemberKind::Method {
            is_setter: true, ..
        } => format!("set:{}", member.name),
        MemberKind::Method { .. } => member.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeRef;

    fn method(name: &str, is_getter: bool, is_setter: bool) -> Member {
        Member {
            name: name.to_string(),
            is_static: false,
            kind: MemberKind::Method {
                parameters: Vec::new(),
                return_type: TypeRef::Dynamic,
                is_getter,
                is_setter,
                is_operator: false,
                is_abstract: false,
            },
            location: None,
            doc: None,
        }
    }

    fn constructor(name: &str) -> Member {
        Member {
            name: "Point".to_string(),
            is_static: false,
            kind: MemberKind::Constructor {
                constructor_name: name.to_string(),
                parameters: Vec::new(),
                is_factory: false,
                is_const: false,
            },
            location: None,
            doc: None,
        }
    }

    #[test]
    fn absolute_urls_untouched() {
        assert!(is_absolute("http://example.com/a.html"));
        assert!(is_absolute("mailto:someone"));
        assert!(!is_absolute("core/List.html"));
        assert!(!is_absolute("core_io.html#get:x"));
        assert_eq!(
            relative_path("a/b/c.html", "https://x.org/y.html"),
            "https://x.org/y.html"
        );
    }

    #[test]
    fn relative_depth_matches_slashes() {
        assert_eq!(relative_path("index.html", "core.html"), "core.html");
        assert_eq!(relative_path("core/List.html", "core.html"), "../core.html");
        assert_eq!(
            relative_path("a/b/c.html", "core/List.html"),
            "../../core/List.html"
        );
    }

    #[test]
    fn sanitize_library_names() {
        assert_eq!(sanitize("dart:core"), "dart_core");
        assert_eq!(sanitize("pkg/util"), "pkg_util");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn anchors_by_member_kind() {
        assert_eq!(member_anchor("A", &method("run", false, false)), "run");
        assert_eq!(member_anchor("A", &method("size", true, false)), "get:size");
        assert_eq!(member_anchor("A", &method("size", false, true)), "set:size");
        assert_eq!(member_anchor("Point", &constructor("")), "Point");
        assert_eq!(member_anchor("Point", &constructor("origin")), "Point.origin");
    }
}
