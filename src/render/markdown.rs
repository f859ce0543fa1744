//! Markdown doc comments to HTML.
//!
//! `[name]` spans with no link definition are handed to a resolver closure
//! and replaced by whatever HTML it returns. `[:code:]` is shorthand for an
//! inline code span and is rewritten before parsing.

use pulldown_cmark::{html, BrokenLink, CowStr, Event, Options, Parser, Tag};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static RE_CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[:(.*?):\]").unwrap());

/// Link destinations starting with this are cross-references.
const XREF: &str = "xref:";

pub fn render_markdown(text: &str, resolve: impl Fn(&str) -> String) -> String {
    let text = expand_code_spans(text);

    let mut broken_link_callback = |link| xref_link(link);
    let mut in_xref = false;
    let events = Parser::new_with_broken_link_callback(
        &text,
        Options::empty(),
        Some(&mut broken_link_callback),
    )
    .filter_map(|event| match event {
        Event::Start(Tag::Link(_, dest, _)) if dest.starts_with(XREF) => {
            in_xref = true;
            Some(Event::Html(resolve(&dest[XREF.len()..]).into()))
        }
        Event::End(Tag::Link(..)) if in_xref => {
            in_xref = false;
            None
        }
        _ if in_xref => None,
        e => Some(e),
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

fn xref_link(link: BrokenLink<'_>) -> Option<(CowStr<'_>, CowStr<'_>)> {
    let name = link.reference.trim().trim_matches('`');
    if name.is_empty() {
        return None;
    }
    Some((format!("{}{}", XREF, name).into(), "".into()))
}

/// Rewrite `[:text:]` as a backtick code span that survives any backticks
/// inside `text`.
fn expand_code_spans(text: &str) -> String {
    RE_CODE_SPAN
        .replace_all(text, |caps: &Captures| {
            let code = &caps[1];
            let longest_run = code
                .split(|c| c != '`')
                .map(str::len)
                .max()
                .unwrap_or(0);
            let fence = "`".repeat(longest_run + 1);
            if code.starts_with('`') || code.ends_with('`') {
                format!("{fence} {code} {fence}")
            } else {
                format!("{fence}{code}{fence}")
            }
        })
        .into_owned()
}

/// The first paragraph of a comment, for one-line summaries.
pub fn first_paragraph(text: &str) -> &str {
    let text = text.trim();
    match text.find("\n\n") {
        Some(end) => text[..end].trim_end(),
        None => text,
    }
}
