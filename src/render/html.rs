//! HTML page skeleton shared by every generated page.

use crate::links::relative_path;

/// Everything the page header needs to know about the page being written.
pub struct PageHeader<'a> {
    /// Output-relative path of the page itself.
    pub path: &'a str,
    /// `<title>` text.
    pub title: &'a str,
    /// Site title, shown first in the breadcrumbs.
    pub main_title: &'a str,
    /// `(text, root-relative url)` pairs after the site title.
    pub breadcrumbs: &'a [(String, String)],
    pub library: Option<&'a str>,
    pub type_name: Option<&'a str>,
    /// Root-relative path of the client script.
    pub script: &'a str,
    /// Pre-rendered sidebar contents; empty when built client-side.
    pub sidebar: &'a str,
    pub app_cache: bool,
}

pub fn page_start(header: &PageHeader<'_>) -> String {
    let rel = |url: &str| relative_path(header.path, url);
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n");
    if header.app_cache {
        out.push_str(&format!(
            "<html manifest=\"{}\">\n",
            rel("appcache.manifest")
        ));
    } else {
        out.push_str("<html>\n");
    }
    out.push_str("<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", html_escape(header.title)));
    out.push_str(&format!(
        "<link rel=\"stylesheet\" type=\"text/css\" href=\"{}\">\n",
        rel("styles.css")
    ));
    out.push_str(&format!(
        "<script type=\"application/javascript\" src=\"{}\"></script>\n",
        rel(header.script)
    ));
    out.push_str("</head>\n");

    out.push_str(&format!("<body data-root=\"{}\"", rel("")));
    if let Some(library) = header.library {
        out.push_str(&format!(" data-library=\"{}\"", html_escape(library)));
    }
    if let Some(type_name) = header.type_name {
        out.push_str(&format!(" data-type=\"{}\"", html_escape(type_name)));
    }
    out.push_str(">\n<div class=\"page\">\n<div class=\"header\">\n");
    out.push_str(&format!(
        "  <a href=\"{}\"><div class=\"logo\"></div></a>\n",
        rel("index.html")
    ));
    out.push_str(&format!(
        "  <a href=\"{}\">{}</a>",
        rel("index.html"),
        html_escape(header.main_title)
    ));
    for (text, url) in header.breadcrumbs {
        out.push_str(&format!(
            " &rsaquo; <a href=\"{}\">{}</a>",
            rel(url),
            html_escape(text)
        ));
    }
    out.push_str("\n</div>\n");
    out.push_str(&format!("<div class=\"nav\">\n{}</div>\n", header.sidebar));
    out.push_str("<div class=\"content\">\n");
    out
}

pub fn page_end(generated_on: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str("</div>\n<div class=\"clear\"></div>\n</div>\n");
    match generated_on {
        Some(when) => out.push_str(&format!(
            "<div class=\"footer\">Generated on {}</div>\n",
            html_escape(when)
        )),
        None => out.push_str("<div class=\"footer\"></div>\n"),
    }
    out.push_str("</body>\n</html>\n");
    out
}

/// `<a>` with already-escaped contents.
pub fn link(href: &str, contents: &str) -> String {
    format!("<a href=\"{}\">{}</a>", href, contents)
}

/// Header plus comma-separated items, or nothing when there are no items.
pub fn list_section(header: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    format!("<h3>{}</h3>\n<p>{}</p>\n", header, items.join(", "))
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
