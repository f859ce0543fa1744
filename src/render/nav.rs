//! Navigation: a sidebar baked into every page, or a `nav.json` index that
//! the client script turns into one.

use crate::generate::PageSink;
use crate::index::SymbolIndex;
use crate::links::relative_path;
use crate::render::html::html_escape;
use crate::walk::{is_exception, visible_types};
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NavMode {
    /// Sidebar rendered into each page.
    Static,
    /// Sidebar built in the browser from nav.json.
    LiveNav,
}

/// The page being written, as navigation sees it.
#[derive(Debug, Clone, Copy)]
pub struct CurrentPage<'a> {
    pub path: &'a str,
    pub library: Option<&'a str>,
    pub type_name: Option<&'a str>,
}

/// Trait for the two ways of giving pages a sidebar.
pub trait Navigation {
    /// Root-relative path of the client script pages load.
    fn script(&self) -> &'static str;
    /// Sidebar markup for one page.
    fn sidebar(&self, index: &SymbolIndex<'_>, current: &CurrentPage<'_>) -> String;
    /// Called once after all pages are written.
    fn finish(&self, index: &SymbolIndex<'_>, sink: &mut dyn PageSink) -> Result<()>;
}

pub fn create_navigation(mode: NavMode) -> Box<dyn Navigation> {
    match mode {
        NavMode::Static => Box::new(StaticNav),
        NavMode::LiveNav => Box::new(LiveNav),
    }
}

pub struct StaticNav;

impl Navigation for StaticNav {
    fn script(&self) -> &'static str {
        "client-static.js"
    }

    fn sidebar(&self, index: &SymbolIndex<'_>, current: &CurrentPage<'_>) -> String {
        let rel = |url: &str| relative_path(current.path, url);
        let mut out = String::new();
        for (library, entries) in NavigationModel::build(index).libraries {
            let is_current = current.library == Some(library);
            out.push_str("<h2><div class=\"icon-library\"></div>");
            if is_current && current.type_name.is_none() {
                out.push_str(&format!("<strong>{}</strong>", html_escape(library)));
            } else {
                out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    rel(&index.library_url(library)),
                    html_escape(library)
                ));
            }
            out.push_str("</h2>\n");
            // Only the current library is expanded.
            if !is_current || entries.is_empty() {
                continue;
            }
            out.push_str("<ul class=\"icon\">\n");
            for entry in entries {
                let icon = format!("<span class=\"icon-{}\"></span>", entry.icon);
                if current.type_name == Some(entry.name) {
                    out.push_str(&format!(
                        "<li>{}<strong>{}</strong></li>\n",
                        icon,
                        html_escape(entry.name)
                    ));
                } else {
                    out.push_str(&format!(
                        "<li><a href=\"{}\">{}{}</a></li>\n",
                        rel(&entry.url),
                        icon,
                        html_escape(entry.name)
                    ));
                }
            }
            out.push_str("</ul>\n");
        }
        out
    }

    fn finish(&self, _index: &SymbolIndex<'_>, _sink: &mut dyn PageSink) -> Result<()> {
        Ok(())
    }
}

pub struct LiveNav;

impl Navigation for LiveNav {
    fn script(&self) -> &'static str {
        "client-live-nav.js"
    }

    fn sidebar(&self, _index: &SymbolIndex<'_>, _current: &CurrentPage<'_>) -> String {
        String::new()
    }

    fn finish(&self, index: &SymbolIndex<'_>, sink: &mut dyn PageSink) -> Result<()> {
        let json = serde_json::to_string(&NavigationModel::build(index))
            .context("failed to serialize navigation")?;
        sink.write_page("nav.json", &json)
    }
}

/// In-scope libraries and their public types, in page order.
pub struct NavigationModel<'p> {
    pub libraries: Vec<(&'p str, Vec<NavEntry<'p>>)>,
}

#[derive(Debug, Serialize)]
pub struct NavEntry<'p> {
    pub name: &'p str,
    /// `class` or `interface`; typedefs count as interfaces.
    pub kind: &'static str,
    pub url: String,
    #[serde(skip)]
    pub icon: &'static str,
}

impl<'p> NavigationModel<'p> {
    pub fn build(index: &SymbolIndex<'p>) -> Self {
        let libraries = index
            .libraries()
            .iter()
            .map(|&library| {
                let entries = visible_types(library)
                    .into_iter()
                    .map(|ty| NavEntry {
                        name: &ty.name,
                        kind: if ty.is_class() { "class" } else { "interface" },
                        url: index.type_url(ty),
                        icon: if is_exception(ty) {
                            "exception"
                        } else {
                            ty.kind_label()
                        },
                    })
                    .collect();
                (library.name.as_str(), entries)
            })
            .collect();
        Self { libraries }
    }
}

// A map keyed by library name, in display order rather than sorted.
impl Serialize for NavigationModel<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.libraries.len()))?;
        for (library, entries) in &self.libraries {
            map.serialize_entry(library, entries)?;
        }
        map.end()
    }
}
