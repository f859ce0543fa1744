//! Page generation: index page, one page per library, one per public type.
//!
//! Pages are written strictly in order (index, then each library followed by
//! its types) and each is flushed to the sink as soon as it is complete.

use crate::index::{Host, SymbolIndex};
use crate::inherit::{analyze, inherited_comment, inherited_members, Hierarchy};
use crate::links::{member_anchor, relative_path};
use crate::model::*;
use crate::parser::comments::CommentLocator;
use crate::render::html::{html_escape, link, list_section, page_end, page_start, PageHeader};
use crate::render::markdown::{first_paragraph, render_markdown};
use crate::render::nav::{CurrentPage, Navigation};
use crate::render::types::TypeRenderer;
use crate::resolve::{Resolver, Scope};
use crate::walk::{group_types, visible_constructors, visible_members, visible_types};
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Destination for finished pages, keyed by output-relative path.
pub trait PageSink {
    fn write_page(&mut self, path: &str, contents: &str) -> Result<()>;
}

/// Writes pages under a directory on disk.
pub struct DirSink {
    root: PathBuf,
}

impl DirSink {
    /// Delete `root` and everything in it, then recreate it empty.
    pub fn create(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        match fs::remove_dir_all(&root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("could not remove {}: {}", root.display(), e),
        }
        // Failure here shows up on the first write.
        if let Err(e) = fs::create_dir_all(&root) {
            log::debug!("could not create {}: {}", root.display(), e);
        }
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PageSink for DirSink {
    fn write_page(&mut self, path: &str, contents: &str) -> Result<()> {
        let out_path = self.root.join(path);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        fs::write(&out_path, contents)
            .with_context(|| format!("failed to write {}", out_path.display()))
    }
}

/// An append-only page buffer, flushed to a sink exactly once.
pub struct OutputPage {
    path: String,
    buf: String,
}

impl OutputPage {
    pub fn open(path: &str) -> Self {
        Self {
            path: path.to_string(),
            buf: String::new(),
        }
    }

    pub fn write(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    pub fn finish(self, sink: &mut dyn PageSink) -> Result<()> {
        log::debug!("writing {}", self.path);
        sink.write_page(&self.path, &self.buf)
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Site title for the index page and breadcrumbs.
    pub title: String,
    pub include_source: bool,
    /// Pages reference `appcache.manifest`.
    pub app_cache: bool,
    /// Footer timestamp; `None` leaves it out.
    pub generated_on: Option<String>,
    /// Base URL for types in libraries that are not documented here.
    pub link_api: Option<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            title: "API Reference".to_string(),
            include_source: false,
            app_cache: false,
            generated_on: None,
            link_api: None,
        }
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub libraries: usize,
    pub types: usize,
    pub members: usize,
    pub pages: usize,
}

/// How an inherited entry is attributed on a subclass page.
#[derive(Debug, Clone, Copy)]
struct Inherited<'p> {
    declarer: &'p TypeDecl,
    /// Public superclass credited with the member, if any.
    from: Option<&'p TypeDecl>,
}

pub struct Generator<'a, 'p> {
    index: &'a SymbolIndex<'p>,
    comments: &'a dyn CommentLocator,
    navigation: &'a dyn Navigation,
    options: &'a GeneratorOptions,
}

impl<'a, 'p> Generator<'a, 'p> {
    pub fn new(
        index: &'a SymbolIndex<'p>,
        comments: &'a dyn CommentLocator,
        navigation: &'a dyn Navigation,
        options: &'a GeneratorOptions,
    ) -> Self {
        Self {
            index,
            comments,
            navigation,
            options,
        }
    }

    pub fn run(&self, sink: &mut dyn PageSink) -> Result<Summary> {
        let mut summary = Summary::default();

        self.write_index(sink)?;
        summary.pages += 1;

        for &library in self.index.libraries() {
            summary.members += self.write_library(library, sink)?;
            summary.libraries += 1;
            summary.pages += 1;
            for ty in visible_types(library) {
                summary.members += self.write_type(library, ty, sink)?;
                summary.types += 1;
                summary.pages += 1;
            }
        }

        self.navigation.finish(self.index, sink)?;
        Ok(summary)
    }

    fn open_page(
        &self,
        path: &str,
        title: &str,
        breadcrumbs: &[(String, String)],
        library: Option<&str>,
        type_name: Option<&str>,
    ) -> OutputPage {
        let current = CurrentPage {
            path,
            library,
            type_name,
        };
        let sidebar = self.navigation.sidebar(self.index, &current);
        let mut page = OutputPage::open(path);
        page.write(&page_start(&PageHeader {
            path,
            title,
            main_title: &self.options.title,
            breadcrumbs,
            library,
            type_name,
            script: self.navigation.script(),
            sidebar: &sidebar,
            app_cache: self.options.app_cache,
        }));
        page
    }

    fn close_page(&self, mut page: OutputPage, sink: &mut dyn PageSink) -> Result<()> {
        page.write(&page_end(self.options.generated_on.as_deref()));
        page.finish(sink)
    }

    fn write_index(&self, sink: &mut dyn PageSink) -> Result<()> {
        let path = "index.html";
        let title = &self.options.title;
        let mut page = self.open_page(path, title, &[], None, None);
        page.write(&format!("<h2>{}</h2>\n", html_escape(title)));
        page.write("<h3>Libraries</h3>\n");
        for &library in self.index.libraries() {
            let url = relative_path(path, &self.index.library_url(&library.name));
            page.write(&format!("<h4>{}</h4>\n", link(&url, &html_escape(&library.name))));
            if let Some(text) = self.library_comment(library) {
                let scope = Scope::library(library);
                page.write(&self.render_doc(path, first_paragraph(&text), &scope));
            }
        }
        self.close_page(page, sink)
    }

    /// Returns the number of members documented on the page.
    fn write_library(&self, library: &'p Library, sink: &mut dyn PageSink) -> Result<usize> {
        let path = self.index.library_url(&library.name);
        let breadcrumbs = vec![(library.name.clone(), path.clone())];
        let title = format!("{} Library", library.name);
        let mut page = self.open_page(&path, &title, &breadcrumbs, Some(&library.name), None);
        let scope = Scope::library(library);

        page.write(&format!(
            "<h2><strong>{}</strong> library</h2>\n",
            html_escape(&library.name)
        ));
        if let Some(text) = self.library_comment(library) {
            page.write(&self.render_doc(&path, &text, &scope));
        }

        let host = Host::Library(library);
        let members = visible_members(&library.members, true);
        page.write(&self.member_section(&path, "Functions", &members.static_methods, host));
        page.write(&self.member_section(&path, "Variables", &members.static_fields, host));

        let types = group_types(library);
        for (header, list) in [
            ("Classes", &types.classes),
            ("Interfaces", &types.interfaces),
            ("Typedefs", &types.typedefs),
            ("Exceptions", &types.exceptions),
        ] {
            page.write(&self.type_summaries(&path, header, list, scope));
        }

        self.close_page(page, sink)?;
        Ok(members.static_methods.len() + members.static_fields.len())
    }

    fn type_summaries(
        &self,
        path: &str,
        header: &str,
        list: &[&'p TypeDecl],
        scope: Scope<'p>,
    ) -> String {
        if list.is_empty() {
            return String::new();
        }
        let types = self.type_renderer(path);
        let mut out = format!("<h3>{}</h3>\n", header);
        for &ty in list {
            let url = relative_path(path, &self.index.type_url(ty));
            let name = format!("<strong>{}</strong>", types.declaration_name(ty, false));
            out.push_str("<div class=\"type\">\n");
            out.push_str(&format!("<h4>{}</h4>\n", link(&url, &name)));
            if let Some(text) = self.comment(&ty.doc, &ty.location) {
                out.push_str(&self.render_doc(path, first_paragraph(&text), &scope.with_type(ty)));
            }
            out.push_str("</div>\n");
        }
        out
    }

    /// Returns the number of members documented on the page.
    fn write_type(
        &self,
        library: &'p Library,
        ty: &'p TypeDecl,
        sink: &mut dyn PageSink,
    ) -> Result<usize> {
        let path = self.index.type_url(ty);
        let breadcrumbs = vec![
            (library.name.clone(), self.index.library_url(&library.name)),
            (ty.name.clone(), path.clone()),
        ];
        let title = format!("{} {} / {} Library", ty.name, ty.kind_label(), library.name);
        let mut page = self.open_page(
            &path,
            &title,
            &breadcrumbs,
            Some(&library.name),
            Some(&ty.name),
        );
        let types = self.type_renderer(&path);
        let scope = Scope::library(library).with_type(ty);

        page.write(&format!(
            "<h2><strong>{}</strong> {}</h2>\n",
            types.declaration_name(ty, true),
            ty.kind_label()
        ));
        if let Some(text) = self.comment(&ty.doc, &ty.location) {
            page.write(&self.render_doc(&path, &text, &scope));
        }
        page.write(&self.source(&ty.location));

        if let Some(hierarchy) = analyze(self.index, ty) {
            page.write(&hierarchy_html(&types, ty, &hierarchy));
        }

        if let TypeKind::Typedef {
            return_type,
            parameters,
        } = &ty.kind
        {
            page.write(&format!(
                "<div class=\"declaration\">\n<pre>typedef {} <strong>{}</strong>{}</pre>\n</div>\n",
                types.annotate(Some(ty), return_type, None),
                types.declaration_name(ty, false),
                types.parameter_list(Some(ty), parameters)
            ));
        }

        let host = Host::Type(ty);
        let constructors = visible_constructors(ty);
        let members = visible_members(&ty.members, false);
        page.write(&self.member_section(&path, "Constructors", &constructors, host));
        page.write(&self.member_section(&path, "Static Methods", &members.static_methods, host));
        page.write(&self.member_section(&path, "Static Fields", &members.static_fields, host));
        page.write(&self.member_section(&path, "Methods", &members.instance_methods, host));
        page.write(&self.member_section(&path, "Fields", &members.instance_fields, host));

        for group in inherited_members(self.index, ty) {
            let header = match group.from {
                Some(from) => format!("Inherited from {}", types.type_link(from)),
                None => "Inherited".to_string(),
            };
            page.write(&format!("<h3>{}</h3>\n", header));
            for inherited in &group.members {
                let shown = Inherited {
                    declarer: inherited.declarer,
                    from: group.from,
                };
                page.write(&self.member_entry(&path, &types, inherited.member, host, Some(shown)));
            }
        }

        self.close_page(page, sink)?;
        Ok(constructors.len()
            + members.static_methods.len()
            + members.static_fields.len()
            + members.instance_methods.len()
            + members.instance_fields.len())
    }

    /// Header and entries for a group of members, or nothing when empty.
    fn member_section(
        &self,
        path: &str,
        header: &str,
        members: &[&'p Member],
        host: Host<'p>,
    ) -> String {
        if members.is_empty() {
            return String::new();
        }
        let types = self.type_renderer(path);
        let mut out = format!("<h3>{}</h3>\n", header);
        for &member in members {
            out.push_str(&self.member_entry(path, &types, member, host, None));
        }
        out
    }

    /// One member entry. `inherited` is set for entries a class picks up from
    /// a superclass.
    fn member_entry(
        &self,
        path: &str,
        types: &TypeRenderer<'_, 'p>,
        member: &'p Member,
        host: Host<'p>,
        inherited: Option<Inherited<'p>>,
    ) -> String {
        // Inherited entries keep the host's anchors.
        let anchor = member_anchor(host.name(), member);
        let declarer = match (inherited, host) {
            (Some(shown), _) => Some(shown.declarer),
            (None, Host::Type(ty)) => Some(ty),
            (None, Host::Library(_)) => None,
        };
        let permalink_title = match member.constructor_name() {
            Some(_) => anchor.clone(),
            None => format!("{}.{}", host.name(), member.name),
        };

        let mut out = format!(
            "<div class=\"{}{}\">\n",
            if member.is_field() { "field" } else { "method" },
            if inherited.is_some() { " inherited" } else { "" }
        );
        out.push_str(&format!(
            "<h4 id=\"{}\">{}<a class=\"anchor-link\" href=\"#{}\" title=\"Permalink to {}\">#</a></h4>\n",
            html_escape(&anchor),
            signature(types, declarer, host.name(), member),
            html_escape(&anchor),
            html_escape(&permalink_title)
        ));

        let page_type = match host {
            Host::Type(ty) => Some(ty),
            Host::Library(_) => None,
        };
        let scope = match declarer {
            Some(ty) => self.type_scope(ty, page_type),
            None => self.host_scope(host),
        };
        if let Some(text) = self.comment(&member.doc, &member.location) {
            out.push_str(&self.render_doc(path, &text, &scope.with_member(member)));
        } else if let Some(ty) = declarer {
            let inherited = inherited_comment(self.index, ty, &member.name, |m| {
                self.comment(&m.doc, &m.location)
            });
            if let Some(doc) = inherited {
                let scope = self.type_scope(doc.from, page_type).with_member(doc.member);
                out.push_str(&self.render_doc(path, &doc.comment, &scope));
                if doc.from.is_private() {
                    out.push_str("<div class=\"inherited-from\">docs inherited</div>\n");
                } else {
                    out.push_str(&format!(
                        "<div class=\"inherited-from\">docs inherited from {}</div>\n",
                        types.type_link(doc.from)
                    ));
                }
            }
        }
        if let Some(from) = inherited.and_then(|shown| shown.from) {
            out.push_str(&format!(
                "<div class=\"inherited-from\">inherited from {}</div>\n",
                types.type_link(from)
            ));
        }
        out.push_str(&self.source(&member.location));
        out.push_str("</div>\n");
        out
    }

    fn type_renderer(&self, path: &str) -> TypeRenderer<'a, 'p> {
        TypeRenderer::new(self.index, path, self.options.link_api.as_deref())
    }

    /// Scope of a member declared by `ty` and shown on `page_type`'s page.
    fn type_scope(&self, ty: &'p TypeDecl, page_type: Option<&'p TypeDecl>) -> Scope<'p> {
        Scope {
            library: self.index.library(&ty.library),
            ty: Some(ty),
            member: None,
            host: page_type,
        }
    }

    fn host_scope(&self, host: Host<'p>) -> Scope<'p> {
        match host {
            Host::Library(library) => Scope::library(library),
            Host::Type(ty) => self.type_scope(ty, Some(ty)),
        }
    }

    /// Inline doc if the snapshot has one, else whatever the locator finds.
    fn comment(&self, doc: &Option<String>, location: &Option<SourceLocation>) -> Option<String> {
        doc.clone()
            .or_else(|| location.as_ref().and_then(|loc| self.comments.find(loc)))
            .filter(|text| !text.trim().is_empty())
    }

    fn library_comment(&self, library: &Library) -> Option<String> {
        library
            .doc
            .clone()
            .or_else(|| {
                library
                    .location
                    .as_ref()
                    .and_then(|loc| self.comments.find_library(loc))
            })
            .filter(|text| !text.trim().is_empty())
    }

    fn render_doc(&self, path: &str, text: &str, scope: &Scope<'p>) -> String {
        let resolver = Resolver::new(self.index, path);
        let html = render_markdown(text, |name| resolver.resolve(name, scope).to_html());
        format!("<div class=\"doc\">\n{}</div>\n", html)
    }

    fn source(&self, location: &Option<SourceLocation>) -> String {
        if !self.options.include_source {
            return String::new();
        }
        match location.as_ref().and_then(|loc| self.comments.source(loc)) {
            Some(code) => format!(
                "<div class=\"show-code\">Code</div>\n<pre class=\"source\">{}</pre>\n",
                html_escape(&code)
            ),
            None => String::new(),
        }
    }
}

/// Declaration line for a member, without its permalink.
fn signature(
    types: &TypeRenderer<'_, '_>,
    enclosing: Option<&TypeDecl>,
    host_name: &str,
    member: &Member,
) -> String {
    let name = html_escape(&member.name);
    match &member.kind {
        MemberKind::Constructor {
            constructor_name,
            parameters,
            is_factory,
            is_const,
        } => {
            let keyword = if *is_const {
                "const"
            } else if *is_factory {
                "factory"
            } else {
                "new"
            };
            let full_name = if constructor_name.is_empty() {
                host_name.to_string()
            } else {
                format!("{}.{}", host_name, constructor_name)
            };
            format!(
                "{} <strong>{}</strong>{}",
                keyword,
                html_escape(&full_name),
                types.parameter_list(enclosing, parameters)
            )
        }
        MemberKind::Method {
            parameters,
            return_type,
            is_getter,
            is_setter,
            is_operator,
            is_abstract,
        } => {
            let mut out = String::new();
            if *is_abstract {
                out.push_str("abstract ");
            }
            out.push_str(&types.annotate(enclosing, return_type, None));
            out.push(' ');
            if *is_getter {
                out.push_str(&format!("get <strong>{}</strong>", name));
                return out;
            }
            if *is_setter {
                out.push_str("set ");
            } else if *is_operator {
                out.push_str("operator ");
            }
            out.push_str(&format!(
                "<strong>{}</strong>{}",
                name,
                types.parameter_list(enclosing, parameters)
            ));
            out
        }
        MemberKind::Field {
            ty,
            is_final,
            is_const,
        } => {
            let mut out = String::new();
            if *is_const {
                out.push_str("const ");
            } else if *is_final {
                out.push_str("final ");
            } else if matches!(ty, TypeRef::Dynamic) {
                out.push_str("var ");
            }
            if !matches!(ty, TypeRef::Dynamic) {
                out.push_str(&types.reference(enclosing, ty));
                out.push(' ');
            }
            out.push_str(&format!("<strong>{}</strong>", name));
            out
        }
    }
}

fn hierarchy_html(types: &TypeRenderer<'_, '_>, ty: &TypeDecl, hierarchy: &Hierarchy<'_>) -> String {
    let decls = |list: &[&TypeDecl]| list.iter().map(|t| types.type_link(t)).collect::<Vec<_>>();
    let refs = |list: &[&TypeRef]| {
        list.iter()
            .map(|r| types.reference(Some(ty), r))
            .collect::<Vec<_>>()
    };

    let mut out = String::new();
    match hierarchy {
        Hierarchy::Class {
            superclasses,
            subclasses,
            implements,
        } => {
            if !superclasses.is_empty() {
                let mut chain = decls(superclasses);
                chain.push(types.declaration_name(ty, false));
                out.push_str(&format!(
                    "<h3>Extends</h3>\n<p>{}</p>\n",
                    chain.join(" &nbsp;&gt;&nbsp; ")
                ));
            }
            out.push_str(&list_section("Subclasses", &decls(subclasses)));
            out.push_str(&list_section("Implements", &refs(implements)));
        }
        Hierarchy::Interface {
            default_class,
            extends,
            subinterfaces,
            implementors,
        } => {
            let default_class: Vec<&TypeRef> = default_class.iter().copied().collect();
            out.push_str(&list_section("Default class", &refs(&default_class)));
            out.push_str(&list_section("Extends", &refs(extends)));
            out.push_str(&list_section("Subinterfaces", &decls(subinterfaces)));
            out.push_str(&list_section("Implemented by", &decls(implementors)));
        }
    }
    out
}
