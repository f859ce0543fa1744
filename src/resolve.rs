//! Cross-reference resolution for `[name]` spans in doc comments.
//!
//! Lookup is lexical and first-match-wins:
//! 1. a parameter of the member being documented
//! 2. a member or constructor of the enclosing type, linked on its own page
//!    or, for inherited members, on the page the comment is shown on
//! 3. `new Type` / `new Type.name` for a class of the current library
//! 4. `Type.member` for a type of the current library
//! 5. a type of the current library
//! 6. a top-level member of the current library
//!
//! Anything else renders as code. Imported libraries and type parameters are
//! not searched.

use crate::index::{Host, SymbolIndex};
use crate::inherit::shown_on;
use crate::links::relative_path;
use crate::model::{Library, Member, TypeDecl};
use crate::render::html::html_escape;
use regex::Regex;
use std::sync::LazyLock;

static RE_CONSTRUCTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"new ([\w$]+)(?:\.([\w$]+))?").unwrap());

static RE_QUALIFIED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w$]+)\.([\w$]+)").unwrap());

/// The declarations enclosing the comment being rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'p> {
    pub library: Option<&'p Library>,
    pub ty: Option<&'p TypeDecl>,
    pub member: Option<&'p Member>,
    /// Type page the comment is shown on, when `ty` is a superclass.
    pub host: Option<&'p TypeDecl>,
}

impl<'p> Scope<'p> {
    pub fn library(library: &'p Library) -> Self {
        Self {
            library: Some(library),
            ..Self::default()
        }
    }

    pub fn with_type(self, ty: &'p TypeDecl) -> Self {
        Self {
            ty: Some(ty),
            ..self
        }
    }

    pub fn with_member(self, member: &'p Member) -> Self {
        Self {
            member: Some(member),
            ..self
        }
    }

    pub fn with_host(self, host: &'p TypeDecl) -> Self {
        Self {
            host: Some(host),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefNode {
    Parameter(String),
    Link { href: String, text: String },
    Unresolved(String),
}

impl RefNode {
    pub fn to_html(&self) -> String {
        match self {
            RefNode::Parameter(name) => format!("<span class=\"param\">{}</span>", html_escape(name)),
            RefNode::Link { href, text } => format!(
                "<a class=\"crossref\" href=\"{}\">{}</a>",
                html_escape(href),
                html_escape(text)
            ),
            RefNode::Unresolved(name) => format!("<code>{}</code>", html_escape(name)),
        }
    }
}

pub struct Resolver<'a, 'p> {
    index: &'a SymbolIndex<'p>,
    page: String,
}

impl<'a, 'p> Resolver<'a, 'p> {
    /// A resolver producing links relative to `page`.
    pub fn new(index: &'a SymbolIndex<'p>, page: &str) -> Self {
        Self {
            index,
            page: page.to_string(),
        }
    }

    pub fn resolve(&self, name: &str, scope: &Scope<'p>) -> RefNode {
        if let Some(member) = scope.member {
            if member.parameters().iter().any(|p| p.name == name) {
                return RefNode::Parameter(name.to_string());
            }
        }

        if let Some(ty) = scope.ty {
            if let Some(member) = ty.find_member(name).filter(|m| !m.is_private()) {
                if self.index.has_page(ty) {
                    return self.link(name, self.index.member_url(Host::Type(ty), member));
                }
                let host = scope
                    .host
                    .filter(|&host| self.index.has_page(host))
                    .filter(|&host| shown_on(self.index, host, ty, member));
                if let Some(host) = host {
                    return self.link(name, self.index.member_url(Host::Type(host), member));
                }
            }
        }

        let Some(library) = scope.library else {
            return RefNode::Unresolved(name.to_string());
        };

        if let Some(caps) = RE_CONSTRUCTOR.captures(name) {
            let ctor_name = caps.get(2).map_or("", |m| m.as_str());
            let ctor = self
                .local_type(library, &caps[1])
                .filter(|ty| ty.is_class())
                .and_then(|ty| Some((ty, ty.find_constructor(ctor_name)?)))
                .filter(|(_, ctor)| !ctor.is_private());
            if let Some((ty, ctor)) = ctor {
                return self.link(name, self.index.member_url(Host::Type(ty), ctor));
            }
        }

        if let Some(caps) = RE_QUALIFIED.captures(name) {
            let found = self.local_type(library, &caps[1]).and_then(|ty| {
                let member = ty.find_member(&caps[2])?;
                (!member.is_private()).then_some((ty, member))
            });
            if let Some((ty, member)) = found {
                return self.link(name, self.index.member_url(Host::Type(ty), member));
            }
        }

        if let Some(ty) = self.local_type(library, name) {
            return self.link(name, self.index.type_url(ty));
        }

        if let Some(member) = library
            .members
            .iter()
            .find(|m| m.name == name && !m.is_private())
        {
            return self.link(name, self.index.member_url(Host::Library(library), member));
        }

        RefNode::Unresolved(name.to_string())
    }

    /// Public type of `library` that has a page.
    fn local_type(&self, library: &Library, name: &str) -> Option<&'p TypeDecl> {
        self.index
            .lookup_type(&library.name, name)
            .filter(|ty| self.index.has_page(ty))
    }

    fn link(&self, text: &str, url: String) -> RefNode {
        RefNode::Link {
            href: relative_path(&self.page, &url),
            text: text.to_string(),
        }
    }
}
