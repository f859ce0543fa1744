//! Type expressions as linked HTML.

use crate::index::SymbolIndex;
use crate::links::{relative_path, sanitize};
use crate::model::*;
use crate::render::html::{html_escape, link};

pub struct TypeRenderer<'a, 'p> {
    index: &'a SymbolIndex<'p>,
    /// Page the output is written into; links are relative to it.
    page: String,
    /// Base URL for types of libraries that are not documented here.
    api_base: Option<&'a str>,
}

impl<'a, 'p> TypeRenderer<'a, 'p> {
    pub fn new(index: &'a SymbolIndex<'p>, page: &str, api_base: Option<&'a str>) -> Self {
        Self {
            index,
            page: page.to_string(),
            api_base,
        }
    }

    fn href(&self, url: &str) -> String {
        relative_path(&self.page, url)
    }

    /// A type as it appears in a signature, optionally followed by the name
    /// of the parameter or field it declares.
    pub fn annotate(
        &self,
        enclosing: Option<&TypeDecl>,
        ty: &TypeRef,
        param_name: Option<&str>,
    ) -> String {
        match (ty, param_name) {
            // Untyped parameters read better without the keyword.
            (TypeRef::Dynamic, Some(name)) => html_escape(name),
            (
                TypeRef::Function {
                    return_type,
                    parameters,
                },
                Some(name),
            ) => format!(
                "{} {}{}",
                self.annotate(enclosing, return_type, None),
                html_escape(name),
                self.parameter_list(enclosing, parameters)
            ),
            (_, Some(name)) => format!("{} {}", self.reference(enclosing, ty), html_escape(name)),
            (_, None) => self.reference(enclosing, ty),
        }
    }

    /// A linked type reference, with type arguments for instantiations.
    pub fn reference(&self, enclosing: Option<&TypeDecl>, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Dynamic => "dynamic".to_string(),
            TypeRef::Void => "void".to_string(),
            TypeRef::Variable { name, declarer } => {
                // Type variables have no page; link to the generic type.
                let declarer = declarer
                    .as_ref()
                    .and_then(|key| self.index.lookup_key(key))
                    .or(enclosing);
                match declarer {
                    Some(decl) if self.index.has_page(decl) => {
                        link(&self.href(&self.index.type_url(decl)), &html_escape(name))
                    }
                    _ => html_escape(name),
                }
            }
            TypeRef::Named {
                library,
                name,
                arguments,
            } => {
                let mut out = self.named(library, name);
                if !arguments.is_empty() {
                    let args: Vec<String> = arguments
                        .iter()
                        .map(|arg| self.reference(enclosing, arg))
                        .collect();
                    out.push_str(&format!("&lt;{}&gt;", args.join(", ")));
                }
                out
            }
            TypeRef::Function {
                return_type,
                parameters,
            } => format!(
                "{} Function{}",
                self.reference(enclosing, return_type),
                self.parameter_list(enclosing, parameters)
            ),
        }
    }

    fn named(&self, library: &str, name: &str) -> String {
        if let Some(decl) = self.index.lookup_type(library, name) {
            if self.index.has_page(decl) {
                return link(&self.href(&self.index.type_url(decl)), &html_escape(name));
            }
        }
        match self.api_base {
            Some(base) if !self.index.is_in_scope(library) && !is_private_name(name) => link(
                &format!(
                    "{}/{}/{}.html",
                    base.trim_end_matches('/'),
                    sanitize(library),
                    name
                ),
                &html_escape(name),
            ),
            _ => html_escape(name),
        }
    }

    /// A declaration linked to its own page, or plain text without one.
    pub fn type_link(&self, ty: &TypeDecl) -> String {
        let name = self.declaration_name(ty, false);
        if self.index.has_page(ty) {
            link(&self.href(&self.index.type_url(ty)), &name)
        } else {
            name
        }
    }

    /// `Name&lt;T extends B, U&gt;` for a generic declaration.
    ///
    /// Bounds equal to the root type are never shown.
    pub fn declaration_name(&self, ty: &TypeDecl, show_bounds: bool) -> String {
        if ty.type_variables.is_empty() {
            return html_escape(&ty.name);
        }
        let vars: Vec<String> = ty
            .type_variables
            .iter()
            .map(|var| match &var.bound {
                Some(bound) if show_bounds && !self.index.is_root_ref(bound) => format!(
                    "{} extends {}",
                    html_escape(&var.name),
                    self.plain_name(bound)
                ),
                _ => html_escape(&var.name),
            })
            .collect();
        format!("{}&lt;{}&gt;", html_escape(&ty.name), vars.join(", "))
    }

    /// Unlinked text form of a reference.
    pub fn plain_name(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Dynamic => "dynamic".to_string(),
            TypeRef::Void => "void".to_string(),
            TypeRef::Variable { name, .. } => html_escape(name),
            TypeRef::Named {
                name, arguments, ..
            } => {
                if arguments.is_empty() {
                    html_escape(name)
                } else {
                    let args: Vec<String> = arguments.iter().map(|a| self.plain_name(a)).collect();
                    format!("{}&lt;{}&gt;", html_escape(name), args.join(", "))
                }
            }
            TypeRef::Function { .. } => "Function".to_string(),
        }
    }

    /// `(A a, [B b = 1])`, with named parameters in braces.
    pub fn parameter_list(&self, enclosing: Option<&TypeDecl>, parameters: &[Parameter]) -> String {
        let mut out = String::from("(");
        let mut closer: Option<char> = None;
        for (i, param) in parameters.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if closer.is_none() && (param.is_optional || param.is_named) {
                let (open, close) = if param.is_named { ('{', '}') } else { ('[', ']') };
                out.push(open);
                closer = Some(close);
            }
            out.push_str(&self.annotate(enclosing, &param.ty, Some(&param.name)));
            if let Some(default) = &param.default_value {
                out.push_str(&format!(" = {}", html_escape(default)));
            }
        }
        if let Some(close) = closer {
            out.push(close);
        }
        out.push(')');
        out
    }
}
