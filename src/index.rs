//! Immutable symbol lookup tables, built once per run.
//!
//! Resolution and rendering only ever do map lookups against this index;
//! nothing walks the program graph after it is built.

use crate::links::{member_anchor, sanitize};
use crate::model::*;
use crate::walk::{order_by_name, sorted_libraries, LibraryFilter};
use std::collections::{HashMap, HashSet};

type Key<'p> = (&'p str, &'p str);

/// Where a member is documented: a library page or a type page.
#[derive(Debug, Clone, Copy)]
pub enum Host<'p> {
    Library(&'p Library),
    Type(&'p TypeDecl),
}

impl<'p> Host<'p> {
    pub fn name(&self) -> &'p str {
        match *self {
            Host::Library(lib) => &lib.name,
            Host::Type(ty) => &ty.name,
        }
    }
}

pub struct SymbolIndex<'p> {
    program: &'p Program,
    libraries: Vec<&'p Library>,
    in_scope: HashSet<&'p str>,
    library_by_name: HashMap<&'p str, &'p Library>,
    types: HashMap<Key<'p>, &'p TypeDecl>,
    slugs: HashMap<&'p str, String>,
    subtypes: HashMap<Key<'p>, Vec<&'p TypeDecl>>,
}

impl<'p> SymbolIndex<'p> {
    pub fn build(program: &'p Program, filter: &LibraryFilter) -> Self {
        let libraries = sorted_libraries(program, filter);
        let in_scope = libraries.iter().map(|l| l.name.as_str()).collect();

        let mut library_by_name = HashMap::new();
        let mut types = HashMap::new();
        for library in &program.libraries {
            library_by_name.entry(library.name.as_str()).or_insert(library);
            for ty in &library.types {
                types
                    .entry((library.name.as_str(), ty.name.as_str()))
                    .or_insert(ty);
            }
        }

        Self {
            program,
            slugs: assign_slugs(&libraries),
            subtypes: collect_subtypes(program),
            libraries,
            in_scope,
            library_by_name,
            types,
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// In-scope libraries in display order.
    pub fn libraries(&self) -> &[&'p Library] {
        &self.libraries
    }

    pub fn is_in_scope(&self, library: &str) -> bool {
        self.in_scope.contains(library)
    }

    pub fn library(&self, name: &str) -> Option<&'p Library> {
        self.library_by_name.get(name).copied()
    }

    pub fn lookup_type(&self, library: &str, name: &str) -> Option<&'p TypeDecl> {
        self.types.get(&(library, name)).copied()
    }

    pub fn lookup_key(&self, key: &TypeKey) -> Option<&'p TypeDecl> {
        self.lookup_type(&key.library, &key.name)
    }

    /// The declaration a named reference points at, if it is in the program.
    pub fn resolve_ref(&self, ty: &TypeRef) -> Option<&'p TypeDecl> {
        let (library, name) = ty.target()?;
        self.lookup_type(library, name)
    }

    pub fn is_root(&self, ty: &TypeDecl) -> bool {
        ty.is(&self.program.root.library, &self.program.root.name)
    }

    pub fn is_root_ref(&self, ty: &TypeRef) -> bool {
        ty.names(&self.program.root)
    }

    /// Whether `ty` gets a page of its own.
    pub fn has_page(&self, ty: &TypeDecl) -> bool {
        !ty.is_private() && self.is_in_scope(&ty.library)
    }

    pub fn library_slug(&self, library: &str) -> String {
        self.slugs
            .get(library)
            .cloned()
            .unwrap_or_else(|| sanitize(library))
    }

    pub fn library_url(&self, library: &str) -> String {
        format!("{}.html", self.library_slug(library))
    }

    pub fn type_url(&self, ty: &TypeDecl) -> String {
        format!("{}/{}.html", self.library_slug(&ty.library), ty.name)
    }

    pub fn member_url(&self, host: Host<'_>, member: &Member) -> String {
        let page = match host {
            Host::Library(lib) => self.library_url(&lib.name),
            Host::Type(ty) => self.type_url(ty),
        };
        format!("{}#{}", page, member_anchor(host.name(), member))
    }

    /// Public types whose declared superclass or interfaces name `ty`.
    pub fn subtypes(&self, ty: &'p TypeDecl) -> &[&'p TypeDecl] {
        self.subtypes
            .get(&(ty.library.as_str(), ty.name.as_str()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// One slug per in-scope library; a slug already taken gets a numeric suffix
/// so that `library.html` and `library/Type.html` never collide.
fn assign_slugs<'p>(libraries: &[&'p Library]) -> HashMap<&'p str, String> {
    // `index.html` is the root page.
    let mut taken = HashSet::from(["index".to_string()]);
    let mut slugs = HashMap::new();
    for library in libraries {
        if slugs.contains_key(library.name.as_str()) {
            continue;
        }
        let base = sanitize(&library.name);
        let mut slug = base.clone();
        let mut n = 2;
        while !taken.insert(slug.clone()) {
            slug = format!("{}_{}", base, n);
            n += 1;
        }
        if slug != base {
            log::warn!(
                "library {} collides with another library's file name; using {}",
                library.name,
                slug
            );
        }
        slugs.insert(library.name.as_str(), slug);
    }
    slugs
}

fn collect_subtypes(program: &Program) -> HashMap<Key<'_>, Vec<&TypeDecl>> {
    let mut subtypes: HashMap<Key<'_>, Vec<&TypeDecl>> = HashMap::new();
    for library in &program.libraries {
        for ty in library.types.iter().filter(|t| !t.is_private()) {
            for parent in ty.superclass().into_iter().chain(&ty.interfaces) {
                if let Some(key) = parent.target() {
                    let list = subtypes.entry(key).or_default();
                    if !list.iter().any(|t| t.is(&ty.library, &ty.name)) {
                        list.push(ty);
                    }
                }
            }
        }
    }
    for list in subtypes.values_mut() {
        *list = order_by_name(list.iter().copied(), |t| &t.name);
    }
    subtypes
}
