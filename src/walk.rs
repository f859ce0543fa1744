//! Deterministic enumeration of libraries, types, and members.
//!
//! Everything is ordered by upper-cased simple name with a stable sort, so
//! two runs over the same snapshot always visit declarations in the same
//! order.

use crate::model::*;

/// Which libraries get pages of their own.
#[derive(Debug, Clone, Default)]
pub enum LibraryFilter {
    #[default]
    All,
    Only(Vec<String>),
}

impl LibraryFilter {
    pub fn from_names(names: Vec<String>) -> Self {
        if names.is_empty() {
            LibraryFilter::All
        } else {
            LibraryFilter::Only(names)
        }
    }

    pub fn includes(&self, library: &str) -> bool {
        match self {
            LibraryFilter::All => true,
            LibraryFilter::Only(names) => names.iter().any(|n| n == library),
        }
    }
}

/// Stable, case-insensitive ordering by a name key.
pub fn order_by_name<'a, T>(items: impl IntoIterator<Item = &'a T>, name: impl Fn(&T) -> &str) -> Vec<&'a T>
where
    T: 'a,
{
    let mut items: Vec<&T> = items.into_iter().collect();
    items.sort_by(|a, b| name(a).to_uppercase().cmp(&name(b).to_uppercase()));
    items
}

/// In-scope libraries in display order.
pub fn sorted_libraries<'p>(program: &'p Program, filter: &LibraryFilter) -> Vec<&'p Library> {
    order_by_name(
        program.libraries.iter().filter(|l| filter.includes(&l.name)),
        |l| &l.name,
    )
}

/// Public types of a library in display order.
pub fn visible_types(library: &Library) -> Vec<&TypeDecl> {
    order_by_name(library.types.iter().filter(|t| !t.is_private()), |t| &t.name)
}

/// Public members split into the four display groups.
#[derive(Debug, Default)]
pub struct MemberGroups<'p> {
    pub static_methods: Vec<&'p Member>,
    pub static_fields: Vec<&'p Member>,
    pub instance_methods: Vec<&'p Member>,
    pub instance_fields: Vec<&'p Member>,
}

impl MemberGroups<'_> {
    pub fn is_empty(&self) -> bool {
        self.static_methods.is_empty()
            && self.static_fields.is_empty()
            && self.instance_methods.is_empty()
            && self.instance_fields.is_empty()
    }
}

/// Library top-level members are always treated as static, so they land in
/// the static groups (rendered as "Functions" and "Variables").
pub fn visible_members<'p>(members: &'p [Member], top_level: bool) -> MemberGroups<'p> {
    let mut groups = MemberGroups::default();
    for member in order_by_name(members.iter().filter(|m| !m.is_private()), |m| &m.name) {
        let is_static = top_level || member.is_static;
        match (&member.kind, is_static) {
            (MemberKind::Method { .. }, true) => groups.static_methods.push(member),
            (MemberKind::Method { .. }, false) => groups.instance_methods.push(member),
            (MemberKind::Field { .. }, true) => groups.static_fields.push(member),
            (MemberKind::Field { .. }, false) => groups.instance_fields.push(member),
            // Constructors are listed separately.
            (MemberKind::Constructor { .. }, _) => {}
        }
    }
    groups
}

/// Public constructors, the unnamed one first.
pub fn visible_constructors(ty: &TypeDecl) -> Vec<&Member> {
    order_by_name(
        ty.constructors().iter().filter(|c| !c.is_private()),
        |c| c.constructor_name().unwrap_or(""),
    )
}

/// Public types of a library grouped for the library page.
#[derive(Debug, Default)]
pub struct TypeGroups<'p> {
    pub classes: Vec<&'p TypeDecl>,
    pub interfaces: Vec<&'p TypeDecl>,
    pub typedefs: Vec<&'p TypeDecl>,
    pub exceptions: Vec<&'p TypeDecl>,
}

pub fn is_exception(ty: &TypeDecl) -> bool {
    !ty.is_typedef() && (ty.name.ends_with("Exception") || ty.name.ends_with("Error"))
}

pub fn group_types(library: &Library) -> TypeGroups<'_> {
    let mut groups = TypeGroups::default();
    for ty in visible_types(library) {
        if is_exception(ty) {
            groups.exceptions.push(ty);
            continue;
        }
        match ty.kind {
            TypeKind::Class { .. } => groups.classes.push(ty),
            TypeKind::Interface { .. } => groups.interfaces.push(ty),
            TypeKind::Typedef { .. } => groups.typedefs.push(ty),
        }
    }
    groups
}
