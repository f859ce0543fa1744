//! Data model for a reflected program, read-only once loaded.
//!
//! Everything here deserializes straight from the program snapshot. The
//! only field not present in the snapshot is [`TypeDecl::library`], which the
//! loader fills in after parsing.

use serde::Deserialize;

/// The whole reflected program.
#[derive(Debug, Deserialize)]
pub struct Program {
    /// The universal root type every class ultimately extends.
    #[serde(default = "default_root")]
    pub root: TypeKey,
    #[serde(default)]
    pub libraries: Vec<Library>,
}

fn default_root() -> TypeKey {
    TypeKey {
        library: "core".to_string(),
        name: "Object".to_string(),
    }
}

/// Identifies a type declaration by owning library and simple name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct TypeKey {
    pub library: String,
    pub name: String,
}

/// Position of a declaration in its source file.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceLocation {
    pub path: String,
    /// 1-based line of the declaration itself.
    pub line: usize,
    /// Last line of the declaration, when the reflection tool knows it.
    #[serde(default)]
    pub end_line: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct Library {
    pub name: String,
    #[serde(default)]
    pub location: Option<SourceLocation>,
    /// Doc comment captured by the reflection tool, if any.
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    /// Owning library, filled in by the loader.
    #[serde(skip)]
    pub library: String,
    #[serde(flatten)]
    pub kind: TypeKind,
    #[serde(default)]
    pub type_variables: Vec<TypeVariable>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Class {
        #[serde(default)]
        superclass: Option<TypeRef>,
        #[serde(default)]
        constructors: Vec<Member>,
    },
    Interface {
        #[serde(default)]
        default_class: Option<TypeRef>,
    },
    Typedef {
        #[serde(default)]
        return_type: TypeRef,
        #[serde(default)]
        parameters: Vec<Parameter>,
    },
}

/// A type variable of a generic declaration, e.g. `T extends Comparable`.
#[derive(Debug, Deserialize)]
pub struct TypeVariable {
    pub name: String,
    #[serde(default)]
    pub bound: Option<TypeRef>,
}

/// A reference to a type from a signature.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    #[default]
    Dynamic,
    Void,
    Variable {
        name: String,
        #[serde(default)]
        declarer: Option<TypeKey>,
    },
    /// A named type, possibly applied to type arguments.
    Named {
        library: String,
        name: String,
        #[serde(default)]
        arguments: Vec<TypeRef>,
    },
    /// An unnamed function type.
    Function {
        #[serde(default)]
        return_type: Box<TypeRef>,
        #[serde(default)]
        parameters: Vec<Parameter>,
    },
}

#[derive(Debug, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(flatten)]
    pub kind: MemberKind,
    #[serde(default)]
    pub location: Option<SourceLocation>,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberKind {
    Method {
        #[serde(default)]
        parameters: Vec<Parameter>,
        #[serde(default)]
        return_type: TypeRef,
        #[serde(default)]
        is_getter: bool,
        #[serde(default)]
        is_setter: bool,
        #[serde(default)]
        is_operator: bool,
        #[serde(default)]
        is_abstract: bool,
    },
    Field {
        #[serde(rename = "type", default)]
        ty: TypeRef,
        #[serde(default)]
        is_final: bool,
        #[serde(default)]
        is_const: bool,
    },
    Constructor {
        /// Empty for the unnamed constructor.
        #[serde(default)]
        constructor_name: String,
        #[serde(default)]
        parameters: Vec<Parameter>,
        #[serde(default)]
        is_factory: bool,
        #[serde(default)]
        is_const: bool,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_named: bool,
    /// Literal source text of the default value.
    #[serde(default)]
    pub default_value: Option<String>,
}

/// Names starting with an underscore are library-private.
pub fn is_private_name(name: &str) -> bool {
    name.starts_with('_')
}

impl TypeDecl {
    pub fn key(&self) -> TypeKey {
        TypeKey {
            library: self.library.clone(),
            name: self.name.clone(),
        }
    }

    pub fn is(&self, library: &str, name: &str) -> bool {
        self.library == library && self.name == name
    }

    pub fn is_private(&self) -> bool {
        is_private_name(&self.name)
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class { .. })
    }

    pub fn is_typedef(&self) -> bool {
        matches!(self.kind, TypeKind::Typedef { .. })
    }

    /// Lower-case kind label used in headings and navigation icons.
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            TypeKind::Class { .. } => "class",
            TypeKind::Interface { .. } => "interface",
            TypeKind::Typedef { .. } => "typedef",
        }
    }

    pub fn superclass(&self) -> Option<&TypeRef> {
        match &self.kind {
            TypeKind::Class { superclass, .. } => superclass.as_ref(),
            _ => None,
        }
    }

    pub fn constructors(&self) -> &[Member] {
        match &self.kind {
            TypeKind::Class { constructors, .. } => constructors,
            _ => &[],
        }
    }

    /// Declared member or constructor with exactly this name.
    ///
    /// Constructors match on their full name (`Type` or `Type.named`) as
    /// well as on a bare constructor name.
    pub fn find_member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name).or_else(|| {
            self.constructors()
                .iter()
                .find(|c| c.name == name || c.constructor_name() == Some(name))
        })
    }

    pub fn find_constructor(&self, constructor_name: &str) -> Option<&Member> {
        self.constructors()
            .iter()
            .find(|c| c.constructor_name() == Some(constructor_name))
    }
}

impl Member {
    pub fn is_private(&self) -> bool {
        is_private_name(&self.name)
            || self
                .constructor_name()
                .is_some_and(|ctor| is_private_name(ctor))
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    pub fn constructor_name(&self) -> Option<&str> {
        match &self.kind {
            MemberKind::Constructor {
                constructor_name, ..
            } => Some(constructor_name),
            _ => None,
        }
    }

    /// Parameters of a method or constructor; fields have none.
    pub fn parameters(&self) -> &[Parameter] {
        match &self.kind {
            MemberKind::Method { parameters, .. } | MemberKind::Constructor { parameters, .. } => {
                parameters
            }
            MemberKind::Field { .. } => &[],
        }
    }
}

impl TypeRef {
    /// The `(library, name)` a named reference points at.
    pub fn target(&self) -> Option<(&str, &str)> {
        match self {
            TypeRef::Named { library, name, .. } => Some((library, name)),
            _ => None,
        }
    }

    pub fn names(&self, key: &TypeKey) -> bool {
        self.target() == Some((key.library.as_str(), key.name.as_str()))
    }
}
