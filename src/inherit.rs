//! Inheritance relationships between type declarations.

use crate::index::SymbolIndex;
use crate::links::member_anchor;
use crate::model::*;
use std::collections::{HashSet, VecDeque};

/// What the type page shows about a type's place in the hierarchy.
#[derive(Debug)]
pub enum Hierarchy<'p> {
    Class {
        /// In-program superclasses, most distant first, root excluded.
        superclasses: Vec<&'p TypeDecl>,
        subclasses: Vec<&'p TypeDecl>,
        implements: Vec<&'p TypeRef>,
    },
    Interface {
        default_class: Option<&'p TypeRef>,
        extends: Vec<&'p TypeRef>,
        subinterfaces: Vec<&'p TypeDecl>,
        implementors: Vec<&'p TypeDecl>,
    },
}

/// `None` for the root type and for typedefs.
pub fn analyze<'p>(index: &SymbolIndex<'p>, ty: &'p TypeDecl) -> Option<Hierarchy<'p>> {
    if index.is_root(ty) {
        return None;
    }
    let subtypes = index.subtypes(ty);
    match &ty.kind {
        TypeKind::Class { .. } => Some(Hierarchy::Class {
            superclasses: superclass_chain(index, ty)
                .into_iter()
                .rev()
                .filter(|t| !t.is_private())
                .collect(),
            subclasses: subtypes.to_vec(),
            implements: public_refs(&ty.interfaces),
        }),
        TypeKind::Interface { default_class } => Some(Hierarchy::Interface {
            default_class: default_class.as_ref().filter(|r| !is_private_ref(r)),
            extends: public_refs(&ty.interfaces),
            subinterfaces: subtypes.iter().copied().filter(|t| !t.is_class()).collect(),
            implementors: subtypes.iter().copied().filter(|t| t.is_class()).collect(),
        }),
        TypeKind::Typedef { .. } => None,
    }
}

fn is_private_ref(ty: &TypeRef) -> bool {
    ty.target().is_some_and(|(_, name)| is_private_name(name))
}

fn public_refs(refs: &[TypeRef]) -> Vec<&TypeRef> {
    refs.iter().filter(|r| !is_private_ref(r)).collect()
}

/// Superclasses nearest first, stopping before the root type or at the first
/// superclass outside the program.
pub fn superclass_chain<'p>(index: &SymbolIndex<'p>, ty: &'p TypeDecl) -> Vec<&'p TypeDecl> {
    let mut chain = Vec::new();
    let mut seen = HashSet::from([(ty.library.as_str(), ty.name.as_str())]);
    let mut current = ty;
    while let Some(parent) = current.superclass().and_then(|r| index.resolve_ref(r)) {
        if index.is_root(parent) {
            break;
        }
        if !seen.insert((parent.library.as_str(), parent.name.as_str())) {
            log::warn!("superclass cycle through {}.{}", parent.library, parent.name);
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain
}

/// A member shown on a subclass page, and the superclass declaring it.
#[derive(Debug, Clone, Copy)]
pub struct InheritedMember<'p> {
    pub member: &'p Member,
    pub declarer: &'p TypeDecl,
}

/// Instance members a class picks up from one public superclass.
///
/// Members of private superclasses are credited to the nearest public
/// superclass below them; `from` is `None` when there is none.
#[derive(Debug)]
pub struct InheritedGroup<'p> {
    pub from: Option<&'p TypeDecl>,
    pub members: Vec<InheritedMember<'p>>,
}

/// Public instance members of superclasses not redeclared closer to `ty`,
/// grouped by superclass, nearest first.
pub fn inherited_members<'p>(index: &SymbolIndex<'p>, ty: &'p TypeDecl) -> Vec<InheritedGroup<'p>> {
    let mut seen: HashSet<String> = ty.members.iter().map(|m| member_anchor("", m)).collect();
    let mut groups: Vec<InheritedGroup<'p>> = Vec::new();
    let mut owner: Option<&'p TypeDecl> = None;
    for parent in superclass_chain(index, ty) {
        if !parent.is_private() {
            owner = Some(parent);
        }
        let fresh = parent
            .members
            .iter()
            .filter(|m| !m.is_static && !m.is_private())
            .filter(|m| seen.insert(member_anchor("", m)))
            .map(|member| InheritedMember {
                member,
                declarer: parent,
            });
        if !groups.last().is_some_and(|g| same_type(g.from, owner)) {
            groups.push(InheritedGroup {
                from: owner,
                members: Vec::new(),
            });
        }
        if let Some(group) = groups.last_mut() {
            group.members.extend(fresh);
        }
    }
    groups.retain(|g| !g.members.is_empty());
    for group in &mut groups {
        group
            .members
            .sort_by_key(|m| m.member.name.to_uppercase());
    }
    groups
}

fn same_type(a: Option<&TypeDecl>, b: Option<&TypeDecl>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => std::ptr::eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Whether `member`, declared by `declarer`, has an entry on `host`'s page:
/// either its own declaration or one inherited through the superclass chain.
pub fn shown_on<'p>(
    index: &SymbolIndex<'p>,
    host: &'p TypeDecl,
    declarer: &'p TypeDecl,
    member: &Member,
) -> bool {
    if member.is_static || member.constructor_name().is_some() {
        return false;
    }
    let anchor = member_anchor("", member);
    host.members
        .iter()
        .any(|m| !m.is_static && !m.is_private() && member_anchor("", m) == anchor)
        || superclass_chain(index, host)
            .into_iter()
            .any(|t| std::ptr::eq(t, declarer))
}

/// Documentation borrowed from an overridden member.
#[derive(Debug)]
pub struct InheritedDoc<'p> {
    pub comment: String,
    pub from: &'p TypeDecl,
    pub member: &'p Member,
}

/// The comment of the nearest same-named member among the supertypes of
/// `ty`, searched breadth first through superclasses and interfaces.
pub fn inherited_comment<'p>(
    index: &SymbolIndex<'p>,
    ty: &'p TypeDecl,
    name: &str,
    comment: impl Fn(&'p Member) -> Option<String>,
) -> Option<InheritedDoc<'p>> {
    let mut seen = HashSet::from([(ty.library.as_str(), ty.name.as_str())]);
    let mut queue: VecDeque<&'p TypeDecl> = VecDeque::from([ty]);
    while let Some(current) = queue.pop_front() {
        for parent in current
            .superclass()
            .into_iter()
            .chain(&current.interfaces)
            .filter_map(|r| index.resolve_ref(r))
        {
            if !seen.insert((parent.library.as_str(), parent.name.as_str())) {
                continue;
            }
            let found = parent
                .members
                .iter()
                .filter(|m| m.name == name && !m.is_private())
                .find_map(|m| Some((m, comment(m)?)));
            if let Some((member, text)) = found {
                return Some(InheritedDoc {
                    comment: text,
                    from: parent,
                    member,
                });
            }
            queue.push_back(parent);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{named, object, program};
    use crate::walk::LibraryFilter;
    use serde_json::json;

    fn names(types: &[&TypeDecl]) -> Vec<String> {
        types.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn root_and_typedefs_have_no_hierarchy() {
        let p = program(json!([{
            "name": "core",
            "types": [
                {"name": "Object", "kind": "class"},
                {"name": "Fn", "kind": "typedef"}
            ]
        }]));
        let index = SymbolIndex::build(&p, &LibraryFilter::All);
        assert!(analyze(&index, &p.libraries[0].types[0]).is_none());
        assert!(analyze(&index, &p.libraries[0].types[1]).is_none());
    }

    #[test]
    fn direct_subclass_of_root_has_empty_chain() {
        let p = program(json!([
            {"name": "core", "types": [{"name": "Object", "kind": "class"}]},
            {"name": "L", "types": [{"name": "C", "kind": "class", "superclass": object()}]}
        ]));
        let index = SymbolIndex::build(&p, &LibraryFilter::All);
        let c = index.lookup_type("L", "C").unwrap();
        match analyze(&index, c) {
            Some(Hierarchy::Class { superclasses, subclasses, implements }) => {
                assert!(superclasses.is_empty());
                assert!(subclasses.is_empty());
                assert!(implements.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn chain_is_most_distant_first() {
        let p = program(json!([{
            "name": "L",
            "types": [
                {"name": "A", "kind": "class"},
                {"name": "_B", "kind": "class", "superclass": named("L", "A")},
                {"name": "C", "kind": "class", "superclass": named("L", "_B")},
                {"name": "D", "kind": "class", "superclass": named("L", "C")}
            ]
        }]));
        let index = SymbolIndex::build(&p, &LibraryFilter::All);
        let d = index.lookup_type("L", "D").unwrap();
        let Some(Hierarchy::Class { superclasses, .. }) = analyze(&index, d) else {
            panic!("expected class hierarchy");
        };
        assert_eq!(names(&superclasses), ["A", "C"]);
        assert_eq!(names(&superclass_chain(&index, d)), ["C", "_B", "A"]);
    }

    #[test]
    fn superclass_cycle_terminates() {
        let p = program(json!([{
            "name": "L",
            "types": [
                {"name": "A", "kind": "class", "superclass": named("L", "B")},
                {"name": "B", "kind": "class", "superclass": named("L", "A")}
            ]
        }]));
        let index = SymbolIndex::build(&p, &LibraryFilter::All);
        let a = index.lookup_type("L", "A").unwrap();
        assert_eq!(names(&superclass_chain(&index, a)), ["B"]);
    }

    #[test]
    fn interface_partitions_subtypes() {
        let p = program(json!([{
            "name": "L",
            "types": [
                {"name": "I", "kind": "interface", "default_class": named("L", "Impl")},
                {"name": "B", "kind": "class", "interfaces": [named("L", "I")]},
                {"name": "A", "kind": "class", "interfaces": [named("L", "I")]},
                {"name": "J", "kind": "interface", "interfaces": [named("L", "I")]},
                {"name": "_Q", "kind": "class", "interfaces": [named("L", "I")]},
                {"name": "Impl", "kind": "class"}
            ]
        }]));
        let index = SymbolIndex::build(&p, &LibraryFilter::All);
        let i = index.lookup_type("L", "I").unwrap();
        let Some(Hierarchy::Interface {
            default_class,
            extends,
            subinterfaces,
            implementors,
        }) = analyze(&index, i)
        else {
            panic!("expected interface hierarchy");
        };
        assert_eq!(default_class.and_then(|r| r.target()), Some(("L", "Impl")));
        assert!(extends.is_empty());
        assert_eq!(names(&subinterfaces), ["J"]);
        assert_eq!(names(&implementors), ["A", "B"]);
    }

    #[test]
    fn private_interfaces_hidden() {
        let p = program(json!([{
            "name": "L",
            "types": [
                {"name": "C", "kind": "class",
                 "interfaces": [named("L", "_Secret"), named("L", "Shown")]}
            ]
        }]));
        let index = SymbolIndex::build(&p, &LibraryFilter::All);
        let c = index.lookup_type("L", "C").unwrap();
        let Some(Hierarchy::Class { implements, .. }) = analyze(&index, c) else {
            panic!("expected class hierarchy");
        };
        let targets: Vec<_> = implements.iter().filter_map(|r| r.target()).collect();
        assert_eq!(targets, [("L", "Shown")]);
    }

    #[test]
    fn inherited_members_skip_overrides() {
        let p = program(json!([{
            "name": "L",
            "types": [
                {"name": "Base", "kind": "class", "members": [
                    {"name": "run", "kind": "method"},
                    {"name": "stop", "kind": "method"},
                    {"name": "make", "kind": "method", "is_static": true},
                    {"name": "_inner", "kind": "method"}
                ]},
                {"name": "Mid", "kind": "class", "superclass": named("L", "Base"), "members": [
                    {"name": "run", "kind": "method"},
                    {"name": "size", "kind": "field"}
                ]},
                {"name": "Leaf", "kind": "class", "superclass": named("L", "Mid"), "members": [
                    {"name": "size", "kind": "field"}
                ]}
            ]
        }]));
        let index = SymbolIndex::build(&p, &LibraryFilter::All);
        let leaf = index.lookup_type("L", "Leaf").unwrap();
        let groups = inherited_members(&index, leaf);
        assert_eq!(
            summarize(&groups),
            [
                (Some("Mid".to_string()), vec!["run".to_string()]),
                (Some("Base".to_string()), vec!["stop".to_string()]),
            ]
        );
    }

    fn summarize(groups: &[InheritedGroup<'_>]) -> Vec<(Option<String>, Vec<String>)> {
        groups
            .iter()
            .map(|g| {
                (
                    g.from.map(|t| t.name.clone()),
                    g.members.iter().map(|m| m.member.name.clone()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn private_superclass_members_credited_to_public_subclass() {
        let p = program(json!([{
            "name": "L",
            "types": [
                {"name": "_Root", "kind": "class", "members": [
                    {"name": "zap", "kind": "method"}
                ]},
                {"name": "Base", "kind": "class", "superclass": named("L", "_Root"), "members": [
                    {"name": "run", "kind": "method"}
                ]},
                {"name": "_Mixin", "kind": "class", "superclass": named("L", "Base"), "members": [
                    {"name": "stop", "kind": "method"}
                ]},
                {"name": "Leaf", "kind": "class", "superclass": named("L", "_Mixin")}
            ]
        }]));
        let index = SymbolIndex::build(&p, &LibraryFilter::All);
        let leaf = index.lookup_type("L", "Leaf").unwrap();
        let groups = inherited_members(&index, leaf);
        assert_eq!(
            summarize(&groups),
            [
                (None, vec!["stop".to_string()]),
                (Some("Base".to_string()), vec!["run".to_string(), "zap".to_string()]),
            ]
        );
        assert_eq!(groups[1].members[1].declarer.name, "_Root");
    }

    #[test]
    fn members_shown_on_subclass_pages() {
        let p = program(json!([{
            "name": "L",
            "types": [
                {"name": "_Base", "kind": "class", "members": [
                    {"name": "reset", "kind": "method"},
                    {"name": "create", "kind": "method", "is_static": true}
                ]},
                {"name": "Leaf", "kind": "class", "superclass": named("L", "_Base")},
                {"name": "Other", "kind": "class"}
            ]
        }]));
        let index = SymbolIndex::build(&p, &LibraryFilter::All);
        let base = index.lookup_type("L", "_Base").unwrap();
        let leaf = index.lookup_type("L", "Leaf").unwrap();
        let other = index.lookup_type("L", "Other").unwrap();
        assert!(shown_on(&index, leaf, base, &base.members[0]));
        assert!(!shown_on(&index, leaf, base, &base.members[1]));
        assert!(!shown_on(&index, other, base, &base.members[0]));
    }

    #[test]
    fn comment_found_through_interface() {
        let p = program(json!([{
            "name": "L",
            "types": [
                {"name": "I", "kind": "interface", "members": [
                    {"name": "run", "kind": "method", "doc": "Runs it."}
                ]},
                {"name": "Base", "kind": "class", "interfaces": [named("L", "I")], "members": [
                    {"name": "run", "kind": "method"}
                ]},
                {"name": "C", "kind": "class", "superclass": named("L", "Base"), "members": [
                    {"name": "run", "kind": "method"}
                ]}
            ]
        }]));
        let index = SymbolIndex::build(&p, &LibraryFilter::All);
        let c = index.lookup_type("L", "C").unwrap();
        let doc = inherited_comment(&index, c, "run", |m| m.doc.clone()).unwrap();
        assert_eq!(doc.comment, "Runs it.");
        assert_eq!(doc.from.name, "I");
        assert!(inherited_comment(&index, c, "walk", |m| m.doc.clone()).is_none());
    }
}
