//! Member resolution over the class hierarchy.

use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use javelin_syntax::Ident;
use javelin_types::{
    ClassSymbol, FieldInfo, HeaderView, TypeView, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC,
};

use crate::env::Env;
use crate::lookup::Resolver;

/// Where a lookup originates, for visibility checks.
#[derive(Clone, Debug, Default)]
pub(crate) struct Origin {
    /// Slash-delimited package of the looking compilation unit.
    pub package: String,
    /// The looking class, when there is one (imports resolve with `None`).
    pub class: Option<ClassSymbol>,
}

/// The nested class of `sym` named `name`: searches `sym` itself, then its
/// supertypes breadth-first, honoring visibility from `origin`.
pub(crate) fn resolve_member(
    env: &dyn Env<dyn HeaderView>,
    origin: &Origin,
    sym: &ClassSymbol,
    name: &str,
) -> Option<ClassSymbol> {
    let mut queue = VecDeque::from([sym.clone()]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let Some(view) = env.get(&current) else {
            continue;
        };
        if let Some(child) = view.child(name) {
            let access = env.get(child).map(|c| c.access()).unwrap_or(ACC_PUBLIC);
            if visible(env, origin, &current, child, access) {
                return Some(child.clone());
            }
        }
        if let Some(superclass) = view.superclass() {
            queue.push_back(superclass.clone());
        }
        queue.extend(view.interfaces().iter().cloned());
    }
    None
}

/// Field resolution, analogous to [`resolve_member`]. Returns the declared
/// field info; visibility filtering is left to use sites that need it
/// (on-demand static imports exclude private hits).
pub(crate) fn resolve_field(
    env: &dyn Env<dyn TypeView>,
    sym: &ClassSymbol,
    name: &str,
) -> Option<FieldInfo> {
    let mut queue = VecDeque::from([sym.clone()]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let Some(view) = env.get(&current) else {
            continue;
        };
        if let Some(field) = view.field(name) {
            return Some(field.clone());
        }
        if let Some(superclass) = view.superclass() {
            queue.push_back(superclass.clone());
        }
        queue.extend(view.interfaces().iter().cloned());
    }
    None
}

fn visible(
    env: &dyn Env<dyn HeaderView>,
    origin: &Origin,
    enclosing: &ClassSymbol,
    member: &ClassSymbol,
    access: u32,
) -> bool {
    if access & ACC_PUBLIC != 0 {
        return true;
    }
    if access & ACC_PRIVATE != 0 {
        // Private members are visible only inside their own top level.
        return origin
            .class
            .as_ref()
            .is_some_and(|cls| top_level(cls.binary_name()) == top_level(member.binary_name()));
    }
    let same_package = origin.package == member.package_name();
    if access & ACC_PROTECTED != 0 {
        return same_package
            || origin
                .class
                .as_ref()
                .is_some_and(|cls| is_subtype(env, cls, enclosing));
    }
    same_package
}

pub(crate) fn is_subtype(
    env: &dyn Env<dyn HeaderView>,
    sub: &ClassSymbol,
    superclass: &ClassSymbol,
) -> bool {
    let mut queue = VecDeque::from([sub.clone()]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if &current == superclass {
            return true;
        }
        if !seen.insert(current.clone()) {
            continue;
        }
        let Some(view) = env.get(&current) else {
            continue;
        };
        if let Some(s) = view.superclass() {
            queue.push_back(s.clone());
        }
        queue.extend(view.interfaces().iter().cloned());
    }
    false
}

fn top_level(binary_name: &str) -> &str {
    match binary_name.find('$') {
        Some(idx) => &binary_name[..idx],
        None => binary_name,
    }
}

/// The [`Resolver`] capability handed to import scopes.
pub(crate) struct MemberResolver {
    pub env: Rc<dyn Env<dyn HeaderView>>,
    pub origin: Origin,
}

impl Resolver for MemberResolver {
    fn resolve_one(&self, sym: &ClassSymbol, name: &Ident) -> Option<ClassSymbol> {
        resolve_member(self.env.as_ref(), &self.origin, sym, name.as_str())
    }
}
