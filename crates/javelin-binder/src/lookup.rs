//! Name-lookup primitives.
//!
//! A lookup key is a non-empty sequence of identifiers; a scope resolves a
//! key prefix to a class symbol and hands back the unconsumed suffix so the
//! caller can keep walking member types structurally.

use std::rc::Rc;

use javelin_syntax::Ident;
use javelin_types::ClassSymbol;

#[derive(Debug, Clone, PartialEq)]
pub struct LookupKey {
    idents: Vec<Ident>,
}

impl LookupKey {
    pub fn new(idents: Vec<Ident>) -> LookupKey {
        assert!(!idents.is_empty(), "lookup keys are non-empty");
        LookupKey { idents }
    }

    pub fn first(&self) -> &Ident {
        &self.idents[0]
    }

    pub fn rest(&self) -> Vec<Ident> {
        self.idents[1..].to_vec()
    }

    pub fn idents(&self) -> &[Ident] {
        &self.idents
    }

    pub fn len(&self) -> usize {
        self.idents.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub sym: ClassSymbol,
    /// Identifiers the scope did not consume; empty for a full match.
    pub remaining: Vec<Ident>,
}

pub trait Scope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult>;
}

/// The member-resolution capability import scopes receive at lookup time.
///
/// Imports are declared before the hierarchy exists but only used after it;
/// deferring the resolver breaks that cycle.
pub trait Resolver {
    /// The nested class of `sym` named `name`, found on `sym` or inherited,
    /// respecting visibility from the resolver's origin.
    fn resolve_one(&self, sym: &ClassSymbol, name: &Ident) -> Option<ClassSymbol>;
}

/// A scope that needs a resolver at lookup time.
pub trait ImportScope {
    fn lookup(&self, key: &LookupKey, resolver: &dyn Resolver) -> Option<LookupResult>;
}

/// Binds an [`ImportScope`] to a resolver, yielding a plain [`Scope`].
pub struct BoundImportScope {
    pub imports: Rc<dyn ImportScope>,
    pub resolver: Rc<dyn Resolver>,
}

impl Scope for BoundImportScope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult> {
        self.imports.lookup(key, self.resolver.as_ref())
    }
}

/// A chain of scopes probed in order; the first hit wins, so earlier scopes
/// shadow later ones.
#[derive(Clone, Default)]
pub struct CompoundScope {
    scopes: Vec<Rc<dyn Scope>>,
}

impl CompoundScope {
    pub fn of(scopes: Vec<Rc<dyn Scope>>) -> CompoundScope {
        CompoundScope { scopes }
    }

    /// A new compound scope with `inner` probed before everything already
    /// present.
    pub fn shadowed_by(&self, inner: Rc<dyn Scope>) -> CompoundScope {
        let mut scopes = Vec::with_capacity(self.scopes.len() + 1);
        scopes.push(inner);
        scopes.extend(self.scopes.iter().cloned());
        CompoundScope { scopes }
    }
}

impl Scope for CompoundScope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult> {
        self.scopes.iter().find_map(|scope| scope.lookup(key))
    }
}
