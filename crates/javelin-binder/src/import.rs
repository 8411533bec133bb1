//! Import scopes.
//!
//! Single-type imports resolve lazily through memoized cells; wildcard
//! imports are probed in source order, stopping at the first hit. Both take
//! the member resolver as a lookup-time parameter so they can be declared
//! before the hierarchy phase and used after it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use javelin_core::Name;
use javelin_syntax::{Ident, ImportDecl};
use javelin_types::ClassSymbol;

use crate::lookup::{
    BoundImportScope, CompoundScope, ImportScope, LookupKey, LookupResult, Resolver, Scope,
};
use crate::preprocess::PreUnit;
use crate::tli::TopLevelIndex;

/// The per-provider tries, probed sources first so sources shadow the
/// bootclasspath, which shadows the classpath.
pub(crate) struct Tlis {
    pub sources: Rc<TopLevelIndex>,
    pub boot: Rc<TopLevelIndex>,
    pub classpath: Rc<TopLevelIndex>,
}

impl Tlis {
    pub(crate) fn scope(&self) -> Rc<dyn Scope> {
        Rc::new(CompoundScope::of(vec![
            self.sources.clone().scope(),
            self.boot.clone().scope(),
            self.classpath.clone().scope(),
        ]))
    }

    /// The compound scope over `package` in every provider that knows it.
    pub(crate) fn package_scope(&self, package: &str) -> Option<Rc<dyn Scope>> {
        let segments: Vec<&str> = if package.is_empty() {
            Vec::new()
        } else {
            package.split('/').collect()
        };
        let mut scopes: Vec<Rc<dyn Scope>> = Vec::new();
        for tli in [&self.sources, &self.boot, &self.classpath] {
            if let Some(scope) = tli.clone().lookup_package(&segments) {
                scopes.push(Rc::new(scope));
            }
        }
        if scopes.is_empty() {
            None
        } else {
            Some(Rc::new(CompoundScope::of(scopes)))
        }
    }
}

/// Single-type imports (`import a.b.C;`, `import static a.B.C;`), keyed by
/// simple name.
pub(crate) struct ImportIndex {
    base: Rc<dyn Scope>,
    by_simple: HashMap<Name, Rc<SingleImport>>,
}

struct SingleImport {
    idents: Vec<Ident>,
    cell: RefCell<Option<Option<ClassSymbol>>>,
}

impl SingleImport {
    fn resolve(&self, base: &dyn Scope, resolver: &dyn Resolver) -> Option<ClassSymbol> {
        if let Some(memo) = self.cell.borrow().as_ref() {
            return memo.clone();
        }
        let resolved = (|| {
            let hit = base.lookup(&LookupKey::new(self.idents.clone()))?;
            let mut sym = hit.sym;
            for ident in &hit.remaining {
                sym = resolver.resolve_one(&sym, ident)?;
            }
            Some(sym)
        })();
        *self.cell.borrow_mut() = Some(resolved.clone());
        resolved
    }
}

impl ImportIndex {
    pub(crate) fn new(base: Rc<dyn Scope>, imports: &[ImportDecl]) -> ImportIndex {
        let mut by_simple = HashMap::new();
        for import in imports {
            if import.wildcard {
                continue;
            }
            let simple = import.name.last().expect("imports are non-empty");
            by_simple
                .entry(simple.name.clone())
                .or_insert_with(|| {
                    Rc::new(SingleImport {
                        idents: import.name.clone(),
                        cell: RefCell::new(None),
                    })
                });
        }
        ImportIndex { base, by_simple }
    }
}

impl ImportScope for ImportIndex {
    fn lookup(&self, key: &LookupKey, resolver: &dyn Resolver) -> Option<LookupResult> {
        let import = self.by_simple.get(&key.first().name)?;
        let sym = import.resolve(self.base.as_ref(), resolver)?;
        Some(LookupResult {
            sym,
            remaining: key.rest(),
        })
    }
}

/// Wildcard imports of packages and of type members, probed in source
/// order.
pub(crate) struct WildImportIndex {
    base: Rc<dyn Scope>,
    imports: Vec<WildImport>,
}

struct WildImport {
    idents: Vec<Ident>,
    package_scope: Option<Rc<dyn Scope>>,
    class_cell: RefCell<Option<Option<ClassSymbol>>>,
}

impl WildImportIndex {
    pub(crate) fn new(tlis: &Tlis, base: Rc<dyn Scope>, imports: &[ImportDecl]) -> WildImportIndex {
        let wilds = imports
            .iter()
            .filter(|import| import.wildcard)
            .map(|import| {
                let package = import
                    .name
                    .iter()
                    .map(Ident::as_str)
                    .collect::<Vec<_>>()
                    .join("/");
                WildImport {
                    idents: import.name.clone(),
                    package_scope: tlis.package_scope(&package),
                    class_cell: RefCell::new(None),
                }
            })
            .collect();
        WildImportIndex {
            base,
            imports: wilds,
        }
    }
}

impl WildImport {
    fn class_target(&self, base: &dyn Scope, resolver: &dyn Resolver) -> Option<ClassSymbol> {
        if let Some(memo) = self.class_cell.borrow().as_ref() {
            return memo.clone();
        }
        let resolved = (|| {
            let hit = base.lookup(&LookupKey::new(self.idents.clone()))?;
            let mut sym = hit.sym;
            for ident in &hit.remaining {
                sym = resolver.resolve_one(&sym, ident)?;
            }
            Some(sym)
        })();
        *self.class_cell.borrow_mut() = Some(resolved.clone());
        resolved
    }
}

impl ImportScope for WildImportIndex {
    fn lookup(&self, key: &LookupKey, resolver: &dyn Resolver) -> Option<LookupResult> {
        for import in &self.imports {
            if let Some(package) = &import.package_scope {
                if let Some(hit) = package.lookup(key) {
                    return Some(hit);
                }
                continue;
            }
            if let Some(class) = import.class_target(self.base.as_ref(), resolver) {
                if let Some(sym) = resolver.resolve_one(&class, key.first()) {
                    return Some(LookupResult {
                        sym,
                        remaining: key.rest(),
                    });
                }
            }
        }
        None
    }
}

/// Static member imports (constants), keyed by simple name.
pub(crate) struct MemberImportIndex {
    base: Rc<dyn Scope>,
    singles: Vec<MemberImport>,
    on_demand: Vec<Rc<SingleImport>>,
}

struct MemberImport {
    qualifier: Rc<SingleImport>,
    member: Name,
}

impl MemberImportIndex {
    pub(crate) fn new(base: Rc<dyn Scope>, imports: &[ImportDecl]) -> MemberImportIndex {
        let mut singles = Vec::new();
        let mut on_demand = Vec::new();
        for import in imports {
            if !import.is_static {
                continue;
            }
            if import.wildcard {
                on_demand.push(Rc::new(SingleImport {
                    idents: import.name.clone(),
                    cell: RefCell::new(None),
                }));
            } else if import.name.len() > 1 {
                let qualifier = import.name[..import.name.len() - 1].to_vec();
                singles.push(MemberImport {
                    qualifier: Rc::new(SingleImport {
                        idents: qualifier,
                        cell: RefCell::new(None),
                    }),
                    member: import.name.last().expect("non-empty").name.clone(),
                });
            }
        }
        MemberImportIndex {
            base,
            singles,
            on_demand,
        }
    }

    /// The `(class, member)` pair a single static import binds `name` to.
    pub(crate) fn lookup_single(
        &self,
        name: &str,
        resolver: &dyn Resolver,
    ) -> Option<(ClassSymbol, Name)> {
        self.singles
            .iter()
            .filter(|import| import.member.as_str() == name)
            .find_map(|import| {
                import
                    .qualifier
                    .resolve(self.base.as_ref(), resolver)
                    .map(|sym| (sym, import.member.clone()))
            })
    }

    /// The classes named by on-demand static imports, in source order.
    pub(crate) fn on_demand_classes(&self, resolver: &dyn Resolver) -> Vec<ClassSymbol> {
        self.on_demand
            .iter()
            .filter_map(|import| import.resolve(self.base.as_ref(), resolver))
            .collect()
    }
}

/// The name-lookup surfaces of one compilation unit.
pub(crate) struct UnitScopes {
    pub package: String,
    pub single: Rc<ImportIndex>,
    pub wild: Rc<WildImportIndex>,
    pub members: Rc<MemberImportIndex>,
    pub package_scope: Option<Rc<dyn Scope>>,
    /// The implicit `java.lang` on-demand import.
    pub java_lang: Option<Rc<dyn Scope>>,
    pub tli_scope: Rc<dyn Scope>,
}

impl UnitScopes {
    pub(crate) fn new(tlis: &Tlis, unit: &PreUnit) -> UnitScopes {
        let tli_scope = tlis.scope();
        UnitScopes {
            package: unit.package.clone(),
            single: Rc::new(ImportIndex::new(tli_scope.clone(), &unit.imports)),
            wild: Rc::new(WildImportIndex::new(tlis, tli_scope.clone(), &unit.imports)),
            members: Rc::new(MemberImportIndex::new(tli_scope.clone(), &unit.imports)),
            package_scope: tlis.package_scope(&unit.package),
            java_lang: tlis.package_scope("java/lang"),
            tli_scope,
        }
    }

    /// The unit's compound scope, innermost first: single-type imports,
    /// wildcard imports, the unit's package, the implicit `java.lang`
    /// import, the top-level index.
    pub(crate) fn scope(&self, resolver: Rc<dyn Resolver>) -> CompoundScope {
        let mut scopes: Vec<Rc<dyn Scope>> = vec![
            Rc::new(BoundImportScope {
                imports: self.single.clone(),
                resolver: resolver.clone(),
            }),
            Rc::new(BoundImportScope {
                imports: self.wild.clone(),
                resolver,
            }),
        ];
        if let Some(package) = &self.package_scope {
            scopes.push(package.clone());
        }
        if let Some(java_lang) = &self.java_lang {
            scopes.push(java_lang.clone());
        }
        scopes.push(self.tli_scope.clone());
        CompoundScope::of(scopes)
    }
}
