//! The top-level index: a trie over slash-delimited package segments and
//! simple class names.

use std::collections::HashMap;
use std::rc::Rc;

use javelin_core::Name;
use javelin_types::ClassSymbol;

use crate::lookup::{LookupKey, LookupResult, Scope};

#[derive(Default)]
struct Node {
    children: HashMap<Name, usize>,
    sym: Option<ClassSymbol>,
}

/// One provider's trie. Sources, bootclasspath, and classpath each own one;
/// cross-provider priority comes from compound-scope ordering.
pub struct TopLevelIndex {
    nodes: Vec<Node>,
}

impl Default for TopLevelIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TopLevelIndex {
    pub fn new() -> TopLevelIndex {
        TopLevelIndex {
            nodes: vec![Node::default()],
        }
    }

    /// Inserts a binary class name, splitting on `/`. Returns `false` when
    /// the node is already occupied: the first insertion wins.
    pub fn insert(&mut self, binary_name: &str) -> bool {
        let mut node = 0usize;
        for segment in binary_name.split('/') {
            let next = match self.nodes[node].children.get(segment) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node]
                        .children
                        .insert(Name::new(segment), next);
                    next
                }
            };
            node = next;
        }
        if self.nodes[node].sym.is_some() {
            return false;
        }
        self.nodes[node].sym = Some(ClassSymbol::new(binary_name));
        true
    }

    /// A scope resolving lookup keys against this trie.
    pub fn scope(self: Rc<Self>) -> Rc<dyn Scope> {
        Rc::new(TliScope { tli: self })
    }

    /// The package named by `segments`, when this trie knows it.
    pub fn lookup_package(self: Rc<Self>, segments: &[&str]) -> Option<PackageScope> {
        let mut node = 0usize;
        for segment in segments {
            node = *self.nodes[node].children.get(*segment)?;
        }
        Some(PackageScope { tli: self, node })
    }
}

struct TliScope {
    tli: Rc<TopLevelIndex>,
}

impl Scope for TliScope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult> {
        let mut node = 0usize;
        for (idx, ident) in key.idents().iter().enumerate() {
            node = *self.tli.nodes[node].children.get(&ident.name)?;
            if let Some(sym) = &self.tli.nodes[node].sym {
                return Some(LookupResult {
                    sym: sym.clone(),
                    remaining: key.idents()[idx + 1..].to_vec(),
                });
            }
        }
        None
    }
}

/// Lists and resolves the classes declared directly in one package.
pub struct PackageScope {
    tli: Rc<TopLevelIndex>,
    node: usize,
}

impl PackageScope {
    pub fn classes(&self) -> impl Iterator<Item = &ClassSymbol> {
        self.tli.nodes[self.node]
            .children
            .values()
            .filter_map(|&child| self.tli.nodes[child].sym.as_ref())
    }
}

impl Scope for PackageScope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult> {
        let child = *self.tli.nodes[self.node]
            .children
            .get(&key.first().name)?;
        let sym = self.tli.nodes[child].sym.as_ref()?;
        Some(LookupResult {
            sym: sym.clone(),
            remaining: key.rest(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_syntax::Ident;
    use text_size::TextSize;

    fn key(parts: &[&str]) -> LookupKey {
        LookupKey::new(
            parts
                .iter()
                .map(|p| Ident {
                    pos: TextSize::from(0),
                    name: Name::new(*p),
                })
                .collect(),
        )
    }

    #[test]
    fn first_insert_wins() {
        let mut tli = TopLevelIndex::new();
        assert!(tli.insert("a/b/C"));
        assert!(!tli.insert("a/b/C"));
        assert!(tli.insert("a/b/D"));
    }

    #[test]
    fn scope_returns_remainder() {
        let mut tli = TopLevelIndex::new();
        tli.insert("a/b/C");
        let tli = Rc::new(tli);
        let scope = tli.clone().scope();

        let hit = scope.lookup(&key(&["a", "b", "C", "Inner"])).unwrap();
        assert_eq!(hit.sym, ClassSymbol::new("a/b/C"));
        assert_eq!(hit.remaining.len(), 1);
        assert_eq!(hit.remaining[0].as_str(), "Inner");

        assert!(scope.lookup(&key(&["a", "b"])).is_none());
        assert!(scope.lookup(&key(&["a", "x", "C"])).is_none());
    }

    #[test]
    fn package_scope_agrees_with_trie_scope() {
        let mut tli = TopLevelIndex::new();
        tli.insert("a/b/C");
        let tli = Rc::new(tli);

        let via_scope = tli.clone().scope().lookup(&key(&["a", "b", "C"])).unwrap().sym;
        let pkg = tli.clone().lookup_package(&["a", "b"]).unwrap();
        let via_package = pkg.lookup(&key(&["C"])).unwrap().sym;
        assert_eq!(via_scope, via_package);
    }

    #[test]
    fn nested_binary_names_are_single_segments() {
        let mut tli = TopLevelIndex::new();
        tli.insert("a/Outer$Inner");
        let tli = Rc::new(tli);
        let hit = tli.clone().scope().lookup(&key(&["a", "Outer$Inner"])).unwrap();
        assert_eq!(hit.sym, ClassSymbol::new("a/Outer$Inner"));
        assert!(tli.clone().scope().lookup(&key(&["a", "Outer", "Inner"])).is_none());
    }
}
