//! The hierarchy phase.
//!
//! Produces a header stub per source class: kind, owner, children, declared
//! type-parameter symbols, and the raw superclass/interface symbols.
//! Resolution is demand-driven with memoization; a class being completed
//! presents a partial view (declared children, no supers) to re-entrant
//! lookups, and cycles are diagnosed afterwards by a DFS over the collected
//! raw supers.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use javelin_core::Name;
use javelin_syntax::ClassTyTree;
use javelin_types::{
    ClassKind, ClassSymbol, HeaderView, TyVarSymbol, JAVA_LANG_ANNOTATION_ANNOTATION,
    JAVA_LANG_ENUM, JAVA_LANG_OBJECT,
};
use text_size::TextSize;
use tracing::debug;

use crate::diag::{DiagSink, ErrorKind};
use crate::env::Env;
use crate::import::UnitScopes;
use crate::lookup::{LookupKey, Scope};
use crate::preprocess::SourceClass;
use crate::resolve::{resolve_member, MemberResolver, Origin};

const JAVA_LANG_RECORD: &str = "java/lang/Record";

/// A source class after the hierarchy phase.
#[derive(Clone)]
pub(crate) struct SourceHeaderClass {
    pub base: Rc<SourceClass>,
    pub typaram_syms: Vec<TyVarSymbol>,
    pub superclass: Option<ClassSymbol>,
    /// True when the superclass is the error sentinel (unresolved or
    /// cyclic).
    pub superclass_err: bool,
    pub interfaces: Vec<ClassSymbol>,
    pub permits: Vec<ClassSymbol>,
    /// Every resolved super edge with the position of its type tree, for
    /// cycle reporting.
    pub super_edges: Vec<(ClassSymbol, TextSize)>,
}

impl HeaderView for SourceHeaderClass {
    fn sym(&self) -> &ClassSymbol {
        &self.base.sym
    }

    fn kind(&self) -> ClassKind {
        self.base.kind
    }

    fn access(&self) -> u32 {
        self.base.access
    }

    fn owner(&self) -> Option<&ClassSymbol> {
        self.base.owner.as_ref()
    }

    fn children(&self) -> &BTreeMap<Name, ClassSymbol> {
        &self.base.children
    }

    fn superclass(&self) -> Option<&ClassSymbol> {
        self.superclass.as_ref()
    }

    fn interfaces(&self) -> &[ClassSymbol] {
        &self.interfaces
    }
}

/// The partial view a class presents while its own supers are being
/// resolved: declared children only.
struct PartialHeader {
    base: Rc<SourceClass>,
}

impl HeaderView for PartialHeader {
    fn sym(&self) -> &ClassSymbol {
        &self.base.sym
    }

    fn kind(&self) -> ClassKind {
        self.base.kind
    }

    fn access(&self) -> u32 {
        self.base.access
    }

    fn owner(&self) -> Option<&ClassSymbol> {
        self.base.owner.as_ref()
    }

    fn children(&self) -> &BTreeMap<Name, ClassSymbol> {
        &self.base.children
    }

    fn superclass(&self) -> Option<&ClassSymbol> {
        None
    }

    fn interfaces(&self) -> &[ClassSymbol] {
        &[]
    }
}

pub(crate) struct HierarchyBinder {
    classes: Vec<Rc<SourceClass>>,
    by_sym: HashMap<ClassSymbol, Rc<SourceClass>>,
    unit_scopes: Vec<Rc<UnitScopes>>,
    classpath_env: Rc<dyn Env<dyn HeaderView>>,
    done: RefCell<HashMap<ClassSymbol, Rc<SourceHeaderClass>>>,
    in_progress: RefCell<HashSet<ClassSymbol>>,
    diags: DiagSink,
}

/// The header environment the hierarchy phase itself resolves against:
/// completed source headers, partial views for classes mid-completion, and
/// the classpath behind both.
pub(crate) struct HierarchyEnv(pub(crate) Rc<HierarchyBinder>);

impl Env<dyn HeaderView> for HierarchyEnv {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<dyn HeaderView>> {
        let binder = &self.0;
        if let Some(source) = binder.by_sym.get(sym) {
            if let Some(done) = binder.done.borrow().get(sym) {
                return Some(done.clone() as Rc<dyn HeaderView>);
            }
            if binder.in_progress.borrow().contains(sym) {
                return Some(Rc::new(PartialHeader {
                    base: source.clone(),
                }) as Rc<dyn HeaderView>);
            }
            // Demand-driven completion keeps declaration order irrelevant
            // for correctness; `bind_all` fixes the reporting order.
            return binder
                .clone()
                .complete(sym)
                .map(|done| done as Rc<dyn HeaderView>);
        }
        binder.classpath_env.get(sym)
    }
}

impl HierarchyBinder {
    pub(crate) fn new(
        classes: Vec<Rc<SourceClass>>,
        unit_scopes: Vec<Rc<UnitScopes>>,
        classpath_env: Rc<dyn Env<dyn HeaderView>>,
        diags: DiagSink,
    ) -> Rc<HierarchyBinder> {
        let by_sym = classes
            .iter()
            .map(|sc| (sc.sym.clone(), sc.clone()))
            .collect();
        Rc::new(HierarchyBinder {
            classes,
            by_sym,
            unit_scopes,
            classpath_env,
            done: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(HashSet::new()),
            diags,
        })
    }

    /// Completes every source class in declaration order, then runs cycle
    /// detection.
    pub(crate) fn bind_all(self: Rc<Self>) -> Vec<(ClassSymbol, Rc<SourceHeaderClass>)> {
        for sc in &self.classes {
            self.clone().complete(&sc.sym);
        }
        let mut headers: Vec<(ClassSymbol, Rc<SourceHeaderClass>)> = self
            .classes
            .iter()
            .filter_map(|sc| {
                self.done
                    .borrow()
                    .get(&sc.sym)
                    .map(|h| (sc.sym.clone(), h.clone()))
            })
            .collect();
        self.detect_cycles(&mut headers);
        headers
    }

    fn complete(self: Rc<Self>, sym: &ClassSymbol) -> Option<Rc<SourceHeaderClass>> {
        if let Some(done) = self.done.borrow().get(sym) {
            return Some(done.clone());
        }
        let source = self.by_sym.get(sym)?.clone();
        self.in_progress.borrow_mut().insert(sym.clone());

        let typaram_syms = source
            .decl
            .typarams
            .iter()
            .map(|tp| TyVarSymbol::class_owned(sym.clone(), tp.name.as_str()))
            .collect();

        let mut super_edges = Vec::new();
        let mut superclass_err = false;

        let superclass = match (&source.decl.extends, source.kind) {
            (Some(tree), _) => match self.clone().resolve_supertype(&source, tree) {
                Some(resolved) => {
                    super_edges.push((resolved.clone(), tree.pos));
                    Some(resolved)
                }
                None => {
                    superclass_err = true;
                    None
                }
            },
            (None, ClassKind::Enum) => Some(ClassSymbol::new(JAVA_LANG_ENUM)),
            (None, ClassKind::Record) => Some(ClassSymbol::new(JAVA_LANG_RECORD)),
            (None, _) if sym.binary_name() == JAVA_LANG_OBJECT => None,
            (None, _) => Some(ClassSymbol::new(JAVA_LANG_OBJECT)),
        };

        let mut interfaces = Vec::new();
        for tree in &source.decl.implements {
            if let Some(resolved) = self.clone().resolve_supertype(&source, tree) {
                super_edges.push((resolved.clone(), tree.pos));
                interfaces.push(resolved);
            }
        }
        if source.kind == ClassKind::Annotation {
            interfaces.push(ClassSymbol::new(JAVA_LANG_ANNOTATION_ANNOTATION));
        }

        let mut permits = Vec::new();
        for tree in &source.decl.permits {
            if let Some(resolved) = self.clone().resolve_supertype(&source, tree) {
                permits.push(resolved);
            }
        }

        let header = Rc::new(SourceHeaderClass {
            base: source,
            typaram_syms,
            superclass,
            superclass_err,
            interfaces,
            permits,
            super_edges,
        });
        self.in_progress.borrow_mut().remove(sym);
        self.done.borrow_mut().insert(sym.clone(), header.clone());
        debug!(class = sym.binary_name(), "bound header");
        Some(header)
    }

    /// Resolves a name in supertype position: type parameters are rejected,
    /// then lexically enclosing members, then the unit scope, then a member
    /// walk over any unconsumed suffix.
    fn resolve_supertype(
        self: Rc<Self>,
        source: &Rc<SourceClass>,
        tree: &ClassTyTree,
    ) -> Option<ClassSymbol> {
        let idents = tree.idents();
        let first = &idents[0];
        let origin = Origin {
            package: self.unit_scopes[source.unit].package.clone(),
            class: Some(source.sym.clone()),
        };

        // Type parameters of the class and its lexical enclosers.
        let mut lexical = Some(source.clone());
        while let Some(encl) = lexical {
            if encl
                .decl
                .typarams
                .iter()
                .any(|tp| tp.name.name == first.name)
            {
                if idents.len() > 1 {
                    self.diags.error(
                        source.file,
                        first.pos,
                        ErrorKind::TypeParameterQualifier,
                        format!("type parameter {} used as type qualifier", first.as_str()),
                    );
                } else {
                    self.diags.error(
                        source.file,
                        first.pos,
                        ErrorKind::UnexpectedType,
                        format!("unexpected type parameter {}", first.as_str()),
                    );
                }
                return None;
            }
            lexical = encl.owner.as_ref().and_then(|o| self.by_sym.get(o)).cloned();
        }

        // Members of the class and its lexical enclosers, inherited
        // included.
        let env = HierarchyEnv(self.clone());
        let mut start = None;
        let mut lexical = Some(source.clone());
        while let Some(encl) = lexical {
            if let Some(hit) = resolve_member(&env, &origin, &encl.sym, first.as_str()) {
                start = Some((hit, 1));
                break;
            }
            lexical = encl.owner.as_ref().and_then(|o| self.by_sym.get(o)).cloned();
        }

        // The compilation unit's scope: imports, package, top-level index.
        let (mut sym, consumed) = match start {
            Some((sym, consumed)) => (sym, consumed),
            None => {
                let resolver = Rc::new(MemberResolver {
                    env: Rc::new(HierarchyEnv(self.clone())) as Rc<dyn Env<dyn HeaderView>>,
                    origin: origin.clone(),
                });
                let scope = self.unit_scopes[source.unit].scope(resolver);
                match scope.lookup(&LookupKey::new(idents.clone())) {
                    Some(hit) => {
                        let consumed = idents.len() - hit.remaining.len();
                        (hit.sym, consumed)
                    }
                    None => {
                        self.diags.error(
                            source.file,
                            first.pos,
                            ErrorKind::CannotResolve,
                            format!("could not resolve {}", first.as_str()),
                        );
                        return None;
                    }
                }
            }
        };

        for (idx, ident) in idents.iter().enumerate().skip(consumed) {
            match resolve_member(&env, &origin, &sym, ident.as_str()) {
                Some(next) => sym = next,
                None => {
                    let path = idents[..=idx]
                        .iter()
                        .map(|i| i.as_str())
                        .collect::<Vec<_>>()
                        .join(".");
                    self.diags.error(
                        source.file,
                        ident.pos,
                        ErrorKind::SymbolNotFound,
                        format!("symbol not found {path}"),
                    );
                    return None;
                }
            }
        }
        Some(sym)
    }

    /// DFS over the supertype graph with a visiting set; the first back edge
    /// of each cycle is reported, and every source class on the cycle keeps
    /// the error sentinel as its superclass.
    fn detect_cycles(&self, headers: &mut Vec<(ClassSymbol, Rc<SourceHeaderClass>)>) {
        #[derive(PartialEq)]
        enum Color {
            Visiting,
            Done,
        }

        let mut colors: HashMap<ClassSymbol, Color> = HashMap::new();
        let mut cyclic: HashSet<ClassSymbol> = HashSet::new();

        // An explicit stack of (symbol, next-edge-index) frames.
        for (root, _) in headers.iter() {
            if colors.contains_key(root) {
                continue;
            }
            let mut stack: Vec<(ClassSymbol, usize)> = vec![(root.clone(), 0)];
            colors.insert(root.clone(), Color::Visiting);
            while let Some((sym, edge)) = stack.last().cloned() {
                let edges = self.super_edges_of(&sym);
                if edge >= edges.len() {
                    colors.insert(sym.clone(), Color::Done);
                    stack.pop();
                    continue;
                }
                stack.last_mut().expect("frame").1 += 1;
                let (target, pos) = edges[edge].clone();
                match colors.get(&target) {
                    Some(Color::Visiting) => {
                        // Back edge: the cycle is the stack suffix from the
                        // target onward, closed by this edge.
                        let cycle_start = stack
                            .iter()
                            .position(|(s, _)| s == &target)
                            .unwrap_or(0);
                        let mut path: Vec<String> = stack[cycle_start..]
                            .iter()
                            .map(|(s, _)| s.dotted())
                            .collect();
                        path.push(target.dotted());
                        for (member, _) in &stack[cycle_start..] {
                            cyclic.insert(member.clone());
                        }
                        if let Some(source) = self.by_sym.get(&sym) {
                            self.diags.error(
                                source.file,
                                pos,
                                ErrorKind::CycleInClassHierarchy,
                                format!("cycle in class hierarchy: {}", path.join(" -> ")),
                            );
                        }
                    }
                    Some(Color::Done) => {}
                    None => {
                        colors.insert(target.clone(), Color::Visiting);
                        stack.push((target, 0));
                    }
                }
            }
        }

        if cyclic.is_empty() {
            return;
        }
        for (sym, header) in headers.iter_mut() {
            if cyclic.contains(sym) {
                let mut fixed = (**header).clone();
                fixed.superclass = None;
                fixed.superclass_err = true;
                fixed.interfaces.retain(|i| !cyclic.contains(i));
                *header = Rc::new(fixed);
                self.done.borrow_mut().insert(sym.clone(), header.clone());
            }
        }
    }

    /// Outgoing super edges for the DFS: source classes use their recorded
    /// edges (with positions); classpath classes use their frozen supers.
    fn super_edges_of(&self, sym: &ClassSymbol) -> Vec<(ClassSymbol, TextSize)> {
        if let Some(header) = self.done.borrow().get(sym) {
            return header.super_edges.clone();
        }
        match self.classpath_env.get(sym) {
            Some(view) => {
                let mut edges = Vec::new();
                if let Some(superclass) = view.superclass() {
                    edges.push((superclass.clone(), TextSize::from(0)));
                }
                for iface in view.interfaces() {
                    edges.push((iface.clone(), TextSize::from(0)));
                }
                edges
            }
            None => Vec::new(),
        }
    }
}

impl Env<dyn HeaderView> for crate::env::SimpleEnv<SourceHeaderClass> {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<dyn HeaderView>> {
        Env::<SourceHeaderClass>::get(self, sym).map(|rc| rc as Rc<dyn HeaderView>)
    }
}
