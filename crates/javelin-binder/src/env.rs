//! Environments: per-phase views keyed by class symbol.
//!
//! An environment answers "given a symbol, give me this phase's view of
//! it". Compound environments chain providers with sources first, then the
//! bootclasspath, then the classpath, which realizes the required priority
//! ordering.

use std::collections::HashMap;
use std::rc::Rc;

use javelin_classpath::Classpath;
use javelin_types::{BoundClass, ClassSymbol, HeaderView, TypeView};

pub trait Env<V: ?Sized> {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<V>>;
}

/// A plain map environment.
pub struct SimpleEnv<V: ?Sized> {
    map: HashMap<ClassSymbol, Rc<V>>,
}

impl<V: ?Sized> Default for SimpleEnv<V> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<V: ?Sized> SimpleEnv<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sym: ClassSymbol, value: Rc<V>) {
        self.map.insert(sym, value);
    }

    pub fn values(&self) -> impl Iterator<Item = (&ClassSymbol, &Rc<V>)> {
        self.map.iter()
    }
}

impl<V: ?Sized> Env<V> for SimpleEnv<V> {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<V>> {
        self.map.get(sym).cloned()
    }
}

/// A chain of environments; the first hit wins.
pub struct CompoundEnv<V: ?Sized> {
    envs: Vec<Rc<dyn Env<V>>>,
}

impl<V: ?Sized> CompoundEnv<V> {
    pub fn of(envs: Vec<Rc<dyn Env<V>>>) -> Self {
        Self { envs }
    }
}

impl<V: ?Sized> Env<V> for CompoundEnv<V> {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<V>> {
        self.envs.iter().find_map(|env| env.get(sym))
    }
}

/// The classpath as an environment; classes materialize lazily behind the
/// classpath's memoizing cells.
pub struct ClasspathEnv {
    pub classpath: Rc<Classpath>,
}

impl Env<BoundClass> for ClasspathEnv {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<BoundClass>> {
        self.classpath.lookup(sym)
    }
}

impl Env<dyn HeaderView> for ClasspathEnv {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<dyn HeaderView>> {
        self.classpath
            .lookup(sym)
            .map(|rc| rc as Rc<dyn HeaderView>)
    }
}

impl Env<dyn TypeView> for ClasspathEnv {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<dyn TypeView>> {
        self.classpath.lookup(sym).map(|rc| rc as Rc<dyn TypeView>)
    }
}

impl Env<dyn HeaderView> for SimpleEnv<BoundClass> {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<dyn HeaderView>> {
        Env::<BoundClass>::get(self, sym).map(|rc| rc as Rc<dyn HeaderView>)
    }
}

impl Env<dyn TypeView> for SimpleEnv<BoundClass> {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<dyn TypeView>> {
        Env::<BoundClass>::get(self, sym).map(|rc| rc as Rc<dyn TypeView>)
    }
}
