#![forbid(unsafe_code)]

//! The binder: a pipeline of phases that turns parsed compilation units plus
//! a classpath into fully resolved, signature-typed bound classes.
//!
//! Phases run strictly in order — parse, index, hierarchy, canonical
//! imports, types, canonicalization, constants and annotations, modules —
//! and each later phase may assume the earlier ones completed for every
//! symbol it consults. Diagnostics accumulate per phase; the first phase
//! that ends with any raises a single composite [`BindError`] and the rest
//! never run.

mod annobind;
mod binder;
mod canonical;
mod constbind;
mod consteval;
mod diag;
mod env;
mod hierarchy;
mod import;
mod lookup;
mod modules;
mod preprocess;
mod resolve;
mod tli;
mod typebind;

pub use crate::annobind::{element_values_with_defaults, inherited_annotations};
pub use crate::binder::{bind, BindOptions, BoundUnits, SourceFile};
pub use crate::canonical::{as_member_of, as_super};
pub use crate::diag::{BindError, Diagnostic, ErrorKind};
pub use crate::env::{CompoundEnv, Env, SimpleEnv};
pub use crate::lookup::{LookupKey, LookupResult, Resolver, Scope};
pub use crate::tli::TopLevelIndex;
