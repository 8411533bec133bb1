#![forbid(unsafe_code)]

//! JPMS module shapes shared between the class-file parser (reading
//! `module-info.class`) and the binder (binding `module-info.java`).

use std::fmt;

use thiserror::Error;

/// A dotted module name, e.g. `java.base`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModuleName").field(&self.0).finish()
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleKind {
    /// Declared by a `module-info`.
    Explicit,
    /// Name derived from the archive file name.
    Automatic,
}

/// A bound module descriptor.
///
/// Service and package names use dots; this is the declaration-level view,
/// not the class-file encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleInfo {
    pub kind: ModuleKind,
    pub name: ModuleName,
    pub is_open: bool,
    pub version: Option<String>,
    pub requires: Vec<Requires>,
    pub exports: Vec<Exports>,
    pub opens: Vec<Opens>,
    pub uses: Vec<Uses>,
    pub provides: Vec<Provides>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requires {
    pub module: ModuleName,
    pub is_transitive: bool,
    pub is_static: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exports {
    pub package: String,
    /// Qualified export targets; empty means unqualified.
    pub to: Vec<ModuleName>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opens {
    pub package: String,
    pub to: Vec<ModuleName>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Uses {
    pub service: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provides {
    pub service: String,
    pub implementations: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("invalid module name: {0}")]
    InvalidName(String),
    #[error("duplicate module declaration: {0}")]
    Duplicate(ModuleName),
}

/// Validates a dotted module name: non-empty dot-separated segments.
pub fn parse_module_name(text: &str) -> Result<ModuleName, ModuleError> {
    if text.is_empty() || text.split('.').any(|seg| seg.is_empty()) {
        return Err(ModuleError::InvalidName(text.to_string()));
    }
    Ok(ModuleName::new(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_name_validation() {
        assert!(parse_module_name("java.base").is_ok());
        assert!(parse_module_name("").is_err());
        assert!(parse_module_name("a..b").is_err());
    }
}
