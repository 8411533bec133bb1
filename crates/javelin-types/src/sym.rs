//! Symbols: stable identity handles for declarations.
//!
//! Symbols are value-equal by their identifying strings and carry no bound
//! state; everything resolved hangs off the environments instead.

use javelin_core::Name;

/// A package, identified by its slash-delimited qualified name (empty for the
/// unnamed package).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageSymbol(Name);

impl PackageSymbol {
    pub fn new(name: impl Into<Name>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for PackageSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PackageSymbol").field(&self.0.as_str()).finish()
    }
}

/// A class, identified by its binary name: `pkg/Outer$Inner$Leaf`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassSymbol(Name);

impl ClassSymbol {
    pub fn new(binary_name: impl Into<Name>) -> Self {
        Self(binary_name.into())
    }

    pub fn binary_name(&self) -> &str {
        self.0.as_str()
    }

    /// The simple name: everything after the last `/` and `$`.
    pub fn simple_name(&self) -> &str {
        let s = self.0.as_str();
        let s = s.rsplit('/').next().unwrap_or(s);
        s.rsplit('$').next().unwrap_or(s)
    }

    /// The slash-delimited package name, empty for the unnamed package.
    pub fn package_name(&self) -> &str {
        match self.0.as_str().rfind('/') {
            Some(idx) => &self.0.as_str()[..idx],
            None => "",
        }
    }

    /// The symbol of a directly nested class.
    pub fn nested(&self, simple_name: &str) -> ClassSymbol {
        ClassSymbol::new(format!("{}${}", self.0, simple_name))
    }

    /// The dotted form used in messages: `pkg.Outer$Inner`.
    pub fn dotted(&self) -> String {
        self.0.as_str().replace('/', ".")
    }
}

impl std::fmt::Debug for ClassSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ClassSymbol").field(&self.0.as_str()).finish()
    }
}

impl std::fmt::Display for ClassSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// A field, identified by its declaring class and name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldSymbol {
    pub owner: ClassSymbol,
    pub name: Name,
}

impl FieldSymbol {
    pub fn new(owner: ClassSymbol, name: impl Into<Name>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }
}

/// A method, identified by its declaring class, name, and declaration index.
///
/// The index distinguishes overloads before signatures are bound.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSymbol {
    pub owner: ClassSymbol,
    pub name: Name,
    pub index: u32,
}

impl MethodSymbol {
    pub fn new(owner: ClassSymbol, name: impl Into<Name>, index: u32) -> Self {
        Self {
            owner,
            name: name.into(),
            index,
        }
    }
}

/// A method parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamSymbol {
    pub owner: MethodSymbol,
    pub name: Name,
}

/// The declaration that owns a type variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TyVarOwner {
    Class(ClassSymbol),
    Method(MethodSymbol),
}

/// A type variable, identified by its owner and name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TyVarSymbol {
    pub owner: TyVarOwner,
    pub name: Name,
}

impl TyVarSymbol {
    pub fn class_owned(owner: ClassSymbol, name: impl Into<Name>) -> Self {
        Self {
            owner: TyVarOwner::Class(owner),
            name: name.into(),
        }
    }

    pub fn method_owned(owner: MethodSymbol, name: impl Into<Name>) -> Self {
        Self {
            owner: TyVarOwner::Method(owner),
            name: name.into(),
        }
    }
}

/// A module, identified by its dotted name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleSymbol(Name);

impl ModuleSymbol {
    pub fn new(name: impl Into<Name>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for ModuleSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ModuleSymbol").field(&self.0.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_symbol_parts() {
        let sym = ClassSymbol::new("com/example/Outer$Inner");
        assert_eq!(sym.simple_name(), "Inner");
        assert_eq!(sym.package_name(), "com/example");
        assert_eq!(sym.dotted(), "com.example.Outer$Inner");
        assert_eq!(
            sym.nested("Leaf"),
            ClassSymbol::new("com/example/Outer$Inner$Leaf")
        );
    }

    #[test]
    fn default_package() {
        let sym = ClassSymbol::new("Top");
        assert_eq!(sym.package_name(), "");
        assert_eq!(sym.simple_name(), "Top");
    }
}
