//! The type IR.
//!
//! Types are immutable value records; constructors do not normalize, and
//! equality is structural. A nested generic class type is an outer→inner
//! chain of `(symbol, type-args)` pairs so `Outer<A>.Inner<B>` keeps both
//! instantiations; a raw or static-nested use collapses to a single leaf.

use javelin_core::Name;

use crate::consts::AnnoInfo;
use crate::sym::{ClassSymbol, TyVarSymbol};

pub const JAVA_LANG_OBJECT: &str = "java/lang/Object";
pub const JAVA_LANG_STRING: &str = "java/lang/String";
pub const JAVA_LANG_ENUM: &str = "java/lang/Enum";
pub const JAVA_LANG_ANNOTATION_ANNOTATION: &str = "java/lang/annotation/Annotation";

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Prim(PrimTy),
    Class(ClassTy),
    Array(ArrayTy),
    TyVar(TyVarTy),
    Wild(WildTy),
    Intersection(IntersectionTy),
    Method(Box<MethodTy>),
    Error(ErrorTy),
    Void,
    None,
}

impl Type {
    pub fn prim(kind: PrimKind) -> Type {
        Type::Prim(PrimTy {
            kind,
            annos: Vec::new(),
        })
    }

    pub fn object() -> Type {
        Type::Class(ClassTy::non_generic(ClassSymbol::new(JAVA_LANG_OBJECT)))
    }

    pub fn string() -> Type {
        Type::Class(ClassTy::non_generic(ClassSymbol::new(JAVA_LANG_STRING)))
    }

    pub fn error(path: Vec<Name>) -> Type {
        Type::Error(ErrorTy { path })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error(_))
    }

    /// The class symbol of a (possibly nested) class type.
    pub fn class_sym(&self) -> Option<&ClassSymbol> {
        match self {
            Type::Class(c) => Some(c.leaf_sym()),
            _ => None,
        }
    }
}

/// Kinds shared by primitive types and constant values.
///
/// `String` and `Null` are pseudo-primitives: `String` so constant coercion
/// can name its target, `Null` for the null literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
    String,
    Null,
}

impl PrimKind {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PrimKind::Byte
                | PrimKind::Short
                | PrimKind::Int
                | PrimKind::Long
                | PrimKind::Char
                | PrimKind::Float
                | PrimKind::Double
        )
    }
}

impl std::fmt::Display for PrimKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PrimKind::Boolean => "boolean",
            PrimKind::Byte => "byte",
            PrimKind::Short => "short",
            PrimKind::Int => "int",
            PrimKind::Long => "long",
            PrimKind::Char => "char",
            PrimKind::Float => "float",
            PrimKind::Double => "double",
            PrimKind::String => "String",
            PrimKind::Null => "null",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimTy {
    pub kind: PrimKind,
    pub annos: Vec<AnnoInfo>,
}

/// A class type: a non-empty outer→inner chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTy {
    pub classes: Vec<SimpleClassTy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleClassTy {
    pub sym: ClassSymbol,
    pub targs: Vec<Type>,
    pub annos: Vec<AnnoInfo>,
}

impl ClassTy {
    pub fn non_generic(sym: ClassSymbol) -> ClassTy {
        ClassTy {
            classes: vec![SimpleClassTy {
                sym,
                targs: Vec::new(),
                annos: Vec::new(),
            }],
        }
    }

    pub fn leaf(&self) -> &SimpleClassTy {
        self.classes.last().expect("class type chain is non-empty")
    }

    pub fn leaf_sym(&self) -> &ClassSymbol {
        &self.leaf().sym
    }

    /// True when no segment carries type arguments.
    pub fn is_raw(&self) -> bool {
        self.classes.iter().all(|s| s.targs.is_empty())
    }

    /// The dotted rendering used in messages, e.g. `java.util.Map$Entry`.
    pub fn display_name(&self) -> String {
        self.leaf_sym().dotted()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayTy {
    pub elem: Box<Type>,
    pub annos: Vec<AnnoInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TyVarTy {
    pub sym: TyVarSymbol,
    pub annos: Vec<AnnoInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WildTy {
    /// `?`
    Unbound { annos: Vec<AnnoInfo> },
    /// `? extends T`
    Upper { bound: Box<Type>, annos: Vec<AnnoInfo> },
    /// `? super T`
    Lower { bound: Box<Type>, annos: Vec<AnnoInfo> },
}

/// The bound set of a type parameter; `bounds` is empty only for the
/// implicit `Object` bound before defaulting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntersectionTy {
    pub bounds: Vec<Type>,
}

impl IntersectionTy {
    pub fn new(bounds: Vec<Type>) -> Self {
        Self { bounds }
    }

    /// The leading bound, defaulting to `Object`.
    pub fn first_bound(&self) -> Type {
        self.bounds.first().cloned().unwrap_or_else(Type::object)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodTy {
    pub typarams: Vec<TyVarSymbol>,
    pub return_type: Type,
    pub receiver: Option<Type>,
    pub params: Vec<Type>,
    pub thrown: Vec<Type>,
}

/// A reference that did not resolve; carries the name path for messages.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorTy {
    pub path: Vec<Name>,
}

impl ErrorTy {
    pub fn display_name(&self) -> String {
        self.path
            .iter()
            .map(Name::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_and_leaf() {
        let sym = ClassSymbol::new("java/util/Map$Entry");
        let ty = ClassTy::non_generic(sym.clone());
        assert!(ty.is_raw());
        assert_eq!(ty.leaf_sym(), &sym);
        assert_eq!(ty.display_name(), "java.util.Map$Entry");
    }

    #[test]
    fn first_bound_defaults_to_object() {
        assert_eq!(IntersectionTy::default().first_bound(), Type::object());
    }
}
