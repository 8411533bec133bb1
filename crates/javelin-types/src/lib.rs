#![forbid(unsafe_code)]

//! Symbols, the type IR, constant values, and the bound-class records the
//! binder and the classpath reader agree on.

mod bound;
mod consts;
mod erase;
mod flags;
mod subst;
mod sym;
mod ty;

pub use crate::bound::{
    AnnotationMetadata, BoundClass, ClassKind, ElementType, FieldInfo, HeaderView, MethodInfo,
    ParamInfo, RetentionPolicy, TyVarInfo, TypeView,
};
pub use crate::consts::{AnnoInfo, ClassValue, Const};
pub use crate::erase::erase;
pub use crate::flags::*;
pub use crate::subst::{subst, Mapping};
pub use crate::sym::{
    ClassSymbol, FieldSymbol, MethodSymbol, ModuleSymbol, PackageSymbol, ParamSymbol, TyVarOwner,
    TyVarSymbol,
};
pub use crate::ty::{
    ArrayTy, ClassTy, ErrorTy, IntersectionTy, MethodTy, PrimKind, PrimTy, SimpleClassTy, TyVarTy,
    Type, WildTy, JAVA_LANG_ANNOTATION_ANNOTATION, JAVA_LANG_ENUM, JAVA_LANG_OBJECT,
    JAVA_LANG_STRING,
};
