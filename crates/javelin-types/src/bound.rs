//! Bound-class records and the phase views over them.
//!
//! A class on the classpath materializes directly as a [`BoundClass`]; a
//! source class is built up in stages by the binder, and every stage
//! implements the view traits so later phases read one interface regardless
//! of where a class came from.

use std::collections::BTreeMap;

use javelin_core::Name;

use crate::consts::{AnnoInfo, Const};
use crate::sym::{ClassSymbol, FieldSymbol, MethodSymbol, ParamSymbol, TyVarSymbol};
use crate::ty::{IntersectionTy, MethodTy, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

/// Bounds and annotations of one type parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TyVarInfo {
    pub upper_bound: IntersectionTy,
    pub annotations: Vec<AnnoInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub sym: FieldSymbol,
    pub ty: Type,
    pub access: u32,
    pub annotations: Vec<AnnoInfo>,
    /// The compile-time constant value, when the declaration has one.
    pub constant: Option<Const>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    pub sym: ParamSymbol,
    pub ty: Type,
    pub access: u32,
    pub annotations: Vec<AnnoInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub sym: MethodSymbol,
    pub typarams: Vec<(TyVarSymbol, TyVarInfo)>,
    pub return_type: Type,
    pub receiver: Option<ParamInfo>,
    pub params: Vec<ParamInfo>,
    pub exceptions: Vec<Type>,
    pub access: u32,
    /// The default value of an annotation element.
    pub default_value: Option<Const>,
    pub annotations: Vec<AnnoInfo>,
}

impl MethodInfo {
    pub fn as_method_ty(&self) -> MethodTy {
        MethodTy {
            typarams: self.typarams.iter().map(|(sym, _)| sym.clone()).collect(),
            return_type: self.return_type.clone(),
            receiver: self.receiver.as_ref().map(|r| r.ty.clone()),
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
            thrown: self.exceptions.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    Source,
    Class,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Type,
    Field,
    Method,
    Parameter,
    Constructor,
    LocalVariable,
    AnnotationType,
    Package,
    TypeParameter,
    TypeUse,
    Module,
    RecordComponent,
}

impl ElementType {
    pub fn from_name(name: &str) -> Option<ElementType> {
        Some(match name {
            "TYPE" => ElementType::Type,
            "FIELD" => ElementType::Field,
            "METHOD" => ElementType::Method,
            "PARAMETER" => ElementType::Parameter,
            "CONSTRUCTOR" => ElementType::Constructor,
            "LOCAL_VARIABLE" => ElementType::LocalVariable,
            "ANNOTATION_TYPE" => ElementType::AnnotationType,
            "PACKAGE" => ElementType::Package,
            "TYPE_PARAMETER" => ElementType::TypeParameter,
            "TYPE_USE" => ElementType::TypeUse,
            "MODULE" => ElementType::Module,
            "RECORD_COMPONENT" => ElementType::RecordComponent,
            _ => return None,
        })
    }
}

/// Metadata an annotation type declares about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationMetadata {
    pub retention: RetentionPolicy,
    /// `None` means the default target set (no `@Target` present).
    pub targets: Option<Vec<ElementType>>,
    pub repeatable: Option<ClassSymbol>,
    pub inherited: bool,
}

impl Default for AnnotationMetadata {
    fn default() -> Self {
        Self {
            retention: RetentionPolicy::Class,
            targets: None,
            repeatable: None,
            inherited: false,
        }
    }
}

/// The complete record per class symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundClass {
    pub sym: ClassSymbol,
    pub kind: ClassKind,
    pub access: u32,
    pub owner: Option<ClassSymbol>,
    /// Directly nested classes by simple name.
    pub children: BTreeMap<Name, ClassSymbol>,
    /// Insertion-ordered type parameters.
    pub type_parameters: Vec<(TyVarSymbol, TyVarInfo)>,
    pub superclass: Option<ClassSymbol>,
    pub interfaces: Vec<ClassSymbol>,
    pub superclass_type: Option<Type>,
    pub interface_types: Vec<Type>,
    pub permits: Vec<ClassSymbol>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub annotations: Vec<AnnoInfo>,
    /// Present iff `kind` is `Annotation`.
    pub annotation_metadata: Option<AnnotationMetadata>,
}

/// The hierarchy phase's view of a class.
pub trait HeaderView {
    fn sym(&self) -> &ClassSymbol;
    fn kind(&self) -> ClassKind;
    fn access(&self) -> u32;
    fn owner(&self) -> Option<&ClassSymbol>;
    fn children(&self) -> &BTreeMap<Name, ClassSymbol>;
    fn superclass(&self) -> Option<&ClassSymbol>;
    fn interfaces(&self) -> &[ClassSymbol];

    fn child(&self, simple_name: &str) -> Option<&ClassSymbol> {
        self.children().get(simple_name)
    }
}

/// The signature-complete view of a class.
pub trait TypeView: HeaderView {
    fn type_parameters(&self) -> &[(TyVarSymbol, TyVarInfo)];
    fn superclass_type(&self) -> Option<&Type>;
    fn interface_types(&self) -> &[Type];
    fn fields(&self) -> &[FieldInfo];
    fn methods(&self) -> &[MethodInfo];
    fn annotations(&self) -> &[AnnoInfo];
    fn annotation_metadata(&self) -> Option<&AnnotationMetadata>;

    fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields().iter().find(|f| f.sym.name.as_str() == name)
    }
}

impl HeaderView for BoundClass {
    fn sym(&self) -> &ClassSymbol {
        &self.sym
    }

    fn kind(&self) -> ClassKind {
        self.kind
    }

    fn access(&self) -> u32 {
        self.access
    }

    fn owner(&self) -> Option<&ClassSymbol> {
        self.owner.as_ref()
    }

    fn children(&self) -> &BTreeMap<Name, ClassSymbol> {
        &self.children
    }

    fn superclass(&self) -> Option<&ClassSymbol> {
        self.superclass.as_ref()
    }

    fn interfaces(&self) -> &[ClassSymbol] {
        &self.interfaces
    }
}

impl TypeView for BoundClass {
    fn type_parameters(&self) -> &[(TyVarSymbol, TyVarInfo)] {
        &self.type_parameters
    }

    fn superclass_type(&self) -> Option<&Type> {
        self.superclass_type.as_ref()
    }

    fn interface_types(&self) -> &[Type] {
        &self.interface_types
    }

    fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    fn annotations(&self) -> &[AnnoInfo] {
        &self.annotations
    }

    fn annotation_metadata(&self) -> Option<&AnnotationMetadata> {
        self.annotation_metadata.as_ref()
    }
}
