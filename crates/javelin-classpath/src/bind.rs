//! Materializes a parsed class file as a [`BoundClass`].
//!
//! Classpath classes skip the staged build the binder uses for sources:
//! everything in a class file is already resolved, so the record is
//! populated in one shot.

use std::collections::BTreeMap;

use javelin_core::Name;
use javelin_classfile::{
    parse_class_signature, parse_field_desc, parse_field_signature, parse_method_desc,
    parse_method_signature, Base, ClassFile, FieldDesc, RawAnnotation, RawConst, RawElementValue,
    RawField, RawMethod, SigClassTy, SigTy, SigTyArg, SigTyParam,
};
use javelin_types::{
    AnnoInfo, AnnotationMetadata, ArrayTy, BoundClass, ClassKind, ClassSymbol, ClassValue, Const,
    ElementType, FieldInfo, FieldSymbol, IntersectionTy, MethodInfo, MethodSymbol, ParamInfo,
    ParamSymbol, PrimKind, RetentionPolicy, SimpleClassTy, TyVarInfo, TyVarOwner, TyVarSymbol,
    TyVarTy, Type, WildTy, ACC_ANNOTATION, ACC_DEPRECATED, ACC_ENUM, ACC_INTERFACE, ACC_SEALED,
};

const RETENTION: &str = "java/lang/annotation/Retention";
const TARGET: &str = "java/lang/annotation/Target";
const REPEATABLE: &str = "java/lang/annotation/Repeatable";
const INHERITED: &str = "java/lang/annotation/Inherited";

pub(crate) fn bind_class(sym: &ClassSymbol, cf: &ClassFile) -> BoundClass {
    // The InnerClasses record for the class itself carries the
    // declaration-level access bits (static, private, …).
    let self_inner = cf
        .inner_classes
        .iter()
        .find(|rec| rec.inner_class == cf.this_class);
    let mut access = u32::from(self_inner.map_or(cf.access_flags, |rec| rec.access_flags));
    if cf.is_deprecated {
        access |= ACC_DEPRECATED;
    }
    if !cf.permitted_subclasses.is_empty() {
        access |= ACC_SEALED;
    }

    let kind = if access & ACC_ANNOTATION != 0 {
        ClassKind::Annotation
    } else if access & ACC_ENUM != 0 {
        ClassKind::Enum
    } else if access & ACC_INTERFACE != 0 {
        ClassKind::Interface
    } else if cf.is_record {
        ClassKind::Record
    } else {
        ClassKind::Class
    };

    let owner = self_inner
        .and_then(|rec| rec.outer_class.as_deref())
        .map(ClassSymbol::new);

    let mut children = BTreeMap::new();
    for rec in &cf.inner_classes {
        if rec.outer_class.as_deref() == Some(cf.this_class.as_str()) {
            if let Some(inner_name) = &rec.inner_name {
                children.insert(Name::new(inner_name.as_str()), ClassSymbol::new(rec.inner_class.as_str()));
            }
        }
    }

    let superclass = cf.super_class.as_deref().map(ClassSymbol::new);
    let interfaces: Vec<ClassSymbol> = cf
        .interfaces
        .iter()
        .map(|name| ClassSymbol::new(name.as_str()))
        .collect();

    // Supertypes and type parameters come from the generic signature when
    // present, and fall back to the raw constant-pool form.
    let mut type_parameters = Vec::new();
    let mut tyvar_scope = TyVarScope::default();
    let (superclass_type, interface_types) = match cf
        .signature
        .as_deref()
        .and_then(|sig| parse_class_signature(sig).ok())
    {
        Some(sig) => {
            tyvar_scope.push_class_frame(sym, &sig.typarams);
            type_parameters = bind_typarams(&sig.typarams, TyVarOwner::Class(sym.clone()), &tyvar_scope);
            let superclass_type = Some(Type::Class(class_ty(&sig.superclass, &tyvar_scope)));
            let interface_types = sig
                .interfaces
                .iter()
                .map(|i| Type::Class(class_ty(i, &tyvar_scope)))
                .collect();
            (superclass_type, interface_types)
        }
        None => (
            superclass
                .clone()
                .map(|s| Type::Class(javelin_types::ClassTy::non_generic(s))),
            interfaces
                .iter()
                .cloned()
                .map(|s| Type::Class(javelin_types::ClassTy::non_generic(s)))
                .collect(),
        ),
    };

    let fields = cf
        .fields
        .iter()
        .map(|f| bind_field(sym, f, &tyvar_scope))
        .collect();

    let methods = cf
        .methods
        .iter()
        .enumerate()
        .map(|(index, m)| bind_method(sym, index as u32, m, &tyvar_scope))
        .collect();

    let annotations = bind_annotations(&cf.annotations);
    let annotation_metadata = if kind == ClassKind::Annotation {
        Some(extract_metadata(&annotations))
    } else {
        None
    };

    BoundClass {
        sym: sym.clone(),
        kind,
        access,
        owner,
        children,
        type_parameters,
        superclass,
        interfaces,
        superclass_type,
        interface_types,
        permits: cf
            .permitted_subclasses
            .iter()
            .map(|name| ClassSymbol::new(name.as_str()))
            .collect(),
        fields,
        methods,
        annotations,
        annotation_metadata,
    }
}

fn bind_field(owner: &ClassSymbol, f: &RawField, scope: &TyVarScope) -> FieldInfo {
    let ty = f
        .signature
        .as_deref()
        .and_then(|sig| parse_field_signature(sig).ok())
        .map(|sig| sig_ty(&sig, scope))
        .or_else(|| {
            parse_field_desc(&f.descriptor)
                .ok()
                .map(|desc| desc_ty(&desc))
        })
        .unwrap_or(Type::None);

    let constant = f.constant.as_ref().and_then(|c| retype_constant(c, &f.descriptor));

    let mut access = u32::from(f.access_flags);
    if f.is_deprecated {
        access |= ACC_DEPRECATED;
    }

    FieldInfo {
        sym: FieldSymbol::new(owner.clone(), f.name.as_str()),
        ty,
        access,
        annotations: bind_annotations(&f.annotations),
        constant,
    }
}

fn bind_method(owner: &ClassSymbol, index: u32, m: &RawMethod, scope: &TyVarScope) -> MethodInfo {
    let sym = MethodSymbol::new(owner.clone(), m.name.as_str(), index);

    let mut scope = scope.clone();
    let sig = m
        .signature
        .as_deref()
        .and_then(|sig| parse_method_signature(sig).ok());

    let mut typarams = Vec::new();
    let (return_type, params, mut exceptions) = match &sig {
        Some(sig) => {
            scope.push_method_frame(&sym, &sig.typarams);
            typarams = bind_typarams(&sig.typarams, TyVarOwner::Method(sym.clone()), &scope);
            let ret = sig
                .ret
                .as_ref()
                .map(|t| sig_ty(t, &scope))
                .unwrap_or(Type::Void);
            let params = sig.params.iter().map(|t| sig_ty(t, &scope)).collect();
            let exceptions = sig.throws.iter().map(|t| sig_ty(t, &scope)).collect();
            (ret, params, exceptions)
        }
        None => match parse_method_desc(&m.descriptor) {
            Ok(desc) => {
                let ret = desc.ret.as_ref().map(desc_ty).unwrap_or(Type::Void);
                let params = desc.params.iter().map(desc_ty).collect();
                (ret, params, Vec::new())
            }
            Err(_) => (Type::None, Vec::new(), Vec::new()),
        },
    };
    if exceptions.is_empty() {
        exceptions = m
            .exceptions
            .iter()
            .map(|name| Type::Class(javelin_types::ClassTy::non_generic(ClassSymbol::new(name.as_str()))))
            .collect();
    }

    let params = params
        .into_iter()
        .enumerate()
        .map(|(i, ty)| ParamInfo {
            sym: ParamSymbol {
                owner: sym.clone(),
                name: Name::new(format!("arg{i}")),
            },
            ty,
            access: 0,
            annotations: Vec::new(),
        })
        .collect();

    let mut access = u32::from(m.access_flags);
    if m.is_deprecated {
        access |= ACC_DEPRECATED;
    }

    MethodInfo {
        sym,
        typarams,
        return_type,
        receiver: None,
        params,
        exceptions,
        access,
        default_value: m.annotation_default.as_ref().map(element_value),
        annotations: bind_annotations(&m.annotations),
    }
}

// ---------------------------------------------------------------------------
// Type variables
// ---------------------------------------------------------------------------

/// Maps signature type-variable names to symbols; method frames shadow the
/// class frame.
#[derive(Default, Clone)]
struct TyVarScope {
    frames: Vec<Vec<(String, TyVarSymbol)>>,
}

impl TyVarScope {
    fn push_class_frame(&mut self, sym: &ClassSymbol, typarams: &[SigTyParam]) {
        self.frames.push(
            typarams
                .iter()
                .map(|tp| {
                    (
                        tp.name.clone(),
                        TyVarSymbol::class_owned(sym.clone(), tp.name.as_str()),
                    )
                })
                .collect(),
        );
    }

    fn push_method_frame(&mut self, sym: &MethodSymbol, typarams: &[SigTyParam]) {
        self.frames.push(
            typarams
                .iter()
                .map(|tp| {
                    (
                        tp.name.clone(),
                        TyVarSymbol::method_owned(sym.clone(), tp.name.as_str()),
                    )
                })
                .collect(),
        );
    }

    fn resolve(&self, name: &str) -> Option<&TyVarSymbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.iter().find(|(n, _)| n == name).map(|(_, sym)| sym))
    }
}

fn bind_typarams(
    typarams: &[SigTyParam],
    owner: TyVarOwner,
    scope: &TyVarScope,
) -> Vec<(TyVarSymbol, TyVarInfo)> {
    typarams
        .iter()
        .map(|tp| {
            let sym = TyVarSymbol {
                owner: owner.clone(),
                name: Name::new(tp.name.as_str()),
            };
            let bounds = tp.bounds.iter().map(|b| sig_ty(b, scope)).collect();
            (
                sym,
                TyVarInfo {
                    upper_bound: IntersectionTy::new(bounds),
                    annotations: Vec::new(),
                },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Signature and descriptor translation
// ---------------------------------------------------------------------------

fn sig_ty(sig: &SigTy, scope: &TyVarScope) -> Type {
    match sig {
        SigTy::Prim(base) => Type::prim(base_kind(*base)),
        SigTy::Class(class) => Type::Class(class_ty(class, scope)),
        SigTy::TyVar(name) => match scope.resolve(name) {
            Some(sym) => Type::TyVar(TyVarTy {
                sym: sym.clone(),
                annos: Vec::new(),
            }),
            None => Type::error(vec![Name::new(name.as_str())]),
        },
        SigTy::Array(elem) => Type::Array(ArrayTy {
            elem: Box::new(sig_ty(elem, scope)),
            annos: Vec::new(),
        }),
    }
}

fn class_ty(sig: &SigClassTy, scope: &TyVarScope) -> javelin_types::ClassTy {
    let mut classes = Vec::with_capacity(sig.segments.len());
    let mut binary = String::new();
    if !sig.package.is_empty() {
        binary.push_str(&sig.package);
        binary.push('/');
    }
    for (idx, seg) in sig.segments.iter().enumerate() {
        if idx > 0 {
            binary.push('$');
        }
        binary.push_str(&seg.name);
        let targs = seg
            .targs
            .iter()
            .map(|arg| match arg {
                SigTyArg::Wild => Type::Wild(WildTy::Unbound { annos: Vec::new() }),
                SigTyArg::Extends(t) => Type::Wild(WildTy::Upper {
                    bound: Box::new(sig_ty(t, scope)),
                    annos: Vec::new(),
                }),
                SigTyArg::Super(t) => Type::Wild(WildTy::Lower {
                    bound: Box::new(sig_ty(t, scope)),
                    annos: Vec::new(),
                }),
                SigTyArg::Exact(t) => sig_ty(t, scope),
            })
            .collect();
        classes.push(SimpleClassTy {
            sym: ClassSymbol::new(binary.as_str()),
            targs,
            annos: Vec::new(),
        });
    }
    javelin_types::ClassTy { classes }
}

fn desc_ty(desc: &FieldDesc) -> Type {
    match desc {
        FieldDesc::Prim(base) => Type::prim(base_kind(*base)),
        FieldDesc::Object(name) => Type::Class(javelin_types::ClassTy::non_generic(
            ClassSymbol::new(name.as_str()),
        )),
        FieldDesc::Array(elem) => Type::Array(ArrayTy {
            elem: Box::new(desc_ty(elem)),
            annos: Vec::new(),
        }),
    }
}

fn base_kind(base: Base) -> PrimKind {
    match base {
        Base::Byte => PrimKind::Byte,
        Base::Char => PrimKind::Char,
        Base::Double => PrimKind::Double,
        Base::Float => PrimKind::Float,
        Base::Int => PrimKind::Int,
        Base::Long => PrimKind::Long,
        Base::Short => PrimKind::Short,
        Base::Boolean => PrimKind::Boolean,
    }
}

// ---------------------------------------------------------------------------
// Constants and annotations
// ---------------------------------------------------------------------------

/// Re-types a `ConstantValue` against the declared descriptor: the pool
/// stores `boolean`, `byte`, `short`, and `char` constants as ints.
fn retype_constant(
    constant: &javelin_classfile::PoolConstant,
    descriptor: &str,
) -> Option<Const> {
    use javelin_classfile::PoolConstant;
    Some(match (constant, descriptor) {
        (PoolConstant::Int(v), "Z") => Const::Boolean(*v != 0),
        (PoolConstant::Int(v), "B") => Const::Byte(*v as i8),
        (PoolConstant::Int(v), "S") => Const::Short(*v as i16),
        (PoolConstant::Int(v), "C") => Const::Char(*v as u16),
        (PoolConstant::Int(v), "I") => Const::Int(*v),
        (PoolConstant::Long(v), _) => Const::Long(*v),
        (PoolConstant::Float(v), _) => Const::Float(*v),
        (PoolConstant::Double(v), _) => Const::Double(*v),
        (PoolConstant::String(v), _) => Const::String(v.clone()),
        _ => return None,
    })
}

fn bind_annotations(raw: &[RawAnnotation]) -> Vec<AnnoInfo> {
    raw.iter().filter_map(bind_annotation).collect()
}

fn bind_annotation(raw: &RawAnnotation) -> Option<AnnoInfo> {
    let internal = raw.internal_name()?;
    // Synthetic classpath-only markers (`jdk/Profile+Annotation`) have no
    // backing class file and are dropped.
    if internal.contains('+') {
        return None;
    }
    let values = raw
        .elements
        .iter()
        .map(|(name, value)| (Name::new(name.as_str()), element_value(value)))
        .collect();
    Some(AnnoInfo {
        sym: ClassSymbol::new(internal),
        pos: None,
        values,
    })
}

fn element_value(value: &RawElementValue) -> Const {
    match value {
        RawElementValue::Const(c) => match c {
            RawConst::Boolean(v) => Const::Boolean(*v),
            RawConst::Byte(v) => Const::Byte(*v),
            RawConst::Short(v) => Const::Short(*v),
            RawConst::Int(v) => Const::Int(*v),
            RawConst::Long(v) => Const::Long(*v),
            RawConst::Char(v) => Const::Char(*v),
            RawConst::Float(v) => Const::Float(*v),
            RawConst::Double(v) => Const::Double(*v),
            RawConst::String(v) => Const::String(v.clone()),
        },
        RawElementValue::Enum {
            type_descriptor,
            const_name,
        } => {
            let owner = descriptor_class(type_descriptor);
            Const::EnumConstant(FieldSymbol::new(owner, const_name.as_str()))
        }
        RawElementValue::Class(descriptor) => Const::Class(ClassValue(descriptor_type(descriptor))),
        RawElementValue::Annotation(nested) => match bind_annotation(nested) {
            Some(info) => Const::Annotation(info),
            None => Const::Null,
        },
        RawElementValue::Array(values) => {
            Const::Array(values.iter().map(element_value).collect())
        }
    }
}

fn descriptor_class(descriptor: &str) -> ClassSymbol {
    match parse_field_desc(descriptor) {
        Ok(FieldDesc::Object(name)) => ClassSymbol::new(name),
        _ => ClassSymbol::new(descriptor),
    }
}

fn descriptor_type(descriptor: &str) -> Type {
    if descriptor == "V" {
        return Type::Void;
    }
    match parse_field_desc(descriptor) {
        Ok(desc) => desc_ty(&desc),
        Err(_) => Type::error(vec![Name::new(descriptor)]),
    }
}

// ---------------------------------------------------------------------------
// Annotation metadata
// ---------------------------------------------------------------------------

fn extract_metadata(annotations: &[AnnoInfo]) -> AnnotationMetadata {
    let mut metadata = AnnotationMetadata::default();
    for anno in annotations {
        match anno.sym.binary_name() {
            RETENTION => {
                if let Some(Const::EnumConstant(field)) = anno.value("value") {
                    metadata.retention = match field.name.as_str() {
                        "SOURCE" => RetentionPolicy::Source,
                        "RUNTIME" => RetentionPolicy::Runtime,
                        _ => RetentionPolicy::Class,
                    };
                }
            }
            TARGET => {
                if let Some(value) = anno.value("value") {
                    let elements = match value {
                        Const::Array(values) => values.as_slice(),
                        single => std::slice::from_ref(single),
                    };
                    metadata.targets = Some(
                        elements
                            .iter()
                            .filter_map(|v| match v {
                                Const::EnumConstant(field) => {
                                    ElementType::from_name(field.name.as_str())
                                }
                                _ => None,
                            })
                            .collect(),
                    );
                }
            }
            REPEATABLE => {
                if let Some(Const::Class(ClassValue(ty))) = anno.value("value") {
                    metadata.repeatable = ty.class_sym().cloned();
                }
            }
            INHERITED => {
                metadata.inherited = true;
            }
            _ => {}
        }
    }
    metadata
}
