//! The annotation binder.
//!
//! Matches annotation arguments against the annotation type's declared
//! elements, evaluates them against the element types, enforces `@Target`
//! and repeatability, and extracts annotation metadata (retention, targets,
//! repeatable container, inheritance). Defaults are filled at query time by
//! [`element_values_with_defaults`], never at store time.

use std::rc::Rc;

use javelin_core::Name;
use javelin_syntax::{Anno, Expr, Lit};
use javelin_types::{
    AnnoInfo, AnnotationMetadata, ClassKind, ClassSymbol, ClassValue, Const, ElementType,
    RetentionPolicy, Type, TypeView, JAVA_LANG_STRING,
};
use text_size::TextSize;

use crate::constbind::{ConstBinder, EvalError, Evaluator};
use crate::consteval::{coerce, OpErr};
use crate::diag::ErrorKind;
use crate::env::Env;
use crate::lookup::{LookupKey, Scope};
use crate::resolve::resolve_member;
use crate::typebind::{ResolvedAnno, SourceTypedClass};

const RETENTION: &str = "java/lang/annotation/Retention";
const TARGET: &str = "java/lang/annotation/Target";
const REPEATABLE: &str = "java/lang/annotation/Repeatable";
const INHERITED: &str = "java/lang/annotation/Inherited";
const JAVA_LANG_CLASS: &str = "java/lang/Class";

/// Binds a declaration's annotations, diagnosing duplicate occurrences of
/// non-repeatable annotation types.
pub(crate) fn bind_annotation_list(
    phase: &ConstBinder,
    tc: &SourceTypedClass,
    annos: &[ResolvedAnno],
    target: ElementType,
) -> Vec<AnnoInfo> {
    let mut seen: Vec<ClassSymbol> = Vec::new();
    let mut out = Vec::new();
    for anno in annos {
        if let Some(sym) = &anno.sym {
            if seen.contains(sym) {
                if metadata_of(phase, sym).repeatable.is_none() {
                    phase.diags.error(
                        tc.file,
                        anno.tree.pos,
                        ErrorKind::NotRepeatable,
                        format!("{} is not @Repeatable", sym.dotted()),
                    );
                }
            } else {
                seen.push(sym.clone());
            }
        }
        if let Some(info) = bind_annotation(phase, tc, anno, target) {
            out.push(info);
        }
    }
    out
}

/// Binds one annotation occurrence.
pub(crate) fn bind_annotation(
    phase: &ConstBinder,
    tc: &SourceTypedClass,
    anno: &ResolvedAnno,
    target: ElementType,
) -> Option<AnnoInfo> {
    let tree = &anno.tree;
    let Some(sym) = anno.sym.clone() else {
        phase.diags.error(
            tc.file,
            tree.pos,
            ErrorKind::CannotResolve,
            format!(
                "could not resolve {}",
                javelin_syntax::dotted(&tree.name)
            ),
        );
        return None;
    };

    let Some(view) = phase.type_env.get(&sym) else {
        phase.diags.error(
            tc.file,
            tree.pos,
            ErrorKind::CannotResolve,
            format!("could not resolve {}", sym.dotted()),
        );
        return None;
    };
    if view.kind() != ClassKind::Annotation {
        phase.diags.error(
            tc.file,
            tree.pos,
            ErrorKind::NotAnAnnotation,
            format!("{} is not an annotation", sym.dotted()),
        );
        return None;
    }

    // The template: declared element name → (type, has-default), consumed
    // as arguments match.
    let mut template: Vec<(Name, Type)> = view
        .methods()
        .iter()
        .filter(|m| m.params.is_empty() && m.sym.name.as_str() != "<init>")
        .map(|m| (m.sym.name.clone(), m.return_type.clone()))
        .collect();

    let mut seen: Vec<Name> = Vec::new();
    let mut values: Vec<(Name, Const)> = Vec::new();
    for arg in &tree.args {
        let (name, pos, expr) = match arg {
            Expr::Assign { name, value, .. } => {
                (name.name.clone(), name.pos, value.as_ref())
            }
            other => (Name::new("value"), other.pos(), other),
        };
        let slot = template.iter().position(|(n, _)| *n == name);
        let Some(slot) = slot else {
            if seen.contains(&name) {
                phase.diags.error(
                    tc.file,
                    pos,
                    ErrorKind::InvalidAnnotationArgument,
                    format!("duplicate annotation argument {name}"),
                );
            } else {
                phase.diags.error(
                    tc.file,
                    pos,
                    ErrorKind::CannotResolveElement,
                    format!("could not resolve element {name}() in {}", sym.dotted()),
                );
            }
            continue;
        };
        let (name, element_ty) = template.remove(slot);
        if let Some(value) = eval_annotation_value(phase, tc, &element_ty, expr) {
            values.push((name.clone(), value));
        }
        seen.push(name);
    }

    for (name, _) in &template {
        if !element_has_default(phase, &sym, name) {
            phase.diags.error(
                tc.file,
                tree.pos,
                ErrorKind::MissingAnnotationArgument,
                format!("missing required annotation argument {name}"),
            );
        }
    }

    if let Some(targets) = &metadata_of(phase, &sym).targets {
        if !targets.contains(&target) {
            phase.diags.error(
                tc.file,
                tree.pos,
                ErrorKind::AnnotationTargetMismatch,
                format!("{} is not applicable to this declaration", sym.dotted()),
            );
        }
    }

    Some(AnnoInfo {
        sym,
        pos: Some(tree.pos),
        values,
    })
}

/// Evaluates one annotation argument against its element's declared type.
/// Primitives coerce, arrays accept the single-element shorthand, class
/// literals become class values, nested annotations recurse.
pub(crate) fn eval_annotation_value(
    phase: &ConstBinder,
    tc: &SourceTypedClass,
    ty: &Type,
    expr: &Expr,
) -> Option<Const> {
    if let Expr::Literal {
        value: Lit::Null,
        pos,
    } = expr
    {
        phase.diags.error(
            tc.file,
            *pos,
            ErrorKind::InvalidAnnotationArgument,
            "invalid annotation argument: null",
        );
        return None;
    }

    match ty {
        Type::Prim(p) => eval_and_coerce(phase, tc, expr, p.kind),
        Type::Array(array) => match expr {
            Expr::ArrayInit { elems, .. } => {
                let values = elems
                    .iter()
                    .filter_map(|e| eval_annotation_value(phase, tc, &array.elem, e))
                    .collect();
                Some(Const::Array(values))
            }
            // The single-element shorthand is accepted here, and only here.
            single => {
                let value = eval_annotation_value(phase, tc, &array.elem, single)?;
                Some(Const::Array(vec![value]))
            }
        },
        Type::Class(class) => {
            let leaf = class.leaf_sym().binary_name();
            if leaf == JAVA_LANG_STRING {
                return eval_and_coerce(phase, tc, expr, javelin_types::PrimKind::String);
            }
            if leaf == JAVA_LANG_CLASS {
                return match eval_checked(phase, tc, expr)? {
                    value @ Const::Class(_) => Some(value),
                    _ => {
                        unexpected_type(phase, tc, expr.pos(), "expected a class literal");
                        None
                    }
                };
            }
            match phase.type_env.get(class.leaf_sym()).map(|v| v.kind()) {
                Some(ClassKind::Annotation) => match expr {
                    Expr::Anno(tree) => {
                        let resolved = ResolvedAnno {
                            sym: resolve_anno_sym(phase, tc, tree),
                            tree: tree.clone(),
                        };
                        bind_annotation(phase, tc, &resolved, ElementType::AnnotationType)
                            .map(Const::Annotation)
                    }
                    _ => {
                        unexpected_type(phase, tc, expr.pos(), "expected an annotation value");
                        None
                    }
                },
                Some(ClassKind::Enum) => match eval_checked(phase, tc, expr)? {
                    value @ Const::EnumConstant(_) => Some(value),
                    _ => {
                        unexpected_type(phase, tc, expr.pos(), "expected an enum constant");
                        None
                    }
                },
                _ => eval_checked(phase, tc, expr),
            }
        }
        Type::Error(_) => None,
        _ => {
            phase.diags.error(
                tc.file,
                expr.pos(),
                ErrorKind::UnexpectedType,
                "unexpected annotation element type",
            );
            None
        }
    }
}

fn eval_and_coerce(
    phase: &ConstBinder,
    tc: &SourceTypedClass,
    expr: &Expr,
    kind: javelin_types::PrimKind,
) -> Option<Const> {
    let evaluator = Evaluator { phase, tc };
    match evaluator.eval(expr) {
        Ok(value) => match coerce(&value, kind) {
            Ok(coerced) => Some(coerced),
            Err(OpErr::Operand | OpErr::NonConst) => {
                expression_error(phase, tc, expr.pos());
                None
            }
        },
        Err(EvalError::NonConst) => {
            expression_error(phase, tc, expr.pos());
            None
        }
        Err(EvalError::Fail) => None,
    }
}

/// Evaluates an argument expression; `ExpressionError` for non-constants,
/// silent when the evaluator already diagnosed.
fn eval_checked(phase: &ConstBinder, tc: &SourceTypedClass, expr: &Expr) -> Option<Const> {
    match (Evaluator { phase, tc }).eval(expr) {
        Ok(value) => Some(value),
        Err(EvalError::NonConst) => {
            expression_error(phase, tc, expr.pos());
            None
        }
        Err(EvalError::Fail) => None,
    }
}

fn expression_error(phase: &ConstBinder, tc: &SourceTypedClass, pos: TextSize) {
    phase.diags.error(
        tc.file,
        pos,
        ErrorKind::ExpressionError,
        "could not evaluate constant expression",
    );
}

fn unexpected_type(phase: &ConstBinder, tc: &SourceTypedClass, pos: TextSize, message: &str) {
    phase.diags.error(tc.file, pos, ErrorKind::UnexpectedType, message);
}

fn resolve_anno_sym(
    phase: &ConstBinder,
    tc: &SourceTypedClass,
    tree: &Anno,
) -> Option<ClassSymbol> {
    let hit = tc.scope.lookup(&LookupKey::new(tree.name.clone()))?;
    let mut sym = hit.sym;
    for ident in &hit.remaining {
        sym = resolve_member(
            phase.header_env.as_ref(),
            &tc.origin,
            &sym,
            ident.as_str(),
        )?;
    }
    Some(sym)
}

/// Whether the named element carries a default value; source annotation
/// classes are consulted through their default trees because their own
/// constant phase may not have run yet.
fn element_has_default(phase: &ConstBinder, anno_sym: &ClassSymbol, element: &Name) -> bool {
    if let Some(tc) = phase.typed.get(anno_sym) {
        return tc
            .methods
            .iter()
            .position(|m| m.sym.name == *element)
            .and_then(|idx| tc.method_defaults.get(idx))
            .is_some_and(|d| d.is_some());
    }
    phase
        .type_env
        .get(anno_sym)
        .and_then(|view| {
            view.methods()
                .iter()
                .find(|m| m.sym.name == *element)
                .map(|m| m.default_value.is_some())
        })
        .unwrap_or(false)
}

/// The metadata an annotation type declares about itself, computed on
/// demand and memoized. A self-annotating annotation type sees defaults
/// while its own metadata is in flight.
pub(crate) fn metadata_of(phase: &ConstBinder, sym: &ClassSymbol) -> Rc<AnnotationMetadata> {
    if let Some(memo) = phase.metadata.borrow().get(sym) {
        return memo.clone();
    }
    if !phase.metadata_guard.borrow_mut().insert(sym.clone()) {
        return Rc::new(AnnotationMetadata::default());
    }
    let metadata = match phase.typed.get(sym) {
        Some(tc) => {
            let infos = phase.class_annotations(sym, tc);
            extract_metadata(&infos)
        }
        None => phase
            .type_env
            .get(sym)
            .and_then(|view| view.annotation_metadata().cloned())
            .unwrap_or_default(),
    };
    phase.metadata_guard.borrow_mut().remove(sym);
    let metadata = Rc::new(metadata);
    phase
        .metadata
        .borrow_mut()
        .insert(sym.clone(), metadata.clone());
    metadata
}

/// Reads retention/target/repeatable/inherited out of an annotation type's
/// own evaluated annotations.
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

/// The element values of `anno` with the annotation type's defaults filled
/// in for everything not written explicitly, in declared element order.
/// Applying this to its own result is the identity.
pub fn element_values_with_defaults(
    env: &dyn Env<dyn TypeView>,
    anno: &AnnoInfo,
) -> Vec<(Name, Const)> {
    let Some(view) = env.get(&anno.sym) else {
        return anno.values.clone();
    };
    let mut out = Vec::new();
    for method in view.methods() {
        if !method.params.is_empty() {
            continue;
        }
        if let Some(value) = anno.value(method.sym.name.as_str()) {
            out.push((method.sym.name.clone(), value.clone()));
        } else if let Some(default) = &method.default_value {
            out.push((method.sym.name.clone(), default.clone()));
        }
    }
    out
}

/// The annotations visible on `sym` for semantic queries: its direct
/// annotations plus, walking the superclass chain only, inherited
/// annotations whose type carries `@Inherited`.
pub fn inherited_annotations(env: &dyn Env<dyn TypeView>, sym: &ClassSymbol) -> Vec<AnnoInfo> {
    let mut out: Vec<AnnoInfo> = match env.get(sym) {
        Some(view) => view.annotations().to_vec(),
        None => return Vec::new(),
    };
    let mut current = env.get(sym).and_then(|view| view.superclass().cloned());
    while let Some(ancestor) = current {
        let Some(view) = env.get(&ancestor) else {
            break;
        };
        for anno in view.annotations() {
            let already = out.iter().any(|a| a.sym == anno.sym);
            if already {
                continue;
            }
            let inherited = env
                .get(&anno.sym)
                .and_then(|a| a.annotation_metadata().map(|m| m.inherited))
                .unwrap_or(false);
            if inherited {
                out.push(anno.clone());
            }
        }
        current = view.superclass().cloned();
    }
    out
}
