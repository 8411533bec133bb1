//! Compilation-unit preprocessing.
//!
//! Flattens nested type declarations into per-class records with binary-name
//! symbols, owners, children, and context-defaulted access bits. Purely
//! syntactic; nothing is resolved yet.

use std::collections::BTreeMap;
use std::rc::Rc;

use javelin_core::Name;
use javelin_syntax::{Anno, CompUnit, ImportDecl, Member, ModDecl, TyDecl};
use javelin_types::{
    ClassKind, ClassSymbol, ACC_ABSTRACT, ACC_ANNOTATION, ACC_DEPRECATED, ACC_ENUM, ACC_FINAL,
    ACC_INTERFACE, ACC_PUBLIC, ACC_RECORD, ACC_STATIC,
};

use crate::diag::{DiagSink, ErrorKind};

pub(crate) struct PreUnit {
    pub file: usize,
    /// Slash-delimited package, empty for the unnamed package.
    pub package: String,
    pub imports: Vec<ImportDecl>,
    pub package_annos: Vec<Anno>,
    pub module: Option<ModDecl>,
}

pub(crate) struct SourceClass {
    pub sym: ClassSymbol,
    pub file: usize,
    /// Index into the preprocessed unit list.
    pub unit: usize,
    pub owner: Option<ClassSymbol>,
    pub kind: ClassKind,
    pub access: u32,
    pub decl: Rc<TyDecl>,
    pub children: BTreeMap<Name, ClassSymbol>,
}

/// Flattens `units` in input order, then top-down declaration order.
pub(crate) fn preprocess(
    units: Vec<(usize, CompUnit)>,
    diags: &DiagSink,
) -> (Vec<PreUnit>, Vec<Rc<SourceClass>>) {
    let mut pre_units = Vec::with_capacity(units.len());
    let mut classes = Vec::new();

    for (unit_idx, (file, unit)) in units.into_iter().enumerate() {
        let package = unit
            .package
            .as_ref()
            .map(|p| p.binary_name())
            .unwrap_or_default();
        let package_annos = unit
            .package
            .as_ref()
            .map(|p| p.annos.clone())
            .unwrap_or_default();

        for decl in unit.decls {
            let binary_name = if package.is_empty() {
                decl.name.as_str().to_string()
            } else {
                format!("{package}/{}", decl.name.as_str())
            };
            flatten(
                file,
                unit_idx,
                ClassSymbol::new(binary_name),
                None,
                false,
                decl,
                &mut classes,
                diags,
            );
        }

        pre_units.push(PreUnit {
            file,
            package,
            imports: unit.imports,
            package_annos,
            module: unit.module,
        });
    }

    (pre_units, classes)
}

#[allow(clippy::too_many_arguments)]
fn flatten(
    file: usize,
    unit: usize,
    sym: ClassSymbol,
    owner: Option<ClassSymbol>,
    owner_is_interface: bool,
    decl: TyDecl,
    out: &mut Vec<Rc<SourceClass>>,
    diags: &DiagSink,
) {
    let access = defaulted_access(&decl, owner.is_some(), owner_is_interface);
    let kind = decl.kind;
    let is_interface_like = matches!(kind, ClassKind::Interface | ClassKind::Annotation);

    // Collect direct children first so the parent record is complete before
    // the children's own records follow it in declaration order.
    let mut children = BTreeMap::new();
    let mut nested = Vec::new();
    for member in &decl.members {
        if let Member::Ty(child) = member {
            let child_sym = sym.nested(child.name.as_str());
            if children
                .insert(child.name.name.clone(), child_sym.clone())
                .is_some()
            {
                diags.error(
                    file,
                    child.name.pos,
                    ErrorKind::DuplicateDeclaration,
                    format!("duplicate declaration of {}", child.name.as_str()),
                );
                continue;
            }
            nested.push((child_sym, child.clone()));
        }
    }

    out.push(Rc::new(SourceClass {
        sym: sym.clone(),
        file,
        unit,
        owner,
        kind,
        access,
        decl: Rc::new(decl),
        children,
    }));

    for (child_sym, child_decl) in nested {
        flatten(
            file,
            unit,
            child_sym,
            Some(sym.clone()),
            is_interface_like,
            child_decl,
            out,
            diags,
        );
    }
}

fn defaulted_access(decl: &TyDecl, nested: bool, owner_is_interface: bool) -> u32 {
    let mut access = decl.mods;
    match decl.kind {
        ClassKind::Interface => access |= ACC_INTERFACE | ACC_ABSTRACT,
        ClassKind::Annotation => access |= ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION,
        ClassKind::Enum => access |= ACC_ENUM | ACC_FINAL,
        ClassKind::Record => access |= ACC_RECORD | ACC_FINAL,
        ClassKind::Class => {}
    }
    if nested
        && matches!(
            decl.kind,
            ClassKind::Interface | ClassKind::Annotation | ClassKind::Enum | ClassKind::Record
        )
    {
        // Member interfaces, enums, and records are implicitly static.
        access |= ACC_STATIC;
    }
    if owner_is_interface {
        access |= ACC_PUBLIC | ACC_STATIC;
    }
    if decl.javadoc_deprecated {
        access |= ACC_DEPRECATED;
    }
    access
}
