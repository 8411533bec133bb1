//! The driver: orchestrates the phase pipeline and assembles the result.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use javelin_classpath::Classpath;
use javelin_modules::ModuleInfo;
use javelin_syntax::{parse, LanguageVersion, ParseErrorKind};
use javelin_types::{
    BoundClass, ClassSymbol, FieldInfo, HeaderView, IntersectionTy, MethodInfo, ParamInfo,
    TypeView, TyVarInfo,
};
use tracing::debug;

use crate::canonical::{canonicalize_type, check_imports};
use crate::constbind::ConstBinder;
use crate::diag::{BindError, DiagSink, Diagnostic, ErrorKind};
use crate::env::{ClasspathEnv, CompoundEnv, Env, SimpleEnv};
use crate::hierarchy::HierarchyBinder;
use crate::import::{Tlis, UnitScopes};
use crate::modules::bind_module;
use crate::preprocess::preprocess;
use crate::tli::TopLevelIndex;
use crate::typebind::{SourceTypedClass, TypeBinder};

pub struct SourceFile {
    pub path: String,
    pub text: String,
}

#[derive(Clone, Default)]
pub struct BindOptions {
    pub language_version: LanguageVersion,
    /// Stamped into bound module-info outputs.
    pub module_version: Option<String>,
}

/// The binder's output: bound classes for every source class, bound module
/// descriptors, and the classpath environments used during binding (exposed
/// so lowering can look up referenced classes).
pub struct BoundUnits {
    pub classes: Vec<(ClassSymbol, Rc<BoundClass>)>,
    pub modules: Vec<ModuleInfo>,
    pub classpath: Rc<Classpath>,
    pub bootclasspath: Rc<Classpath>,
}

impl BoundUnits {
    pub fn class(&self, binary_name: &str) -> Option<&Rc<BoundClass>> {
        self.classes
            .iter()
            .find(|(sym, _)| sym.binary_name() == binary_name)
            .map(|(_, class)| class)
    }

    /// The combined environment over sources, bootclasspath, and classpath.
    pub fn env(&self) -> impl Env<dyn TypeView> {
        let mut sources = SimpleEnv::new();
        for (sym, class) in &self.classes {
            sources.insert(sym.clone(), class.clone());
        }
        let boot = Rc::new(ClasspathEnv {
            classpath: self.bootclasspath.clone(),
        });
        let cp = Rc::new(ClasspathEnv {
            classpath: self.classpath.clone(),
        });
        CompoundEnv::of(vec![
            Rc::new(sources) as Rc<dyn Env<dyn TypeView>>,
            boot,
            cp,
        ])
    }
}

/// Binds `sources` against the given classpaths: parse → index → hierarchy
/// → canonical imports → types → canonicalization → constants and
/// annotations → modules. The first phase that ends with diagnostics raises
/// them as one composite [`BindError`] and later phases do not run.
pub fn bind(
    sources: &[SourceFile],
    bootclasspath: Rc<Classpath>,
    classpath: Rc<Classpath>,
    options: &BindOptions,
) -> Result<BoundUnits, BindError> {
    let rendering: Vec<(String, String)> = sources
        .iter()
        .map(|s| (s.path.clone(), s.text.clone()))
        .collect();
    let diags = DiagSink::default();

    // Parse.
    let mut units = Vec::with_capacity(sources.len());
    let mut parse_diags = Vec::new();
    for (file, source) in sources.iter().enumerate() {
        match parse(&source.text, options.language_version) {
            Ok(unit) => units.push((file, unit)),
            Err(err) => parse_diags.push(Diagnostic {
                file,
                pos: err.pos,
                kind: match err.kind {
                    ParseErrorKind::UnexpectedToken => ErrorKind::UnexpectedToken,
                    ParseErrorKind::UnexpectedInput => ErrorKind::UnexpectedInput,
                    ParseErrorKind::UnexpectedModifier => ErrorKind::UnexpectedModifier,
                    ParseErrorKind::FeatureNotSupported => ErrorKind::FeatureNotSupported,
                },
                message: err.message,
            }),
        }
    }
    if !parse_diags.is_empty() {
        return Err(BindError::new(&rendering, parse_diags));
    }

    // Index.
    let (pre_units, classes) = preprocess(units, &diags);
    let mut source_tli = TopLevelIndex::new();
    for class in &classes {
        if !source_tli.insert(class.sym.binary_name()) && class.owner.is_none() {
            diags.error(
                class.file,
                class.decl.name.pos,
                ErrorKind::DuplicateDeclaration,
                format!("duplicate declaration of {}", class.sym.dotted()),
            );
        }
    }
    let mut boot_tli = TopLevelIndex::new();
    for name in bootclasspath.class_names() {
        boot_tli.insert(name);
    }
    let mut cp_tli = TopLevelIndex::new();
    for name in classpath.class_names() {
        cp_tli.insert(name);
    }
    check(&diags, &rendering)?;

    let tlis = Tlis {
        sources: Rc::new(source_tli),
        boot: Rc::new(boot_tli),
        classpath: Rc::new(cp_tli),
    };
    let unit_scopes: Vec<Rc<UnitScopes>> = pre_units
        .iter()
        .map(|unit| Rc::new(UnitScopes::new(&tlis, unit)))
        .collect();

    let boot_env = Rc::new(ClasspathEnv {
        classpath: bootclasspath.clone(),
    });
    let cp_env = Rc::new(ClasspathEnv {
        classpath: classpath.clone(),
    });
    let classpath_header_env: Rc<dyn Env<dyn HeaderView>> = Rc::new(CompoundEnv::of(vec![
        boot_env.clone() as Rc<dyn Env<dyn HeaderView>>,
        cp_env.clone() as Rc<dyn Env<dyn HeaderView>>,
    ]));

    // Hierarchy.
    let hierarchy = HierarchyBinder::new(
        classes.clone(),
        unit_scopes.clone(),
        classpath_header_env.clone(),
        diags.clone(),
    );
    let headers = hierarchy.bind_all();
    check(&diags, &rendering)?;
    debug!(classes = headers.len(), "hierarchy phase complete");

    let mut header_simple = SimpleEnv::new();
    for (sym, header) in &headers {
        header_simple.insert(sym.clone(), header.clone());
    }
    let header_env: Rc<dyn Env<dyn HeaderView>> = Rc::new(CompoundEnv::of(vec![
        Rc::new(header_simple) as Rc<dyn Env<dyn HeaderView>>,
        boot_env.clone() as Rc<dyn Env<dyn HeaderView>>,
        cp_env.clone() as Rc<dyn Env<dyn HeaderView>>,
    ]));

    // Canonical-name validation of single-type imports.
    check_imports(&pre_units, &unit_scopes, header_env.as_ref(), &diags);
    check(&diags, &rendering)?;

    // Types.
    let type_binder = TypeBinder {
        headers: headers.clone(),
        by_sym: headers.iter().cloned().collect(),
        unit_scopes: unit_scopes.clone(),
        header_env: header_env.clone(),
        diags: diags.clone(),
    };
    let typed = type_binder.bind_all();
    check(&diags, &rendering)?;
    debug!(classes = typed.len(), "type phase complete");

    // Canonicalization of bound types.
    let mut pre_canonical = SimpleEnv::new();
    for (sym, tc) in &typed {
        pre_canonical.insert(sym.clone(), tc.clone());
    }
    let pre_canonical_env: Rc<dyn Env<dyn TypeView>> = Rc::new(CompoundEnv::of(vec![
        Rc::new(pre_canonical) as Rc<dyn Env<dyn TypeView>>,
        boot_env.clone() as Rc<dyn Env<dyn TypeView>>,
        cp_env.clone() as Rc<dyn Env<dyn TypeView>>,
    ]));
    let typed: Vec<(ClassSymbol, Rc<SourceTypedClass>)> = typed
        .iter()
        .map(|(sym, tc)| {
            (
                sym.clone(),
                Rc::new(canonicalize_typed(pre_canonical_env.as_ref(), tc)),
            )
        })
        .collect();

    // Constants and annotations.
    let mut canonical_simple = SimpleEnv::new();
    for (sym, tc) in &typed {
        canonical_simple.insert(sym.clone(), tc.clone());
    }
    let type_env: Rc<dyn Env<dyn TypeView>> = Rc::new(CompoundEnv::of(vec![
        Rc::new(canonical_simple) as Rc<dyn Env<dyn TypeView>>,
        boot_env.clone() as Rc<dyn Env<dyn TypeView>>,
        cp_env.clone() as Rc<dyn Env<dyn TypeView>>,
    ]));
    let const_binder = ConstBinder {
        order: typed.iter().map(|(sym, _)| sym.clone()).collect(),
        typed: typed.iter().cloned().collect(),
        type_env,
        header_env: header_env.clone(),
        values: RefCell::new(HashMap::new()),
        evaluating: RefCell::new(Default::default()),
        metadata: RefCell::new(HashMap::new()),
        metadata_guard: RefCell::new(Default::default()),
        class_annos: RefCell::new(HashMap::new()),
        diags: diags.clone(),
    };
    let bound = const_binder.bind_all();
    check(&diags, &rendering)?;
    debug!(classes = bound.len(), "constant phase complete");

    // Modules.
    let mut final_simple = SimpleEnv::new();
    for (sym, class) in &bound {
        final_simple.insert(sym.clone(), class.clone());
    }
    let final_header_env: Rc<dyn Env<dyn HeaderView>> = Rc::new(CompoundEnv::of(vec![
        Rc::new(final_simple) as Rc<dyn Env<dyn HeaderView>>,
        boot_env.clone() as Rc<dyn Env<dyn HeaderView>>,
        cp_env.clone() as Rc<dyn Env<dyn HeaderView>>,
    ]));
    let tli_scope = tlis.scope();
    let mut modules = Vec::new();
    for unit in &pre_units {
        if let Some(decl) = &unit.module {
            modules.push(bind_module(
                decl,
                unit.file,
                tli_scope.as_ref(),
                final_header_env.as_ref(),
                options.module_version.as_deref(),
                &diags,
            ));
        }
    }
    check(&diags, &rendering)?;

    Ok(BoundUnits {
        classes: bound,
        modules,
        classpath,
        bootclasspath,
    })
}

fn check(diags: &DiagSink, rendering: &[(String, String)]) -> Result<(), BindError> {
    if diags.is_empty() {
        Ok(())
    } else {
        Err(BindError::new(rendering, diags.take()))
    }
}

/// Rewrites a typed stub with canonicalized types.
fn canonicalize_typed(
    env: &dyn Env<dyn TypeView>,
    tc: &SourceTypedClass,
) -> SourceTypedClass {
    let canon = |ty: &javelin_types::Type| canonicalize_type(env, ty);
    let canon_info = |info: &TyVarInfo| TyVarInfo {
        upper_bound: IntersectionTy {
            bounds: info.upper_bound.bounds.iter().map(canon).collect(),
        },
        annotations: info.annotations.clone(),
    };
    SourceTypedClass {
        header: tc.header.clone(),
        access: tc.access,
        type_parameters: tc
            .type_parameters
            .iter()
            .map(|(sym, info)| (sym.clone(), canon_info(info)))
            .collect(),
        superclass_type: tc.superclass_type.as_ref().map(canon),
        interface_types: tc.interface_types.iter().map(canon).collect(),
        fields: tc
            .fields
            .iter()
            .map(|f| FieldInfo {
                sym: f.sym.clone(),
                ty: canon(&f.ty),
                access: f.access,
                annotations: f.annotations.clone(),
                constant: f.constant.clone(),
            })
            .collect(),
        field_inits: tc.field_inits.clone(),
        methods: tc
            .methods
            .iter()
            .map(|m| MethodInfo {
                sym: m.sym.clone(),
                typarams: m
                    .typarams
                    .iter()
                    .map(|(sym, info)| (sym.clone(), canon_info(info)))
                    .collect(),
                return_type: canon(&m.return_type),
                receiver: m.receiver.as_ref().map(|r| ParamInfo {
                    sym: r.sym.clone(),
                    ty: canon(&r.ty),
                    access: r.access,
                    annotations: r.annotations.clone(),
                }),
                params: m
                    .params
                    .iter()
                    .map(|p| ParamInfo {
                        sym: p.sym.clone(),
                        ty: canon(&p.ty),
                        access: p.access,
                        annotations: p.annotations.clone(),
                    })
                    .collect(),
                exceptions: m.exceptions.iter().map(canon).collect(),
                access: m.access,
                default_value: m.default_value.clone(),
                annotations: m.annotations.clone(),
            })
            .collect(),
        method_defaults: tc.method_defaults.clone(),
        decl_annos: tc.decl_annos.clone(),
        field_annos: tc.field_annos.clone(),
        method_annos: tc.method_annos.clone(),
        param_annos: tc.param_annos.clone(),
        pending_type_annos: tc.pending_type_annos.clone(),
        scope: tc.scope.clone(),
        member_imports: tc.member_imports.clone(),
        resolver: tc.resolver.clone(),
        origin: tc.origin.clone(),
        file: tc.file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{HierarchyBinder, SourceHeaderClass};
    use crate::import::Tlis;

    struct EmptyEnv;

    impl Env<dyn HeaderView> for EmptyEnv {
        fn get(&self, _: &ClassSymbol) -> Option<Rc<dyn HeaderView>> {
            None
        }
    }

    fn bind_headers(
        texts: &[&str],
    ) -> (DiagSink, Vec<(ClassSymbol, Rc<SourceHeaderClass>)>) {
        let diags = DiagSink::default();
        let units = texts
            .iter()
            .enumerate()
            .map(|(file, text)| {
                (file, parse(text, LanguageVersion::default()).expect("parse"))
            })
            .collect();
        let (pre_units, classes) = preprocess(units, &diags);
        let mut source_tli = TopLevelIndex::new();
        for class in &classes {
            source_tli.insert(class.sym.binary_name());
        }
        let tlis = Tlis {
            sources: Rc::new(source_tli),
            boot: Rc::new(TopLevelIndex::new()),
            classpath: Rc::new(TopLevelIndex::new()),
        };
        let unit_scopes = pre_units
            .iter()
            .map(|unit| Rc::new(UnitScopes::new(&tlis, unit)))
            .collect();
        let binder =
            HierarchyBinder::new(classes, unit_scopes, Rc::new(EmptyEnv), diags.clone());
        let headers = binder.bind_all();
        (diags, headers)
    }

    #[test]
    fn unresolved_super_keeps_the_error_sentinel() {
        let (diags, headers) = bind_headers(&["package a; class A extends NoSuch {}"]);
        assert!(!diags.is_empty());
        let (sym, header) = &headers[0];
        assert_eq!(sym.binary_name(), "a/A");
        assert!(header.superclass_err);
        assert_eq!(header.superclass, None);
    }

    #[test]
    fn cyclic_classes_keep_the_error_sentinel_and_stay_bound() {
        let (diags, headers) = bind_headers(&["class A extends B {} class B extends A {}"]);
        let cycle_count = diags
            .take()
            .iter()
            .filter(|d| d.kind == ErrorKind::CycleInClassHierarchy)
            .count();
        assert_eq!(cycle_count, 1);
        assert_eq!(headers.len(), 2);
        for (_, header) in &headers {
            assert!(header.superclass_err);
            assert_eq!(header.superclass, None);
        }
    }
}
