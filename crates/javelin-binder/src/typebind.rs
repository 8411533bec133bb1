//! The type phase.
//!
//! Promotes header stubs to typed stubs: type parameters get their bounds,
//! supertypes their generic instantiations, and every field, method,
//! parameter, throws clause, and receiver its canonical type. Annotation
//! occurrences are resolved to symbols here; their element values are
//! evaluated by the constant phase.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use javelin_core::Name;
use javelin_syntax::{Anno, ClassTyTree, Expr, Member, MethDecl, TyTree, VarDecl, WildBound};
use javelin_types::{
    AnnoInfo, AnnotationMetadata, ArrayTy, ClassKind, ClassSymbol, ClassTy, ErrorTy, FieldInfo,
    FieldSymbol, HeaderView, IntersectionTy, MethodInfo, MethodSymbol, ParamInfo, ParamSymbol,
    PrimTy, SimpleClassTy, TyVarInfo, TyVarSymbol, TyVarTy, Type, TypeView, WildTy, ACC_ABSTRACT,
    ACC_DEPRECATED, ACC_FINAL, ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC, ACC_VARARGS,
    JAVA_LANG_ANNOTATION_ANNOTATION, JAVA_LANG_ENUM, JAVA_LANG_OBJECT,
};
use text_size::TextSize;
use tracing::debug;

use crate::diag::{DiagSink, ErrorKind};
use crate::env::Env;
use crate::hierarchy::SourceHeaderClass;
use crate::import::{MemberImportIndex, UnitScopes};
use crate::lookup::{CompoundScope, LookupKey, LookupResult, Resolver, Scope};
use crate::resolve::{resolve_member, MemberResolver, Origin};

const JAVA_LANG_RECORD: &str = "java/lang/Record";
const JAVA_LANG_DEPRECATED: &str = "java/lang/Deprecated";
const JAVA_LANG_STRING: &str = "java/lang/String";

/// An annotation occurrence with its symbol resolved and its argument trees
/// still unevaluated.
#[derive(Clone)]
pub(crate) struct ResolvedAnno {
    pub sym: Option<ClassSymbol>,
    pub tree: Anno,
}

/// A source class after the type phase.
pub(crate) struct SourceTypedClass {
    pub header: Rc<SourceHeaderClass>,
    pub access: u32,
    pub type_parameters: Vec<(TyVarSymbol, TyVarInfo)>,
    pub superclass_type: Option<Type>,
    pub interface_types: Vec<Type>,
    pub fields: Vec<FieldInfo>,
    /// Initializer trees, parallel to `fields`.
    pub field_inits: Vec<Option<Expr>>,
    pub methods: Vec<MethodInfo>,
    /// Annotation-element default trees, parallel to `methods`.
    pub method_defaults: Vec<Option<Expr>>,
    pub decl_annos: Vec<ResolvedAnno>,
    pub field_annos: Vec<Vec<ResolvedAnno>>,
    pub method_annos: Vec<Vec<ResolvedAnno>>,
    pub param_annos: Vec<Vec<Vec<ResolvedAnno>>>,
    /// Type-position annotations keyed by source position, filled into the
    /// stored types during the constant phase.
    pub pending_type_annos: HashMap<u32, ResolvedAnno>,
    pub scope: CompoundScope,
    pub member_imports: Rc<MemberImportIndex>,
    pub resolver: Rc<dyn Resolver>,
    pub origin: Origin,
    pub file: usize,
}

impl HeaderView for SourceTypedClass {
    fn sym(&self) -> &ClassSymbol {
        self.header.sym()
    }

    fn kind(&self) -> ClassKind {
        self.header.kind()
    }

    fn access(&self) -> u32 {
        self.access
    }

    fn owner(&self) -> Option<&ClassSymbol> {
        self.header.owner()
    }

    fn children(&self) -> &BTreeMap<Name, ClassSymbol> {
        self.header.children()
    }

    fn superclass(&self) -> Option<&ClassSymbol> {
        self.header.superclass()
    }

    fn interfaces(&self) -> &[ClassSymbol] {
        self.header.interfaces()
    }
}

impl TypeView for SourceTypedClass {
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
        &[]
    }

    fn annotation_metadata(&self) -> Option<&AnnotationMetadata> {
        None
    }
}

/// A scope over the members (declared and inherited) of one class.
struct ClassMemberScope {
    sym: ClassSymbol,
    env: Rc<dyn Env<dyn HeaderView>>,
    origin: Origin,
}

impl Scope for ClassMemberScope {
    fn lookup(&self, key: &LookupKey) -> Option<LookupResult> {
        let sym = resolve_member(
            self.env.as_ref(),
            &self.origin,
            &self.sym,
            key.first().as_str(),
        )?;
        Some(LookupResult {
            sym,
            remaining: key.rest(),
        })
    }
}

pub(crate) struct TypeBinder {
    pub headers: Vec<(ClassSymbol, Rc<SourceHeaderClass>)>,
    pub by_sym: HashMap<ClassSymbol, Rc<SourceHeaderClass>>,
    pub unit_scopes: Vec<Rc<UnitScopes>>,
    pub header_env: Rc<dyn Env<dyn HeaderView>>,
    pub diags: DiagSink,
}

impl TypeBinder {
    pub(crate) fn bind_all(&self) -> Vec<(ClassSymbol, Rc<SourceTypedClass>)> {
        self.headers
            .iter()
            .map(|(sym, header)| (sym.clone(), Rc::new(self.bind_class(sym, header))))
            .collect()
    }

    fn bind_class(&self, sym: &ClassSymbol, header: &Rc<SourceHeaderClass>) -> SourceTypedClass {
        let source = &header.base;
        let unit = &self.unit_scopes[source.unit];
        let origin = Origin {
            package: unit.package.clone(),
            class: Some(sym.clone()),
        };
        let resolver: Rc<dyn Resolver> = Rc::new(MemberResolver {
            env: self.header_env.clone(),
            origin: origin.clone(),
        });

        // Compound scope, innermost first: member scopes of the class and
        // its lexical enclosers, then the unit scope.
        let mut scope = unit.scope(resolver.clone());
        for encl in self.lexical_chain(header) {
            scope = scope.shadowed_by(Rc::new(ClassMemberScope {
                sym: encl,
                env: self.header_env.clone(),
                origin: origin.clone(),
            }));
        }

        let mut cx = ClassCx {
            file: source.file,
            origin: origin.clone(),
            scope: scope.clone(),
            tyvars: self.tyvar_frames(header),
            pending: RefCell::new(HashMap::new()),
            diags: self.diags.clone(),
            header_env: self.header_env.clone(),
        };

        // Type parameters: bounds may reference sibling parameters, so the
        // frame is in place before any bound is bound.
        let mut type_parameters = Vec::new();
        for (tp_sym, tp) in header.typaram_syms.iter().zip(&source.decl.typarams) {
            let bounds: Vec<Type> = tp
                .bounds
                .iter()
                .map(|b| cx.bind_class_ty_tree(b))
                .collect();
            type_parameters.push((
                tp_sym.clone(),
                TyVarInfo {
                    upper_bound: IntersectionTy::new(bounds),
                    annotations: cx.bind_annos(&tp.annos),
                },
            ));
        }

        let superclass_type = self.bind_superclass(&mut cx, sym, header);
        let mut interface_types: Vec<Type> = source
            .decl
            .implements
            .iter()
            .map(|tree| cx.bind_class_ty_tree(tree))
            .collect();
        if source.kind == ClassKind::Annotation {
            interface_types.push(Type::Class(ClassTy::non_generic(ClassSymbol::new(
                JAVA_LANG_ANNOTATION_ANNOTATION,
            ))));
        }

        let decl_annos = cx.resolve_annos(&source.decl.annos);
        let mut access = source.access;
        if is_deprecated(&decl_annos) {
            access |= ACC_DEPRECATED;
        }

        let mut fields = Vec::new();
        let mut field_inits = Vec::new();
        let mut field_annos = Vec::new();
        let mut methods = Vec::new();
        let mut method_defaults = Vec::new();
        let mut method_annos = Vec::new();
        let mut param_annos = Vec::new();

        // Record components lower to private final fields plus accessors.
        for component in &source.decl.components {
            let ty = cx.bind_ty(&component.ty);
            fields.push(FieldInfo {
                sym: FieldSymbol::new(sym.clone(), component.name.as_str()),
                ty,
                access: ACC_PRIVATE | ACC_FINAL,
                annotations: Vec::new(),
                constant: None,
            });
            field_inits.push(None);
            field_annos.push(cx.resolve_annos(&component.annos));
        }

        for member in &source.decl.members {
            match member {
                Member::Field(vd) => {
                    let (info, annos) = self.bind_field(&mut cx, sym, source.kind, vd);
                    fields.push(info);
                    field_inits.push(vd.init.clone());
                    field_annos.push(annos);
                }
                Member::Method(md) => {
                    let index = methods.len() as u32;
                    let (info, annos, per_param) =
                        self.bind_method(&mut cx, sym, source.kind, index, md);
                    methods.push(info);
                    method_defaults.push(md.default_value.clone());
                    method_annos.push(annos);
                    param_annos.push(per_param);
                }
                Member::Ty(_) => {}
            }
        }

        let synthesized =
            self.synthesize_members(&mut cx, sym, source.kind, access, &source.decl.components, &methods);
        for info in synthesized {
            methods.push(info);
            method_defaults.push(None);
            method_annos.push(Vec::new());
            param_annos.push(Vec::new());
        }

        debug!(class = sym.binary_name(), "bound signatures");
        SourceTypedClass {
            header: header.clone(),
            access,
            type_parameters,
            superclass_type,
            interface_types,
            fields,
            field_inits,
            methods,
            method_defaults,
            decl_annos,
            field_annos,
            method_annos,
            param_annos,
            pending_type_annos: cx.pending.into_inner(),
            scope,
            member_imports: unit.members.clone(),
            resolver,
            origin,
            file: source.file,
        }
    }

    fn bind_superclass(
        &self,
        cx: &mut ClassCx,
        sym: &ClassSymbol,
        header: &SourceHeaderClass,
    ) -> Option<Type> {
        if header.superclass_err {
            let path = header
                .base
                .decl
                .extends
                .as_ref()
                .map(|tree| tree.idents().iter().map(|i| i.name.clone()).collect())
                .unwrap_or_default();
            return Some(Type::Error(ErrorTy { path }));
        }
        if let Some(tree) = &header.base.decl.extends {
            return Some(cx.bind_class_ty_tree(tree));
        }
        match header.base.kind {
            ClassKind::Enum => Some(Type::Class(ClassTy {
                classes: vec![SimpleClassTy {
                    sym: ClassSymbol::new(JAVA_LANG_ENUM),
                    targs: vec![Type::Class(ClassTy::non_generic(sym.clone()))],
                    annos: Vec::new(),
                }],
            })),
            ClassKind::Record => Some(Type::Class(ClassTy::non_generic(ClassSymbol::new(
                JAVA_LANG_RECORD,
            )))),
            _ if sym.binary_name() == JAVA_LANG_OBJECT => None,
            _ => Some(Type::object()),
        }
    }

    fn bind_field(
        &self,
        cx: &mut ClassCx,
        sym: &ClassSymbol,
        kind: ClassKind,
        vd: &VarDecl,
    ) -> (FieldInfo, Vec<ResolvedAnno>) {
        let ty = cx.bind_ty(&vd.ty);
        let mut access = vd.mods;
        if matches!(kind, ClassKind::Interface | ClassKind::Annotation) {
            access |= ACC_PUBLIC | ACC_STATIC | ACC_FINAL;
        }
        let annos = cx.resolve_annos(&vd.annos);
        if vd.javadoc_deprecated || is_deprecated(&annos) {
            access |= ACC_DEPRECATED;
        }
        (
            FieldInfo {
                sym: FieldSymbol::new(sym.clone(), vd.name.as_str()),
                ty,
                access,
                annotations: Vec::new(),
                constant: None,
            },
            annos,
        )
    }

    fn bind_method(
        &self,
        cx: &mut ClassCx,
        sym: &ClassSymbol,
        kind: ClassKind,
        index: u32,
        md: &MethDecl,
    ) -> (MethodInfo, Vec<ResolvedAnno>, Vec<Vec<ResolvedAnno>>) {
        let name = if md.is_constructor {
            "<init>"
        } else {
            md.name.as_str()
        };
        let method_sym = MethodSymbol::new(sym.clone(), name, index);

        // Method type parameters shadow class ones.
        let frame: Vec<(Name, TyVarSymbol)> = md
            .typarams
            .iter()
            .map(|tp| {
                (
                    tp.name.name.clone(),
                    TyVarSymbol::method_owned(method_sym.clone(), tp.name.as_str()),
                )
            })
            .collect();
        cx.tyvars.push(frame);

        let mut typarams = Vec::new();
        for tp in &md.typarams {
            let tp_sym = TyVarSymbol::method_owned(method_sym.clone(), tp.name.as_str());
            let bounds: Vec<Type> = tp
                .bounds
                .iter()
                .map(|b| cx.bind_class_ty_tree(b))
                .collect();
            typarams.push((
                tp_sym,
                TyVarInfo {
                    upper_bound: IntersectionTy::new(bounds),
                    annotations: cx.bind_annos(&tp.annos),
                },
            ));
        }

        let return_type = cx.bind_ty(&md.ret);
        let receiver = md.receiver.as_ref().map(|r| ParamInfo {
            sym: ParamSymbol {
                owner: method_sym.clone(),
                name: r.name.name.clone(),
            },
            ty: cx.bind_ty(&r.ty),
            access: 0,
            annotations: Vec::new(),
        });

        let mut params = Vec::new();
        let mut per_param_annos = Vec::new();
        let mut varargs = false;
        for param in &md.params {
            varargs = param.mods & ACC_VARARGS != 0;
            params.push(ParamInfo {
                sym: ParamSymbol {
                    owner: method_sym.clone(),
                    name: param.name.name.clone(),
                },
                ty: cx.bind_ty(&param.ty),
                access: param.mods,
                annotations: Vec::new(),
            });
            per_param_annos.push(cx.resolve_annos(&param.annos));
        }

        let exceptions = md
            .throws
            .iter()
            .map(|t| cx.bind_class_ty_tree(t))
            .collect();

        let mut access = md.mods;
        if varargs {
            access |= ACC_VARARGS;
        }
        match kind {
            ClassKind::Annotation => access |= ACC_PUBLIC | ACC_ABSTRACT,
            ClassKind::Interface => {
                if access & ACC_PRIVATE == 0 {
                    access |= ACC_PUBLIC;
                    if access & (ACC_STATIC | javelin_types::ACC_DEFAULT) == 0 {
                        access |= ACC_ABSTRACT;
                    }
                }
            }
            _ => {}
        }
        let annos = cx.resolve_annos(&md.annos);
        if md.javadoc_deprecated || is_deprecated(&annos) {
            access |= ACC_DEPRECATED;
        }

        cx.tyvars.pop();

        (
            MethodInfo {
                sym: method_sym,
                typarams,
                return_type,
                receiver,
                params,
                exceptions,
                access,
                default_value: None,
                annotations: Vec::new(),
            },
            annos,
            per_param_annos,
        )
    }

    /// Implicit members: enum `values`/`valueOf`, record canonical
    /// constructors and accessors, and default constructors.
    fn synthesize_members(
        &self,
        cx: &mut ClassCx,
        sym: &ClassSymbol,
        kind: ClassKind,
        class_access: u32,
        components: &[VarDecl],
        explicit: &[MethodInfo],
    ) -> Vec<MethodInfo> {
        let self_ty = Type::Class(ClassTy::non_generic(sym.clone()));
        let mut out = Vec::new();
        let mut next_index = explicit.len() as u32;
        let mut index = || {
            let idx = next_index;
            next_index += 1;
            idx
        };

        match kind {
            ClassKind::Enum => {
                out.push(MethodInfo {
                    sym: MethodSymbol::new(sym.clone(), "values", index()),
                    typarams: Vec::new(),
                    return_type: Type::Array(ArrayTy {
                        elem: Box::new(self_ty.clone()),
                        annos: Vec::new(),
                    }),
                    receiver: None,
                    params: Vec::new(),
                    exceptions: Vec::new(),
                    access: ACC_PUBLIC | ACC_STATIC,
                    default_value: None,
                    annotations: Vec::new(),
                });
                let value_of_sym = MethodSymbol::new(sym.clone(), "valueOf", index());
                out.push(MethodInfo {
                    sym: value_of_sym.clone(),
                    typarams: Vec::new(),
                    return_type: self_ty,
                    receiver: None,
                    params: vec![ParamInfo {
                        sym: ParamSymbol {
                            owner: value_of_sym,
                            name: Name::new("name"),
                        },
                        ty: Type::Class(ClassTy::non_generic(ClassSymbol::new(JAVA_LANG_STRING))),
                        access: 0,
                        annotations: Vec::new(),
                    }],
                    exceptions: Vec::new(),
                    access: ACC_PUBLIC | ACC_STATIC,
                    default_value: None,
                    annotations: Vec::new(),
                });
            }
            ClassKind::Record => {
                let ctor_sym = MethodSymbol::new(sym.clone(), "<init>", index());
                let params = components
                    .iter()
                    .map(|component| ParamInfo {
                        sym: ParamSymbol {
                            owner: ctor_sym.clone(),
                            name: component.name.name.clone(),
                        },
                        ty: cx.bind_ty(&component.ty),
                        access: 0,
                        annotations: Vec::new(),
                    })
                    .collect();
                out.push(MethodInfo {
                    sym: ctor_sym,
                    typarams: Vec::new(),
                    return_type: Type::Void,
                    receiver: None,
                    params,
                    exceptions: Vec::new(),
                    access: class_access & (ACC_PUBLIC | ACC_PRIVATE),
                    default_value: None,
                    annotations: Vec::new(),
                });
                for component in components {
                    let declared = explicit.iter().any(|m| {
                        m.sym.name.as_str() == component.name.as_str() && m.params.is_empty()
                    });
                    if declared {
                        continue;
                    }
                    out.push(MethodInfo {
                        sym: MethodSymbol::new(sym.clone(), component.name.as_str(), index()),
                        typarams: Vec::new(),
                        return_type: cx.bind_ty(&component.ty),
                        receiver: None,
                        params: Vec::new(),
                        exceptions: Vec::new(),
                        access: ACC_PUBLIC,
                        default_value: None,
                        annotations: Vec::new(),
                    });
                }
            }
            ClassKind::Class => {
                let has_ctor = explicit.iter().any(|m| m.sym.name.as_str() == "<init>");
                if !has_ctor {
                    out.push(MethodInfo {
                        sym: MethodSymbol::new(sym.clone(), "<init>", index()),
                        typarams: Vec::new(),
                        return_type: Type::Void,
                        receiver: None,
                        params: Vec::new(),
                        exceptions: Vec::new(),
                        access: class_access & ACC_PUBLIC,
                        default_value: None,
                        annotations: Vec::new(),
                    });
                }
            }
            _ => {}
        }
        out
    }

    /// The lexical owner chain outermost-last, for scope assembly.
    fn lexical_chain(&self, header: &Rc<SourceHeaderClass>) -> Vec<ClassSymbol> {
        let mut chain = Vec::new();
        let mut current = Some(header.base.sym.clone());
        while let Some(sym) = current {
            current = self
                .by_sym
                .get(&sym)
                .and_then(|h| h.base.owner.clone());
            chain.push(sym);
        }
        // Outermost first so the innermost ends up probed first after the
        // fold in `bind_class`.
        chain.reverse();
        chain
    }

    /// Type-parameter frames visible in the class body; a static class cuts
    /// off its enclosers' frames.
    fn tyvar_frames(&self, header: &Rc<SourceHeaderClass>) -> Vec<Vec<(Name, TyVarSymbol)>> {
        let mut frames = Vec::new();
        let mut current = Some(header.clone());
        while let Some(h) = current {
            frames.push(
                h.typaram_syms
                    .iter()
                    .map(|tv| (tv.name.clone(), tv.clone()))
                    .collect(),
            );
            if h.base.access & ACC_STATIC != 0 {
                break;
            }
            current = h
                .base
                .owner
                .as_ref()
                .and_then(|o| self.by_sym.get(o))
                .cloned();
        }
        // Innermost frame last; lookups scan in reverse.
        frames.reverse();
        frames
    }
}

fn is_deprecated(annos: &[ResolvedAnno]) -> bool {
    annos
        .iter()
        .any(|a| a.sym.as_ref().is_some_and(|s| s.binary_name() == JAVA_LANG_DEPRECATED))
}

/// Per-class type-resolution context; also constructed by the constant
/// phase for class literals and cast types.
pub(crate) struct ClassCx {
    pub file: usize,
    pub origin: Origin,
    pub scope: CompoundScope,
    pub tyvars: Vec<Vec<(Name, TyVarSymbol)>>,
    pub pending: RefCell<HashMap<u32, ResolvedAnno>>,
    pub diags: DiagSink,
    pub header_env: Rc<dyn Env<dyn HeaderView>>,
}

impl ClassCx {
    pub(crate) fn bind_ty(&self, tree: &TyTree) -> Type {
        match tree {
            TyTree::Prim { kind, annos, .. } => Type::Prim(PrimTy {
                kind: *kind,
                annos: self.bind_annos(annos),
            }),
            TyTree::Void { .. } => Type::Void,
            TyTree::Class(class) => self.bind_class_ty_tree(class),
            TyTree::Array { elem, annos, .. } => Type::Array(ArrayTy {
                elem: Box::new(self.bind_ty(elem)),
                annos: self.bind_annos(annos),
            }),
            TyTree::Wild { bound, annos, .. } => Type::Wild(match bound {
                WildBound::None => WildTy::Unbound {
                    annos: self.bind_annos(annos),
                },
                WildBound::Extends(inner) => WildTy::Upper {
                    bound: Box::new(self.bind_ty(inner)),
                    annos: self.bind_annos(annos),
                },
                WildBound::Super(inner) => WildTy::Lower {
                    bound: Box::new(self.bind_ty(inner)),
                    annos: self.bind_annos(annos),
                },
            }),
        }
    }

    pub(crate) fn bind_class_ty_tree(&self, tree: &ClassTyTree) -> Type {
        let segments = &tree.segments;
        let first = &segments[0].name;

        if let Some(tv) = self.lookup_tyvar(first.name.as_str()) {
            if segments.len() > 1 {
                self.diags.error(
                    self.file,
                    first.pos,
                    ErrorKind::TypeParameterQualifier,
                    format!("type parameter {} used as type qualifier", first.as_str()),
                );
                return Type::Error(ErrorTy {
                    path: tree.idents().iter().map(|i| i.name.clone()).collect(),
                });
            }
            return Type::TyVar(TyVarTy {
                sym: tv,
                annos: self.bind_annos(&segments[0].annos),
            });
        }

        let idents = tree.idents();
        let key = LookupKey::new(idents.clone());
        let Some(hit) = self.scope.lookup(&key) else {
            self.diags.error(
                self.file,
                first.pos,
                ErrorKind::CannotResolve,
                format!("could not resolve {}", first.as_str()),
            );
            return Type::Error(ErrorTy {
                path: idents.iter().map(|i| i.name.clone()).collect(),
            });
        };

        let consumed = idents.len() - hit.remaining.len();
        let head = &segments[consumed - 1];
        let mut classes = vec![SimpleClassTy {
            sym: hit.sym,
            targs: self.bind_targs(head),
            annos: self.bind_annos(&head.annos),
        }];

        for (idx, segment) in segments.iter().enumerate().skip(consumed) {
            let qualifier = classes.last().expect("non-empty chain").sym.clone();
            match resolve_member(
                self.header_env.as_ref(),
                &self.origin,
                &qualifier,
                segment.name.as_str(),
            ) {
                Some(next) => classes.push(SimpleClassTy {
                    sym: next,
                    targs: self.bind_targs(segment),
                    annos: self.bind_annos(&segment.annos),
                }),
                None => {
                    let path = idents[..=idx]
                        .iter()
                        .map(|i| i.as_str())
                        .collect::<Vec<_>>()
                        .join(".");
                    self.diags.error(
                        self.file,
                        segment.name.pos,
                        ErrorKind::SymbolNotFound,
                        format!("symbol not found {path}"),
                    );
                    return Type::Error(ErrorTy {
                        path: idents.iter().map(|i| i.name.clone()).collect(),
                    });
                }
            }
        }

        Type::Class(ClassTy { classes })
    }

    fn bind_targs(&self, segment: &javelin_syntax::ClassTySegment) -> Vec<Type> {
        segment
            .targs
            .as_ref()
            .map(|targs| targs.iter().map(|t| self.bind_ty(t)).collect())
            .unwrap_or_default()
    }

    fn lookup_tyvar(&self, name: &str) -> Option<TyVarSymbol> {
        self.tyvars.iter().rev().find_map(|frame| {
            frame
                .iter()
                .find(|(n, _)| n.as_str() == name)
                .map(|(_, tv)| tv.clone())
        })
    }

    /// Resolves annotation occurrences to symbols, leaving argument trees
    /// for the constant phase.
    pub(crate) fn resolve_annos(&self, annos: &[Anno]) -> Vec<ResolvedAnno> {
        annos
            .iter()
            .map(|tree| ResolvedAnno {
                sym: self.resolve_anno_sym(tree),
                tree: tree.clone(),
            })
            .collect()
    }

    fn resolve_anno_sym(&self, tree: &Anno) -> Option<ClassSymbol> {
        let key = LookupKey::new(tree.name.clone());
        let hit = self.scope.lookup(&key)?;
        let mut sym = hit.sym;
        for ident in &hit.remaining {
            sym = resolve_member(
                self.header_env.as_ref(),
                &self.origin,
                &sym,
                ident.as_str(),
            )?;
        }
        Some(sym)
    }

    /// Type-position annotations: resolved now, evaluated later. The
    /// placeholder [`AnnoInfo`] is found again by position when the constant
    /// phase fills element values in.
    fn bind_annos(&self, annos: &[Anno]) -> Vec<AnnoInfo> {
        annos
            .iter()
            .filter_map(|tree| {
                let sym = self.resolve_anno_sym(tree)?;
                self.pending.borrow_mut().insert(
                    u32::from(tree.pos),
                    ResolvedAnno {
                        sym: Some(sym.clone()),
                        tree: tree.clone(),
                    },
                );
                Some(AnnoInfo {
                    sym,
                    pos: Some(TextSize::from(u32::from(tree.pos))),
                    values: Vec::new(),
                })
            })
            .collect()
    }
}

impl Env<dyn HeaderView> for crate::env::SimpleEnv<SourceTypedClass> {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<dyn HeaderView>> {
        Env::<SourceTypedClass>::get(self, sym).map(|rc| rc as Rc<dyn HeaderView>)
    }
}

impl Env<dyn TypeView> for crate::env::SimpleEnv<SourceTypedClass> {
    fn get(&self, sym: &ClassSymbol) -> Option<Rc<dyn TypeView>> {
        Env::<SourceTypedClass>::get(self, sym).map(|rc| rc as Rc<dyn TypeView>)
    }
}
