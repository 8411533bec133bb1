//! The constant phase.
//!
//! Evaluates compile-time constant field initializers, annotation
//! arguments, and annotation-element defaults, fills type-position
//! annotation values in, and assembles the final [`BoundClass`] records.
//! Cross-class constant references are satisfied by a phase-wide memo table
//! with an in-progress guard: a reference cycle simply de-constants the
//! reference.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use javelin_syntax::{Expr, Lit, TyTree};
use javelin_types::{
    AnnoInfo, AnnotationMetadata, ArrayTy, BoundClass, ClassKind, ClassSymbol, ClassTy,
    ClassValue, Const, ElementType, FieldInfo, FieldSymbol, HeaderView, IntersectionTy, MethodInfo,
    MethodTy, ParamInfo, PrimKind, SimpleClassTy, Type, TypeView, TyVarInfo, WildTy, ACC_ENUM,
    ACC_FINAL, ACC_PRIVATE, ACC_STATIC, JAVA_LANG_STRING,
};
use tracing::debug;

use crate::annobind;
use crate::consteval::{apply_binary, apply_unary, coerce, OpErr};
use crate::diag::{DiagSink, ErrorKind};
use crate::env::Env;
use crate::lookup::{LookupKey, Scope};
use crate::resolve::{resolve_field, resolve_member};
use crate::typebind::SourceTypedClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EvalError {
    /// The expression is not a compile-time constant; silently de-constants
    /// a field initializer, upgraded to a diagnostic in annotation
    /// arguments.
    NonConst,
    /// A diagnostic was already emitted.
    Fail,
}

pub(crate) struct ConstBinder {
    pub order: Vec<ClassSymbol>,
    pub typed: HashMap<ClassSymbol, Rc<SourceTypedClass>>,
    pub type_env: Rc<dyn Env<dyn TypeView>>,
    pub header_env: Rc<dyn Env<dyn HeaderView>>,
    pub values: RefCell<HashMap<FieldSymbol, Option<Const>>>,
    pub evaluating: RefCell<HashSet<FieldSymbol>>,
    pub metadata: RefCell<HashMap<ClassSymbol, Rc<AnnotationMetadata>>>,
    pub metadata_guard: RefCell<HashSet<ClassSymbol>>,
    /// Bound declaration annotations per class, shared between the class's
    /// own record and metadata extraction so diagnostics fire once.
    pub class_annos: RefCell<HashMap<ClassSymbol, Vec<AnnoInfo>>>,
    pub diags: DiagSink,
}

impl ConstBinder {
    pub(crate) fn bind_all(&self) -> Vec<(ClassSymbol, Rc<BoundClass>)> {
        self.order
            .iter()
            .map(|sym| {
                let tc = self.typed.get(sym).expect("typed class").clone();
                (sym.clone(), Rc::new(self.bind_class(sym, &tc)))
            })
            .collect()
    }

    fn bind_class(&self, sym: &ClassSymbol, tc: &SourceTypedClass) -> BoundClass {
        let kind = tc.kind();

        let mut fields = Vec::with_capacity(tc.fields.len());
        for (idx, field) in tc.fields.iter().enumerate() {
            let constant = if field.access & (ACC_STATIC | ACC_FINAL) == (ACC_STATIC | ACC_FINAL)
                && field.access & ACC_ENUM == 0
            {
                self.field_value(&field.sym)
            } else {
                None
            };
            fields.push(FieldInfo {
                sym: field.sym.clone(),
                ty: self.fill_type(tc, &field.ty),
                access: field.access,
                annotations: annobind::bind_annotation_list(
                    self,
                    tc,
                    &tc.field_annos[idx],
                    ElementType::Field,
                ),
                constant,
            });
        }

        let mut methods = Vec::with_capacity(tc.methods.len());
        for (idx, method) in tc.methods.iter().enumerate() {
            let default_value = tc
                .method_defaults
                .get(idx)
                .and_then(|d| d.as_ref())
                .and_then(|expr| {
                    annobind::eval_annotation_value(self, tc, &method.return_type, expr)
                });
            let annotations = tc
                .method_annos
                .get(idx)
                .map(|annos| {
                    annobind::bind_annotation_list(self, tc, annos, ElementType::Method)
                })
                .unwrap_or_default();
            let params = method
                .params
                .iter()
                .enumerate()
                .map(|(p_idx, param)| ParamInfo {
                    sym: param.sym.clone(),
                    ty: self.fill_type(tc, &param.ty),
                    access: param.access,
                    annotations: tc
                        .param_annos
                        .get(idx)
                        .and_then(|per| per.get(p_idx))
                        .map(|annos| {
                            annobind::bind_annotation_list(
                                self,
                                tc,
                                annos,
                                ElementType::Parameter,
                            )
                        })
                        .unwrap_or_default(),
                })
                .collect();
            methods.push(MethodInfo {
                sym: method.sym.clone(),
                typarams: method
                    .typarams
                    .iter()
                    .map(|(tv, info)| (tv.clone(), self.fill_tyvar_info(tc, info)))
                    .collect(),
                return_type: self.fill_type(tc, &method.return_type),
                receiver: method.receiver.as_ref().map(|r| ParamInfo {
                    sym: r.sym.clone(),
                    ty: self.fill_type(tc, &r.ty),
                    access: r.access,
                    annotations: r.annotations.clone(),
                }),
                params,
                exceptions: method
                    .exceptions
                    .iter()
                    .map(|e| self.fill_type(tc, e))
                    .collect(),
                access: method.access,
                default_value,
                annotations,
            });
        }

        let annotations = self.class_annotations(sym, tc);

        let annotation_metadata = if kind == ClassKind::Annotation {
            Some(annobind::metadata_of(self, sym).as_ref().clone())
        } else {
            None
        };

        debug!(class = sym.binary_name(), "bound constants and annotations");
        BoundClass {
            sym: sym.clone(),
            kind,
            access: tc.access,
            owner: tc.owner().cloned(),
            children: tc.children().clone(),
            type_parameters: tc
                .type_parameters
                .iter()
                .map(|(tv, info)| (tv.clone(), self.fill_tyvar_info(tc, info)))
                .collect(),
            superclass: tc.superclass().cloned(),
            interfaces: tc.interfaces().to_vec(),
            superclass_type: tc
                .superclass_type
                .as_ref()
                .map(|t| self.fill_type(tc, t)),
            interface_types: tc
                .interface_types
                .iter()
                .map(|t| self.fill_type(tc, t))
                .collect(),
            permits: tc.header.permits.clone(),
            fields,
            methods,
            annotations,
            annotation_metadata,
        }
    }

    /// A class's bound declaration annotations, computed once.
    pub(crate) fn class_annotations(
        &self,
        sym: &ClassSymbol,
        tc: &SourceTypedClass,
    ) -> Vec<AnnoInfo> {
        if let Some(memo) = self.class_annos.borrow().get(sym) {
            return memo.clone();
        }
        let target = match tc.kind() {
            ClassKind::Annotation => ElementType::AnnotationType,
            _ => ElementType::Type,
        };
        let annos = annobind::bind_annotation_list(self, tc, &tc.decl_annos, target);
        self.class_annos
            .borrow_mut()
            .entry(sym.clone())
            .or_insert(annos)
            .clone()
    }

    /// The constant value of a field, evaluated on demand and memoized. A
    /// source field evaluates its initializer in its own class context;
    /// classpath fields carry their value already.
    pub(crate) fn field_value(&self, sym: &FieldSymbol) -> Option<Const> {
        if let Some(memo) = self.values.borrow().get(sym) {
            return memo.clone();
        }
        let value = self.compute_field_value(sym);
        self.values
            .borrow_mut()
            .entry(sym.clone())
            .or_insert(value)
            .clone()
    }

    fn compute_field_value(&self, sym: &FieldSymbol) -> Option<Const> {
        let Some(tc) = self.typed.get(&sym.owner) else {
            // A classpath field; its class file recorded the value.
            let view = self.type_env.get(&sym.owner)?;
            return view.field(sym.name.as_str())?.constant.clone();
        };

        let idx = tc
            .fields
            .iter()
            .position(|f| f.sym.name == sym.name)?;
        let field = &tc.fields[idx];
        if field.access & ACC_FINAL == 0 {
            return None;
        }
        let target = declared_const_kind(&field.ty)?;
        let init = tc.field_inits[idx].as_ref()?;

        if !self.evaluating.borrow_mut().insert(sym.clone()) {
            // A reference cycle; the reference is simply not constant.
            return None;
        }
        let result = Evaluator { phase: self, tc }.eval(init);
        self.evaluating.borrow_mut().remove(sym);

        match result {
            Ok(value) => coerce(&value, target).ok(),
            Err(_) => None,
        }
    }

    fn fill_tyvar_info(&self, tc: &SourceTypedClass, info: &TyVarInfo) -> TyVarInfo {
        TyVarInfo {
            upper_bound: IntersectionTy {
                bounds: info
                    .upper_bound
                    .bounds
                    .iter()
                    .map(|b| self.fill_type(tc, b))
                    .collect(),
            },
            annotations: self.fill_annos(tc, &info.annotations),
        }
    }

    /// Rewrites a stored type so every placeholder type-position annotation
    /// gains its evaluated element values.
    pub(crate) fn fill_type(&self, tc: &SourceTypedClass, ty: &Type) -> Type {
        match ty {
            Type::Prim(p) => Type::Prim(javelin_types::PrimTy {
                kind: p.kind,
                annos: self.fill_annos(tc, &p.annos),
            }),
            Type::Class(c) => Type::Class(ClassTy {
                classes: c
                    .classes
                    .iter()
                    .map(|s| SimpleClassTy {
                        sym: s.sym.clone(),
                        targs: s.targs.iter().map(|t| self.fill_type(tc, t)).collect(),
                        annos: self.fill_annos(tc, &s.annos),
                    })
                    .collect(),
            }),
            Type::Array(a) => Type::Array(ArrayTy {
                elem: Box::new(self.fill_type(tc, &a.elem)),
                annos: self.fill_annos(tc, &a.annos),
            }),
            Type::TyVar(tv) => Type::TyVar(javelin_types::TyVarTy {
                sym: tv.sym.clone(),
                annos: self.fill_annos(tc, &tv.annos),
            }),
            Type::Wild(w) => Type::Wild(match w {
                WildTy::Unbound { annos } => WildTy::Unbound {
                    annos: self.fill_annos(tc, annos),
                },
                WildTy::Upper { bound, annos } => WildTy::Upper {
                    bound: Box::new(self.fill_type(tc, bound)),
                    annos: self.fill_annos(tc, annos),
                },
                WildTy::Lower { bound, annos } => WildTy::Lower {
                    bound: Box::new(self.fill_type(tc, bound)),
                    annos: self.fill_annos(tc, annos),
                },
            }),
            Type::Intersection(i) => Type::Intersection(IntersectionTy {
                bounds: i.bounds.iter().map(|b| self.fill_type(tc, b)).collect(),
            }),
            Type::Method(m) => Type::Method(Box::new(MethodTy {
                typarams: m.typarams.clone(),
                return_type: self.fill_type(tc, &m.return_type),
                receiver: m.receiver.as_ref().map(|r| self.fill_type(tc, r)),
                params: m.params.iter().map(|p| self.fill_type(tc, p)).collect(),
                thrown: m.thrown.iter().map(|t| self.fill_type(tc, t)).collect(),
            })),
            Type::Error(_) | Type::Void | Type::None => ty.clone(),
        }
    }

    fn fill_annos(&self, tc: &SourceTypedClass, annos: &[AnnoInfo]) -> Vec<AnnoInfo> {
        annos
            .iter()
            .map(|anno| {
                if !anno.values.is_empty() {
                    return anno.clone();
                }
                let Some(pos) = anno.pos else {
                    return anno.clone();
                };
                match tc.pending_type_annos.get(&u32::from(pos)) {
                    Some(resolved) => {
                        annobind::bind_annotation(self, tc, resolved, ElementType::TypeUse)
                            .unwrap_or_else(|| anno.clone())
                    }
                    None => anno.clone(),
                }
            })
            .collect()
    }
}

/// Whether a declared type can hold a recorded constant, and as what kind.
pub(crate) fn declared_const_kind(ty: &Type) -> Option<PrimKind> {
    match ty {
        Type::Prim(p) => Some(p.kind),
        Type::Class(c) if c.leaf_sym().binary_name() == JAVA_LANG_STRING => {
            Some(PrimKind::String)
        }
        _ => None,
    }
}

/// The tree-walking constant evaluator, bound to one class's scopes.
pub(crate) struct Evaluator<'p> {
    pub phase: &'p ConstBinder,
    pub tc: &'p SourceTypedClass,
}

impl Evaluator<'_> {
    pub(crate) fn eval(&self, expr: &Expr) -> Result<Const, EvalError> {
        match expr {
            Expr::Literal { value, .. } => Ok(match value {
                Lit::Int(v) => Const::Int(*v),
                Lit::Long(v) => Const::Long(*v),
                Lit::Float(v) => Const::Float(*v),
                Lit::Double(v) => Const::Double(*v),
                Lit::Char(v) => Const::Char(*v),
                Lit::String(v) => Const::String(v.clone()),
                Lit::Boolean(v) => Const::Boolean(*v),
                Lit::Null => Const::Null,
            }),
            Expr::Paren { expr, .. } => self.eval(expr),
            Expr::Unary { op, operand, pos } => {
                let value = self.eval(operand)?;
                apply_unary(*op, value).map_err(|err| self.op_err(err, *pos))
            }
            Expr::Binary { op, lhs, rhs, pos } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                apply_binary(*op, lhs, rhs).map_err(|err| self.op_err(err, *pos))
            }
            Expr::Conditional {
                cond,
                then_branch,
                else_branch,
                pos,
            } => match self.eval(cond)? {
                Const::Boolean(true) => self.eval(then_branch),
                Const::Boolean(false) => self.eval(else_branch),
                _ => Err(self.op_err(OpErr::Operand, *pos)),
            },
            Expr::Cast { ty, expr, .. } => self.eval_cast(ty, expr),
            Expr::ClassLit { ty, .. } => {
                let bound = self.bind_ty(ty);
                Ok(Const::Class(ClassValue(bound)))
            }
            Expr::Name { idents } => self.eval_name(idents),
            // Array initializers and annotation values are constant only in
            // annotation-argument positions, which are handled before this
            // point.
            Expr::ArrayInit { .. } | Expr::Anno(_) | Expr::Assign { .. } => {
                Err(EvalError::NonConst)
            }
        }
    }

    fn eval_cast(&self, ty: &TyTree, expr: &Expr) -> Result<Const, EvalError> {
        match ty {
            TyTree::Prim { kind, .. } => {
                let value = self.eval(expr)?;
                coerce(&value, *kind).map_err(|err| self.op_err(err, expr.pos()))
            }
            TyTree::Class(_) => {
                let value = self.eval(expr)?;
                let bound = self.bind_ty(ty);
                let is_string = matches!(
                    &bound,
                    Type::Class(c) if c.leaf_sym().binary_name() == JAVA_LANG_STRING
                );
                if is_string && matches!(value, Const::String(_)) {
                    Ok(value)
                } else {
                    // Other reference casts are not constant expressions.
                    Err(EvalError::NonConst)
                }
            }
            _ => Err(EvalError::NonConst),
        }
    }

    /// Const-var references: lexically enclosing classes first, then
    /// qualified resolution, then single static imports, then on-demand
    /// static imports skipping private hits.
    fn eval_name(&self, idents: &[javelin_syntax::Ident]) -> Result<Const, EvalError> {
        let env = self.phase.type_env.as_ref();
        if idents.len() == 1 {
            let name = idents[0].as_str();
            let mut lexical = Some(self.tc.sym().clone());
            while let Some(cls) = lexical {
                if let Some(field) = resolve_field(env, &cls, name) {
                    return self.field_const(field);
                }
                lexical = self
                    .phase
                    .header_env
                    .get(&cls)
                    .and_then(|view| view.owner().cloned());
            }
            if let Some((cls, member)) = self
                .tc
                .member_imports
                .lookup_single(name, self.tc.resolver.as_ref())
            {
                if let Some(field) = resolve_field(env, &cls, member.as_str()) {
                    return self.field_const(field);
                }
            }
            for cls in self
                .tc
                .member_imports
                .on_demand_classes(self.tc.resolver.as_ref())
            {
                if let Some(field) = resolve_field(env, &cls, name) {
                    if field.access & ACC_PRIVATE != 0 {
                        continue;
                    }
                    return self.field_const(field);
                }
            }
            self.phase.diags.error(
                self.tc.file,
                idents[0].pos,
                ErrorKind::CannotResolve,
                format!("could not resolve {name}"),
            );
            return Err(EvalError::Fail);
        }

        // Qualified: the scope resolves a class prefix, member classes are
        // walked structurally, and the final identifier is a field.
        let key = LookupKey::new(idents.to_vec());
        let Some(hit) = self.tc.scope.lookup(&key) else {
            self.phase.diags.error(
                self.tc.file,
                idents[0].pos,
                ErrorKind::CannotResolve,
                format!("could not resolve {}", idents[0].as_str()),
            );
            return Err(EvalError::Fail);
        };
        let mut sym = hit.sym;
        let mut rest = hit.remaining.as_slice();
        while rest.len() > 1 {
            match resolve_member(
                self.phase.header_env.as_ref(),
                &self.tc.origin,
                &sym,
                rest[0].as_str(),
            ) {
                Some(next) => {
                    sym = next;
                    rest = &rest[1..];
                }
                None => break,
            }
        }
        let Some(last) = rest.first() else {
            // The whole name resolved to a class; a class is not a constant.
            return Err(EvalError::NonConst);
        };
        if rest.len() > 1 {
            self.phase.diags.error(
                self.tc.file,
                last.pos,
                ErrorKind::CannotResolve,
                format!("could not resolve {}", last.as_str()),
            );
            return Err(EvalError::Fail);
        }
        match resolve_field(env, &sym, last.as_str()) {
            Some(field) => self.field_const(field),
            None => {
                self.phase.diags.error(
                    self.tc.file,
                    last.pos,
                    ErrorKind::CannotResolve,
                    format!("could not resolve {}", last.as_str()),
                );
                Err(EvalError::Fail)
            }
        }
    }

    fn field_const(&self, field: FieldInfo) -> Result<Const, EvalError> {
        if field.access & ACC_ENUM != 0 {
            return Ok(Const::EnumConstant(field.sym));
        }
        match self.phase.field_value(&field.sym) {
            Some(value) => Ok(value),
            None => Err(EvalError::NonConst),
        }
    }

    /// Resolves a type tree for a class literal or cast against the class's
    /// scope.
    pub(crate) fn bind_ty(&self, tree: &TyTree) -> Type {
        let cx = crate::typebind::ClassCx {
            file: self.tc.file,
            origin: self.tc.origin.clone(),
            scope: self.tc.scope.clone(),
            tyvars: Vec::new(),
            pending: RefCell::new(HashMap::new()),
            diags: self.phase.diags.clone(),
            header_env: self.phase.header_env.clone(),
        };
        cx.bind_ty(tree)
    }

    fn op_err(&self, err: OpErr, pos: text_size::TextSize) -> EvalError {
        match err {
            OpErr::Operand => {
                self.phase.diags.error(
                    self.tc.file,
                    pos,
                    ErrorKind::OperandType,
                    "bad operand type in constant expression",
                );
                EvalError::Fail
            }
            OpErr::NonConst => EvalError::NonConst,
        }
    }
}
