//! The AST the binder consumes.
//!
//! Plain tagged variants per syntactic category, with positions. The binder
//! dispatches by matching on the tags; there is no uniform node trait.

use javelin_core::Name;
use javelin_types::{ClassKind, PrimKind};
use text_size::TextSize;

/// An identifier with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub pos: TextSize,
    pub name: Name,
}

impl Ident {
    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

/// Modifier bits as written; mapped onto class-file access bits by the
/// binder. Matches `javelin_types` flag values.
pub type Mods = u32;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompUnit {
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<TyDecl>,
    pub module: Option<ModDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub annos: Vec<Anno>,
    pub name: Vec<Ident>,
}

impl PackageDecl {
    /// Slash-delimited package name.
    pub fn binary_name(&self) -> String {
        self.name
            .iter()
            .map(Ident::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub pos: TextSize,
    pub name: Vec<Ident>,
    pub is_static: bool,
    pub wildcard: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TyDecl {
    pub pos: TextSize,
    pub annos: Vec<Anno>,
    pub mods: Mods,
    pub kind: ClassKind,
    pub name: Ident,
    pub typarams: Vec<TyParamTree>,
    pub extends: Option<ClassTyTree>,
    pub implements: Vec<ClassTyTree>,
    pub permits: Vec<ClassTyTree>,
    /// Record components; empty unless `kind` is `Record`.
    pub components: Vec<VarDecl>,
    pub members: Vec<Member>,
    pub javadoc_deprecated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Ty(TyDecl),
    Field(VarDecl),
    Method(MethDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TyParamTree {
    pub pos: TextSize,
    pub annos: Vec<Anno>,
    pub name: Ident,
    pub bounds: Vec<ClassTyTree>,
}

/// A (possibly qualified, possibly parameterized) class type reference:
/// a chain of segments, e.g. `java.util.Map.Entry<K, V>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTyTree {
    pub pos: TextSize,
    pub segments: Vec<ClassTySegment>,
}

impl ClassTyTree {
    pub fn idents(&self) -> Vec<Ident> {
        self.segments.iter().map(|s| s.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassTySegment {
    pub name: Ident,
    /// `None` when no `<…>` was written; `Some(vec![])` is a diamond.
    pub targs: Option<Vec<TyTree>>,
    pub annos: Vec<Anno>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TyTree {
    Prim {
        pos: TextSize,
        kind: PrimKind,
        annos: Vec<Anno>,
    },
    Void {
        pos: TextSize,
    },
    Class(ClassTyTree),
    Array {
        pos: TextSize,
        elem: Box<TyTree>,
        annos: Vec<Anno>,
    },
    Wild {
        pos: TextSize,
        bound: WildBound,
        annos: Vec<Anno>,
    },
}

impl TyTree {
    pub fn pos(&self) -> TextSize {
        match self {
            TyTree::Prim { pos, .. }
            | TyTree::Void { pos }
            | TyTree::Array { pos, .. }
            | TyTree::Wild { pos, .. } => *pos,
            TyTree::Class(c) => c.pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WildBound {
    None,
    Extends(Box<TyTree>),
    Super(Box<TyTree>),
}

/// A field, record component, or method parameter declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub pos: TextSize,
    pub annos: Vec<Anno>,
    pub mods: Mods,
    pub ty: TyTree,
    pub name: Ident,
    pub init: Option<Expr>,
    pub javadoc_deprecated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethDecl {
    pub pos: TextSize,
    pub annos: Vec<Anno>,
    pub mods: Mods,
    pub typarams: Vec<TyParamTree>,
    pub ret: TyTree,
    pub name: Ident,
    pub receiver: Option<VarDecl>,
    pub params: Vec<VarDecl>,
    pub throws: Vec<ClassTyTree>,
    /// The `default` value of an annotation element.
    pub default_value: Option<Expr>,
    pub is_constructor: bool,
    pub javadoc_deprecated: bool,
}

/// An annotation use site.
#[derive(Debug, Clone, PartialEq)]
pub struct Anno {
    pub pos: TextSize,
    pub name: Vec<Ident>,
    /// Either `Expr::Assign` entries or a single bare `value` expression.
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        pos: TextSize,
        value: Lit,
    },
    /// A dotted name: a const-var reference or a qualified field access.
    Name {
        idents: Vec<Ident>,
    },
    Unary {
        pos: TextSize,
        op: UnOp,
        operand: Box<Expr>,
    },
    Binary {
        pos: TextSize,
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Cast {
        pos: TextSize,
        ty: TyTree,
        expr: Box<Expr>,
    },
    Conditional {
        pos: TextSize,
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Paren {
        pos: TextSize,
        expr: Box<Expr>,
    },
    ClassLit {
        pos: TextSize,
        ty: TyTree,
    },
    ArrayInit {
        pos: TextSize,
        elems: Vec<Expr>,
    },
    Anno(Anno),
    /// `name = value`, only inside annotation arguments.
    Assign {
        pos: TextSize,
        name: Ident,
        value: Box<Expr>,
    },
}

impl Expr {
    pub fn pos(&self) -> TextSize {
        match self {
            Expr::Literal { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::Binary { pos, .. }
            | Expr::Cast { pos, .. }
            | Expr::Conditional { pos, .. }
            | Expr::Paren { pos, .. }
            | Expr::ClassLit { pos, .. }
            | Expr::ArrayInit { pos, .. }
            | Expr::Assign { pos, .. } => *pos,
            Expr::Name { idents } => idents[0].pos,
            Expr::Anno(anno) => anno.pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(u16),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    BitNot,
    Plus,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Mult,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    UShr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    AndAnd,
    OrOr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModDecl {
    pub pos: TextSize,
    pub annos: Vec<Anno>,
    pub is_open: bool,
    pub name: Vec<Ident>,
    pub directives: Vec<ModDirective>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModDirective {
    Requires {
        pos: TextSize,
        is_transitive: bool,
        is_static: bool,
        module: Vec<Ident>,
    },
    Exports {
        pos: TextSize,
        package: Vec<Ident>,
        to: Vec<Vec<Ident>>,
    },
    Opens {
        pos: TextSize,
        package: Vec<Ident>,
        to: Vec<Vec<Ident>>,
    },
    Uses {
        pos: TextSize,
        service: Vec<Ident>,
    },
    Provides {
        pos: TextSize,
        service: Vec<Ident>,
        implementations: Vec<Vec<Ident>>,
    },
}

/// Joins a dotted-name ident chain into a dotted string.
pub fn dotted(idents: &[Ident]) -> String {
    idents
        .iter()
        .map(Ident::as_str)
        .collect::<Vec<_>>()
        .join(".")
}
