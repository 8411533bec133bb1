//! The header-level parser.
//!
//! Recursive descent over the token stream. Declarations, signatures,
//! constant initializers, and annotations are kept; method and initializer
//! bodies are consumed by balanced-brace matching and never represented.

use javelin_core::Name;
use javelin_types::{
    ClassKind, PrimKind, ACC_ABSTRACT, ACC_DEFAULT, ACC_ENUM, ACC_FINAL, ACC_NATIVE,
    ACC_NON_SEALED, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_SEALED, ACC_STATIC, ACC_STRICT,
    ACC_SYNCHRONIZED, ACC_TRANSIENT, ACC_VARARGS, ACC_VOLATILE,
};
use text_size::TextSize;
use thiserror::Error;

use crate::lexer::lex;
use crate::token::{Keyword, Token, TokenKind};
use crate::tree::*;
use crate::version::LanguageVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedToken,
    UnexpectedInput,
    UnexpectedModifier,
    FeatureNotSupported,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub pos: TextSize,
    pub message: String,
}

/// Parses one compilation unit.
pub fn parse(text: &str, version: LanguageVersion) -> Result<CompUnit, ParseError> {
    let tokens = lex(text, version)?;
    let mut parser = Parser {
        tokens,
        idx: 0,
        version,
    };
    parser.comp_unit()
}

struct Parser {
    tokens: Vec<Token>,
    idx: usize,
    version: LanguageVersion,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.idx].kind
    }

    fn nth(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.idx + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn pos(&self) -> TextSize {
        self.tokens[self.idx].pos()
    }

    fn deprecated_doc(&self) -> bool {
        self.tokens[self.idx].deprecated_doc
    }

    fn bump(&mut self) -> &Token {
        let tok = &self.tokens[self.idx];
        if self.idx + 1 < self.tokens.len() {
            self.idx += 1;
        }
        tok
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_kw(&self, kw: Keyword) -> bool {
        matches!(self.peek(), TokenKind::Kw(k) if *k == kw)
    }

    fn at_contextual(&self, text: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(name) if name.as_str() == text)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: Keyword) -> bool {
        if self.at_kw(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<TextSize, ParseError> {
        if self.at(kind) {
            let pos = self.pos();
            self.bump();
            Ok(pos)
        } else {
            Err(self.unexpected(&format!("expected {}", kind.describe())))
        }
    }

    fn expect_kw(&mut self, kw: Keyword) -> Result<TextSize, ParseError> {
        self.expect(&TokenKind::Kw(kw))
    }

    fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                let pos = self.pos();
                self.bump();
                Ok(Ident { pos, name })
            }
            _ => Err(self.unexpected("expected identifier")),
        }
    }

    fn unexpected(&self, context: &str) -> ParseError {
        ParseError {
            kind: ParseErrorKind::UnexpectedToken,
            pos: self.pos(),
            message: format!("unexpected token {}: {context}", self.peek().describe()),
        }
    }

    /// Two neighbouring tokens with no space between them, for `>` `>`
    /// recombination.
    fn adjacent(&self, n: usize) -> bool {
        match (self.tokens.get(self.idx + n), self.tokens.get(self.idx + n + 1)) {
            (Some(a), Some(b)) => a.range.end() == b.range.start(),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Compilation units
    // ------------------------------------------------------------------

    fn comp_unit(&mut self) -> Result<CompUnit, ParseError> {
        let mut unit = CompUnit::default();
        loop {
            if self.at(&TokenKind::Eof) {
                return Ok(unit);
            }
            if self.eat(&TokenKind::Semi) {
                continue;
            }

            let deprecated = self.deprecated_doc();
            let (mods, mods_pos, annos) = self.modifiers()?;

            if self.at_kw(Keyword::Package) {
                if unit.package.is_some() || mods != 0 {
                    return Err(self.unexpected("package declaration"));
                }
                self.bump();
                let name = self.qualified_name()?;
                self.expect(&TokenKind::Semi)?;
                unit.package = Some(PackageDecl { annos, name });
                continue;
            }

            if self.at_kw(Keyword::Import) {
                if mods != 0 || !annos.is_empty() {
                    return Err(self.unexpected("import declaration"));
                }
                unit.imports.push(self.import_decl()?);
                continue;
            }

            if self.at_module_decl() {
                if unit.module.is_some() || mods != 0 {
                    return Err(self.unexpected("module declaration"));
                }
                unit.module = Some(self.module_decl(annos)?);
                continue;
            }

            let decl = self.ty_decl(mods, mods_pos, annos, deprecated)?;
            unit.decls.push(decl);
        }
    }

    fn at_module_decl(&self) -> bool {
        if self.at_contextual("module") {
            return matches!(self.nth(1), TokenKind::Ident(_));
        }
        self.at_contextual("open")
            && matches!(self.nth(1), TokenKind::Ident(n) if n.as_str() == "module")
    }

    fn qualified_name(&mut self) -> Result<Vec<Ident>, ParseError> {
        let mut idents = vec![self.expect_ident()?];
        while self.at(&TokenKind::Dot) {
            self.bump();
            idents.push(self.expect_ident()?);
        }
        Ok(idents)
    }

    fn import_decl(&mut self) -> Result<ImportDecl, ParseError> {
        let pos = self.expect_kw(Keyword::Import)?;
        let is_static = self.eat_kw(Keyword::Static);
        let mut name = vec![self.expect_ident()?];
        let mut wildcard = false;
        while self.eat(&TokenKind::Dot) {
            if self.at(&TokenKind::Star) {
                self.bump();
                wildcard = true;
                break;
            }
            name.push(self.expect_ident()?);
        }
        self.expect(&TokenKind::Semi)?;
        Ok(ImportDecl {
            pos,
            name,
            is_static,
            wildcard,
        })
    }

    // ------------------------------------------------------------------
    // Modifiers and annotations
    // ------------------------------------------------------------------

    /// Parses any run of modifiers and annotations, in any order.
    fn modifiers(&mut self) -> Result<(Mods, TextSize, Vec<Anno>), ParseError> {
        let start = self.pos();
        let mut mods: Mods = 0;
        let mut annos = Vec::new();
        loop {
            let bit = match self.peek() {
                TokenKind::Kw(Keyword::Public) => ACC_PUBLIC,
                TokenKind::Kw(Keyword::Protected) => ACC_PROTECTED,
                TokenKind::Kw(Keyword::Private) => ACC_PRIVATE,
                TokenKind::Kw(Keyword::Static) => ACC_STATIC,
                TokenKind::Kw(Keyword::Final) => ACC_FINAL,
                TokenKind::Kw(Keyword::Abstract) => ACC_ABSTRACT,
                TokenKind::Kw(Keyword::Native) => ACC_NATIVE,
                TokenKind::Kw(Keyword::Synchronized) => ACC_SYNCHRONIZED,
                TokenKind::Kw(Keyword::Transient) => ACC_TRANSIENT,
                TokenKind::Kw(Keyword::Volatile) => ACC_VOLATILE,
                TokenKind::Kw(Keyword::Strictfp) => ACC_STRICT,
                TokenKind::Kw(Keyword::Default) => ACC_DEFAULT,
                TokenKind::At if !matches!(self.nth(1), TokenKind::Kw(Keyword::Interface)) => {
                    annos.push(self.annotation()?);
                    continue;
                }
                TokenKind::Ident(name) if name.as_str() == "sealed" && self.at_sealed_decl(1) => {
                    self.require_sealed()?;
                    ACC_SEALED
                }
                TokenKind::Ident(name)
                    if name.as_str() == "non"
                        && self.adjacent(0)
                        && matches!(self.nth(1), TokenKind::Minus)
                        && self.adjacent(1)
                        && matches!(self.nth(2), TokenKind::Ident(n) if n.as_str() == "sealed") =>
                {
                    self.require_sealed()?;
                    self.bump();
                    self.bump();
                    ACC_NON_SEALED
                }
                _ => break,
            };
            if mods & bit != 0 {
                return Err(ParseError {
                    kind: ParseErrorKind::UnexpectedModifier,
                    pos: self.pos(),
                    message: format!("repeated modifier {}", self.peek().describe()),
                });
            }
            mods |= bit;
            self.bump();
        }
        Ok((mods, start, annos))
    }

    /// `sealed` is contextual: only a modifier when a type declaration (or
    /// further modifiers) follow.
    fn at_sealed_decl(&self, from: usize) -> bool {
        matches!(
            self.nth(from),
            TokenKind::Kw(
                Keyword::Class
                    | Keyword::Interface
                    | Keyword::Enum
                    | Keyword::Abstract
                    | Keyword::Public
                    | Keyword::Protected
                    | Keyword::Private
                    | Keyword::Static
                    | Keyword::Final
                    | Keyword::Strictfp
            ) | TokenKind::At
        ) || matches!(self.nth(from), TokenKind::Ident(n) if n.as_str() == "record")
    }

    fn require_sealed(&self) -> Result<(), ParseError> {
        if !self.version.supports_sealed() {
            return Err(ParseError {
                kind: ParseErrorKind::FeatureNotSupported,
                pos: self.pos(),
                message: format!(
                    "sealed types are not supported at language level {}",
                    self.version.level()
                ),
            });
        }
        Ok(())
    }

    fn annotation(&mut self) -> Result<Anno, ParseError> {
        let pos = self.expect(&TokenKind::At)?;
        let name = self.qualified_name()?;
        let mut args = Vec::new();
        if self.at(&TokenKind::LParen) {
            self.bump();
            if !self.at(&TokenKind::RParen) {
                loop {
                    args.push(self.annotation_arg()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RParen)?;
        }
        Ok(Anno { pos, name, args })
    }

    fn annotation_arg(&mut self) -> Result<Expr, ParseError> {
        if let TokenKind::Ident(_) = self.peek() {
            if matches!(self.nth(1), TokenKind::Assign) {
                let name = self.expect_ident()?;
                let pos = self.expect(&TokenKind::Assign)?;
                let value = self.element_value()?;
                return Ok(Expr::Assign {
                    pos,
                    name,
                    value: Box::new(value),
                });
            }
        }
        self.element_value()
    }

    fn element_value(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            TokenKind::At => Ok(Expr::Anno(self.annotation()?)),
            TokenKind::LBrace => self.array_init(),
            _ => self.expr(),
        }
    }

    fn array_init(&mut self) -> Result<Expr, ParseError> {
        let pos = self.expect(&TokenKind::LBrace)?;
        let mut elems = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            elems.push(self.element_value()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::ArrayInit { pos, elems })
    }

    // ------------------------------------------------------------------
    // Type declarations
    // ------------------------------------------------------------------

    fn ty_decl(
        &mut self,
        mods: Mods,
        mods_pos: TextSize,
        annos: Vec<Anno>,
        deprecated: bool,
    ) -> Result<TyDecl, ParseError> {
        if self.at_kw(Keyword::Class) {
            self.bump();
            return self.class_rest(ClassKind::Class, mods, mods_pos, annos, deprecated);
        }
        if self.at_kw(Keyword::Interface) {
            self.bump();
            return self.interface_rest(ClassKind::Interface, mods, mods_pos, annos, deprecated);
        }
        if self.at_kw(Keyword::Enum) {
            self.bump();
            return self.enum_rest(mods, mods_pos, annos, deprecated);
        }
        if self.at(&TokenKind::At) && matches!(self.nth(1), TokenKind::Kw(Keyword::Interface)) {
            self.bump();
            self.bump();
            return self.interface_rest(ClassKind::Annotation, mods, mods_pos, annos, deprecated);
        }
        if self.at_contextual("record") && matches!(self.nth(1), TokenKind::Ident(_)) {
            if !self.version.supports_records() {
                return Err(ParseError {
                    kind: ParseErrorKind::FeatureNotSupported,
                    pos: self.pos(),
                    message: format!(
                        "records are not supported at language level {}",
                        self.version.level()
                    ),
                });
            }
            self.bump();
            return self.record_rest(mods, mods_pos, annos, deprecated);
        }
        Err(self.unexpected("expected type declaration"))
    }

    fn class_rest(
        &mut self,
        kind: ClassKind,
        mods: Mods,
        pos: TextSize,
        annos: Vec<Anno>,
        deprecated: bool,
    ) -> Result<TyDecl, ParseError> {
        let name = self.expect_ident()?;
        let typarams = self.ty_params_opt()?;
        let extends = if self.eat_kw(Keyword::Extends) {
            Some(self.class_ty()?)
        } else {
            None
        };
        let implements = if self.eat_kw(Keyword::Implements) {
            self.class_ty_list()?
        } else {
            Vec::new()
        };
        let permits = self.permits_opt()?;
        let members = self.class_body(&name)?;
        Ok(TyDecl {
            pos,
            annos,
            mods,
            kind,
            name,
            typarams,
            extends,
            implements,
            permits,
            components: Vec::new(),
            members,
            javadoc_deprecated: deprecated,
        })
    }

    fn interface_rest(
        &mut self,
        kind: ClassKind,
        mods: Mods,
        pos: TextSize,
        annos: Vec<Anno>,
        deprecated: bool,
    ) -> Result<TyDecl, ParseError> {
        let name = self.expect_ident()?;
        let typarams = self.ty_params_opt()?;
        // An interface's superinterfaces are written with `extends`.
        let implements = if self.eat_kw(Keyword::Extends) {
            self.class_ty_list()?
        } else {
            Vec::new()
        };
        let permits = self.permits_opt()?;
        let members = self.class_body(&name)?;
        Ok(TyDecl {
            pos,
            annos,
            mods,
            kind,
            name,
            typarams,
            extends: None,
            implements,
            permits,
            components: Vec::new(),
            members,
            javadoc_deprecated: deprecated,
        })
    }

    fn enum_rest(
        &mut self,
        mods: Mods,
        pos: TextSize,
        annos: Vec<Anno>,
        deprecated: bool,
    ) -> Result<TyDecl, ParseError> {
        let name = self.expect_ident()?;
        let implements = if self.eat_kw(Keyword::Implements) {
            self.class_ty_list()?
        } else {
            Vec::new()
        };
        self.expect(&TokenKind::LBrace)?;

        let mut members = Vec::new();
        // Enum constants become implicit public static final fields of the
        // enum type.
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Semi) {
            let const_deprecated = self.deprecated_doc();
            let mut const_annos = Vec::new();
            while self.at(&TokenKind::At) {
                const_annos.push(self.annotation()?);
            }
            let const_name = self.expect_ident()?;
            if self.at(&TokenKind::LParen) {
                self.skip_balanced(&TokenKind::LParen, &TokenKind::RParen)?;
            }
            if self.at(&TokenKind::LBrace) {
                self.skip_balanced(&TokenKind::LBrace, &TokenKind::RBrace)?;
            }
            members.push(Member::Field(VarDecl {
                pos: const_name.pos,
                annos: const_annos,
                mods: ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM,
                ty: TyTree::Class(ClassTyTree {
                    pos: const_name.pos,
                    segments: vec![ClassTySegment {
                        name: name.clone(),
                        targs: None,
                        annos: Vec::new(),
                    }],
                }),
                name: const_name,
                init: None,
                javadoc_deprecated: const_deprecated,
            }));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        if self.eat(&TokenKind::Semi) {
            while !self.at(&TokenKind::RBrace) {
                if self.eat(&TokenKind::Semi) {
                    continue;
                }
                members.extend(self.member(&name)?);
            }
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(TyDecl {
            pos,
            annos,
            mods,
            kind: ClassKind::Enum,
            name,
            typarams: Vec::new(),
            extends: None,
            implements,
            permits: Vec::new(),
            components: Vec::new(),
            members,
            javadoc_deprecated: deprecated,
        })
    }

    fn record_rest(
        &mut self,
        mods: Mods,
        pos: TextSize,
        annos: Vec<Anno>,
        deprecated: bool,
    ) -> Result<TyDecl, ParseError> {
        let name = self.expect_ident()?;
        let typarams = self.ty_params_opt()?;
        self.expect(&TokenKind::LParen)?;
        let mut components = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                components.push(self.formal_param()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let implements = if self.eat_kw(Keyword::Implements) {
            self.class_ty_list()?
        } else {
            Vec::new()
        };
        let members = self.class_body(&name)?;
        Ok(TyDecl {
            pos,
            annos,
            mods,
            kind: ClassKind::Record,
            name,
            typarams,
            extends: None,
            implements,
            permits: Vec::new(),
            components,
            members,
            javadoc_deprecated: deprecated,
        })
    }

    fn permits_opt(&mut self) -> Result<Vec<ClassTyTree>, ParseError> {
        if self.at_contextual("permits") {
            self.require_sealed()?;
            self.bump();
            return self.class_ty_list();
        }
        Ok(Vec::new())
    }

    fn class_ty_list(&mut self) -> Result<Vec<ClassTyTree>, ParseError> {
        let mut list = vec![self.class_ty()?];
        while self.eat(&TokenKind::Comma) {
            list.push(self.class_ty()?);
        }
        Ok(list)
    }

    // ------------------------------------------------------------------
    // Class bodies and members
    // ------------------------------------------------------------------

    fn class_body(&mut self, class_name: &Ident) -> Result<Vec<Member>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            if self.eat(&TokenKind::Semi) {
                continue;
            }
            members.extend(self.member(class_name)?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(members)
    }

    /// One member declaration: empty for skipped initializer blocks, several
    /// for a multi-declarator field.
    fn member(&mut self, class_name: &Ident) -> Result<Vec<Member>, ParseError> {
        let deprecated = self.deprecated_doc();
        let (mods, mods_pos, annos) = self.modifiers()?;

        // Static and instance initializer blocks carry no header information.
        if self.at(&TokenKind::LBrace) {
            self.skip_balanced(&TokenKind::LBrace, &TokenKind::RBrace)?;
            return Ok(Vec::new());
        }

        if self.at_kw(Keyword::Class)
            || self.at_kw(Keyword::Interface)
            || self.at_kw(Keyword::Enum)
            || (self.at(&TokenKind::At) && matches!(self.nth(1), TokenKind::Kw(Keyword::Interface)))
            || (self.at_contextual("record")
                && matches!(self.nth(1), TokenKind::Ident(_))
                && matches!(self.nth(2), TokenKind::Lt | TokenKind::LParen))
        {
            let decl = self.ty_decl(mods, mods_pos, annos, deprecated)?;
            return Ok(vec![Member::Ty(decl)]);
        }

        // Generic method.
        if self.at(&TokenKind::Lt) {
            let typarams = self.ty_params_opt()?;
            let ret = self.ty_tree()?;
            let name = self.expect_ident()?;
            let method =
                self.method_rest(mods, mods_pos, annos, typarams, ret, name, false, deprecated)?;
            return Ok(vec![Member::Method(method)]);
        }

        // Constructor, or a record's compact constructor.
        if let TokenKind::Ident(name) = self.peek() {
            if name == &class_name.name
                && matches!(self.nth(1), TokenKind::LParen | TokenKind::LBrace)
            {
                let name = self.expect_ident()?;
                if self.at(&TokenKind::LBrace) {
                    self.skip_balanced(&TokenKind::LBrace, &TokenKind::RBrace)?;
                    return Ok(Vec::new());
                }
                let ret = TyTree::Void { pos: name.pos };
                let method = self
                    .method_rest(mods, mods_pos, annos, Vec::new(), ret, name, true, deprecated)?;
                return Ok(vec![Member::Method(method)]);
            }
        }

        let ty = self.ty_tree()?;
        let name = self.expect_ident()?;
        if self.at(&TokenKind::LParen) {
            let method =
                self.method_rest(mods, mods_pos, annos, Vec::new(), ty, name, false, deprecated)?;
            return Ok(vec![Member::Method(method)]);
        }

        // One or more field declarators sharing a base type.
        let mut fields = Vec::new();
        let mut decl_name = name;
        loop {
            let declared_ty = self.dims(ty.clone())?;
            let init = if self.eat(&TokenKind::Assign) {
                Some(self.variable_init()?)
            } else {
                None
            };
            fields.push(VarDecl {
                pos: decl_name.pos,
                annos: annos.clone(),
                mods,
                ty: declared_ty,
                name: decl_name,
                init,
                javadoc_deprecated: deprecated,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            decl_name = self.expect_ident()?;
        }
        self.expect(&TokenKind::Semi)?;
        Ok(fields.into_iter().map(Member::Field).collect())
    }

    fn variable_init(&mut self) -> Result<Expr, ParseError> {
        if self.at(&TokenKind::LBrace) {
            return self.array_init();
        }
        self.expr()
    }

    #[allow(clippy::too_many_arguments)]
    fn method_rest(
        &mut self,
        mods: Mods,
        pos: TextSize,
        annos: Vec<Anno>,
        typarams: Vec<TyParamTree>,
        ret: TyTree,
        name: Ident,
        is_constructor: bool,
        deprecated: bool,
    ) -> Result<MethDecl, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut receiver = None;
        let mut params = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                let param = self.formal_param()?;
                if param.name.as_str() == "this" {
                    receiver = Some(param);
                } else {
                    params.push(param);
                }
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;

        let throws = if self.eat_kw(Keyword::Throws) {
            self.class_ty_list()?
        } else {
            Vec::new()
        };

        let mut default_value = None;
        if self.at_kw(Keyword::Default) {
            self.bump();
            default_value = Some(self.element_value()?);
            self.expect(&TokenKind::Semi)?;
        } else if self.at(&TokenKind::LBrace) {
            self.skip_balanced(&TokenKind::LBrace, &TokenKind::RBrace)?;
        } else {
            self.expect(&TokenKind::Semi)?;
        }

        Ok(MethDecl {
            pos,
            annos,
            mods,
            typarams,
            ret,
            name,
            receiver,
            params,
            throws,
            default_value,
            is_constructor,
            javadoc_deprecated: deprecated,
        })
    }

    fn formal_param(&mut self) -> Result<VarDecl, ParseError> {
        let deprecated = self.deprecated_doc();
        let (mods, _, annos) = self.modifiers()?;
        let mut ty = self.ty_tree()?;
        let varargs = self.eat(&TokenKind::Ellipsis);
        let name = if self.at_kw(Keyword::This) {
            let pos = self.pos();
            self.bump();
            Ident {
                pos,
                name: Name::new("this"),
            }
        } else {
            self.expect_ident()?
        };
        ty = self.dims(ty)?;
        let mut mods = mods;
        if varargs {
            mods |= ACC_VARARGS;
            ty = TyTree::Array {
                pos: ty.pos(),
                elem: Box::new(ty),
                annos: Vec::new(),
            };
        }
        Ok(VarDecl {
            pos: name.pos,
            annos,
            mods,
            ty,
            name,
            init: None,
            javadoc_deprecated: deprecated,
        })
    }

    /// C-style trailing array dimensions.
    fn dims(&mut self, mut ty: TyTree) -> Result<TyTree, ParseError> {
        while self.at(&TokenKind::LBracket) {
            let pos = self.pos();
            self.bump();
            self.expect(&TokenKind::RBracket)?;
            ty = TyTree::Array {
                pos,
                elem: Box::new(ty),
                annos: Vec::new(),
            };
        }
        Ok(ty)
    }

    fn skip_balanced(&mut self, open: &TokenKind, close: &TokenKind) -> Result<(), ParseError> {
        let start = self.pos();
        self.expect(open)?;
        let mut depth = 1usize;
        loop {
            if self.at(&TokenKind::Eof) {
                return Err(ParseError {
                    kind: ParseErrorKind::UnexpectedInput,
                    pos: start,
                    message: format!("unbalanced {}", open.describe()),
                });
            }
            if self.at(open) {
                depth += 1;
            } else if self.at(close) {
                depth -= 1;
                if depth == 0 {
                    self.bump();
                    return Ok(());
                }
            }
            self.bump();
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn ty_params_opt(&mut self) -> Result<Vec<TyParamTree>, ParseError> {
        if !self.at(&TokenKind::Lt) {
            return Ok(Vec::new());
        }
        self.bump();
        let mut out = Vec::new();
        loop {
            let mut annos = Vec::new();
            while self.at(&TokenKind::At) {
                annos.push(self.annotation()?);
            }
            let name = self.expect_ident()?;
            let mut bounds = Vec::new();
            if self.eat_kw(Keyword::Extends) {
                bounds.push(self.class_ty()?);
                while self.eat(&TokenKind::Amp) {
                    bounds.push(self.class_ty()?);
                }
            }
            out.push(TyParamTree {
                pos: name.pos,
                annos,
                name,
                bounds,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::Gt)?;
        Ok(out)
    }

    fn class_ty(&mut self) -> Result<ClassTyTree, ParseError> {
        let pos = self.pos();
        let mut segments = Vec::new();
        loop {
            let mut annos = Vec::new();
            while self.at(&TokenKind::At) {
                annos.push(self.annotation()?);
            }
            let name = self.expect_ident()?;
            let targs = if self.at(&TokenKind::Lt) {
                Some(self.ty_args()?)
            } else {
                None
            };
            segments.push(ClassTySegment { name, targs, annos });
            if !self.at(&TokenKind::Dot) || !matches!(self.nth(1), TokenKind::Ident(_) | TokenKind::At) {
                break;
            }
            self.bump();
        }
        Ok(ClassTyTree { pos, segments })
    }

    fn ty_args(&mut self) -> Result<Vec<TyTree>, ParseError> {
        self.expect(&TokenKind::Lt)?;
        let mut args = Vec::new();
        if !self.at(&TokenKind::Gt) {
            loop {
                args.push(self.ty_arg()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::Gt)?;
        Ok(args)
    }

    fn ty_arg(&mut self) -> Result<TyTree, ParseError> {
        let mut annos = Vec::new();
        while self.at(&TokenKind::At) {
            annos.push(self.annotation()?);
        }
        if self.at(&TokenKind::Question) {
            let pos = self.pos();
            self.bump();
            let bound = if self.eat_kw(Keyword::Extends) {
                WildBound::Extends(Box::new(self.ty_tree()?))
            } else if self.eat_kw(Keyword::Super) {
                WildBound::Super(Box::new(self.ty_tree()?))
            } else {
                WildBound::None
            };
            return Ok(TyTree::Wild { pos, bound, annos });
        }
        let ty = self.ty_tree_with_annos(annos)?;
        Ok(ty)
    }

    fn ty_tree(&mut self) -> Result<TyTree, ParseError> {
        let mut annos = Vec::new();
        while self.at(&TokenKind::At) {
            annos.push(self.annotation()?);
        }
        self.ty_tree_with_annos(annos)
    }

    fn ty_tree_with_annos(&mut self, annos: Vec<Anno>) -> Result<TyTree, ParseError> {
        let pos = self.pos();
        let base = if let Some(kind) = self.prim_kind() {
            self.bump();
            TyTree::Prim { pos, kind, annos }
        } else if self.at_kw(Keyword::Void) {
            self.bump();
            TyTree::Void { pos }
        } else {
            let mut class = self.class_ty()?;
            if let Some(first) = class.segments.first_mut() {
                let mut merged = annos;
                merged.append(&mut first.annos);
                first.annos = merged;
            }
            TyTree::Class(class)
        };
        // Array dimensions, possibly annotated.
        let mut ty = base;
        loop {
            let mut dim_annos = Vec::new();
            let save = self.idx;
            while self.at(&TokenKind::At) {
                dim_annos.push(self.annotation()?);
            }
            if self.at(&TokenKind::LBracket) && matches!(self.nth(1), TokenKind::RBracket) {
                let pos = self.pos();
                self.bump();
                self.bump();
                ty = TyTree::Array {
                    pos,
                    elem: Box::new(ty),
                    annos: dim_annos,
                };
            } else {
                self.idx = save;
                break;
            }
        }
        Ok(ty)
    }

    fn prim_kind(&self) -> Option<PrimKind> {
        Some(match self.peek() {
            TokenKind::Kw(Keyword::Boolean) => PrimKind::Boolean,
            TokenKind::Kw(Keyword::Byte) => PrimKind::Byte,
            TokenKind::Kw(Keyword::Short) => PrimKind::Short,
            TokenKind::Kw(Keyword::Int) => PrimKind::Int,
            TokenKind::Kw(Keyword::Long) => PrimKind::Long,
            TokenKind::Kw(Keyword::Char) => PrimKind::Char,
            TokenKind::Kw(Keyword::Float) => PrimKind::Float,
            TokenKind::Kw(Keyword::Double) => PrimKind::Double,
            _ => return None,
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let cond = self.binary_expr(0)?;
        if self.at(&TokenKind::Question) {
            let pos = self.pos();
            self.bump();
            let then_branch = self.expr()?;
            self.expect(&TokenKind::Colon)?;
            let else_branch = self.expr()?;
            return Ok(Expr::Conditional {
                pos,
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }
        Ok(cond)
    }

    fn binary_expr(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.unary_expr()?;
        loop {
            let Some((op, prec, toks)) = self.peek_binop() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let pos = self.pos();
            for _ in 0..toks {
                self.bump();
            }
            let rhs = self.binary_expr(prec + 1)?;
            lhs = Expr::Binary {
                pos,
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    /// The operator at the cursor, its precedence, and how many tokens it
    /// spans (adjacent `>`s recombine into shifts here).
    fn peek_binop(&self) -> Option<(BinOp, u8, usize)> {
        Some(match self.peek() {
            TokenKind::BarBar => (BinOp::OrOr, 1, 1),
            TokenKind::AmpAmp => (BinOp::AndAnd, 2, 1),
            TokenKind::Bar => (BinOp::BitOr, 3, 1),
            TokenKind::Caret => (BinOp::BitXor, 4, 1),
            TokenKind::Amp => (BinOp::BitAnd, 5, 1),
            TokenKind::EqEq => (BinOp::Eq, 6, 1),
            TokenKind::NotEq => (BinOp::Ne, 6, 1),
            TokenKind::Lt => (BinOp::Lt, 7, 1),
            TokenKind::Le => (BinOp::Le, 7, 1),
            TokenKind::Ge => (BinOp::Ge, 7, 1),
            TokenKind::Gt => {
                if matches!(self.nth(1), TokenKind::Gt) && self.adjacent(0) {
                    if matches!(self.nth(2), TokenKind::Gt) && self.adjacent(1) {
                        (BinOp::UShr, 8, 3)
                    } else {
                        (BinOp::Shr, 8, 2)
                    }
                } else {
                    (BinOp::Gt, 7, 1)
                }
            }
            TokenKind::Shl => (BinOp::Shl, 8, 1),
            TokenKind::Plus => (BinOp::Add, 9, 1),
            TokenKind::Minus => (BinOp::Sub, 9, 1),
            TokenKind::Star => (BinOp::Mult, 10, 1),
            TokenKind::Slash => (BinOp::Div, 10, 1),
            TokenKind::Percent => (BinOp::Mod, 10, 1),
            _ => return None,
        })
    }

    fn unary_expr(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        let op = match self.peek() {
            TokenKind::Bang => Some(UnOp::Not),
            TokenKind::Tilde => Some(UnOp::BitNot),
            TokenKind::Plus => Some(UnOp::Plus),
            TokenKind::Minus => Some(UnOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.unary_expr()?;
            return Ok(Expr::Unary {
                pos,
                op,
                operand: Box::new(operand),
            });
        }
        if self.at(&TokenKind::LParen) {
            if let Some(cast) = self.try_cast()? {
                return Ok(cast);
            }
            let pos = self.pos();
            self.bump();
            let expr = self.expr()?;
            self.expect(&TokenKind::RParen)?;
            return Ok(Expr::Paren {
                pos,
                expr: Box::new(expr),
            });
        }
        self.primary()
    }

    /// Distinguishes `(T) operand` from a parenthesized expression, with
    /// backtracking.
    fn try_cast(&mut self) -> Result<Option<Expr>, ParseError> {
        let save = self.idx;
        let pos = self.pos();
        self.bump(); // (
        let is_prim = self.prim_kind().is_some();
        let ty = match self.ty_tree_with_annos(Vec::new()) {
            Ok(ty) => ty,
            Err(_) => {
                self.idx = save;
                return Ok(None);
            }
        };
        if !self.at(&TokenKind::RParen) {
            self.idx = save;
            return Ok(None);
        }
        let operand_follows = match self.nth(1) {
            TokenKind::Ident(_)
            | TokenKind::IntLit { .. }
            | TokenKind::FloatLit { .. }
            | TokenKind::CharLit(_)
            | TokenKind::StringLit(_)
            | TokenKind::LParen
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::Kw(Keyword::True | Keyword::False | Keyword::Null) => true,
            // `+`/`-` after a class-type cast is a binary operator; after a
            // primitive cast it begins the operand.
            TokenKind::Plus | TokenKind::Minus => is_prim,
            _ => false,
        };
        if !operand_follows {
            self.idx = save;
            return Ok(None);
        }
        self.bump(); // )
        let operand = self.unary_expr()?;
        Ok(Some(Expr::Cast {
            pos,
            ty,
            expr: Box::new(operand),
        }))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        match self.peek().clone() {
            TokenKind::IntLit { value, long } => {
                self.bump();
                let value = if long {
                    Lit::Long(value as i64)
                } else {
                    Lit::Int(value as u32 as i32)
                };
                Ok(Expr::Literal { pos, value })
            }
            TokenKind::FloatLit { value, float } => {
                self.bump();
                let value = if float {
                    Lit::Float(value as f32)
                } else {
                    Lit::Double(value)
                };
                Ok(Expr::Literal { pos, value })
            }
            TokenKind::CharLit(unit) => {
                self.bump();
                Ok(Expr::Literal {
                    pos,
                    value: Lit::Char(unit),
                })
            }
            TokenKind::StringLit(text) => {
                self.bump();
                Ok(Expr::Literal {
                    pos,
                    value: Lit::String(text),
                })
            }
            TokenKind::Kw(Keyword::True) => {
                self.bump();
                Ok(Expr::Literal {
                    pos,
                    value: Lit::Boolean(true),
                })
            }
            TokenKind::Kw(Keyword::False) => {
                self.bump();
                Ok(Expr::Literal {
                    pos,
                    value: Lit::Boolean(false),
                })
            }
            TokenKind::Kw(Keyword::Null) => {
                self.bump();
                Ok(Expr::Literal {
                    pos,
                    value: Lit::Null,
                })
            }
            TokenKind::At => Ok(Expr::Anno(self.annotation()?)),
            TokenKind::LBrace => self.array_init(),
            TokenKind::Kw(_) if self.prim_kind().is_some() => {
                // `int.class`, `int[].class`.
                let ty = self.ty_tree_with_annos(Vec::new())?;
                self.expect(&TokenKind::Dot)?;
                self.expect_kw(Keyword::Class)?;
                Ok(Expr::ClassLit { pos, ty })
            }
            TokenKind::Kw(Keyword::Void) => {
                self.bump();
                let ty = TyTree::Void { pos };
                self.expect(&TokenKind::Dot)?;
                self.expect_kw(Keyword::Class)?;
                Ok(Expr::ClassLit { pos, ty })
            }
            TokenKind::Ident(_) => {
                let mut idents = vec![self.expect_ident()?];
                loop {
                    if self.at(&TokenKind::Dot) {
                        match self.nth(1) {
                            TokenKind::Ident(_) => {
                                self.bump();
                                idents.push(self.expect_ident()?);
                                continue;
                            }
                            TokenKind::Kw(Keyword::Class) => {
                                self.bump();
                                self.bump();
                                let ty = class_ty_from_idents(idents);
                                return Ok(Expr::ClassLit { pos, ty });
                            }
                            _ => break,
                        }
                    }
                    if self.at(&TokenKind::LBracket)
                        && matches!(self.nth(1), TokenKind::RBracket)
                    {
                        // `T[].class`
                        let mut ty = class_ty_from_idents(idents);
                        ty = self.dims(ty)?;
                        self.expect(&TokenKind::Dot)?;
                        self.expect_kw(Keyword::Class)?;
                        return Ok(Expr::ClassLit { pos, ty });
                    }
                    break;
                }
                Ok(Expr::Name { idents })
            }
            _ => Err(self.unexpected("expected expression")),
        }
    }

    // ------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------

    fn module_decl(&mut self, annos: Vec<Anno>) -> Result<ModDecl, ParseError> {
        let pos = self.pos();
        let is_open = if self.at_contextual("open") {
            self.bump();
            true
        } else {
            false
        };
        if !self.at_contextual("module") {
            return Err(self.unexpected("expected 'module'"));
        }
        self.bump();
        let name = self.qualified_name()?;
        self.expect(&TokenKind::LBrace)?;
        let mut directives = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            directives.push(self.module_directive()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(ModDecl {
            pos,
            annos,
            is_open,
            name,
            directives,
        })
    }

    fn module_directive(&mut self) -> Result<ModDirective, ParseError> {
        let pos = self.pos();
        if self.at_contextual("requires") {
            self.bump();
            let mut is_transitive = false;
            let mut is_static = false;
            loop {
                if self.at_contextual("transitive")
                    && !matches!(self.nth(1), TokenKind::Semi | TokenKind::Dot)
                {
                    self.bump();
                    is_transitive = true;
                } else if self.at_kw(Keyword::Static) {
                    self.bump();
                    is_static = true;
                } else {
                    break;
                }
            }
            let module = self.qualified_name()?;
            self.expect(&TokenKind::Semi)?;
            return Ok(ModDirective::Requires {
                pos,
                is_transitive,
                is_static,
                module,
            });
        }
        if self.at_contextual("exports") || self.at_contextual("opens") {
            let is_exports = self.at_contextual("exports");
            self.bump();
            let package = self.qualified_name()?;
            let mut to = Vec::new();
            if self.at_contextual("to") {
                self.bump();
                loop {
                    to.push(self.qualified_name()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::Semi)?;
            return Ok(if is_exports {
                ModDirective::Exports { pos, package, to }
            } else {
                ModDirective::Opens { pos, package, to }
            });
        }
        if self.at_contextual("uses") {
            self.bump();
            let service = self.qualified_name()?;
            self.expect(&TokenKind::Semi)?;
            return Ok(ModDirective::Uses { pos, service });
        }
        if self.at_contextual("provides") {
            self.bump();
            let service = self.qualified_name()?;
            if !self.at_contextual("with") {
                return Err(self.unexpected("expected 'with'"));
            }
            self.bump();
            let mut implementations = Vec::new();
            loop {
                implementations.push(self.qualified_name()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::Semi)?;
            return Ok(ModDirective::Provides {
                pos,
                service,
                implementations,
            });
        }
        Err(self.unexpected("expected module directive"))
    }
}

fn class_ty_from_idents(idents: Vec<Ident>) -> TyTree {
    let pos = idents[0].pos;
    TyTree::Class(ClassTyTree {
        pos,
        segments: idents
            .into_iter()
            .map(|name| ClassTySegment {
                name,
                targs: None,
                annos: Vec::new(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_ok(text: &str) -> CompUnit {
        parse(text, LanguageVersion::LATEST).unwrap()
    }

    #[test]
    fn package_imports_and_class() {
        let unit = parse_ok(
            "package com.example;\n\
             import java.util.List;\n\
             import static java.lang.Math.*;\n\
             public class Foo extends Bar implements Baz, Qux {}\n",
        );
        assert_eq!(unit.package.as_ref().unwrap().binary_name(), "com/example");
        assert_eq!(unit.imports.len(), 2);
        assert!(unit.imports[1].is_static);
        assert!(unit.imports[1].wildcard);
        let decl = &unit.decls[0];
        assert_eq!(decl.kind, ClassKind::Class);
        assert_eq!(decl.name.as_str(), "Foo");
        assert_eq!(decl.mods & ACC_PUBLIC, ACC_PUBLIC);
        assert!(decl.extends.is_some());
        assert_eq!(decl.implements.len(), 2);
    }

    #[test]
    fn generic_class_with_members() {
        let unit = parse_ok(
            "class Box<T extends Number & Comparable<T>> {\n\
             \u{20} private final T value = null;\n\
             \u{20} <U> U map(U seed, int count) throws Exception { return seed; }\n\
             }\n",
        );
        let decl = &unit.decls[0];
        assert_eq!(decl.typarams.len(), 1);
        assert_eq!(decl.typarams[0].bounds.len(), 2);
        assert_eq!(decl.members.len(), 2);
        match &decl.members[1] {
            Member::Method(m) => {
                assert_eq!(m.typarams.len(), 1);
                assert_eq!(m.params.len(), 2);
                assert_eq!(m.throws.len(), 1);
            }
            other => panic!("expected method, got {other:?}"),
        }
    }

    #[test]
    fn field_with_constant_initializer() {
        let unit = parse_ok("class C { static final int X = 1 + 2 * 3; }");
        let field = match &unit.decls[0].members[0] {
            Member::Field(f) => f,
            other => panic!("expected field, got {other:?}"),
        };
        let init = field.init.as_ref().unwrap();
        match init {
            Expr::Binary { op: BinOp::Add, .. } => {}
            other => panic!("expected addition at the root, got {other:?}"),
        }
    }

    #[test]
    fn multi_declarator_field_splits() {
        let unit = parse_ok("class C { int a = 1, b, c[] = {}; }");
        let fields: Vec<_> = unit.decls[0]
            .members
            .iter()
            .filter_map(|m| match m {
                Member::Field(f) => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(fields.len(), 3);
        assert!(matches!(fields[2].ty, TyTree::Array { .. }));
    }

    #[test]
    fn method_bodies_are_skipped() {
        let unit = parse_ok(
            "class C { int f() { if (true) { return \"}\".length(); } return 0; } int g; }",
        );
        assert_eq!(unit.decls[0].members.len(), 2);
    }

    #[test]
    fn enum_constants_become_fields() {
        let unit = parse_ok("enum E implements Marker { A, B(1) { }, C; void m() {} }");
        let decl = &unit.decls[0];
        assert_eq!(decl.kind, ClassKind::Enum);
        let consts: Vec<_> = decl
            .members
            .iter()
            .filter_map(|m| match m {
                Member::Field(f) if f.mods & ACC_ENUM != 0 => Some(f.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(consts, vec!["A", "B", "C"]);
    }

    #[test]
    fn annotation_declaration_with_default() {
        let unit = parse_ok("@interface Anno { int value() default 42; String name(); }");
        let decl = &unit.decls[0];
        assert_eq!(decl.kind, ClassKind::Annotation);
        match &decl.members[0] {
            Member::Method(m) => assert!(m.default_value.is_some()),
            other => panic!("expected method, got {other:?}"),
        }
    }

    #[test]
    fn annotation_uses() {
        let unit = parse_ok("@Anno(value = 1, other = {2, 3}) @Marker class C {}");
        let decl = &unit.decls[0];
        assert_eq!(decl.annos.len(), 2);
        assert_eq!(decl.annos[0].args.len(), 2);
        assert!(matches!(decl.annos[0].args[0], Expr::Assign { .. }));
    }

    #[test]
    fn shift_operators_recombine() {
        let unit = parse_ok("class C { static final int X = 1 << 2 >> 1 >>> 1; }");
        let field = match &unit.decls[0].members[0] {
            Member::Field(f) => f,
            other => panic!("expected field, got {other:?}"),
        };
        match field.init.as_ref().unwrap() {
            Expr::Binary {
                op: BinOp::UShr, ..
            } => {}
            other => panic!("expected unsigned shift at the root, got {other:?}"),
        }
    }

    #[test]
    fn casts_and_parens() {
        let unit = parse_ok("class C { static final int X = (int) 1L; static final int Y = (X) + 1; }");
        let x = match &unit.decls[0].members[0] {
            Member::Field(f) => f.init.as_ref().unwrap(),
            other => panic!("expected field, got {other:?}"),
        };
        assert!(matches!(x, Expr::Cast { .. }));
        let y = match &unit.decls[0].members[1] {
            Member::Field(f) => f.init.as_ref().unwrap(),
            other => panic!("expected field, got {other:?}"),
        };
        assert!(matches!(y, Expr::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn class_literal() {
        let unit = parse_ok("@Anno(String.class) class C {}");
        match &unit.decls[0].annos[0].args[0] {
            Expr::ClassLit { .. } => {}
            other => panic!("expected class literal, got {other:?}"),
        }
    }

    #[test]
    fn record_declaration() {
        let unit = parse_ok("record Point(int x, int y) implements Shape { static int Z = 0; }");
        let decl = &unit.decls[0];
        assert_eq!(decl.kind, ClassKind::Record);
        assert_eq!(decl.components.len(), 2);
        assert_eq!(decl.implements.len(), 1);
    }

    #[test]
    fn records_gated_by_version() {
        let err = parse(
            "record Point(int x) {}",
            LanguageVersion::new(11).unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::FeatureNotSupported);
    }

    #[test]
    fn sealed_class() {
        let unit = parse_ok("public sealed class Shape permits Circle, Square {} ");
        let decl = &unit.decls[0];
        assert_eq!(decl.mods & ACC_SEALED, ACC_SEALED);
        assert_eq!(decl.permits.len(), 2);
    }

    #[test]
    fn non_sealed_modifier() {
        let unit = parse_ok("non-sealed class Circle extends Shape {}");
        assert_eq!(unit.decls[0].mods & ACC_NON_SEALED, ACC_NON_SEALED);
    }

    #[test]
    fn module_declaration() {
        let unit = parse_ok(
            "open module com.example.app {\n\
             \u{20} requires transitive java.sql;\n\
             \u{20} exports com.example.api to other.mod;\n\
             \u{20} uses com.example.Service;\n\
             \u{20} provides com.example.Service with com.example.Impl;\n\
             }\n",
        );
        let module = unit.module.as_ref().unwrap();
        assert!(module.is_open);
        assert_eq!(dotted(&module.name), "com.example.app");
        assert_eq!(module.directives.len(), 4);
        assert!(matches!(
            module.directives[0],
            ModDirective::Requires {
                is_transitive: true,
                ..
            }
        ));
    }

    #[test]
    fn repeated_modifier_rejected() {
        let err = parse("public public class C {}", LanguageVersion::LATEST).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedModifier);
    }

    #[test]
    fn javadoc_deprecation_is_sniffed() {
        let unit = parse_ok("/** @deprecated use Bar */ class Foo {}");
        assert!(unit.decls[0].javadoc_deprecated);
    }

    #[test]
    fn conditional_expression() {
        let unit = parse_ok("class C { static final int X = true ? 1 : 2; }");
        let field = match &unit.decls[0].members[0] {
            Member::Field(f) => f,
            other => panic!("expected field, got {other:?}"),
        };
        assert!(matches!(
            field.init.as_ref().unwrap(),
            Expr::Conditional { .. }
        ));
    }

    #[test]
    fn receiver_parameter() {
        let unit = parse_ok("class C { void m(C this, int x) {} }");
        match &unit.decls[0].members[0] {
            Member::Method(m) => {
                assert!(m.receiver.is_some());
                assert_eq!(m.params.len(), 1);
            }
            other => panic!("expected method, got {other:?}"),
        }
    }

    #[test]
    fn varargs_parameter() {
        let unit = parse_ok("class C { void m(String... rest) {} }");
        match &unit.decls[0].members[0] {
            Member::Method(m) => {
                assert_eq!(m.params[0].mods & ACC_VARARGS, ACC_VARARGS);
                assert!(matches!(m.params[0].ty, TyTree::Array { .. }));
            }
            other => panic!("expected method, got {other:?}"),
        }
    }
}
