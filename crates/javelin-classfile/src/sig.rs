//! The JVMS generic-signature grammar.
//!
//! All type productions funnel through one tag-dispatched parser whose
//! admissible tags are narrowed by a position mode, instead of one function
//! per grammar rule: primitives are legal only in descriptor-like
//! positions, arrays everywhere but `throws` clauses, and class types and
//! type variables everywhere. Malformed input fails the whole signature;
//! the classpath layer then treats the class as absent.

use crate::desc::{Base, Cursor};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigClass {
    pub typarams: Vec<SigTyParam>,
    pub superclass: SigClassTy,
    pub interfaces: Vec<SigClassTy>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigMethod {
    pub typarams: Vec<SigTyParam>,
    pub params: Vec<SigTy>,
    /// `None` for `void`.
    pub ret: Option<SigTy>,
    /// Class types or type variables.
    pub throws: Vec<SigTy>,
}

/// A type parameter with its bounds in declaration order (class bound first
/// when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigTyParam {
    pub name: String,
    pub bounds: Vec<SigTy>,
}

/// A class type as an outer→inner segment chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigClassTy {
    /// Slash-delimited package prefix, empty for the unnamed package.
    pub package: String,
    pub segments: Vec<SigSegment>,
}

impl SigClassTy {
    /// The binary name: `pkg/Outer$Inner`.
    pub fn binary_name(&self) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push_str(&self.package);
            out.push('/');
        }
        for (idx, seg) in self.segments.iter().enumerate() {
            if idx > 0 {
                out.push('$');
            }
            out.push_str(&seg.name);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigSegment {
    pub name: String,
    pub targs: Vec<SigTyArg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigTyArg {
    /// `*`
    Wild,
    /// `+T`
    Extends(SigTy),
    /// `-T`
    Super(SigTy),
    Exact(SigTy),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigTy {
    Prim(Base),
    Class(SigClassTy),
    TyVar(String),
    Array(Box<SigTy>),
}

/// Which tags [`ty`] admits at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TyPos {
    /// Parameters, returns, array components: primitives included.
    Any,
    /// Bounds, type arguments, field signatures: references only.
    Reference,
    /// `throws`: class types and type variables, no arrays.
    Thrown,
}

pub fn parse_class_signature(sig: &str) -> Result<SigClass> {
    let mut c = Cursor::new(sig);
    let typarams = type_params(&mut c)?;
    // The supertype list runs to the end of the string; its head is the
    // superclass, the rest are interfaces.
    let mut supers = Vec::new();
    while !c.at_end() {
        supers.push(class_ty(&mut c)?);
    }
    if supers.is_empty() {
        return Err(c.bad_signature());
    }
    let superclass = supers.remove(0);
    Ok(SigClass {
        typarams,
        superclass,
        interfaces: supers,
    })
}

pub fn parse_method_signature(sig: &str) -> Result<SigMethod> {
    let mut c = Cursor::new(sig);
    let typarams = type_params(&mut c)?;
    c.expect(b'(').map_err(|_| c.bad_signature())?;
    let mut params = Vec::new();
    while !c.eat(b')') {
        if c.at_end() {
            return Err(c.bad_signature());
        }
        params.push(ty(&mut c, TyPos::Any)?);
    }
    let ret = if c.eat(b'V') {
        None
    } else {
        Some(ty(&mut c, TyPos::Any)?)
    };
    let mut throws = Vec::new();
    while c.eat(b'^') {
        throws.push(ty(&mut c, TyPos::Thrown)?);
    }
    c.finish().map_err(|_| c.bad_signature())?;
    Ok(SigMethod {
        typarams,
        params,
        ret,
        throws,
    })
}

pub fn parse_field_signature(sig: &str) -> Result<SigTy> {
    let mut c = Cursor::new(sig);
    let parsed = ty(&mut c, TyPos::Reference)?;
    c.finish().map_err(|_| c.bad_signature())?;
    Ok(parsed)
}

/// `<A:...:...B:...>`: each parameter is a name followed by one or more
/// colon-led bound slots, of which only the first (the class bound) may be
/// empty.
fn type_params(c: &mut Cursor<'_>) -> Result<Vec<SigTyParam>> {
    if !c.eat(b'<') {
        return Ok(Vec::new());
    }
    let mut params = Vec::new();
    while !c.eat(b'>') {
        if c.at_end() {
            return Err(c.bad_signature());
        }
        let name = c.segment()?;
        let mut bounds = Vec::new();
        let mut slots = 0usize;
        while c.eat(b':') {
            slots += 1;
            if slots == 1 && !at_reference(c) {
                continue;
            }
            bounds.push(ty(c, TyPos::Reference)?);
        }
        if slots == 0 {
            return Err(c.bad_signature());
        }
        params.push(SigTyParam { name, bounds });
    }
    Ok(params)
}

fn at_reference(c: &Cursor<'_>) -> bool {
    matches!(c.peek(), Some(b'L' | b'T' | b'['))
}

/// The one type parser; `pos` narrows the admissible leading tags.
fn ty(c: &mut Cursor<'_>, pos: TyPos) -> Result<SigTy> {
    if pos == TyPos::Any {
        if let Some(base) = c.base() {
            return Ok(SigTy::Prim(base));
        }
    }
    match c.peek() {
        Some(b'[') if pos != TyPos::Thrown => {
            c.bump();
            // Array components may be primitive whatever the outer position.
            Ok(SigTy::Array(Box::new(ty(c, TyPos::Any)?)))
        }
        Some(b'T') => {
            c.bump();
            let name = c.segment()?;
            c.expect(b';').map_err(|_| c.bad_signature())?;
            Ok(SigTy::TyVar(name))
        }
        Some(b'L') => Ok(SigTy::Class(class_ty(c)?)),
        _ => Err(c.bad_signature()),
    }
}

/// `Lpkg/Outer<...>.Inner<...>;` — the package prefix and the outermost
/// simple name arrive as one slash-joined run, split on the last `/`;
/// nested segments follow dot-separated, each with optional arguments.
fn class_ty(c: &mut Cursor<'_>) -> Result<SigClassTy> {
    c.expect(b'L').map_err(|_| c.bad_signature())?;
    let head = c.qualified()?;
    if head.split('/').any(str::is_empty) {
        return Err(c.bad_signature());
    }
    let (package, outer) = match head.rfind('/') {
        Some(idx) => (head[..idx].to_string(), head[idx + 1..].to_string()),
        None => (String::new(), head),
    };

    let mut segments = vec![SigSegment {
        name: outer,
        targs: targ_list(c)?,
    }];
    while c.eat(b'.') {
        segments.push(SigSegment {
            name: c.segment()?,
            targs: targ_list(c)?,
        });
    }
    c.expect(b';').map_err(|_| c.bad_signature())?;
    Ok(SigClassTy { package, segments })
}

/// A `<...>` argument list, or nothing. Wildcard variance is read inline:
/// a bare `*`, or a `+`/`-` prefix on a reference type.
fn targ_list(c: &mut Cursor<'_>) -> Result<Vec<SigTyArg>> {
    if !c.eat(b'<') {
        return Ok(Vec::new());
    }
    let mut args = Vec::new();
    loop {
        match c.peek() {
            Some(b'>') => {
                c.bump();
                break;
            }
            Some(b'*') => {
                c.bump();
                args.push(SigTyArg::Wild);
            }
            Some(b'+') => {
                c.bump();
                args.push(SigTyArg::Extends(ty(c, TyPos::Reference)?));
            }
            Some(b'-') => {
                c.bump();
                args.push(SigTyArg::Super(ty(c, TyPos::Reference)?));
            }
            Some(_) => args.push(SigTyArg::Exact(ty(c, TyPos::Reference)?)),
            None => return Err(c.bad_signature()),
        }
    }
    if args.is_empty() {
        return Err(c.bad_signature());
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_signature_with_bounds() {
        let sig = parse_class_signature("<T:Ljava/lang/Number;:Ljava/lang/Comparable<TT;>;>Ljava/lang/Object;Ljava/util/RandomAccess;").unwrap();
        assert_eq!(sig.typarams.len(), 1);
        assert_eq!(sig.typarams[0].name, "T");
        assert_eq!(sig.typarams[0].bounds.len(), 2);
        assert_eq!(sig.superclass.binary_name(), "java/lang/Object");
        assert_eq!(sig.interfaces.len(), 1);
    }

    #[test]
    fn interface_only_bound() {
        let sig = parse_class_signature("<T::Ljava/lang/Runnable;>Ljava/lang/Object;").unwrap();
        assert_eq!(sig.typarams[0].bounds.len(), 1);
    }

    #[test]
    fn elided_class_bound_alone() {
        let sig = parse_class_signature("<T:>Ljava/lang/Object;").unwrap();
        assert!(sig.typarams[0].bounds.is_empty());
    }

    #[test]
    fn method_signature_with_throws() {
        let sig =
            parse_method_signature("<X:Ljava/lang/Object;>(TX;I)TX;^Ljava/io/IOException;^TE;")
                .unwrap();
        assert_eq!(sig.typarams.len(), 1);
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.ret, Some(SigTy::TyVar("X".to_string())));
        assert_eq!(sig.throws.len(), 2);
    }

    #[test]
    fn nested_generic_chain() {
        let ty = parse_field_signature("Lfoo/Outer<TA;>.Inner<TB;>;").unwrap();
        let SigTy::Class(class) = ty else {
            panic!("expected class type");
        };
        assert_eq!(class.package, "foo");
        assert_eq!(class.segments.len(), 2);
        assert_eq!(class.binary_name(), "foo/Outer$Inner");
        assert_eq!(class.segments[1].targs.len(), 1);
    }

    #[test]
    fn wildcards() {
        let ty = parse_field_signature("Ljava/util/List<*>;").unwrap();
        let SigTy::Class(class) = ty else {
            panic!("expected class type");
        };
        assert_eq!(class.segments[0].targs, vec![SigTyArg::Wild]);

        let ty = parse_field_signature("Ljava/util/List<+Ljava/lang/Number;>;").unwrap();
        let SigTy::Class(class) = ty else {
            panic!("expected class type");
        };
        assert!(matches!(class.segments[0].targs[0], SigTyArg::Extends(_)));
    }

    #[test]
    fn primitives_only_where_descriptors_allow_them() {
        // A bare primitive is not a field signature, but an array of one is.
        assert!(parse_field_signature("I").is_err());
        assert_eq!(
            parse_field_signature("[I").unwrap(),
            SigTy::Array(Box::new(SigTy::Prim(Base::Int)))
        );
        // Arrays cannot be thrown.
        assert!(parse_method_signature("()V^[Ljava/lang/Error;").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_field_signature("Qfoo;").is_err());
        assert!(parse_method_signature("(I").is_err());
        assert!(parse_class_signature("Ljava/lang/Object").is_err());
        assert!(parse_field_signature("Ljava/util/List<>;").is_err());
        assert!(parse_field_signature("Lfoo//Bar;").is_err());
    }
}
