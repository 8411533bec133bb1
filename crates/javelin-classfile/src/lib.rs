#![forbid(unsafe_code)]

//! Binary class-file parsing, limited to what a header compiler consumes:
//! constants, flags, supertypes, inner-class records, fields, methods,
//! signatures, annotations, and module descriptors. Code attributes are
//! skipped unread.

mod anno;
mod bytes;
mod classfile;
mod desc;
mod error;
mod module_info;
mod pool;
mod sig;

pub use crate::anno::{RawAnnotation, RawConst, RawElementValue};
pub use crate::classfile::{ClassFile, InnerClassRec, PoolConstant, RawField, RawMethod};
pub use crate::desc::{parse_field_desc, parse_method_desc, Base, FieldDesc, MethodDesc};
pub use crate::error::{ClassFileError, Result};
pub use crate::module_info::parse_module_info;
pub use crate::sig::{
    parse_class_signature, parse_field_signature, parse_method_signature, SigClass, SigClassTy,
    SigMethod, SigSegment, SigTy, SigTyArg, SigTyParam,
};
