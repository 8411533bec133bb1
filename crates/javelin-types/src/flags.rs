//! Access and property flags.
//!
//! The low 16 bits are the class-file access bits; higher bits carry
//! declaration-level properties that have no class-file encoding of their
//! own.

pub const ACC_PUBLIC: u32 = 0x0001;
pub const ACC_PRIVATE: u32 = 0x0002;
pub const ACC_PROTECTED: u32 = 0x0004;
pub const ACC_STATIC: u32 = 0x0008;
pub const ACC_FINAL: u32 = 0x0010;
pub const ACC_SYNCHRONIZED: u32 = 0x0020;
pub const ACC_VOLATILE: u32 = 0x0040;
pub const ACC_TRANSIENT: u32 = 0x0080;
pub const ACC_VARARGS: u32 = 0x0080;
pub const ACC_NATIVE: u32 = 0x0100;
pub const ACC_INTERFACE: u32 = 0x0200;
pub const ACC_ABSTRACT: u32 = 0x0400;
pub const ACC_STRICT: u32 = 0x0800;
pub const ACC_SYNTHETIC: u32 = 0x1000;
pub const ACC_ANNOTATION: u32 = 0x2000;
pub const ACC_ENUM: u32 = 0x4000;
pub const ACC_MODULE: u32 = 0x8000;

// Extended bits, not emitted to class files directly.
pub const ACC_DEFAULT: u32 = 1 << 16;
pub const ACC_SEALED: u32 = 1 << 17;
pub const ACC_NON_SEALED: u32 = 1 << 18;
pub const ACC_DEPRECATED: u32 = 1 << 19;
pub const ACC_RECORD: u32 = 1 << 20;

pub fn is_visible_outside_package(access: u32) -> bool {
    access & (ACC_PUBLIC | ACC_PROTECTED) != 0
}
