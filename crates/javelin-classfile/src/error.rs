use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClassFileError>;

#[derive(Debug, Error)]
pub enum ClassFileError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("bad class file magic: 0x{0:08x}")]
    BadMagic(u32),
    #[error("bad constant pool index {0}")]
    BadPoolIndex(u16),
    #[error("bad constant pool tag {0}")]
    BadPoolTag(u8),
    #[error("constant pool entry {index} is {found}, expected {expected}")]
    PoolMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid modified UTF-8 constant")]
    BadUtf8,
    #[error("invalid descriptor: {0}")]
    BadDescriptor(String),
    #[error("invalid signature: {0}")]
    BadSignature(String),
    #[error("malformed {0} attribute")]
    BadAttribute(&'static str),
    #[error("{0}")]
    Malformed(&'static str),
}
