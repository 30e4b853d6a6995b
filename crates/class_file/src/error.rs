use thiserror::Error;

use crate::constant_pool;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Expected {0}, found {1:?}")]
    UnexpectedConstantPoolEntry(&'static str, constant_pool::CpInfo),
    #[error("Constant pool index {0} out of range (pool has {1} slots)")]
    InvalidConstantPoolIndex(u16, usize),
    #[error("Invalid cp info tag: {0}")]
    InvalidCpInfoTag(u8),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Attribute {name} declares {declared} bytes but only {available} remain")]
    AttributeLengthOverflow {
        name: String,
        declared: u32,
        available: usize,
    },
    #[error("Invalid element value tag: {0:?}")]
    InvalidElementValueTag(char),
}

impl ClassFileError {
    /// Pool lookups failing is a structural problem with the class, not with
    /// the body of a single attribute.
    pub fn is_constant_pool_error(&self) -> bool {
        matches!(
            self,
            ClassFileError::UnexpectedConstantPoolEntry(..)
                | ClassFileError::InvalidConstantPoolIndex(..)
        )
    }
}
