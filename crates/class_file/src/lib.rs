// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
#[macro_use]
mod constant_pool;
mod error;
mod member;
mod parser;

use std::fmt;

pub use self::class_file::ClassFile;
pub use access_flags::{AccessFlags, MethodAccessFlags};
pub use attributes::{Attribute, AttributeFactory, Attributes, StandardAttributeFactory};
pub use constant_pool::{ClassInfo, ConstantPool, ConstantValue, CpInfo};
pub use error::ClassFileError;
pub use member::MemberRecord;
pub use parser::Parser;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

/// Major/minor version pair from the class file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassFileVersion {
    pub major: u16,
    pub minor: u16,
}
impl ClassFileVersion {
    pub const JAVA_5: ClassFileVersion = ClassFileVersion::new(49, 0);
    pub const JAVA_8: ClassFileVersion = ClassFileVersion::new(52, 0);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Generic signatures and annotations only exist from Java 5 onwards.
    pub fn supports_generics(&self) -> bool {
        *self >= Self::JAVA_5
    }
}
impl fmt::Display for ClassFileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
