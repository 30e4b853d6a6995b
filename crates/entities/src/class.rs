use unbrew_class_file::AccessFlags;

use crate::types::RefType;

/// What a member needs to know about the class declaring it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassContext {
    pub class_type: RefType,
    pub access_flags: AccessFlags,
    /// A nested class that is not static, so its constructors take the
    /// outer instance.
    pub is_inner_class: bool,
}
impl ClassContext {
    pub fn new(class_type: RefType, access_flags: AccessFlags) -> Self {
        Self {
            class_type,
            access_flags,
            is_inner_class: false,
        }
    }

    pub fn inner(mut self) -> Self {
        self.is_inner_class = true;
        self
    }

    pub fn is_enum(&self) -> bool {
        self.access_flags.contains(AccessFlags::ENUM)
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(AccessFlags::INTERFACE)
    }
}
