use bitflags::bitflags;

use crate::{attributes::Attributes, Attribute};

bitflags! {
    /// Flags of a class or field. `DEPRECATED` is a pseudo flag set from the
    /// `Deprecated` attribute and sits outside the 16-bit range on disk.
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
        const DEPRECATED = 0x2_0000;
    }
}

bitflags! {
    /// Flags of a method. Bits 0x40 and 0x80 mean bridge/varargs here, which
    /// is why methods get their own set.
    pub struct MethodAccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const DEPRECATED = 0x2_0000;
    }
}

const FIELD_KEYWORDS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::TRANSIENT, "transient"),
    (AccessFlags::VOLATILE, "volatile"),
];

const METHOD_KEYWORDS: &[(MethodAccessFlags, &str)] = &[
    (MethodAccessFlags::PUBLIC, "public"),
    (MethodAccessFlags::PRIVATE, "private"),
    (MethodAccessFlags::PROTECTED, "protected"),
    (MethodAccessFlags::ABSTRACT, "abstract"),
    (MethodAccessFlags::STATIC, "static"),
    (MethodAccessFlags::FINAL, "final"),
    (MethodAccessFlags::SYNCHRONIZED, "synchronized"),
    (MethodAccessFlags::NATIVE, "native"),
    (MethodAccessFlags::STRICT, "strictfp"),
];

impl AccessFlags {
    pub fn from_u16(bits: u16) -> Self {
        Self::from_bits_truncate(u32::from(bits))
    }

    /// Union in the flags that are also encoded as attributes.
    pub fn apply_attributes(&mut self, attributes: &Attributes) {
        if attributes.get(Attribute::SYNTHETIC).is_some() {
            self.insert(AccessFlags::SYNTHETIC);
        }
        if attributes.get(Attribute::DEPRECATED).is_some() {
            self.insert(AccessFlags::DEPRECATED);
        }
    }

    /// Source modifiers in declaration order.
    pub fn keywords(&self) -> Vec<&'static str> {
        FIELD_KEYWORDS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, keyword)| *keyword)
            .collect()
    }
}

impl MethodAccessFlags {
    pub fn from_u16(bits: u16) -> Self {
        Self::from_bits_truncate(u32::from(bits))
    }

    pub fn apply_attributes(&mut self, attributes: &Attributes) {
        if attributes.get(Attribute::SYNTHETIC).is_some() {
            self.insert(MethodAccessFlags::SYNTHETIC);
        }
        if attributes.get(Attribute::DEPRECATED).is_some() {
            self.insert(MethodAccessFlags::DEPRECATED);
        }
    }

    pub fn keywords(&self) -> Vec<&'static str> {
        METHOD_KEYWORDS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, keyword)| *keyword)
            .collect()
    }
}
