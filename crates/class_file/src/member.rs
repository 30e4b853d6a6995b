use crate::{
    attributes::{AttributeFactory, Attributes},
    parser::Parser,
    AccessFlags, ClassFileVersion, ConstantPool, MethodAccessFlags, Result,
};

/// A field_info or method_info structure. The two share one layout; the
/// access flag bits are only given meaning by [`MemberRecord::field_flags`]
/// and [`MemberRecord::method_flags`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
    /// Bytes consumed from the start of the record, always the 8 byte header
    /// plus the encoded length of every attribute.
    pub raw_length: usize,
}
impl MemberRecord {
    pub const HEADER_LENGTH: usize = 8;

    pub fn parse(
        raw: &[u8],
        constant_pool: &ConstantPool,
        version: ClassFileVersion,
        factory: &dyn AttributeFactory,
    ) -> Result<Self> {
        let record = Parser::new(raw).parse_member_record(constant_pool, version, factory)?;
        log::trace!(
            "Read member record #{} with {} attributes ({} bytes)",
            record.name_index,
            record.attributes.len(),
            record.raw_length
        );
        Ok(record)
    }

    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> Result<&'a str> {
        constant_pool.utf8_entry(self.name_index)
    }

    pub fn descriptor<'a>(&self, constant_pool: &'a ConstantPool) -> Result<&'a str> {
        constant_pool.utf8_entry(self.descriptor_index)
    }

    /// Flags read as a field, with attribute-encoded flags folded in.
    pub fn field_flags(&self) -> AccessFlags {
        let mut flags = AccessFlags::from_u16(self.access_flags);
        flags.apply_attributes(&self.attributes);
        flags
    }

    /// Flags read as a method, with attribute-encoded flags folded in.
    pub fn method_flags(&self) -> MethodAccessFlags {
        let mut flags = MethodAccessFlags::from_u16(self.access_flags);
        flags.apply_attributes(&self.attributes);
        flags
    }
}
