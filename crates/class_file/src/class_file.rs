use crate::{
    attributes::{AttributeFactory, Attributes},
    parser::Parser,
    AccessFlags, ClassFileVersion, ConstantPool, MemberRecord, Result, StandardAttributeFactory,
};

#[derive(Debug)]
pub struct ClassFile {
    pub version: ClassFileVersion,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<MemberRecord>,
    pub methods: Vec<MemberRecord>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
        Self::parse_with(bytes, &StandardAttributeFactory)
    }

    pub fn parse_with(bytes: &[u8], factory: &dyn AttributeFactory) -> Result<ClassFile> {
        Parser::new(bytes).parse(factory)
    }

    pub fn super_class(&self) -> Result<Option<&str>> {
        // If the value of the super_class item is zero, then this class file must represent the
        // class Object, the only class or interface without a direct superclass.
        if self.super_class == 0 {
            return Ok(None);
        }

        // Otherwise the constant_pool entry at that index must be a CONSTANT_Class_info structure
        // representing the direct superclass of the class defined by this class file.
        Ok(Some(self.constant_pool.class_name(self.super_class)?))
    }

    pub fn class_name(&self) -> Result<&str> {
        // The value of the this_class item must be a valid index into the constant_pool table.
        // The constant_pool entry at that index must be a CONSTANT_Class_info structure
        // representing the class or interface defined by this class file.
        self.constant_pool.class_name(self.this_class)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|i| self.constant_pool.class_name(*i))
            .collect()
    }

    pub fn field_name(&self, field: &MemberRecord) -> Result<&str> {
        field.name(&self.constant_pool)
    }

    pub fn field_descriptor(&self, field: &MemberRecord) -> Result<&str> {
        field.descriptor(&self.constant_pool)
    }

    pub fn method_name(&self, method: &MemberRecord) -> Result<&str> {
        method.name(&self.constant_pool)
    }

    pub fn method_descriptor(&self, method: &MemberRecord) -> Result<&str> {
        method.descriptor(&self.constant_pool)
    }
}
