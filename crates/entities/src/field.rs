use once_cell::unsync::OnceCell;
use unbrew_class_file::{
    AccessFlags, AttributeFactory, Attributes, ClassFileVersion, ConstantPool, MemberRecord,
};

use crate::{
    annotations::{collect_annotation_usages, dump_annotation},
    dumper::Dumper,
    literal::TypedLiteral,
    types::{parse_field_type, JavaType},
    usage::TypeUsageCollector,
    Result,
};

#[derive(Debug)]
pub struct Field {
    record: MemberRecord,
    name: String,
    descriptor: String,
    access_flags: AccessFlags,
    java_type: OnceCell<JavaType>,
    constant_value: Option<TypedLiteral>,
    disambiguate: bool,
}

impl Field {
    pub fn parse(
        raw: &[u8],
        constant_pool: &ConstantPool,
        version: ClassFileVersion,
        factory: &dyn AttributeFactory,
    ) -> Result<Self> {
        let record = MemberRecord::parse(raw, constant_pool, version, factory)?;
        Self::from_record(record, constant_pool)
    }

    pub fn from_record(record: MemberRecord, constant_pool: &ConstantPool) -> Result<Self> {
        let name = record.name(constant_pool)?.to_owned();
        Self::build(record, constant_pool, name.clone()).map_err(|e| e.in_member(name))
    }

    fn build(record: MemberRecord, constant_pool: &ConstantPool, name: String) -> Result<Self> {
        let descriptor = record.descriptor(constant_pool)?.to_owned();
        let access_flags = record.field_flags();
        let mut field = Self {
            record,
            name,
            descriptor,
            access_flags,
            java_type: OnceCell::new(),
            constant_value: None,
            disambiguate: false,
        };

        if let Some(index) = field.record.attributes.constant_value_index() {
            let literal = TypedLiteral::from_constant(constant_pool.resolve_constant(index)?)?;
            let literal = match field.java_type()?.as_raw() {
                Some(raw) => literal.shrink_to(raw),
                None => literal,
            };
            field.constant_value = Some(literal);
        }

        log::trace!("Built field {} {}", field.descriptor, field.name);
        Ok(field)
    }

    /// The declared type, from the generic signature when there is one.
    pub fn java_type(&self) -> Result<&JavaType> {
        self.java_type.get_or_try_init(|| {
            let text = self
                .record
                .attributes
                .signature()
                .unwrap_or(&self.descriptor);
            parse_field_type(text)
        })
    }

    /// Name as stored in the class file.
    pub fn raw_name(&self) -> &str {
        &self.name
    }

    /// Name to render, which differs from the stored one once the field has
    /// been marked for disambiguation.
    pub fn name(&self) -> Result<String> {
        if !self.disambiguate {
            return Ok(self.name.clone());
        }
        Ok(format!(
            "var_{}_{}",
            self.java_type()?.type_fix_prefix(),
            self.name
        ))
    }

    /// Set by the renaming pass when two fields would render with the same name.
    pub fn set_disambiguate(&mut self) {
        self.disambiguate = true;
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    pub fn test_access_flag(&self, flag: AccessFlags) -> bool {
        self.access_flags.contains(flag)
    }

    pub fn is_synthetic(&self) -> bool {
        self.test_access_flag(AccessFlags::SYNTHETIC)
    }

    pub fn constant_value(&self) -> Option<&TypedLiteral> {
        self.constant_value.as_ref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.record.attributes
    }

    pub fn raw_length(&self) -> usize {
        self.record.raw_length
    }

    pub fn collect_type_usages(&self, collector: &mut dyn TypeUsageCollector) -> Result<()> {
        collector.collect(self.java_type()?);
        for annotation in self.record.attributes.annotations() {
            collect_annotation_usages(annotation, collector)?;
        }
        Ok(())
    }

    /// Renders the declaration. Interface fields are implicitly
    /// `public static final`.
    pub fn dump(&self, d: &mut dyn Dumper, as_interface: bool) -> Result<()> {
        self.dump_declaration(d, as_interface)
            .map_err(|e| e.in_member(self.name.clone()))
    }

    fn dump_declaration(&self, d: &mut dyn Dumper, as_interface: bool) -> Result<()> {
        for annotation in self.record.attributes.annotations() {
            dump_annotation(annotation, d)?;
            d.newline();
        }

        let mut flags = self.access_flags;
        if as_interface {
            flags.remove(AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL);
        }
        let keywords = flags.keywords();
        if !keywords.is_empty() {
            d.keyword(&keywords.join(" "));
            d.print(" ");
        }

        d.dump_type(self.java_type()?);
        d.print(" ");
        d.identifier(&self.name()?);
        if let Some(value) = &self.constant_value {
            d.print(" = ");
            d.print(&value.to_string());
        }
        d.end_code_line();
        Ok(())
    }
}
