use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    access_flags::AccessFlags,
    attributes::{
        Annotation, AttributeFactory, Attributes, CodeAttribute, ElementValue,
        ExceptionTableEntry, LocalVariable,
    },
    constant_pool::{self, CpInfo},
    member::MemberRecord,
    ClassFile, ClassFileError, ClassFileVersion, ConstantPool, ConstantValue, Result,
};

type Endian = BigEndian;

/// Big-endian reader over an in-memory class file, or any slice of one.
pub struct Parser<'a> {
    r: Cursor<&'a [u8]>,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: Cursor::new(buf),
        }
    }

    pub fn position(&self) -> usize {
        self.r.position() as usize
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        let buf = *self.r.get_ref();
        &buf[self.position().min(buf.len())..]
    }

    pub fn parse(&mut self, factory: &dyn AttributeFactory) -> Result<ClassFile> {
        let _ = self.parse_magic_identifier()?;
        let version = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_u16(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        let interfaces_count = self.read_u16()?;

        let mut interfaces = vec![0u16; interfaces_count as usize];
        self.r.read_u16_into::<Endian>(&mut interfaces)?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_member_record(&constant_pool, version, factory))
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_member_record(&constant_pool, version, factory))
            .collect::<Result<Vec<_>>>()?;

        let attributes_count = self.read_u16()?;
        let (attributes, _) =
            self.parse_attributes(attributes_count, &constant_pool, version, factory)?;

        Ok(ClassFile {
            version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Fields and methods share one record layout:
    ///
    /// | offset | size | item                 |
    /// |--------|------|----------------------|
    /// | 0      | 2    | access flags         |
    /// | 2      | 2    | name index           |
    /// | 4      | 2    | descriptor index     |
    /// | 6      | 2    | attribute count      |
    /// | 8      | ..   | attribute table      |
    pub fn parse_member_record(
        &mut self,
        constant_pool: &ConstantPool,
        version: ClassFileVersion,
        factory: &dyn AttributeFactory,
    ) -> Result<MemberRecord> {
        let access_flags = self.read_u16()?;
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        let (attributes, attributes_length) =
            self.parse_attributes(attributes_count, constant_pool, version, factory)?;

        Ok(MemberRecord {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
            raw_length: MemberRecord::HEADER_LENGTH + attributes_length,
        })
    }

    /// Returns the decoded attributes and the number of bytes they occupied.
    pub fn parse_attributes(
        &mut self,
        attributes_count: u16,
        constant_pool: &ConstantPool,
        version: ClassFileVersion,
        factory: &dyn AttributeFactory,
    ) -> Result<(Attributes, usize)> {
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        let mut length = 0;
        for _ in 0..attributes_count {
            let (attribute, consumed) = factory.decode(self.remaining(), constant_pool, version)?;
            self.skip(consumed)?;
            length += consumed;
            attributes.push(attribute);
        }

        Ok((Attributes::new(attributes), length))
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            0xCAFEBABE => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<ClassFileVersion> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok(ClassFileVersion::new(major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;

        let mut count = (constant_pool_count as usize).saturating_sub(1);
        let mut res = Vec::with_capacity(count);
        while count > 0 {
            let (cp_info, slot_size) = self.parse_cp_info()?;
            res.push(cp_info);
            // A wide entry in the last slot gets no padding past the declared count.
            (0..(slot_size - 1).min(count - 1)).for_each(|_| res.push(CpInfo::Unusable));

            count = count.saturating_sub(slot_size);
        }
        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self) -> Result<(CpInfo, usize)> {
        let tag = self.read_u8()?;
        let (cp_info, additional_cp_info) = match tag {
            1 => (self.parse_utf8()?, 1),
            3 => (CpInfo::Integer(self.read_i32()?), 1),
            4 => (CpInfo::Float(f32::from_bits(self.read_u32()?)), 1),
            5 => (CpInfo::Long(self.read_i64()?), 2),
            6 => (CpInfo::Double(f64::from_bits(self.read_u64()?)), 2),
            7 => (self.parse_class_info()?, 1),
            8 => (
                CpInfo::String {
                    string_index: self.read_u16()?,
                },
                1,
            ),
            9 => (CpInfo::FieldRef(self.parse_ref_info()?), 1),
            10 => (CpInfo::MethodRef(self.parse_ref_info()?), 1),
            11 => (CpInfo::InterfaceMethodRef(self.parse_ref_info()?), 1),
            12 => (self.parse_name_and_type_info()?, 1),
            15 => (self.parse_method_handle()?, 1),
            16 => (self.parse_method_type_info()?, 1),
            17 => (CpInfo::Dynamic(self.parse_invoke_dynamic_info()?), 1),
            18 => (CpInfo::InvokeDynamic(self.parse_invoke_dynamic_info()?), 1),
            19 => (
                CpInfo::Module {
                    name_index: self.read_u16()?,
                },
                1,
            ),
            20 => (
                CpInfo::Package {
                    name_index: self.read_u16()?,
                },
                1,
            ),
            _ => return Err(ClassFileError::InvalidCpInfoTag(tag)),
        };

        Ok((cp_info, additional_cp_info))
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let bytes = self.read_bytes(length as usize)?;

        // Modified UTF-8 only differs for NUL and supplementary characters,
        // which are rare enough in names that a lossy decode is acceptable.
        Ok(CpInfo::Utf8(String::from_utf8_lossy(&bytes).into()))
    }

    fn parse_class_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;

        Ok(CpInfo::Class(constant_pool::ClassInfo { name_index }))
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(constant_pool::NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(CpInfo::MethodHandle(constant_pool::MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_method_type_info(&mut self) -> Result<CpInfo> {
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::MethodType(constant_pool::MethodTypeInfo {
            descriptor_index,
        }))
    }

    fn parse_invoke_dynamic_info(&mut self) -> Result<constant_pool::InvokeDynamicInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(constant_pool::InvokeDynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        })
    }

    fn parse_ref_info(&mut self) -> Result<constant_pool::RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(constant_pool::RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    pub fn parse_code_attribute(
        &mut self,
        constant_pool: &ConstantPool,
        version: ClassFileVersion,
        factory: &dyn AttributeFactory,
    ) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let code = self.read_bytes(code_length as usize)?;
        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        let attributes_count = self.read_u16()?;
        let (attributes, _) =
            self.parse_attributes(attributes_count, constant_pool, version, factory)?;

        Ok(CodeAttribute::new(
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        ))
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = self.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    /// Internal names of the classes listed by an `Exceptions` attribute.
    pub fn parse_exceptions(&mut self, constant_pool: &ConstantPool) -> Result<Vec<String>> {
        let number_of_exceptions = self.read_u16()?;
        (0..number_of_exceptions)
            .map(|_| -> Result<String> {
                Ok(constant_pool.class_name(self.read_u16()?)?.to_owned())
            })
            .collect()
    }

    pub fn parse_local_variable_table(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<LocalVariable>> {
        let table_length = self.read_u16()?;
        (0..table_length)
            .map(|_| -> Result<LocalVariable> {
                let start_pc = self.read_u16()?;
                let length = self.read_u16()?;
                let name = constant_pool.utf8_entry(self.read_u16()?)?.to_owned();
                let descriptor = constant_pool.utf8_entry(self.read_u16()?)?.to_owned();
                let index = self.read_u16()?;

                Ok(LocalVariable {
                    start_pc,
                    length,
                    name,
                    descriptor,
                    index,
                })
            })
            .collect()
    }

    pub fn parse_annotations(&mut self, constant_pool: &ConstantPool) -> Result<Vec<Annotation>> {
        let num_annotations = self.read_u16()?;
        (0..num_annotations)
            .map(|_| self.parse_annotation(constant_pool))
            .collect()
    }

    pub fn parse_parameter_annotations(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<Vec<Annotation>>> {
        let num_parameters = self.read_u8()?;
        (0..num_parameters)
            .map(|_| self.parse_annotations(constant_pool))
            .collect()
    }

    fn parse_annotation(&mut self, constant_pool: &ConstantPool) -> Result<Annotation> {
        let type_descriptor = constant_pool.utf8_entry(self.read_u16()?)?.to_owned();
        let num_element_value_pairs = self.read_u16()?;
        let elements = (0..num_element_value_pairs)
            .map(|_| -> Result<(String, ElementValue)> {
                let name = constant_pool.utf8_entry(self.read_u16()?)?.to_owned();
                Ok((name, self.parse_element_value(constant_pool)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Annotation {
            type_descriptor,
            elements,
        })
    }

    pub fn parse_element_value(&mut self, constant_pool: &ConstantPool) -> Result<ElementValue> {
        let tag = self.read_u8()? as char;
        Ok(match tag {
            'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' => ElementValue::Const {
                tag,
                value: constant_pool.resolve_constant(self.read_u16()?)?,
            },
            // String element values point straight at a Utf8 entry.
            's' => ElementValue::Const {
                tag,
                value: ConstantValue::String(
                    constant_pool.utf8_entry(self.read_u16()?)?.to_owned(),
                ),
            },
            'e' => {
                let type_descriptor = constant_pool.utf8_entry(self.read_u16()?)?.to_owned();
                let const_name = constant_pool.utf8_entry(self.read_u16()?)?.to_owned();
                ElementValue::Enum {
                    type_descriptor,
                    const_name,
                }
            }
            'c' => ElementValue::Class(constant_pool.utf8_entry(self.read_u16()?)?.to_owned()),
            '@' => ElementValue::Annotation(self.parse_annotation(constant_pool)?),
            '[' => {
                let num_values = self.read_u16()?;
                ElementValue::Array(
                    (0..num_values)
                        .map(|_| self.parse_element_value(constant_pool))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            _ => return Err(ClassFileError::InvalidElementValueTag(tag)),
        })
    }

    fn skip(&mut self, count: usize) -> Result<()> {
        if count > self.remaining().len() {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        self.r.set_position(self.r.position() + count as u64);
        Ok(())
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        if count > self.remaining().len() {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        let mut bytes = vec![0u8; count];
        self.r.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(self.r.read_u64::<Endian>()?)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.r.read_i64::<Endian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.r.read_u32::<Endian>()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.r.read_u16::<Endian>()?)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.r.read_u8()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.r.read_i32::<Endian>()?)
    }
}
