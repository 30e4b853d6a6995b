use crate::{matches_cp_info, ClassFileError, Result};

#[derive(Debug, Default)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        Self { cp_infos }
    }

    /// Number of slots, not counting the unused slot 0.
    pub fn len(&self) -> usize {
        self.cp_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.is_empty()
    }

    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        // Slot 0 is never valid.
        (index as usize)
            .checked_sub(1)
            .and_then(|i| self.cp_infos.get(i))
            .ok_or(ClassFileError::InvalidConstantPoolIndex(
                index,
                self.cp_infos.len(),
            ))
    }

    pub fn utf8_entry(&self, index: u16) -> Result<&str> {
        Ok(matches_cp_info!(self, index, Utf8)?)
    }

    /// Internal name of the class referenced by a `CONSTANT_Class_info` entry.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        let ClassInfo { name_index } = matches_cp_info!(self, index, Class)?;

        self.utf8_entry(*name_index)
    }

    /// Resolve a loadable entry into its value.
    pub fn resolve_constant(&self, index: u16) -> Result<ConstantValue> {
        Ok(match self.get(index)? {
            CpInfo::Integer(i) => ConstantValue::Integer(*i),
            CpInfo::Long(l) => ConstantValue::Long(*l),
            CpInfo::Float(f) => ConstantValue::Float(*f),
            CpInfo::Double(d) => ConstantValue::Double(*d),
            CpInfo::String { string_index } => {
                ConstantValue::String(self.utf8_entry(*string_index)?.to_owned())
            }
            CpInfo::Class(ClassInfo { name_index }) => {
                ConstantValue::Class(self.utf8_entry(*name_index)?.to_owned())
            }
            CpInfo::MethodType(MethodTypeInfo { descriptor_index }) => {
                ConstantValue::MethodType(self.utf8_entry(*descriptor_index)?.to_owned())
            }
            c => {
                return Err(ClassFileError::UnexpectedConstantPoolEntry(
                    "loadable constant",
                    c.clone(),
                ))
            }
        })
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {
        match $cp.get($index) {
            Ok($crate::CpInfo::$i(ref n)) => Ok(n),
            Ok(c) => Err($crate::ClassFileError::UnexpectedConstantPoolEntry(
                stringify!($i),
                c.clone(),
            )),
            Err(e) => Err(e),
        }
    };
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    MethodRef(RefInfo),
    FieldRef(RefInfo),
    Float(f32),
    Double(f64),
    InterfaceMethodRef(RefInfo),
    Class(ClassInfo),
    NameAndType(NameAndTypeInfo),
    Utf8(String),
    String { string_index: u16 },
    Dynamic(InvokeDynamicInfo),
    InvokeDynamic(InvokeDynamicInfo),
    Integer(i32),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Module { name_index: u16 },
    Package { name_index: u16 },
    Long(i64),
    Unusable,
}

/// A resolved loadable constant.
#[derive(Debug, PartialEq, Clone)]
pub enum ConstantValue {
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Internal name (or array descriptor) of a class literal.
    Class(String),
    MethodType(String),
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // The value of the name_index item must be a valid index into the constant_pool table.
    // The constant_pool entry at that index must be a CONSTANT_Utf8_info structure
    // representing a valid binary class or interface name encoded in internal form.
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InvokeDynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}
