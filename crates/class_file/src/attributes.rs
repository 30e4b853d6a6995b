use indexmap::IndexMap;

use crate::{
    parser::Parser, ClassFileError, ClassFileVersion, ConstantPool, ConstantValue, Result,
};

/// A decoded attribute. Attributes this crate does not understand, and bodies
/// that fail to decode, are kept as opaque `Unknown` blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    ConstantValue { value_index: u16 },
    Code(CodeAttribute),
    /// Internal names of the declared exception classes.
    Exceptions(Vec<String>),
    Signature(String),
    Synthetic,
    Deprecated,
    AnnotationDefault(ElementValue),
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),
    RuntimeVisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeInvisibleParameterAnnotations(Vec<Vec<Annotation>>),
    LocalVariableTable(Vec<LocalVariable>),
    Unknown { name: String, info: Vec<u8> },
}
impl Attribute {
    pub const CONSTANT_VALUE: &'static str = "ConstantValue";
    pub const CODE: &'static str = "Code";
    pub const EXCEPTIONS: &'static str = "Exceptions";
    pub const SIGNATURE: &'static str = "Signature";
    pub const SYNTHETIC: &'static str = "Synthetic";
    pub const DEPRECATED: &'static str = "Deprecated";
    pub const ANNOTATION_DEFAULT: &'static str = "AnnotationDefault";
    pub const RUNTIME_VISIBLE_ANNOTATIONS: &'static str = "RuntimeVisibleAnnotations";
    pub const RUNTIME_INVISIBLE_ANNOTATIONS: &'static str = "RuntimeInvisibleAnnotations";
    pub const RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS: &'static str =
        "RuntimeVisibleParameterAnnotations";
    pub const RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS: &'static str =
        "RuntimeInvisibleParameterAnnotations";
    pub const LOCAL_VARIABLE_TABLE: &'static str = "LocalVariableTable";

    pub fn name(&self) -> &str {
        match self {
            Attribute::ConstantValue { .. } => Self::CONSTANT_VALUE,
            Attribute::Code(_) => Self::CODE,
            Attribute::Exceptions(_) => Self::EXCEPTIONS,
            Attribute::Signature(_) => Self::SIGNATURE,
            Attribute::Synthetic => Self::SYNTHETIC,
            Attribute::Deprecated => Self::DEPRECATED,
            Attribute::AnnotationDefault(_) => Self::ANNOTATION_DEFAULT,
            Attribute::RuntimeVisibleAnnotations(_) => Self::RUNTIME_VISIBLE_ANNOTATIONS,
            Attribute::RuntimeInvisibleAnnotations(_) => Self::RUNTIME_INVISIBLE_ANNOTATIONS,
            Attribute::RuntimeVisibleParameterAnnotations(_) => {
                Self::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS
            }
            Attribute::RuntimeInvisibleParameterAnnotations(_) => {
                Self::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS
            }
            Attribute::LocalVariableTable(_) => Self::LOCAL_VARIABLE_TABLE,
            Attribute::Unknown { name, .. } => name,
        }
    }
}

/// Decodes one attribute from the front of `raw` and reports how many bytes it
/// occupied, header included.
pub trait AttributeFactory {
    fn decode(
        &self,
        raw: &[u8],
        constant_pool: &ConstantPool,
        version: ClassFileVersion,
    ) -> Result<(Attribute, usize)>;
}

/// Factory for the attributes a member model needs.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardAttributeFactory;
impl StandardAttributeFactory {
    const HEADER_LENGTH: usize = 6;

    fn decode_body(
        &self,
        name: &str,
        body: &[u8],
        constant_pool: &ConstantPool,
        version: ClassFileVersion,
    ) -> Result<Attribute> {
        let mut p = Parser::new(body);
        let generic = version.supports_generics();

        Ok(match name {
            Attribute::CONSTANT_VALUE => Attribute::ConstantValue {
                value_index: p.read_u16()?,
            },
            Attribute::CODE => Attribute::Code(p.parse_code_attribute(constant_pool, version, self)?),
            Attribute::EXCEPTIONS => Attribute::Exceptions(p.parse_exceptions(constant_pool)?),
            Attribute::SYNTHETIC => Attribute::Synthetic,
            Attribute::DEPRECATED => Attribute::Deprecated,
            Attribute::LOCAL_VARIABLE_TABLE => {
                Attribute::LocalVariableTable(p.parse_local_variable_table(constant_pool)?)
            }
            Attribute::SIGNATURE if generic => {
                Attribute::Signature(constant_pool.utf8_entry(p.read_u16()?)?.to_owned())
            }
            Attribute::ANNOTATION_DEFAULT if generic => {
                Attribute::AnnotationDefault(p.parse_element_value(constant_pool)?)
            }
            Attribute::RUNTIME_VISIBLE_ANNOTATIONS if generic => {
                Attribute::RuntimeVisibleAnnotations(p.parse_annotations(constant_pool)?)
            }
            Attribute::RUNTIME_INVISIBLE_ANNOTATIONS if generic => {
                Attribute::RuntimeInvisibleAnnotations(p.parse_annotations(constant_pool)?)
            }
            Attribute::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS if generic => {
                Attribute::RuntimeVisibleParameterAnnotations(
                    p.parse_parameter_annotations(constant_pool)?,
                )
            }
            Attribute::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS if generic => {
                Attribute::RuntimeInvisibleParameterAnnotations(
                    p.parse_parameter_annotations(constant_pool)?,
                )
            }
            // Attributes introduced after this class file's version are not
            // predefined for it.
            _ => Attribute::Unknown {
                name: name.to_owned(),
                info: body.to_vec(),
            },
        })
    }
}
impl AttributeFactory for StandardAttributeFactory {
    fn decode(
        &self,
        raw: &[u8],
        constant_pool: &ConstantPool,
        version: ClassFileVersion,
    ) -> Result<(Attribute, usize)> {
        let mut p = Parser::new(raw);
        let name = constant_pool.utf8_entry(p.read_u16()?)?;
        let declared = p.read_u32()?;
        let available = p.remaining().len();
        if declared as usize > available {
            return Err(ClassFileError::AttributeLengthOverflow {
                name: name.to_owned(),
                declared,
                available,
            });
        }
        let body = &p.remaining()[..declared as usize];

        let attribute = match self.decode_body(name, body, constant_pool, version) {
            Ok(attribute) => attribute,
            Err(e) if e.is_constant_pool_error() => return Err(e),
            Err(e) => {
                log::warn!("Keeping malformed {} attribute as opaque: {}", name, e);
                Attribute::Unknown {
                    name: name.to_owned(),
                    info: body.to_vec(),
                }
            }
        };
        log::trace!("Decoded {} attribute ({} bytes)", name, declared);

        Ok((attribute, Self::HEADER_LENGTH + declared as usize))
    }
}

/// Name-keyed index over the attributes of one member. Later duplicates
/// replace earlier ones.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Attributes(IndexMap<String, Attribute>);
impl Attributes {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        let mut map = IndexMap::with_capacity(attributes.len());
        for attribute in attributes {
            map.insert(attribute.name().to_owned(), attribute);
        }
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        self.0.shift_remove(name)
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.values()
    }

    pub fn signature(&self) -> Option<&str> {
        match self.get(Attribute::SIGNATURE)? {
            Attribute::Signature(signature) => Some(signature),
            _ => None,
        }
    }

    pub fn constant_value_index(&self) -> Option<u16> {
        match self.get(Attribute::CONSTANT_VALUE)? {
            Attribute::ConstantValue { value_index } => Some(*value_index),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        match self.get(Attribute::CODE)? {
            Attribute::Code(code) => Some(code),
            _ => None,
        }
    }

    pub fn exceptions(&self) -> Option<&[String]> {
        match self.get(Attribute::EXCEPTIONS)? {
            Attribute::Exceptions(exceptions) => Some(exceptions),
            _ => None,
        }
    }

    pub fn annotation_default(&self) -> Option<&ElementValue> {
        match self.get(Attribute::ANNOTATION_DEFAULT)? {
            Attribute::AnnotationDefault(value) => Some(value),
            _ => None,
        }
    }

    pub fn local_variable_table(&self) -> Option<&[LocalVariable]> {
        match self.get(Attribute::LOCAL_VARIABLE_TABLE)? {
            Attribute::LocalVariableTable(table) => Some(table),
            _ => None,
        }
    }

    /// Visible annotations first, then invisible ones.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        let visible = match self.get(Attribute::RUNTIME_VISIBLE_ANNOTATIONS) {
            Some(Attribute::RuntimeVisibleAnnotations(a)) => a.as_slice(),
            _ => &[],
        };
        let invisible = match self.get(Attribute::RUNTIME_INVISIBLE_ANNOTATIONS) {
            Some(Attribute::RuntimeInvisibleAnnotations(a)) => a.as_slice(),
            _ => &[],
        };
        visible.iter().chain(invisible)
    }

    /// Annotations of the parameter at `index`, visible first.
    pub fn parameter_annotations(&self, index: usize) -> Vec<&Annotation> {
        let visible = match self.get(Attribute::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS) {
            Some(Attribute::RuntimeVisibleParameterAnnotations(a)) => a.get(index),
            _ => None,
        };
        let invisible = match self.get(Attribute::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS) {
            Some(Attribute::RuntimeInvisibleParameterAnnotations(a)) => a.get(index),
            _ => None,
        };
        visible
            .into_iter()
            .chain(invisible)
            .flat_map(|a| a.iter())
            .collect()
    }

    /// Every parameter annotation regardless of position.
    pub fn all_parameter_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.0
            .values()
            .filter_map(|a| match a {
                Attribute::RuntimeVisibleParameterAnnotations(p)
                | Attribute::RuntimeInvisibleParameterAnnotations(p) => Some(p),
                _ => None,
            })
            .flatten()
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name: String,
    pub descriptor: String,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    attributes: Attributes,
    released: bool,
}
impl CodeAttribute {
    pub fn new(
        max_stack: u16,
        max_locals: u16,
        code: Vec<u8>,
        exception_table: Vec<ExceptionTableEntry>,
        attributes: Attributes,
    ) -> Self {
        Self {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
            released: false,
        }
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn local_variable_table(&self) -> Option<&[LocalVariable]> {
        self.attributes.local_variable_table()
    }

    /// Drop the bytecode and nested attributes once analysis no longer needs them.
    pub fn release_code(&mut self) {
        self.code = Vec::new();
        self.attributes.clear();
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation interface, e.g. `Ljava/lang/Deprecated;`.
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const { tag: char, value: ConstantValue },
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    /// Return descriptor of a class literal, `V` for `void.class`.
    Class(String),
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}
