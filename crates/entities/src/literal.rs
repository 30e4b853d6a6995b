use std::fmt;

use unbrew_class_file::ConstantValue;

use crate::types::{parse_field_type, JavaType, RawType};
use crate::Result;

/// A constant with the type it has at its use site.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedLiteral {
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    String(String),
    Class(JavaType),
    MethodType(String),
}

impl TypedLiteral {
    pub fn from_constant(value: ConstantValue) -> Result<Self> {
        Ok(match value {
            ConstantValue::Integer(i) => TypedLiteral::Integer(i),
            ConstantValue::Long(l) => TypedLiteral::Long(l),
            ConstantValue::Float(f) => TypedLiteral::Float(f),
            ConstantValue::Double(d) => TypedLiteral::Double(d),
            ConstantValue::String(s) => TypedLiteral::String(s),
            ConstantValue::Class(name) => TypedLiteral::Class(class_literal_type(&name)?),
            ConstantValue::MethodType(descriptor) => TypedLiteral::MethodType(descriptor),
        })
    }

    /// Sub-int constants are stored as `int` in the pool; reinterpret one at
    /// the width and signedness of the type it is declared with. Anything
    /// else is returned unchanged.
    pub fn shrink_to(self, raw: RawType) -> Self {
        match self {
            TypedLiteral::Integer(i) => match raw {
                RawType::Boolean => TypedLiteral::Boolean(i != 0),
                RawType::Byte => TypedLiteral::Byte(i as i8),
                RawType::Char => TypedLiteral::Char(i as u16),
                RawType::Short => TypedLiteral::Short(i as i16),
                _ => TypedLiteral::Integer(i),
            },
            other => other,
        }
    }
}

/// Class constants hold an internal name, or a descriptor for array classes.
fn class_literal_type(name: &str) -> Result<JavaType> {
    if name.starts_with('[') {
        parse_field_type(name)
    } else {
        Ok(JavaType::class(name))
    }
}

impl fmt::Display for TypedLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedLiteral::Integer(i) => write!(f, "{}", i),
            TypedLiteral::Long(l) => write!(f, "{}L", l),
            TypedLiteral::Float(v) if v.is_nan() => f.write_str("Float.NaN"),
            TypedLiteral::Float(v) if v.is_infinite() => f.write_str(if *v > 0. {
                "Float.POSITIVE_INFINITY"
            } else {
                "Float.NEGATIVE_INFINITY"
            }),
            TypedLiteral::Float(v) => write!(f, "{:?}f", v),
            TypedLiteral::Double(v) if v.is_nan() => f.write_str("Double.NaN"),
            TypedLiteral::Double(v) if v.is_infinite() => f.write_str(if *v > 0. {
                "Double.POSITIVE_INFINITY"
            } else {
                "Double.NEGATIVE_INFINITY"
            }),
            TypedLiteral::Double(v) => write!(f, "{:?}", v),
            TypedLiteral::Boolean(b) => write!(f, "{}", b),
            TypedLiteral::Byte(b) => write!(f, "{}", b),
            TypedLiteral::Short(s) => write!(f, "{}", s),
            TypedLiteral::Char(c) => {
                f.write_str("'")?;
                match char::from_u32(u32::from(*c)) {
                    Some(c) => write_escaped(f, c, '\'')?,
                    // Lone surrogate.
                    None => write!(f, "\\u{:04x}", c)?,
                }
                f.write_str("'")
            }
            TypedLiteral::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    write_escaped(f, c, '"')?;
                }
                f.write_str("\"")
            }
            TypedLiteral::Class(t) => write!(f, "{}.class", t),
            TypedLiteral::MethodType(descriptor) => write!(f, "/* method type */ {:?}", descriptor),
        }
    }
}

/// Java escapes only; printable non-ASCII characters are written as is.
fn write_escaped(f: &mut fmt::Formatter<'_>, c: char, quote: char) -> fmt::Result {
    match c {
        '\\' => f.write_str("\\\\"),
        '\n' => f.write_str("\\n"),
        '\t' => f.write_str("\\t"),
        '\r' => f.write_str("\\r"),
        '\u{8}' => f.write_str("\\b"),
        '\u{c}' => f.write_str("\\f"),
        c if c == quote => write!(f, "\\{}", c),
        c if c.is_control() => write!(f, "\\u{:04x}", u32::from(c)),
        c => write!(f, "{}", c),
    }
}
