//! Java types as they appear in descriptors and generic signatures.

mod signature;

use std::fmt;

pub use signature::{parse_field_type, parse_method_signature, MethodSignature};

pub const OBJECT: &str = "java/lang/Object";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}
impl RawType {
    pub fn from_descriptor(c: u8) -> Option<Self> {
        Some(match c {
            b'Z' => RawType::Boolean,
            b'B' => RawType::Byte,
            b'C' => RawType::Char,
            b'S' => RawType::Short,
            b'I' => RawType::Int,
            b'J' => RawType::Long,
            b'F' => RawType::Float,
            b'D' => RawType::Double,
            b'V' => RawType::Void,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            RawType::Boolean => "boolean",
            RawType::Byte => "byte",
            RawType::Char => "char",
            RawType::Short => "short",
            RawType::Int => "int",
            RawType::Long => "long",
            RawType::Float => "float",
            RawType::Double => "double",
            RawType::Void => "void",
        }
    }

    /// Local variable slots taken by a value of this type.
    pub fn slot_width(&self) -> u16 {
        match self {
            RawType::Long | RawType::Double => 2,
            RawType::Void => 0,
            _ => 1,
        }
    }

    /// Types stored as a wide `int` in the constant pool.
    pub fn is_sub_int(&self) -> bool {
        matches!(
            self,
            RawType::Boolean | RawType::Byte | RawType::Char | RawType::Short
        )
    }
}

/// A class or interface, by internal name (`java/util/Map$Entry`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefType(String);
impl RefType {
    pub fn new(internal_name: impl Into<String>) -> Self {
        Self(internal_name.into())
    }

    pub fn object() -> Self {
        Self::new(OBJECT)
    }

    pub fn internal_name(&self) -> &str {
        &self.0
    }

    /// `java/util` for `java/util/Map$Entry`, empty for the default package.
    pub fn package_name(&self) -> &str {
        self.0.rfind('/').map_or("", |i| &self.0[..i])
    }

    /// `Entry` for `java/util/Map$Entry`.
    pub fn simple_name(&self) -> &str {
        let name = self.0.rfind('/').map_or(&self.0[..], |i| &self.0[i + 1..]);
        name.rfind('$').map_or(name, |i| &name[i + 1..])
    }

    pub fn java_name(&self) -> String {
        self.0.replace(['/', '$'], ".")
    }
}
impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.java_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeArgument {
    /// `?`
    Any,
    /// `? extends T`
    Extends(JavaType),
    /// `? super T`
    Super(JavaType),
    Exact(JavaType),
}
impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArgument::Any => f.write_str("?"),
            TypeArgument::Extends(t) => write!(f, "? extends {}", t),
            TypeArgument::Super(t) => write!(f, "? super {}", t),
            TypeArgument::Exact(t) => write!(f, "{}", t),
        }
    }
}

/// A parameterized class type. `outer` is set for `Outer<A>.Inner<B>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericType {
    pub base: RefType,
    pub args: Vec<TypeArgument>,
    pub outer: Option<Box<GenericType>>,
}
impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outer {
            Some(outer) => write!(f, "{}.{}", outer, self.base.simple_name())?,
            None => write!(f, "{}", self.base)?,
        }
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    Raw(RawType),
    Ref(RefType),
    Generic(GenericType),
    TypeVariable(String),
    Array(Box<JavaType>),
}
impl JavaType {
    pub fn class(internal_name: impl Into<String>) -> Self {
        JavaType::Ref(RefType::new(internal_name))
    }

    pub fn array_of(component: JavaType) -> Self {
        JavaType::Array(Box::new(component))
    }

    pub fn as_raw(&self) -> Option<RawType> {
        match self {
            JavaType::Raw(raw) => Some(*raw),
            _ => None,
        }
    }

    /// The class behind a plain or parameterized class type.
    pub fn ref_type(&self) -> Option<&RefType> {
        match self {
            JavaType::Ref(r) => Some(r),
            JavaType::Generic(g) => Some(&g.base),
            _ => None,
        }
    }

    pub fn slot_width(&self) -> u16 {
        match self {
            JavaType::Raw(raw) => raw.slot_width(),
            _ => 1,
        }
    }

    /// Erasure without knowledge of type variable bounds: type variables
    /// erase to `Object`.
    pub fn de_generified(&self) -> JavaType {
        self.erasure(&[])
    }

    /// Erasure with type variables resolved against `formals`.
    pub fn erasure(&self, formals: &[FormalTypeParameter]) -> JavaType {
        self.erasure_at_depth(formals, 0)
    }

    fn erasure_at_depth(&self, formals: &[FormalTypeParameter], depth: usize) -> JavaType {
        match self {
            JavaType::Raw(_) | JavaType::Ref(_) => self.clone(),
            JavaType::Generic(g) => JavaType::Ref(g.base.clone()),
            JavaType::Array(component) => {
                JavaType::array_of(component.erasure_at_depth(formals, depth))
            }
            JavaType::TypeVariable(name) => {
                // Bounds may chain through other variables (`<U:TT;>`) or be
                // cyclic in malformed input.
                match formals.iter().find(|f| &f.name == name) {
                    Some(formal) if depth < formals.len() => formal
                        .first_bound()
                        .map_or_else(JavaType::object, |b| {
                            b.erasure_at_depth(formals, depth + 1)
                        }),
                    _ => JavaType::object(),
                }
            }
        }
    }

    pub fn object() -> Self {
        JavaType::Ref(RefType::object())
    }

    /// Every type mentioned by this one, itself included, outermost first.
    pub fn components(&self) -> Vec<&JavaType> {
        let mut res = vec![];
        self.push_components(&mut res);
        res
    }

    fn push_components<'a>(&'a self, res: &mut Vec<&'a JavaType>) {
        res.push(self);
        match self {
            JavaType::Generic(g) => push_generic_components(g, res),
            JavaType::Array(component) => component.push_components(res),
            _ => {}
        }
    }

    /// Prefix used when a field has to be renamed to stay unique.
    pub fn type_fix_prefix(&self) -> String {
        match self {
            JavaType::Raw(raw) => raw.name().to_owned(),
            JavaType::Array(component) => format!("arr{}", component.type_fix_prefix()),
            JavaType::TypeVariable(name) => name.clone(),
            JavaType::Ref(_) | JavaType::Generic(_) => self
                .ref_type()
                .map(|r| r.simple_name())
                .unwrap_or_default()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect(),
        }
    }
}

fn push_generic_components<'a>(g: &'a GenericType, res: &mut Vec<&'a JavaType>) {
    if let Some(outer) = &g.outer {
        push_generic_components(outer, res);
    }
    for arg in &g.args {
        match arg {
            TypeArgument::Any => {}
            TypeArgument::Extends(t) | TypeArgument::Super(t) | TypeArgument::Exact(t) => {
                t.push_components(res)
            }
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Raw(raw) => f.write_str(raw.name()),
            JavaType::Ref(r) => write!(f, "{}", r),
            JavaType::Generic(g) => write!(f, "{}", g),
            JavaType::TypeVariable(name) => f.write_str(name),
            JavaType::Array(component) => write!(f, "{}[]", component),
        }
    }
}

/// `T extends Bound & Iface` from a generic signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormalTypeParameter {
    pub name: String,
    pub class_bound: Option<JavaType>,
    pub interface_bounds: Vec<JavaType>,
}
impl FormalTypeParameter {
    pub fn first_bound(&self) -> Option<&JavaType> {
        self.class_bound
            .as_ref()
            .or_else(|| self.interface_bounds.first())
    }

    pub fn bounds(&self) -> impl Iterator<Item = &JavaType> {
        self.class_bound.iter().chain(&self.interface_bounds)
    }
}
impl fmt::Display for FormalTypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        let bounds = self
            .bounds()
            .filter(|b| b.ref_type().map(|r| r.internal_name()) != Some(OBJECT))
            .collect::<Vec<_>>();
        for (i, bound) in bounds.iter().enumerate() {
            f.write_str(if i == 0 { " extends " } else { " & " })?;
            write!(f, "{}", bound)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_type_names() {
        let entry = RefType::new("java/util/Map$Entry");
        assert_eq!("java/util", entry.package_name());
        assert_eq!("Entry", entry.simple_name());
        assert_eq!("java.util.Map.Entry", entry.to_string());
        assert_eq!("", RefType::new("Foo").package_name());
    }

    #[test]
    fn test_erasure_follows_bounds() {
        let formals = vec![
            FormalTypeParameter {
                name: "T".into(),
                class_bound: Some(JavaType::class("java/lang/Number")),
                interface_bounds: vec![],
            },
            FormalTypeParameter {
                name: "U".into(),
                class_bound: Some(JavaType::TypeVariable("T".into())),
                interface_bounds: vec![],
            },
        ];
        let u_array = JavaType::array_of(JavaType::TypeVariable("U".into()));

        assert_eq!(
            JavaType::array_of(JavaType::class("java/lang/Number")),
            u_array.erasure(&formals)
        );
        assert_eq!(
            JavaType::array_of(JavaType::object()),
            u_array.de_generified()
        );
    }

    #[test]
    fn test_cyclic_bounds_terminate() {
        let formals = vec![FormalTypeParameter {
            name: "T".into(),
            class_bound: Some(JavaType::TypeVariable("T".into())),
            interface_bounds: vec![],
        }];
        assert_eq!(
            JavaType::object(),
            JavaType::TypeVariable("T".into()).erasure(&formals)
        );
    }

    #[test]
    fn test_type_fix_prefix() {
        assert_eq!("int", JavaType::Raw(RawType::Int).type_fix_prefix());
        assert_eq!(
            "arrString",
            JavaType::array_of(JavaType::class("java/lang/String")).type_fix_prefix()
        );
    }
}
