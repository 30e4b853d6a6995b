//! Recursive descent over descriptors and generic signatures (JVMS 4.3, 4.7.9.1).
//! Descriptors are a subset of signatures, so one parser serves both.

use super::{FormalTypeParameter, GenericType, JavaType, RawType, RefType, TypeArgument};
use crate::{EntityError, Result};

/// A parsed method descriptor or method signature.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub formal_type_parameters: Vec<FormalTypeParameter>,
    pub args: Vec<JavaType>,
    pub result: JavaType,
    /// Only signatures carry these; descriptors never do.
    pub throws: Vec<JavaType>,
}

pub fn parse_field_type(text: &str) -> Result<JavaType> {
    let mut p = SignatureParser::new(text);
    let res = p.field_type()?;
    p.expect_end()?;
    Ok(res)
}

pub fn parse_method_signature(text: &str) -> Result<MethodSignature> {
    let mut p = SignatureParser::new(text);
    let res = p.method_signature()?;
    p.expect_end()?;
    Ok(res)
}

struct SignatureParser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn error(&self, reason: &'static str) -> EntityError {
        EntityError::InvalidSignature {
            signature: self.text.to_owned(),
            offset: self.pos,
            reason,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn next(&mut self) -> Result<u8> {
        let c = self.peek().ok_or_else(|| self.error("unexpected end"))?;
        self.pos += 1;
        Ok(c)
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: u8, reason: &'static str) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(reason))
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.pos == self.text.len() {
            Ok(())
        } else {
            Err(self.error("trailing characters"))
        }
    }

    /// Identifier up to (not including) any of `stops`.
    fn identifier(&mut self, stops: &[u8]) -> Result<&'a str> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("empty identifier"));
        }
        Ok(&self.text[start..self.pos])
    }

    fn method_signature(&mut self) -> Result<MethodSignature> {
        let formal_type_parameters = if self.peek() == Some(b'<') {
            self.formal_type_parameters()?
        } else {
            vec![]
        };

        self.expect(b'(', "expected '('")?;
        let mut args = vec![];
        while !self.eat(b')') {
            args.push(self.field_type()?);
        }

        let result = if self.eat(b'V') {
            JavaType::Raw(RawType::Void)
        } else {
            self.field_type()?
        };

        let mut throws = vec![];
        while self.eat(b'^') {
            throws.push(self.reference_type()?);
        }

        Ok(MethodSignature {
            formal_type_parameters,
            args,
            result,
            throws,
        })
    }

    fn formal_type_parameters(&mut self) -> Result<Vec<FormalTypeParameter>> {
        self.expect(b'<', "expected '<'")?;
        let mut res = vec![];
        while !self.eat(b'>') {
            let name = self.identifier(b":>;")?.to_owned();
            self.expect(b':', "expected ':' after type parameter")?;
            // The class bound may be empty (`T::Ljava/lang/Comparable;`).
            let class_bound = match self.peek() {
                Some(b':') | Some(b'>') => None,
                _ => Some(self.reference_type()?),
            };
            let mut interface_bounds = vec![];
            while self.eat(b':') {
                interface_bounds.push(self.reference_type()?);
            }
            res.push(FormalTypeParameter {
                name,
                class_bound,
                interface_bounds,
            });
        }
        Ok(res)
    }

    fn field_type(&mut self) -> Result<JavaType> {
        match self.peek() {
            Some(b'L') | Some(b'T') | Some(b'[') => self.reference_type(),
            Some(b'V') => Err(self.error("void is only valid as a return type")),
            Some(c) => match RawType::from_descriptor(c) {
                Some(raw) => {
                    self.pos += 1;
                    Ok(JavaType::Raw(raw))
                }
                None => Err(self.error("unknown type tag")),
            },
            None => Err(self.error("unexpected end")),
        }
    }

    fn reference_type(&mut self) -> Result<JavaType> {
        match self.next()? {
            b'L' => self.class_type(),
            b'T' => {
                let name = self.identifier(b";")?.to_owned();
                self.expect(b';', "expected ';' after type variable")?;
                Ok(JavaType::TypeVariable(name))
            }
            b'[' => Ok(JavaType::array_of(self.field_type()?)),
            _ => {
                self.pos -= 1;
                Err(self.error("expected reference type"))
            }
        }
    }

    /// After the leading `L`.
    fn class_type(&mut self) -> Result<JavaType> {
        let mut name = self.identifier(b"<;.")?.to_owned();
        let mut current = GenericType {
            base: RefType::new(name.clone()),
            args: self.type_arguments()?,
            outer: None,
        };

        while self.eat(b'.') {
            name.push('$');
            name.push_str(self.identifier(b"<;.")?);
            let args = self.type_arguments()?;
            current = GenericType {
                base: RefType::new(name.clone()),
                args,
                outer: Some(Box::new(current)),
            };
        }
        self.expect(b';', "expected ';' after class type")?;

        if current.args.is_empty() && !has_generic_outer(&current) {
            Ok(JavaType::Ref(current.base))
        } else {
            Ok(JavaType::Generic(current))
        }
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        if !self.eat(b'<') {
            return Ok(vec![]);
        }
        let mut res = vec![];
        while !self.eat(b'>') {
            res.push(match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    TypeArgument::Any
                }
                Some(b'+') => {
                    self.pos += 1;
                    TypeArgument::Extends(self.reference_type()?)
                }
                Some(b'-') => {
                    self.pos += 1;
                    TypeArgument::Super(self.reference_type()?)
                }
                _ => TypeArgument::Exact(self.reference_type()?),
            });
        }
        if res.is_empty() {
            return Err(self.error("empty type argument list"));
        }
        Ok(res)
    }
}

fn has_generic_outer(g: &GenericType) -> bool {
    g.outer
        .as_ref()
        .map_or(false, |o| !o.args.is_empty() || has_generic_outer(o))
}
