use unbrew_class_file::attributes::{Annotation, ElementValue};

use crate::{
    dumper::Dumper,
    literal::TypedLiteral,
    types::{parse_field_type, JavaType, RawType},
    usage::TypeUsageCollector,
    Result,
};

const VALUE_ELEMENT: &str = "value";

/// `@Type`, `@Type(v)` or `@Type(a=v, b=w)`.
pub fn dump_annotation(annotation: &Annotation, d: &mut dyn Dumper) -> Result<()> {
    d.print("@");
    d.dump_type(&parse_field_type(&annotation.type_descriptor)?);
    match annotation.elements.as_slice() {
        [] => {}
        [(name, value)] if name == VALUE_ELEMENT => {
            d.print("(");
            dump_element_value(value, d)?;
            d.print(")");
        }
        elements => {
            d.print("(");
            for (i, (name, value)) in elements.iter().enumerate() {
                if i > 0 {
                    d.print(", ");
                }
                d.identifier(name);
                d.print("=");
                dump_element_value(value, d)?;
            }
            d.print(")");
        }
    }
    Ok(())
}

pub fn dump_element_value(value: &ElementValue, d: &mut dyn Dumper) -> Result<()> {
    match value {
        ElementValue::Const { tag, value } => {
            let literal = TypedLiteral::from_constant(value.clone())?;
            let literal = match u8::try_from(*tag).ok().and_then(RawType::from_descriptor) {
                Some(raw) => literal.shrink_to(raw),
                None => literal,
            };
            d.print(&literal.to_string());
        }
        ElementValue::Enum {
            type_descriptor,
            const_name,
        } => {
            d.dump_type(&parse_field_type(type_descriptor)?);
            d.print(".");
            d.identifier(const_name);
        }
        ElementValue::Class(descriptor) => {
            d.dump_type(&class_literal_type(descriptor)?);
            d.print(".class");
        }
        ElementValue::Annotation(annotation) => dump_annotation(annotation, d)?,
        ElementValue::Array(values) => {
            d.print("{");
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    d.print(", ");
                }
                dump_element_value(value, d)?;
            }
            d.print("}");
        }
    }
    Ok(())
}

pub fn collect_annotation_usages(
    annotation: &Annotation,
    collector: &mut dyn TypeUsageCollector,
) -> Result<()> {
    collector.collect(&parse_field_type(&annotation.type_descriptor)?);
    for (_, value) in &annotation.elements {
        collect_element_value_usages(value, collector)?;
    }
    Ok(())
}

pub fn collect_element_value_usages(
    value: &ElementValue,
    collector: &mut dyn TypeUsageCollector,
) -> Result<()> {
    match value {
        ElementValue::Const { .. } => {}
        ElementValue::Enum {
            type_descriptor, ..
        } => collector.collect(&parse_field_type(type_descriptor)?),
        ElementValue::Class(descriptor) => collector.collect(&class_literal_type(descriptor)?),
        ElementValue::Annotation(annotation) => collect_annotation_usages(annotation, collector)?,
        ElementValue::Array(values) => {
            for value in values {
                collect_element_value_usages(value, collector)?;
            }
        }
    }
    Ok(())
}

fn class_literal_type(descriptor: &str) -> Result<JavaType> {
    if descriptor == "V" {
        return Ok(JavaType::Raw(RawType::Void));
    }
    parse_field_type(descriptor)
}
