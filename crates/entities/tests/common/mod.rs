#![allow(dead_code)]

use std::rc::Rc;

use byteorder::{BigEndian, WriteBytesExt};

use unbrew_class_file::{
    attributes::CodeAttribute, AccessFlags, ClassFileVersion, ClassInfo, ConstantPool, CpInfo,
    StandardAttributeFactory,
};
use unbrew_entities::{
    ClassContext, CodeAnalyser, Dumper, Field, JavaType, LocalClassRegistry, MemberOptions,
    Method, RefType, Result, StructuredBody, TypeUsageCollector,
};

/// Constant pool under construction; each helper returns the new entry's index.
#[derive(Default)]
pub struct PoolBuilder {
    infos: Vec<CpInfo>,
}
impl PoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, info: CpInfo) -> u16 {
        self.infos.push(info);
        self.infos.len() as u16
    }

    pub fn utf8(&mut self, s: &str) -> u16 {
        let existing = self
            .infos
            .iter()
            .position(|info| matches!(info, CpInfo::Utf8(u) if u == s));
        match existing {
            Some(i) => i as u16 + 1,
            None => self.push(CpInfo::Utf8(s.to_owned())),
        }
    }

    pub fn integer(&mut self, i: i32) -> u16 {
        self.push(CpInfo::Integer(i))
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.push(CpInfo::Class(ClassInfo { name_index }))
    }

    pub fn build(self) -> ConstantPool {
        ConstantPool::new(self.infos)
    }
}

/// A field_info or method_info record under construction.
pub struct RecordBuilder<'a> {
    pool: &'a mut PoolBuilder,
    out: Vec<u8>,
    attributes: Vec<u8>,
    attribute_count: u16,
}
impl<'a> RecordBuilder<'a> {
    pub fn new(pool: &'a mut PoolBuilder, access_flags: u16, name: &str, descriptor: &str) -> Self {
        let mut out = vec![];
        out.write_u16::<BigEndian>(access_flags).unwrap();
        out.write_u16::<BigEndian>(pool.utf8(name)).unwrap();
        out.write_u16::<BigEndian>(pool.utf8(descriptor)).unwrap();
        Self {
            pool,
            out,
            attributes: vec![],
            attribute_count: 0,
        }
    }

    pub fn attribute(mut self, name: &str, body: &[u8]) -> Self {
        let name_index = self.pool.utf8(name);
        self.attributes.write_u16::<BigEndian>(name_index).unwrap();
        self.attributes
            .write_u32::<BigEndian>(body.len() as u32)
            .unwrap();
        self.attributes.extend_from_slice(body);
        self.attribute_count += 1;
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        let index = self.pool.utf8(signature);
        self.attribute("Signature", &index.to_be_bytes())
    }

    pub fn constant_int(mut self, value: i32) -> Self {
        let index = self.pool.integer(value);
        self.attribute("ConstantValue", &index.to_be_bytes())
    }

    pub fn exceptions(mut self, classes: &[&str]) -> Self {
        let mut body = vec![];
        body.write_u16::<BigEndian>(classes.len() as u16).unwrap();
        for class in classes {
            let index = self.pool.class(class);
            body.write_u16::<BigEndian>(index).unwrap();
        }
        self.attribute("Exceptions", &body)
    }

    pub fn annotation_default_int(mut self, value: i32) -> Self {
        let index = self.pool.integer(value);
        let mut body = vec![b'I'];
        body.write_u16::<BigEndian>(index).unwrap();
        self.attribute("AnnotationDefault", &body)
    }

    /// `RuntimeVisibleAnnotations` with marker annotations only.
    pub fn annotations(mut self, descriptors: &[&str]) -> Self {
        let mut body = vec![];
        body.write_u16::<BigEndian>(descriptors.len() as u16).unwrap();
        for descriptor in descriptors {
            body.write_u16::<BigEndian>(self.pool.utf8(descriptor))
                .unwrap();
            body.write_u16::<BigEndian>(0).unwrap();
        }
        self.attribute("RuntimeVisibleAnnotations", &body)
    }

    /// A `Code` attribute holding `return`, with an optional local variable
    /// table of `(name, descriptor, slot)` entries live from pc 0.
    pub fn code(mut self, locals: &[(&str, &str, u16)]) -> Self {
        let mut nested = vec![];
        let mut nested_count = 0u16;
        if !locals.is_empty() {
            let mut table = vec![];
            table.write_u16::<BigEndian>(locals.len() as u16).unwrap();
            for (name, descriptor, slot) in locals {
                table.write_u16::<BigEndian>(0).unwrap();
                table.write_u16::<BigEndian>(1).unwrap();
                table.write_u16::<BigEndian>(self.pool.utf8(name)).unwrap();
                table
                    .write_u16::<BigEndian>(self.pool.utf8(descriptor))
                    .unwrap();
                table.write_u16::<BigEndian>(*slot).unwrap();
            }
            nested
                .write_u16::<BigEndian>(self.pool.utf8("LocalVariableTable"))
                .unwrap();
            nested.write_u32::<BigEndian>(table.len() as u32).unwrap();
            nested.extend_from_slice(&table);
            nested_count += 1;
        }

        let mut body = vec![];
        body.write_u16::<BigEndian>(1).unwrap();
        body.write_u16::<BigEndian>(4).unwrap();
        body.write_u32::<BigEndian>(1).unwrap();
        body.write_u8(0xb1).unwrap();
        body.write_u16::<BigEndian>(0).unwrap();
        body.write_u16::<BigEndian>(nested_count).unwrap();
        body.extend_from_slice(&nested);
        self.attribute("Code", &body)
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = self.out;
        out.write_u16::<BigEndian>(self.attribute_count).unwrap();
        out.extend_from_slice(&self.attributes);
        out
    }
}

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

pub fn class(name: &str) -> Rc<ClassContext> {
    Rc::new(ClassContext::new(
        RefType::new(name),
        AccessFlags::PUBLIC | AccessFlags::SUPER,
    ))
}

pub fn parse_field(pool: PoolBuilder, raw: &[u8]) -> Result<Field> {
    Field::parse(
        raw,
        &pool.build(),
        ClassFileVersion::JAVA_8,
        &StandardAttributeFactory,
    )
}

pub fn parse_method(
    pool: PoolBuilder,
    raw: &[u8],
    class: Rc<ClassContext>,
    options: MemberOptions,
) -> Result<Method> {
    Method::parse(
        raw,
        &pool.build(),
        ClassFileVersion::JAVA_8,
        &StandardAttributeFactory,
        class,
        options,
    )
}

/// Analysis stand-in that renders an empty block and registers the given
/// local classes.
#[derive(Default)]
pub struct FakeAnalyser {
    pub local_classes: Vec<(&'static str, Option<&'static str>)>,
}

#[derive(Debug)]
pub struct EmptyBlock {
    instructions: usize,
}
impl StructuredBody for EmptyBlock {
    fn collect_type_usages(&self, _collector: &mut dyn TypeUsageCollector) {}

    fn dump(&self, d: &mut dyn Dumper) {
        d.print("{");
        d.newline();
        d.print(&format!("// {} instructions", self.instructions));
        d.newline();
        d.print("}");
        d.newline();
    }
}

impl CodeAnalyser for FakeAnalyser {
    fn analyse(
        &self,
        code: &CodeAttribute,
        local_classes: &mut LocalClassRegistry,
    ) -> Result<Box<dyn StructuredBody>> {
        for (class, name) in &self.local_classes {
            local_classes.register(
                &JavaType::class(*class),
                name.map(str::to_owned),
            )?;
        }
        Ok(Box::new(EmptyBlock {
            instructions: code.code().len(),
        }))
    }
}
