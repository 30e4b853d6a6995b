use std::fmt;

use once_cell::unsync::OnceCell;
use unbrew_class_file::MethodAccessFlags;

use crate::{
    namer::VariableNamer,
    types::{parse_method_signature, FormalTypeParameter, JavaType, MethodSignature, RefType},
    usage::TypeUsageCollector,
    Result,
};

pub const INIT_METHOD: &str = "<init>";
pub const STATIC_INIT_METHOD: &str = "<clinit>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructorKind {
    Not,
    StaticInitializer,
    Constructor,
    EnumConstructor,
    /// An enum constructor without a generic signature. Its descriptor is
    /// honest and declares the hidden name and ordinal arguments.
    EnumConstructorLegacyForm,
}
impl ConstructorKind {
    pub fn classify(name: &str, enclosing_is_enum: bool) -> Self {
        match name {
            INIT_METHOD if enclosing_is_enum => ConstructorKind::EnumConstructor,
            INIT_METHOD => ConstructorKind::Constructor,
            STATIC_INIT_METHOD => ConstructorKind::StaticInitializer,
            _ => ConstructorKind::Not,
        }
    }

    pub fn is_constructor(&self) -> bool {
        matches!(
            self,
            ConstructorKind::Constructor
                | ConstructorKind::EnumConstructor
                | ConstructorKind::EnumConstructorLegacyForm
        )
    }

    pub fn is_enum_constructor(&self) -> bool {
        matches!(
            self,
            ConstructorKind::EnumConstructor | ConstructorKind::EnumConstructorLegacyForm
        )
    }
}

/// Everything prototype synthesis needs to know about a method record.
#[derive(Debug, Clone, Copy)]
pub struct PrototypeSource<'a> {
    pub name: &'a str,
    pub class_type: &'a RefType,
    /// The declaring class is a non-static nested class.
    pub is_inner_class: bool,
    pub flags: MethodAccessFlags,
    pub constructor: ConstructorKind,
    pub descriptor: &'a str,
    pub signature: Option<&'a str>,
}

/// The callable signature of a method. Frozen once [`MethodPrototype::synthesize`]
/// returns; only the parameter names are filled in later, once.
#[derive(Debug, Clone)]
pub struct MethodPrototype {
    name: String,
    class_type: RefType,
    formal_type_parameters: Vec<FormalTypeParameter>,
    args: Vec<JavaType>,
    result: JavaType,
    signature_throws: Vec<JavaType>,
    instance: bool,
    varargs: bool,
    synthetic: bool,
    constructor: ConstructorKind,
    descriptor_fallback: Option<Box<MethodPrototype>>,
    parameter_names: OnceCell<Vec<String>>,
}

impl MethodPrototype {
    /// Build the prototype from the signature when there is one, else from the
    /// descriptor, and repair the known inner class signature bug.
    pub fn synthesize(source: PrototypeSource) -> Result<Self> {
        let mut constructor = source.constructor;
        // javac's enum constructor signatures omit the hidden name and ordinal
        // arguments; without a signature the descriptor shows them.
        if source.signature.is_none() && constructor == ConstructorKind::EnumConstructor {
            constructor = ConstructorKind::EnumConstructorLegacyForm;
        }

        let text = source.signature.unwrap_or(source.descriptor);
        let mut res = Self::from_signature(&source, constructor, parse_method_signature(text)?);

        if source.is_inner_class && source.signature.is_some() {
            let descriptor_proto = Self::from_signature(
                &source,
                constructor,
                parse_method_signature(source.descriptor)?,
            );
            if descriptor_proto.args.len() != res.args.len() {
                res.fix_inner_class_signature(descriptor_proto);
            }
        }

        Ok(res)
    }

    fn from_signature(
        source: &PrototypeSource,
        constructor: ConstructorKind,
        signature: MethodSignature,
    ) -> Self {
        Self {
            name: source.name.to_owned(),
            class_type: source.class_type.clone(),
            formal_type_parameters: signature.formal_type_parameters,
            args: signature.args,
            result: signature.result,
            signature_throws: signature.throws,
            instance: !source.flags.contains(MethodAccessFlags::STATIC),
            varargs: source.flags.contains(MethodAccessFlags::VARARGS),
            synthetic: source.flags.contains(MethodAccessFlags::SYNTHETIC),
            constructor,
            descriptor_fallback: None,
            parameter_names: OnceCell::new(),
        }
    }

    /// Some compilers leave the outer instance argument out of the signature
    /// of an inner class constructor, while the descriptor has it.
    fn fix_inner_class_signature(&mut self, descriptor: MethodPrototype) {
        let compatible = descriptor.args.len() == self.args.len() + 1
            && self
                .args
                .iter()
                .zip(&descriptor.args[1..])
                .all(|(sig, desc)| sig.erasure(&self.formal_type_parameters) == *desc);

        if !compatible {
            log::debug!(
                "Signature of {}.{} disagrees with its descriptor; using the descriptor",
                self.class_type,
                self.name
            );
            self.descriptor_fallback = Some(Box::new(descriptor));
            return;
        }

        log::debug!(
            "Restoring outer instance argument of {}.{}",
            self.class_type,
            self.name
        );
        self.args.insert(0, descriptor.args[0].clone());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_type(&self) -> &RefType {
        &self.class_type
    }

    pub fn formal_type_parameters(&self) -> &[FormalTypeParameter] {
        &self.formal_type_parameters
    }

    pub fn args(&self) -> &[JavaType] {
        &self.args
    }

    pub fn return_type(&self) -> &JavaType {
        &self.result
    }

    /// Exceptions declared by the generic signature (`^`), which may name
    /// type variables.
    pub fn signature_throws(&self) -> &[JavaType] {
        &self.signature_throws
    }

    pub fn is_instance_method(&self) -> bool {
        self.instance
    }

    pub fn is_varargs(&self) -> bool {
        self.varargs
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn constructor_kind(&self) -> ConstructorKind {
        self.constructor
    }

    pub fn descriptor_fallback(&self) -> Option<&MethodPrototype> {
        self.descriptor_fallback.as_deref()
    }

    /// The prototype to trust for argument positions: the descriptor's when
    /// the signature could not be reconciled with it.
    pub fn effective(&self) -> &MethodPrototype {
        self.descriptor_fallback().unwrap_or(self)
    }

    /// Leading arguments present in the prototype but absent from source.
    pub fn hidden_leading_args(&self) -> usize {
        match self.constructor {
            ConstructorKind::EnumConstructorLegacyForm => 2.min(self.effective().args.len()),
            _ => 0,
        }
    }

    /// Arguments as they are declared in source.
    pub fn declared_args(&self) -> &[JavaType] {
        &self.effective().args[self.hidden_leading_args()..]
    }

    pub fn parameters_computed(&self) -> bool {
        self.parameter_names.get().is_some()
    }

    /// Display names of every argument in [`MethodPrototype::effective`],
    /// computed on first request.
    pub fn parameter_names(&self, namer: &dyn VariableNamer) -> &[String] {
        self.parameter_names.get_or_init(|| {
            let mut slot: u16 = if self.instance { 1 } else { 0 };
            // The signature form omits name and ordinal, but they still
            // occupy slots 1 and 2.
            if self.constructor == ConstructorKind::EnumConstructor {
                slot += 2;
            }
            self.effective()
                .args
                .iter()
                .enumerate()
                .map(|(ordinal, arg)| {
                    let name = namer.parameter_name(slot, ordinal);
                    slot = slot.saturating_add(arg.slot_width());
                    name
                })
                .collect()
        })
    }

    pub fn collect_type_usages(&self, collector: &mut dyn TypeUsageCollector) {
        for formal in &self.formal_type_parameters {
            formal.bounds().for_each(|b| collector.collect(b));
        }
        let effective = self.effective();
        effective.args.iter().for_each(|a| collector.collect(a));
        collector.collect(&self.result);
        self.signature_throws
            .iter()
            .for_each(|t| collector.collect(t));
    }
}

impl fmt::Display for MethodPrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.formal_type_parameters.is_empty() {
            f.write_str("<")?;
            for (i, formal) in self.formal_type_parameters.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", formal)?;
            }
            f.write_str("> ")?;
        }
        write!(f, "{} {}(", self.result, self.name)?;
        for (i, arg) in self.effective().args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}
