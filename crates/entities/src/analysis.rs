use std::{cell::RefCell, fmt, mem};

use once_cell::unsync::OnceCell;
use unbrew_class_file::attributes::{Attribute, Attributes, CodeAttribute, ElementValue};

use crate::{
    dumper::Dumper, local_classes::LocalClassRegistry, usage::TypeUsageCollector, EntityError,
    Result,
};

/// The statement tree recovered from a method's bytecode.
pub trait StructuredBody: fmt::Debug {
    fn collect_type_usages(&self, collector: &mut dyn TypeUsageCollector);

    /// Renders the body including its enclosing braces.
    fn dump(&self, d: &mut dyn Dumper);
}

/// The control flow reconstruction engine.
pub trait CodeAnalyser {
    /// Local and anonymous classes discovered in the body are registered
    /// into `local_classes` as they are found.
    fn analyse(
        &self,
        code: &CodeAttribute,
        local_classes: &mut LocalClassRegistry,
    ) -> Result<Box<dyn StructuredBody>>;
}

#[derive(Debug)]
pub struct CodeBody {
    code: CodeAttribute,
    analysis: OnceCell<Box<dyn StructuredBody>>,
}

#[derive(Debug)]
pub enum MethodBody {
    /// Abstract, native, or an annotation element without a default.
    AbsentNoDefault,
    /// An annotation interface element with a default value.
    AbsentWithDefault(ElementValue),
    Present(CodeBody),
    /// The bytecode has been dropped; only the code header survives.
    Released(CodeAttribute),
}

impl MethodBody {
    /// Takes the `Code` attribute out of `attributes` so the body owns it.
    pub fn take_from(attributes: &mut Attributes) -> Self {
        match attributes.remove(Attribute::CODE) {
            Some(Attribute::Code(code)) => MethodBody::Present(CodeBody {
                code,
                analysis: OnceCell::new(),
            }),
            _ => match attributes.annotation_default() {
                Some(value) => MethodBody::AbsentWithDefault(value.clone()),
                None => MethodBody::AbsentNoDefault,
            },
        }
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        match self {
            MethodBody::Present(body) => Some(&body.code),
            _ => None,
        }
    }

    pub fn has_code(&self) -> bool {
        matches!(self, MethodBody::Present(_))
    }

    pub fn default_value(&self) -> Option<&ElementValue> {
        match self {
            MethodBody::AbsentWithDefault(value) => Some(value),
            _ => None,
        }
    }

    /// The analysed body, running the analyser the first time.
    pub fn analysis(
        &self,
        analyser: &dyn CodeAnalyser,
        local_classes: &RefCell<LocalClassRegistry>,
        method_name: &str,
    ) -> Result<&dyn StructuredBody> {
        match self {
            MethodBody::Present(body) => body
                .analysis
                .get_or_try_init(|| {
                    log::trace!("Analysing code of {}", method_name);
                    analyser.analyse(&body.code, &mut local_classes.borrow_mut())
                })
                .map(|b| b.as_ref()),
            MethodBody::Released(_) => Err(EntityError::CodeReleased(method_name.to_owned())),
            MethodBody::AbsentNoDefault | MethodBody::AbsentWithDefault(_) => {
                Err(EntityError::NoCode(method_name.to_owned()))
            }
        }
    }

    /// The analysed body if analysis has already run.
    pub fn cached_analysis(&self) -> Option<&dyn StructuredBody> {
        match self {
            MethodBody::Present(body) => body.analysis.get().map(|b| b.as_ref()),
            _ => None,
        }
    }

    /// Drops the bytecode and any analysis. Bodies without code are untouched.
    pub fn release(&mut self) {
        if let MethodBody::Present(_) = self {
            if let MethodBody::Present(CodeBody { mut code, .. }) =
                mem::replace(self, MethodBody::AbsentNoDefault)
            {
                code.release_code();
                *self = MethodBody::Released(code);
            }
        }
    }

    pub fn is_released(&self) -> bool {
        matches!(self, MethodBody::Released(_))
    }
}
