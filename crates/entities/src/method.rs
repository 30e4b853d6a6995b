use std::{
    cell::{Ref, RefCell},
    fmt,
    rc::Rc,
};

use indexmap::IndexSet;
use once_cell::unsync::OnceCell;
use unbrew_class_file::{
    AttributeFactory, Attributes, ClassFileVersion, ConstantPool, MemberRecord, MethodAccessFlags,
};

use crate::{
    analysis::{CodeAnalyser, MethodBody, StructuredBody},
    annotations::{
        collect_annotation_usages, collect_element_value_usages, dump_annotation,
        dump_element_value,
    },
    class::ClassContext,
    comments::DecompilerComments,
    dumper::{Dumper, LocalClassAwareDumper},
    local_classes::LocalClassRegistry,
    namer::{DefaultNamer, TableNamer, VariableNamer},
    options::MemberOptions,
    prototype::{ConstructorKind, MethodPrototype, PrototypeSource},
    types::{JavaType, RefType},
    usage::TypeUsageCollector,
    visibility::{self, TypeBindings},
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenState {
    Visible,
    HiddenSynthetic,
    HiddenBridge,
}

#[derive(Debug)]
pub struct Method {
    record: MemberRecord,
    name: String,
    descriptor: String,
    access_flags: MethodAccessFlags,
    class: Rc<ClassContext>,
    body: MethodBody,
    namer: Box<dyn VariableNamer>,
    prototype: MethodPrototype,
    hidden: HiddenState,
    is_override: bool,
    local_classes: RefCell<LocalClassRegistry>,
    thrown_types: OnceCell<IndexSet<JavaType>>,
    comments: Option<DecompilerComments>,
}

impl Method {
    pub fn parse(
        raw: &[u8],
        constant_pool: &ConstantPool,
        version: ClassFileVersion,
        factory: &dyn AttributeFactory,
        class: Rc<ClassContext>,
        options: MemberOptions,
    ) -> Result<Self> {
        let record = MemberRecord::parse(raw, constant_pool, version, factory)?;
        Self::from_record(record, constant_pool, class, options)
    }

    pub fn from_record(
        record: MemberRecord,
        constant_pool: &ConstantPool,
        class: Rc<ClassContext>,
        options: MemberOptions,
    ) -> Result<Self> {
        let name = record.name(constant_pool)?.to_owned();
        let context = format!("{}.{}", class.class_type, name);
        Self::build(record, constant_pool, class, options, name).map_err(|e| e.in_member(context))
    }

    fn build(
        mut record: MemberRecord,
        constant_pool: &ConstantPool,
        class: Rc<ClassContext>,
        options: MemberOptions,
        name: String,
    ) -> Result<Self> {
        let descriptor = record.descriptor(constant_pool)?.to_owned();
        let access_flags = record.method_flags();
        let constructor = ConstructorKind::classify(&name, class.is_enum());
        let body = MethodBody::take_from(&mut record.attributes);

        let namer: Box<dyn VariableNamer> = match body.code().and_then(|c| c.local_variable_table())
        {
            Some(table) if options.use_name_table => Box::new(TableNamer::new(table)),
            _ => Box::new(DefaultNamer),
        };

        let prototype = MethodPrototype::synthesize(PrototypeSource {
            name: &name,
            class_type: &class.class_type,
            is_inner_class: class.is_inner_class,
            flags: access_flags,
            constructor,
            descriptor: &descriptor,
            signature: record.attributes.signature(),
        })?;

        let hidden = if options.hide_bridge_methods
            && access_flags.contains(MethodAccessFlags::BRIDGE)
            && !access_flags.contains(MethodAccessFlags::STATIC)
        {
            log::debug!("Hiding bridge method {}.{}", class.class_type, name);
            HiddenState::HiddenBridge
        } else {
            HiddenState::Visible
        };

        log::trace!("Built method {}{}", name, descriptor);
        Ok(Self {
            record,
            name,
            descriptor,
            access_flags,
            class,
            body,
            namer,
            prototype,
            hidden,
            is_override: false,
            local_classes: RefCell::new(LocalClassRegistry::new()),
            thrown_types: OnceCell::new(),
            comments: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn class_type(&self) -> &RefType {
        &self.class.class_type
    }

    pub fn access_flags(&self) -> MethodAccessFlags {
        self.access_flags
    }

    pub fn test_access_flag(&self, flag: MethodAccessFlags) -> bool {
        self.access_flags.contains(flag)
    }

    pub fn is_synthetic(&self) -> bool {
        self.test_access_flag(MethodAccessFlags::SYNTHETIC)
    }

    pub fn is_bridge(&self) -> bool {
        self.test_access_flag(MethodAccessFlags::BRIDGE)
    }

    pub fn is_varargs(&self) -> bool {
        self.test_access_flag(MethodAccessFlags::VARARGS)
    }

    pub fn constructor_kind(&self) -> ConstructorKind {
        self.prototype.constructor_kind()
    }

    pub fn is_constructor(&self) -> bool {
        self.constructor_kind().is_constructor()
    }

    pub fn prototype(&self) -> &MethodPrototype {
        &self.prototype
    }

    pub fn body(&self) -> &MethodBody {
        &self.body
    }

    pub fn has_code(&self) -> bool {
        self.body.has_code()
    }

    /// Attributes other than `Code`, which the body owns.
    pub fn attributes(&self) -> &Attributes {
        &self.record.attributes
    }

    pub fn raw_length(&self) -> usize {
        self.record.raw_length
    }

    pub fn hide_synthetic(&mut self) {
        self.hidden = HiddenState::HiddenSynthetic;
    }

    pub fn hidden_state(&self) -> HiddenState {
        self.hidden
    }

    pub fn mark_override(&mut self) {
        self.is_override = true;
    }

    pub fn is_override(&self) -> bool {
        self.is_override
    }

    pub fn set_comments(&mut self, comments: DecompilerComments) {
        self.comments = Some(comments);
    }

    pub fn comments(&self) -> Option<&DecompilerComments> {
        self.comments.as_ref()
    }

    /// Records a local or anonymous class used by this method's body.
    pub fn mark_used_local_class(&self, ty: &JavaType, suggested_name: Option<String>) -> Result<()> {
        self.local_classes
            .borrow_mut()
            .register(ty, suggested_name)
            .map_err(|e| e.in_member(self.to_string()))
    }

    /// Returns whether `other` had any local classes.
    pub fn copy_local_classes_from(&self, other: &Method) -> bool {
        let theirs = other.local_classes.borrow().clone();
        self.local_classes.borrow_mut().merge_from(&theirs)
    }

    pub fn local_classes(&self) -> Ref<'_, LocalClassRegistry> {
        self.local_classes.borrow()
    }

    /// Declared exceptions. The generic forms from the signature are used
    /// when they line up with the `Exceptions` attribute.
    pub fn thrown_types(&self) -> &IndexSet<JavaType> {
        self.thrown_types.get_or_init(|| {
            let declared = self
                .record
                .attributes
                .exceptions()
                .unwrap_or_default()
                .iter()
                .map(|name| JavaType::class(name.as_str()))
                .collect::<Vec<_>>();
            let generic = self.prototype.signature_throws();
            let formals = self.prototype.formal_type_parameters();
            if !generic.is_empty()
                && generic.len() == declared.len()
                && generic
                    .iter()
                    .zip(&declared)
                    .all(|(g, d)| g.erasure(formals) == *d)
            {
                generic.iter().cloned().collect()
            } else {
                declared.into_iter().collect()
            }
        })
    }

    /// Parameter display names, in prototype order.
    pub fn parameter_names(&self) -> &[String] {
        self.prototype.parameter_names(self.namer.as_ref())
    }

    /// The structured body, analysed on first request.
    pub fn analysis(&self, analyser: &dyn CodeAnalyser) -> Result<&dyn StructuredBody> {
        self.body
            .analysis(analyser, &self.local_classes, &self.name)
            .map_err(|e| e.in_member(self.to_string()))
    }

    /// Runs everything that is otherwise deferred to first use.
    pub fn analyse(&self, analyser: &dyn CodeAnalyser) -> Result<()> {
        if self.has_code() {
            self.analysis(analyser)?;
        }
        self.parameter_names();
        Ok(())
    }

    /// Drops the bytecode and the attribute table. Any later request for
    /// the analysis fails.
    pub fn release_code(&mut self) {
        self.body.release();
        self.record.attributes.clear();
        log::trace!("Released code of {}", self);
    }

    pub fn is_visible_to(&self, caller: &RefType, bindings: &dyn TypeBindings) -> bool {
        visibility::is_visible_to(self.access_flags, &self.class.class_type, caller, bindings)
    }

    pub fn collect_type_usages(&self, collector: &mut dyn TypeUsageCollector) -> Result<()> {
        self.collect_usages(collector)
            .map_err(|e| e.in_member(self.to_string()))
    }

    fn collect_usages(&self, collector: &mut dyn TypeUsageCollector) -> Result<()> {
        self.prototype.collect_type_usages(collector);
        let attributes = &self.record.attributes;
        for annotation in attributes
            .annotations()
            .chain(attributes.all_parameter_annotations())
        {
            collect_annotation_usages(annotation, collector)?;
        }
        if let Some(value) = self.body.default_value() {
            collect_element_value_usages(value, collector)?;
        }
        if let Some(analysis) = self.body.cached_analysis() {
            analysis.collect_type_usages(collector);
        }
        for class in self.local_classes.borrow().classes() {
            collector.collect(&JavaType::Ref(class.clone()));
        }
        self.thrown_types().iter().for_each(|t| collector.collect(t));
        Ok(())
    }

    /// Renders the method. `as_interface` is set when the declaring class is
    /// an interface; `analyser` is only consulted when there is code.
    pub fn dump(
        &self,
        d: &mut dyn Dumper,
        as_interface: bool,
        analyser: &dyn CodeAnalyser,
    ) -> Result<()> {
        self.dump_method(d, as_interface, analyser)
            .map_err(|e| e.in_member(self.to_string()))
    }

    fn dump_method(
        &self,
        d: &mut dyn Dumper,
        as_interface: bool,
        analyser: &dyn CodeAnalyser,
    ) -> Result<()> {
        // Released code fails here, before anything is written.
        let analysed = match &self.body {
            MethodBody::Present(_) | MethodBody::Released(_) => Some(self.analysis(analyser)?),
            MethodBody::AbsentWithDefault(_) | MethodBody::AbsentNoDefault => None,
        };

        if let Some(comments) = &self.comments {
            comments.dump(d);
        }
        if self.is_override {
            d.print("@Override");
            d.newline();
        }
        for annotation in self.record.attributes.annotations() {
            dump_annotation(annotation, d)?;
            d.newline();
        }

        let mut flags = self.access_flags;
        let mut keywords = vec![];
        if as_interface {
            flags.remove(MethodAccessFlags::ABSTRACT);
        }
        keywords.extend(flags.keywords());
        if as_interface
            && self.has_code()
            && !flags.intersects(MethodAccessFlags::STATIC | MethodAccessFlags::PRIVATE)
        {
            keywords.push("default");
        }
        if !keywords.is_empty() {
            d.keyword(&keywords.join(" "));
            d.print(" ");
        }

        if self.constructor_kind() != ConstructorKind::StaticInitializer {
            self.dump_signature(d)?;
        }

        if let Some(body) = analysed {
            if self.constructor_kind() != ConstructorKind::StaticInitializer {
                d.print(" ");
            }
            let local_classes = self.local_classes.borrow();
            if local_classes.is_empty() {
                body.dump(d);
            } else {
                body.dump(&mut LocalClassAwareDumper::new(d, &local_classes));
            }
        } else if let Some(value) = self.body.default_value() {
            d.print(" ");
            d.keyword("default");
            d.print(" ");
            dump_element_value(value, d)?;
            d.end_code_line();
        } else {
            d.end_code_line();
        }
        Ok(())
    }

    fn dump_signature(&self, d: &mut dyn Dumper) -> Result<()> {
        let prototype = &self.prototype;
        let formals = prototype.formal_type_parameters();
        if !formals.is_empty() {
            let formals = formals.iter().map(|f| f.to_string()).collect::<Vec<_>>();
            d.print(&format!("<{}> ", formals.join(", ")));
        }

        if self.is_constructor() {
            d.identifier(self.class.class_type.simple_name());
        } else {
            d.dump_type(prototype.return_type());
            d.print(" ");
            d.identifier(&self.name);
        }

        d.print("(");
        let hidden = prototype.hidden_leading_args();
        let args = prototype.declared_args();
        let names = &self.parameter_names()[hidden..];
        for (i, (arg, name)) in args.iter().zip(names).enumerate() {
            if i > 0 {
                d.print(", ");
            }
            for annotation in self.record.attributes.parameter_annotations(i) {
                dump_annotation(annotation, d)?;
                d.print(" ");
            }
            match arg {
                JavaType::Array(component) if prototype.is_varargs() && i + 1 == args.len() => {
                    d.dump_type(component);
                    d.print("...");
                }
                _ => d.dump_type(arg),
            }
            d.print(" ");
            d.identifier(name);
        }
        d.print(")");

        if self.record.attributes.exceptions().is_some() && !self.thrown_types().is_empty() {
            d.print(" ");
            d.keyword("throws");
            d.print(" ");
            for (i, thrown) in self.thrown_types().iter().enumerate() {
                if i > 0 {
                    d.print(", ");
                }
                d.dump_type(thrown);
            }
        }
        Ok(())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class.class_type, self.name, self.descriptor)
    }
}
