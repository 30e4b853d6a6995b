use crate::{local_classes::LocalClassRegistry, types::JavaType};

/// Sink for rendered source. Implemented by the output renderer; the member
/// model only ever pushes text into it.
pub trait Dumper {
    fn print(&mut self, text: &str);

    fn newline(&mut self);

    fn keyword(&mut self, text: &str) {
        self.print(text)
    }

    fn identifier(&mut self, name: &str) {
        self.print(name)
    }

    fn dump_type(&mut self, ty: &JavaType) {
        self.print(&ty.to_string())
    }

    fn comment(&mut self, text: &str) {
        self.print("/* ");
        self.print(text);
        self.print(" */");
        self.newline();
    }

    fn end_code_line(&mut self) {
        self.print(";");
        self.newline();
    }
}

/// Plain text dumper.
#[derive(Debug, Default)]
pub struct StringDumper {
    out: String,
}
impl StringDumper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}
impl Dumper for StringDumper {
    fn print(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
    }
}

/// Renders local classes registered on a method under their suggested names.
pub struct LocalClassAwareDumper<'a> {
    inner: &'a mut dyn Dumper,
    local_classes: &'a LocalClassRegistry,
}
impl<'a> LocalClassAwareDumper<'a> {
    pub fn new(inner: &'a mut dyn Dumper, local_classes: &'a LocalClassRegistry) -> Self {
        Self {
            inner,
            local_classes,
        }
    }
}
impl Dumper for LocalClassAwareDumper<'_> {
    fn print(&mut self, text: &str) {
        self.inner.print(text)
    }

    fn newline(&mut self) {
        self.inner.newline()
    }

    fn keyword(&mut self, text: &str) {
        self.inner.keyword(text)
    }

    fn identifier(&mut self, name: &str) {
        self.inner.identifier(name)
    }

    fn dump_type(&mut self, ty: &JavaType) {
        let suggested = ty
            .ref_type()
            .and_then(|class| self.local_classes.suggested_name(class));
        match suggested {
            Some(name) => self.inner.print(name),
            None => self.inner.dump_type(ty),
        }
    }

    fn comment(&mut self, text: &str) {
        self.inner.comment(text)
    }

    fn end_code_line(&mut self) {
        self.inner.end_code_line()
    }
}
