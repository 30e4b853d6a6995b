use std::collections::HashMap;

use unbrew_class_file::attributes::LocalVariable;

/// Chooses display names for parameters and locals.
pub trait VariableNamer: std::fmt::Debug {
    /// Name for the parameter in local `slot`, the `ordinal`th declared one.
    fn parameter_name(&self, slot: u16, ordinal: usize) -> String;
}

/// `arg0`, `arg1`, ... when nothing better is known.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNamer;
impl VariableNamer for DefaultNamer {
    fn parameter_name(&self, _slot: u16, ordinal: usize) -> String {
        format!("arg{}", ordinal)
    }
}

/// Names taken from a `LocalVariableTable`, falling back to [`DefaultNamer`].
#[derive(Debug, Default, Clone)]
pub struct TableNamer {
    // Parameters are live from pc 0, so only those entries matter here.
    by_slot: HashMap<u16, String>,
}
impl TableNamer {
    pub fn new(table: &[LocalVariable]) -> Self {
        let by_slot = table
            .iter()
            .filter(|v| v.start_pc == 0 && is_java_identifier(&v.name))
            .map(|v| (v.index, v.name.clone()))
            .collect();
        Self { by_slot }
    }
}
impl VariableNamer for TableNamer {
    fn parameter_name(&self, slot: u16, ordinal: usize) -> String {
        match self.by_slot.get(&slot) {
            Some(name) => name.clone(),
            None => DefaultNamer.parameter_name(slot, ordinal),
        }
    }
}

// Obfuscated tables carry names that would not compile.
fn is_java_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
