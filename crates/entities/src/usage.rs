use indexmap::IndexSet;

use crate::types::{JavaType, RefType};

/// Receives every type a member mentions, for import and usage tracking.
pub trait TypeUsageCollector {
    fn collect(&mut self, ty: &JavaType);
}

/// Collects the classes mentioned, in first-seen order.
#[derive(Debug, Default)]
pub struct TypeUsageSet {
    classes: IndexSet<RefType>,
}
impl TypeUsageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, class: &RefType) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &RefType> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
impl TypeUsageCollector for TypeUsageSet {
    fn collect(&mut self, ty: &JavaType) {
        for component in ty.components() {
            if let Some(class) = component.ref_type() {
                self.classes.insert(class.clone());
            }
        }
    }
}
