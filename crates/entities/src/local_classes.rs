use indexmap::IndexMap;

use crate::types::{JavaType, RefType};
use crate::{EntityError, Result};

/// Local and anonymous classes a method body refers to, in discovery order,
/// with the name the renderer should use for each. Entries are never removed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LocalClassRegistry {
    classes: IndexMap<RefType, Option<String>>,
}
impl LocalClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering a type that does not erase to a class is a bug in the
    /// caller.
    pub fn register(&mut self, ty: &JavaType, suggested_name: Option<String>) -> Result<()> {
        let JavaType::Ref(class) = ty.de_generified() else {
            return Err(EntityError::InvalidLocalClass(ty.to_string()));
        };
        self.insert(class, suggested_name);
        Ok(())
    }

    fn insert(&mut self, class: RefType, suggested_name: Option<String>) {
        let entry = self.classes.entry(class).or_default();
        if suggested_name.is_some() {
            *entry = suggested_name;
        }
    }

    /// Returns whether `other` had anything to offer.
    pub fn merge_from(&mut self, other: &LocalClassRegistry) -> bool {
        for (class, name) in &other.classes {
            self.insert(class.clone(), name.clone());
        }
        !other.is_empty()
    }

    pub fn suggested_name(&self, class: &RefType) -> Option<&str> {
        self.classes.get(class)?.as_deref()
    }

    pub fn contains(&self, class: &RefType) -> bool {
        self.classes.contains_key(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &RefType> {
        self.classes.keys()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
