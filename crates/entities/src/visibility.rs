use indexmap::IndexSet;
use unbrew_class_file::MethodAccessFlags;

use crate::types::RefType;

/// Transitive supertypes (classes and interfaces) of one type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingSupers(IndexSet<RefType>);
impl BindingSupers {
    pub fn new(supers: impl IntoIterator<Item = RefType>) -> Self {
        Self(supers.into_iter().collect())
    }

    pub fn contains_base(&self, base: &RefType) -> bool {
        self.0.contains(base)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RefType> {
        self.0.iter()
    }
}

/// Longest outer-class chain walked before giving up on a cyclic
/// InnerClasses table.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Whole-program type knowledge, owned outside the member model. Must be
/// safe to read from several workers when classes are processed in parallel.
pub trait TypeBindings {
    /// `None` when the hierarchy of `ty` could not be resolved.
    fn binding_supers(&self, ty: &RefType) -> Option<&BindingSupers>;

    /// The lexically enclosing class of `ty`, if it is a nested class.
    fn outer_class_of(&self, ty: &RefType) -> Option<&RefType>;

    fn is_transitive_inner_class_of(&self, inner: &RefType, outer: &RefType) -> bool {
        let mut current = self.outer_class_of(inner);
        for _ in 0..MAX_NESTING_DEPTH {
            match current {
                Some(c) if c == outer => return true,
                Some(c) => current = self.outer_class_of(c),
                None => return false,
            }
        }
        false
    }
}

fn is_inner_visible_to(bindings: &dyn TypeBindings, declaring: &RefType, caller: &RefType) -> bool {
    bindings.is_transitive_inner_class_of(caller, declaring)
        || bindings.is_transitive_inner_class_of(declaring, caller)
}

/// Can code in `caller` see a method with `flags` declared in `declaring`?
pub fn is_visible_to(
    flags: MethodAccessFlags,
    declaring: &RefType,
    caller: &RefType,
    bindings: &dyn TypeBindings,
) -> bool {
    if flags.contains(MethodAccessFlags::PUBLIC) {
        return true;
    }
    if caller == declaring {
        return true;
    }
    if flags.contains(MethodAccessFlags::PRIVATE) {
        return is_inner_visible_to(bindings, declaring, caller);
    }
    if flags.contains(MethodAccessFlags::PROTECTED) {
        // An unresolvable hierarchy grants nothing through inheritance.
        let inherited = bindings
            .binding_supers(caller)
            .map_or(false, |supers| supers.contains_base(declaring));
        if inherited || is_inner_visible_to(bindings, declaring, caller) {
            return true;
        }
    }
    // Package access, which protected members also have.
    caller.package_name() == declaring.package_name()
}
