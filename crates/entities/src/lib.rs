//! Semantic model of the fields and methods of a class file: declared types,
//! method prototypes, constant values, visibility and rendering.

pub mod analysis;
pub mod annotations;
mod class;
mod comments;
pub mod dumper;
mod error;
mod field;
pub mod literal;
mod local_classes;
mod method;
pub mod namer;
mod options;
pub mod prototype;
pub mod types;
pub mod usage;
pub mod visibility;

pub use analysis::{CodeAnalyser, MethodBody, StructuredBody};
pub use class::ClassContext;
pub use comments::DecompilerComments;
pub use dumper::{Dumper, StringDumper};
pub use error::EntityError;
pub use field::Field;
pub use literal::TypedLiteral;
pub use local_classes::LocalClassRegistry;
pub use method::{HiddenState, Method};
pub use options::MemberOptions;
pub use prototype::{ConstructorKind, MethodPrototype};
pub use types::{JavaType, RawType, RefType};
pub use usage::{TypeUsageCollector, TypeUsageSet};
pub use visibility::{BindingSupers, TypeBindings};

pub type Result<T, E = EntityError> = std::result::Result<T, E>;
