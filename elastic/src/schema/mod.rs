pub mod definition;
pub mod field;
pub mod loader;
pub mod options;
pub mod target;

pub use definition::{Definition, DefinitionBuilder};
pub use field::Field;
pub use loader::{LoadedSchema, SchemaLoader};
pub use options::{canonical_key, CustomOptions};
pub use target::{
    ElasticMode, Indexable, PlainTarget, ScopedTarget, StaticTarget, Target, TargetRef,
};
