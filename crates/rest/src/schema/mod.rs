//! Resource type declarations.
//!
//! Every exposed type declares its fields (with a kind and filter/sort
//! flags) and its relationships up front. Query parameters are resolved
//! against these declarations only; a name that is not declared is a 400.

mod registry;
mod resource_type;

pub use registry::{RegistryError, ResourceRegistry};
pub use resource_type::{
    Cardinality, FieldDef, FieldKind, ID_FIELD, RelationshipDef, RelationshipSource, ResourceType,
};
