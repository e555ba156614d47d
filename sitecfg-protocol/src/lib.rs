//! sitecfg-protocol: Shared definitions between the configuration engine and
//! the repository it observes
//!
//! This crate defines the resource identity types, the change-notification
//! events delivered by the repository, and the schema of the authored
//! configuration documents.

pub mod document;
pub mod types;

// Re-export main types at crate root
pub use document::{
    ConfigDocument, DetailPageEntry, ElementViewDocument, FormatterEntry, FunctionRefEntry,
    ModelPageEntry, PropertyEntry, ResourceTypeEntry,
};
pub use types::{
    type_names, ClearScope, IdParseError, Resource, RepositoryEvent, StructureId,
};
