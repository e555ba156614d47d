//! Configuration records and the elements they are made of

mod detail;
mod element;
mod record;
mod view;

pub use detail::{DetailPageInfo, FormatterChangeSet};
pub use element::{
    ConfigElement, FolderSpec, FunctionReference, ModelPageConfig, PropertyConfig,
    ResourceTypeConfig,
};
pub use record::{ConfigKind, ConfigRecord, ResourceReference};
pub use view::ElementView;
