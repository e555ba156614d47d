//! sitecfg-engine: hierarchical site configuration resolution and caching
//!
//! Configuration documents placed in `.content` folders govern the subtree
//! they belong to. For any repository path the engine resolves the nearest
//! governing document, merges it with its ancestors, master configurations
//! and the module configuration, and returns the result as a
//! [`ConfigFacade`].
//!
//! The main pieces:
//! - [`ConfigurationManager`]: offline and online caches, event routing
//! - [`ConfigCache`]: current snapshot, dirty set and background refresh
//! - [`ConfigCacheState`]: immutable snapshot with the path index
//! - [`ConfigReader`]: reads documents through a [`Repository`]

pub mod cache;
pub mod dirty;
pub mod facade;
pub mod manager;
pub mod merge;
pub mod model;
pub mod path;
pub mod reader;
pub mod repository;
pub mod sequence;
pub mod settings;
pub mod snapshot;

pub use cache::{CacheStatus, ConfigCache, UpdateOutcome};
pub use dirty::{DirtyId, DirtySet};
pub use facade::{ConfigFacade, ResolvedConfig};
pub use manager::{ConfigurationManager, Project};
pub use model::{
    ConfigElement, ConfigKind, ConfigRecord, DetailPageInfo, ElementView, FolderSpec,
    FormatterChangeSet, FunctionReference, ModelPageConfig, PropertyConfig, ResourceReference,
    ResourceTypeConfig,
};
pub use reader::{ConfigReader, DocumentParser, TomlDocumentParser};
pub use repository::{FsRepository, InMemoryRepository, Repository, RepositoryWatcher};
pub use sequence::ConfigSequence;
pub use settings::{EngineSettings, SettingsLoader, DEFAULT_SETTINGS_TOML};
pub use snapshot::{ConfigCacheState, SiteUpdates};
