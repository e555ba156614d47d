//! Access to the content repository the configuration is read from
//!
//! The engine only needs four read operations; the repository also emits
//! [`RepositoryEvent`](sitecfg_protocol::RepositoryEvent)s that the
//! [`ConfigurationManager`](crate::ConfigurationManager) turns into dirty ids.

mod fs;
mod memory;
mod watcher;

pub use fs::FsRepository;
pub use memory::InMemoryRepository;
pub use watcher::RepositoryWatcher;

#[cfg(test)]
pub(crate) use watcher::to_repository_events;

use sitecfg_protocol::{Resource, StructureId};
use sitecfg_utils::Result;

/// Read access to a repository view (offline or online)
///
/// Calls may block on the storage layer; the engine only issues them from
/// initialization and from the background refresh.
pub trait Repository: Send + Sync {
    fn read_resource(&self, id: StructureId) -> Result<Resource>;

    fn read_resource_by_path(&self, root_path: &str) -> Result<Resource>;

    /// Resources at or below `root_path`, optionally restricted to one type
    ///
    /// Fails with `UnknownResourceType` if the type is not registered.
    fn list_resources(&self, root_path: &str, type_name: Option<&str>) -> Result<Vec<Resource>>;

    fn read_body(&self, resource: &Resource) -> Result<String>;
}
