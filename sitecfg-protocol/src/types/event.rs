use serde::{Deserialize, Serialize};

use super::resource::Resource;

/// Which caches a cache-clear event applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearScope {
    All,
    OnlineOnly,
    OfflineOnly,
}

/// Change notification emitted by the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RepositoryEvent {
    ResourceCreated(Resource),
    ResourceModified(Resource),
    /// Only the properties of a resource changed
    ResourcePropertiesModified(Resource),
    /// Several resources changed in one batch
    ResourcesModified(Vec<Resource>),
    ResourceMoved {
        source: Resource,
        destination: Resource,
    },
    ResourceDeleted(Vec<Resource>),
    /// Offline changes were published; an empty list means "unknown"
    ProjectPublished { resources: Vec<Resource> },
    CachesCleared(ClearScope),
}

impl RepositoryEvent {
    /// All resources carried by this event
    pub fn resources(&self) -> Vec<&Resource> {
        match self {
            Self::ResourceCreated(r)
            | Self::ResourceModified(r)
            | Self::ResourcePropertiesModified(r) => vec![r],
            Self::ResourcesModified(list) | Self::ResourceDeleted(list) => list.iter().collect(),
            Self::ResourceMoved {
                source,
                destination,
            } => vec![source, destination],
            Self::ProjectPublished { resources } => resources.iter().collect(),
            Self::CachesCleared(_) => Vec::new(),
        }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ResourceCreated(_) => "resource_created",
            Self::ResourceModified(_) => "resource_modified",
            Self::ResourcePropertiesModified(_) => "resource_properties_modified",
            Self::ResourcesModified(_) => "resources_modified",
            Self::ResourceMoved { .. } => "resource_moved",
            Self::ResourceDeleted(_) => "resource_deleted",
            Self::ProjectPublished { .. } => "project_published",
            Self::CachesCleared(_) => "caches_cleared",
        }
    }
}
