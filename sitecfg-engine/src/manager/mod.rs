//! Offline and online configuration caches behind one entry point
//!
//! The offline cache follows edits, the online cache follows publishing.
//! Repository events are routed to the cache(s) they concern; everything
//! else is a lookup against one of the two caches.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use sitecfg_protocol::{ClearScope, RepositoryEvent, Resource};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::cache::ConfigCache;
use crate::facade::ConfigFacade;
use crate::model::ElementView;
use crate::reader::ConfigReader;
use crate::settings::CacheSettings;

/// Which repository view a call addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Project {
    /// Draft content
    Offline,
    /// Published content
    Online,
}

impl Project {
    pub fn from_online(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }
}

pub struct ConfigurationManager {
    offline: Arc<ConfigCache>,
    online: Arc<ConfigCache>,
}

impl ConfigurationManager {
    pub fn new(
        offline: ConfigReader,
        online: ConfigReader,
        settings: CacheSettings,
        runtime: Handle,
    ) -> Self {
        Self {
            offline: ConfigCache::new("offline", offline, settings.clone(), runtime.clone()),
            online: ConfigCache::new("online", online, settings, runtime),
        }
    }

    /// Initialize both caches
    ///
    /// Failures are logged and leave the affected cache uninitialized;
    /// returns whether both caches came up.
    pub fn initialize(&self) -> bool {
        let offline = self.offline.initialize().is_ok();
        let online = self.online.initialize().is_ok();
        if offline && online {
            info!("Configuration caches initialized");
        } else {
            warn!(offline, online, "Configuration caches not fully initialized");
        }
        offline && online
    }

    pub fn cache(&self, project: Project) -> &Arc<ConfigCache> {
        match project {
            Project::Offline => &self.offline,
            Project::Online => &self.online,
        }
    }

    pub fn lookup(&self, path: &str, project: Project) -> ConfigFacade {
        self.cache(project).lookup(path)
    }

    pub fn is_detail_page(&self, resource: &Resource, project: Project) -> bool {
        self.cache(project).is_detail_page(resource)
    }

    pub fn detail_pages_for_type(&self, type_name: &str, project: Project) -> Vec<String> {
        self.cache(project).detail_pages_for_type(type_name)
    }

    pub fn folder_types(&self, project: Project) -> HashMap<String, String> {
        self.cache(project).folder_types()
    }

    pub fn element_views(&self, project: Project) -> Vec<ElementView> {
        self.cache(project).element_views()
    }

    /// Force a complete reload of both caches on their next cycle
    pub fn refresh(&self) {
        self.offline.mark_all_dirty();
        self.online.mark_all_dirty();
    }

    /// Resolve after the next refresh cycle of `project`'s cache
    pub async fn wait_for_update(&self, project: Project) {
        self.cache(project).wait_for_update().await
    }

    /// Stop both refresh tasks
    pub fn shutdown(&self) {
        self.offline.cancel();
        self.online.cancel();
    }

    /// Route a repository change to the caches it concerns
    pub fn handle_event(&self, event: &RepositoryEvent) {
        debug!(kind = event.kind(), "Handling repository event");
        match event {
            RepositoryEvent::ResourceCreated(resource)
            | RepositoryEvent::ResourceModified(resource)
            | RepositoryEvent::ResourcePropertiesModified(resource) => {
                self.offline.handle_changed_resource(resource);
            }
            RepositoryEvent::ResourcesModified(resources)
            | RepositoryEvent::ResourceDeleted(resources) => {
                for resource in resources {
                    self.offline.handle_changed_resource(resource);
                }
            }
            RepositoryEvent::ResourceMoved {
                source,
                destination,
            } => {
                self.offline.handle_changed_resource(source);
                self.offline.handle_changed_resource(destination);
                self.online.evict_path(source.id);
            }
            RepositoryEvent::ProjectPublished { resources } if resources.is_empty() => {
                info!("Publish without resource list, reloading online configuration");
                self.online.mark_all_dirty();
            }
            RepositoryEvent::ProjectPublished { resources } => {
                for resource in resources {
                    self.online.handle_changed_resource(resource);
                }
            }
            RepositoryEvent::CachesCleared(scope) => {
                if matches!(scope, ClearScope::All | ClearScope::OfflineOnly) {
                    self.offline.mark_all_dirty();
                }
                if matches!(scope, ClearScope::All | ClearScope::OnlineOnly) {
                    self.online.mark_all_dirty();
                }
            }
        }
    }
}

impl Drop for ConfigurationManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
