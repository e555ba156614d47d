//! Configuration cache with background refresh
//!
//! One cache serves one repository view. Lookups read the current snapshot
//! through an `ArcSwapOption` without locking; the refresh task replaces it.
//! Change notifications only add entries to the dirty set, the refresh task
//! is the single consumer.

mod refresh;

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use parking_lot::Mutex;
use sitecfg_protocol::{type_names, Resource, StructureId};
use sitecfg_utils::Result;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::dirty::{DirtyId, DirtySet};
use crate::facade::ConfigFacade;
use crate::model::ElementView;
use crate::path;
use crate::reader::ConfigReader;
use crate::settings::CacheSettings;
use crate::snapshot::{ConfigCacheState, SiteUpdates};

/// Lifecycle of a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Uninitialized,
    Initializing,
    Initialized,
}

/// What one refresh cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing was dirty
    Idle,
    /// The snapshot was rebuilt from a complete read
    Full,
    /// The snapshot was copied with `updated` site records replaced or removed
    Incremental { updated: usize },
    /// A complete read failed; the previous snapshot stays current
    Failed,
}

pub struct ConfigCache {
    /// "offline" or "online", for logging
    name: &'static str,
    reader: ConfigReader,
    settings: CacheSettings,
    runtime: Handle,
    state: ArcSwapOption<ConfigCacheState>,
    /// Served while no snapshot is installed
    empty: Arc<ConfigCacheState>,
    status: Mutex<CacheStatus>,
    dirty: DirtySet,
    /// Soft id -> current root path cache; `None` remembers a missing id
    paths: DashMap<StructureId, Option<String>>,
    cancel_tx: Mutex<Option<oneshot::Sender<()>>>,
    /// Completed refresh cycles
    updates: watch::Sender<u64>,
}

impl ConfigCache {
    pub fn new(
        name: &'static str,
        reader: ConfigReader,
        settings: CacheSettings,
        runtime: Handle,
    ) -> Arc<Self> {
        let (updates, _) = watch::channel(0);
        Arc::new(Self {
            name,
            reader,
            settings,
            runtime,
            state: ArcSwapOption::empty(),
            empty: Arc::new(ConfigCacheState::empty()),
            status: Mutex::new(CacheStatus::Uninitialized),
            dirty: DirtySet::new(),
            paths: DashMap::new(),
            cancel_tx: Mutex::new(None),
            updates,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn status(&self) -> CacheStatus {
        *self.status.lock()
    }

    pub fn reader(&self) -> &ConfigReader {
        &self.reader
    }

    // ==================== Lifecycle ====================

    /// Read everything and start the refresh task
    ///
    /// A running refresh task is cancelled first. On failure the cache is
    /// left uninitialized and lookups answer from an empty snapshot.
    pub fn initialize(self: &Arc<Self>) -> Result<()> {
        self.cancel();
        *self.status.lock() = CacheStatus::Initializing;
        info!(cache = self.name, "Initializing configuration cache");

        match self.reader.read_complete_configuration() {
            Ok(state) => {
                self.paths.clear();
                self.install(state);
                *self.status.lock() = CacheStatus::Initialized;
                self.schedule();
                Ok(())
            }
            Err(e) => {
                *self.status.lock() = CacheStatus::Uninitialized;
                error!(cache = self.name, error = %e, "Configuration cache initialization failed");
                Err(e)
            }
        }
    }

    fn schedule(self: &Arc<Self>) {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        if let Some(previous) = self.cancel_tx.lock().replace(cancel_tx) {
            let _ = previous.send(());
        }

        self.runtime.spawn(refresh::refresh_task(
            Arc::downgrade(self),
            self.settings.clone(),
            cancel_rx,
        ));

        debug!(
            cache = self.name,
            interval_ms = self.settings.update_interval_ms,
            "Refresh task scheduled"
        );
    }

    /// Stop the refresh task; returns true if one was running
    pub fn cancel(&self) -> bool {
        match self.cancel_tx.lock().take() {
            Some(tx) => {
                // Receiver may already be gone
                let _ = tx.send(());
                info!(cache = self.name, "Refresh task cancelled");
                true
            }
            None => false,
        }
    }

    // ==================== Snapshot access ====================

    /// Current snapshot, or an empty one before initialization
    pub fn state(&self) -> Arc<ConfigCacheState> {
        self.state
            .load_full()
            .unwrap_or_else(|| Arc::clone(&self.empty))
    }

    pub fn has_snapshot(&self) -> bool {
        self.state.load().is_some()
    }

    fn install(&self, state: ConfigCacheState) {
        debug!(
            cache = self.name,
            configs = state.config_count(),
            folder_types = state.folder_types().len(),
            "Installing configuration snapshot"
        );
        self.state.store(Some(Arc::new(state)));
    }

    pub fn lookup(&self, path: &str) -> ConfigFacade {
        self.state().lookup(path)
    }

    pub fn folder_types(&self) -> HashMap<String, String> {
        self.state().folder_types().clone()
    }

    /// Element views sorted by order, then path
    pub fn element_views(&self) -> Vec<ElementView> {
        let state = self.state();
        let mut views: Vec<ElementView> = state.element_views().values().cloned().collect();
        views.sort_by(|a, b| a.root_path.cmp(&b.root_path));
        crate::merge::sort_by_order(&mut views, |v| v.order);
        views
    }

    // ==================== Dirty tracking ====================

    pub fn add_dirty(&self, id: DirtyId) {
        self.dirty.add(id);
    }

    /// Schedule a complete reload on the next cycle
    pub fn mark_all_dirty(&self) {
        self.paths.clear();
        self.dirty.add(DirtyId::ReloadAll);
    }

    pub fn pending(&self) -> usize {
        self.dirty.len()
    }

    /// Classify a changed resource into a dirty id; returns what was added
    ///
    /// Configurations that name the resource's path but resolved it to
    /// another id (or to nothing) are marked as well.
    pub fn handle_changed_resource(&self, resource: &Resource) -> Option<DirtyId> {
        self.paths.remove(&resource.id);

        for holder in self.state().stale_references(resource) {
            debug!(
                cache = self.name,
                path = %resource.root_path,
                dirty = %holder,
                "Reference target changed, marked dirty"
            );
            self.dirty.add(holder);
        }

        let dirty = match resource.type_name.as_str() {
            type_names::SITEMAP_CONFIG | type_names::MASTER_CONFIG => {
                Some(DirtyId::Resource(resource.id))
            }
            type_names::MODULE_CONFIG => Some(DirtyId::ReloadModules),
            type_names::ELEMENT_VIEW => Some(DirtyId::ReloadElementViews),
            _ if self
                .state()
                .folder_types()
                .contains_key(&path::folder_key(&resource.root_path)) =>
            {
                Some(DirtyId::RecomputeFolderTypes)
            }
            _ => None,
        };

        if let Some(id) = dirty {
            debug!(cache = self.name, path = %resource.root_path, dirty = %id, "Marked dirty");
            self.dirty.add(id);
        }
        dirty
    }

    // ==================== Refresh ====================

    /// Drain the dirty set and bring the snapshot up to date
    ///
    /// Blocks on repository reads. Every call counts as a completed cycle
    /// for [`wait_for_update`](Self::wait_for_update).
    pub fn perform_update(&self) -> UpdateOutcome {
        let dirty = self.dirty.drain();
        let outcome = match self.state.load_full() {
            Some(_) if dirty.is_empty() => UpdateOutcome::Idle,
            Some(current) if !dirty.contains(&DirtyId::ReloadAll) => {
                self.apply_incremental(&current, dirty)
            }
            _ => self.reload_all(),
        };

        self.updates.send_modify(|n| *n = n.wrapping_add(1));
        outcome
    }

    fn reload_all(&self) -> UpdateOutcome {
        match self.reader.read_complete_configuration() {
            Ok(state) => {
                self.paths.clear();
                self.install(state);
                info!(cache = self.name, "Configuration reloaded");
                UpdateOutcome::Full
            }
            Err(e) => {
                error!(cache = self.name, error = %e, "Complete configuration reload failed");
                self.dirty.add(DirtyId::ReloadAll);
                UpdateOutcome::Failed
            }
        }
    }

    fn apply_incremental(
        &self,
        current: &ConfigCacheState,
        dirty: HashSet<DirtyId>,
    ) -> UpdateOutcome {
        let mut site_updates = SiteUpdates::new();
        let mut reload_modules = false;
        let mut reload_views = false;

        for id in dirty {
            match id {
                DirtyId::Resource(structure_id) => {
                    match self.reader.read_site_record(structure_id) {
                        Ok(record) => {
                            site_updates.insert(structure_id, record);
                        }
                        Err(e) => {
                            warn!(
                                cache = self.name,
                                id = %structure_id,
                                error = %e,
                                "Could not re-read configuration, keeping previous"
                            );
                        }
                    }
                }
                DirtyId::ReloadModules => reload_modules = true,
                DirtyId::ReloadElementViews => reload_views = true,
                // Every new snapshot recomputes its derived indexes
                DirtyId::RecomputeFolderTypes | DirtyId::ReloadAll => {}
            }
        }

        let modules = if reload_modules {
            match self.reader.read_module_records() {
                Ok(records) => Some(records),
                Err(e) => {
                    warn!(cache = self.name, error = %e, "Could not re-read module configurations");
                    self.dirty.add(DirtyId::ReloadModules);
                    None
                }
            }
        } else {
            None
        };

        let views = if reload_views {
            match self.reader.read_element_views() {
                Ok(views) => Some(views),
                Err(e) => {
                    warn!(cache = self.name, error = %e, "Could not re-read element views");
                    self.dirty.add(DirtyId::ReloadElementViews);
                    None
                }
            }
        } else {
            None
        };

        let updated = site_updates.len();
        self.install(current.create_updated_copy(site_updates, modules, views));
        UpdateOutcome::Incremental { updated }
    }

    /// Number of completed refresh cycles
    pub fn update_count(&self) -> u64 {
        *self.updates.borrow()
    }

    /// Resolve after the next refresh cycle completes
    pub async fn wait_for_update(&self) {
        let mut rx = self.updates.subscribe();
        // The sender lives as long as `self`
        let _ = rx.changed().await;
    }

    // ==================== Detail pages ====================

    /// Current root path of a structure id, through the soft path cache
    ///
    /// Ids the repository does not know are remembered as missing until a
    /// change for that id or a full reload evicts them.
    pub fn path_for_id(&self, id: StructureId) -> Option<String> {
        if let Some(path) = self.paths.get(&id) {
            return path.value().clone();
        }
        match self.reader.repository().read_resource(id) {
            Ok(resource) => {
                self.paths.insert(id, Some(resource.root_path.clone()));
                Some(resource.root_path)
            }
            Err(e) if e.is_not_found() => {
                debug!(cache = self.name, id = %id, "Id not in repository, remembering");
                self.paths.insert(id, None);
                None
            }
            Err(e) => {
                debug!(cache = self.name, id = %id, error = %e, "Could not resolve id to path");
                None
            }
        }
    }

    pub fn evict_path(&self, id: StructureId) {
        self.paths.remove(&id);
    }

    /// Current paths of the detail pages configured for a type
    pub fn detail_pages_for_type(&self, type_name: &str) -> Vec<String> {
        let state = self.state();
        let mut uris: Vec<String> = Vec::new();
        for page in state.detail_pages_for_type(type_name) {
            let uri = self
                .path_for_id(page.id)
                .unwrap_or_else(|| page.uri.clone());
            if !uris.contains(&uri) {
                uris.push(uri);
            }
        }
        uris
    }

    /// Whether `resource` is, or lives in, a configured detail page
    pub fn is_detail_page(&self, resource: &Resource) -> bool {
        let folder = if resource.is_folder {
            resource.clone()
        } else {
            let Some(parent) = path::parent_folder(&resource.root_path) else {
                return false;
            };
            match self.reader.repository().read_resource_by_path(&parent) {
                Ok(folder) => folder,
                Err(e) => {
                    warn!(
                        cache = self.name,
                        path = %resource.root_path,
                        error = %e,
                        "Could not read folder of resource for detail page check"
                    );
                    return false;
                }
            }
        };
        let folder_key = path::folder_key(&folder.root_path);

        let state = self.state();
        let pages = state.all_detail_pages();

        let exact = pages.iter().any(|page| {
            page.id == folder.id
                || self
                    .path_for_id(page.id)
                    .is_some_and(|p| path::folder_key(&p) == folder_key)
        });
        if exact {
            return true;
        }

        // Detail page configured as a page file inside the folder
        pages.iter().any(|page| match self.path_for_id(page.id) {
            Some(target) => {
                !target.ends_with('/')
                    && path::parent_folder(&target).as_deref() == Some(folder_key.as_str())
            }
            None => false,
        })
    }
}

impl Drop for ConfigCache {
    fn drop(&mut self) {
        if let Some(tx) = self.cancel_tx.get_mut().take() {
            let _ = tx.send(());
        }
    }
}
