//! Immutable snapshot of every known configuration record
//!
//! A snapshot is never modified. Updates produce a new snapshot through
//! [`ConfigCacheState::create_updated_copy`], sharing the unchanged records
//! (and the unchanged module/element-view data) with the previous one.
//! The folder-type, detail-page-type, master-path and reference indexes are
//! recomputed for every new snapshot.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sitecfg_protocol::{Resource, StructureId};
use tracing::{debug, warn};

use crate::dirty::DirtyId;
use crate::facade::ConfigFacade;
use crate::merge::{combine, combine_detail_pages, sort_by_order};
use crate::model::{ConfigKind, ConfigRecord, DetailPageInfo, ElementView};
use crate::path;
use crate::sequence::ConfigSequence;

/// Updates for one incremental refresh: `None` removes the record
pub type SiteUpdates = HashMap<StructureId, Option<Arc<ConfigRecord>>>;

/// Guard against runaway master-configuration chains
const MAX_MASTER_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub struct ConfigCacheState {
    /// Folder key (trailing `/`) -> sitemap record
    site_configs_by_path: HashMap<String, Arc<ConfigRecord>>,
    /// Every sitemap and master record
    configs_by_id: HashMap<StructureId, Arc<ConfigRecord>>,
    module_configs: Arc<[Arc<ConfigRecord>]>,
    module_config: Arc<ConfigRecord>,
    element_views: Arc<HashMap<StructureId, ElementView>>,
    folder_types: HashMap<String, String>,
    detail_page_types: HashSet<String>,
    /// Master source path (no trailing `/`) -> id
    masters_by_path: HashMap<String, StructureId>,
    /// Referenced path -> (record to re-read, id the path resolved to)
    references: HashMap<String, Vec<(DirtyId, Option<StructureId>)>>,
}

impl Default for ConfigCacheState {
    fn default() -> Self {
        Self::empty()
    }
}

impl ConfigCacheState {
    /// Snapshot without any configuration
    pub fn empty() -> Self {
        Self::build(Vec::new(), Vec::new(), Vec::new())
    }

    /// Build a snapshot from freshly read records
    pub fn build(
        site_records: Vec<Arc<ConfigRecord>>,
        module_records: Vec<Arc<ConfigRecord>>,
        element_views: Vec<ElementView>,
    ) -> Self {
        let mut configs_by_id = HashMap::with_capacity(site_records.len());
        let mut site_configs_by_path = HashMap::new();

        for record in site_records {
            let Some(id) = record.id else {
                warn!(config = %record.describe(), "Ignoring configuration without structure id");
                continue;
            };
            index_by_path(&mut site_configs_by_path, &record);
            configs_by_id.insert(id, record);
        }

        let module_config = Arc::new(merge_module_configs(&module_records));
        let views = element_views.into_iter().map(|v| (v.id, v)).collect();

        Self::assemble(
            site_configs_by_path,
            configs_by_id,
            module_records.into(),
            module_config,
            Arc::new(views),
        )
    }

    /// New snapshot with the given records replaced or removed
    ///
    /// `module_updates` replaces the module record list wholesale when set;
    /// `view_updates` does the same for element views.
    pub fn create_updated_copy(
        &self,
        site_updates: SiteUpdates,
        module_updates: Option<Vec<Arc<ConfigRecord>>>,
        view_updates: Option<Vec<ElementView>>,
    ) -> Self {
        let mut configs_by_id = self.configs_by_id.clone();
        let mut site_configs_by_path = self.site_configs_by_path.clone();
        let mut vacated = Vec::new();

        for (id, update) in site_updates {
            if let Some(old) = configs_by_id.remove(&id) {
                if let Some(key) = old.base_folder_key() {
                    let same_record = site_configs_by_path
                        .get(&key)
                        .is_some_and(|current| current.id == Some(id));
                    if same_record {
                        site_configs_by_path.remove(&key);
                        vacated.push(key);
                    }
                }
            }

            match update {
                Some(record) if record.id == Some(id) => {
                    index_by_path(&mut site_configs_by_path, &record);
                    configs_by_id.insert(id, record);
                }
                Some(record) => {
                    warn!(
                        id = %id,
                        config = %record.describe(),
                        "Update record does not carry its own id, ignoring"
                    );
                }
                None => {
                    debug!(id = %id, "Removed configuration from snapshot");
                }
            }
        }

        // A second sitemap for the same base path takes over a vacated key
        for key in vacated {
            if site_configs_by_path.contains_key(&key) {
                continue;
            }
            let successor = configs_by_id
                .values()
                .filter(|r| r.kind == ConfigKind::Sitemap)
                .filter(|r| r.base_folder_key().as_deref() == Some(key.as_str()))
                .min_by(|a, b| a.source_path.cmp(&b.source_path));
            if let Some(record) = successor {
                debug!(base_path = %key, config = %record.describe(), "Re-indexed sitemap configuration");
                site_configs_by_path.insert(key, Arc::clone(record));
            }
        }

        let (module_configs, module_config) = match module_updates {
            Some(records) => {
                let merged = Arc::new(merge_module_configs(&records));
                (records.into(), merged)
            }
            None => (
                Arc::clone(&self.module_configs),
                Arc::clone(&self.module_config),
            ),
        };

        let element_views = match view_updates {
            Some(views) => Arc::new(views.into_iter().map(|v| (v.id, v)).collect()),
            None => Arc::clone(&self.element_views),
        };

        Self::assemble(
            site_configs_by_path,
            configs_by_id,
            module_configs,
            module_config,
            element_views,
        )
    }

    fn assemble(
        site_configs_by_path: HashMap<String, Arc<ConfigRecord>>,
        configs_by_id: HashMap<StructureId, Arc<ConfigRecord>>,
        module_configs: Arc<[Arc<ConfigRecord>]>,
        module_config: Arc<ConfigRecord>,
        element_views: Arc<HashMap<StructureId, ElementView>>,
    ) -> Self {
        let folder_types = compute_folder_types(&module_config, &site_configs_by_path);
        let detail_page_types = compute_detail_page_types(&module_config, &configs_by_id);
        let masters_by_path = configs_by_id
            .iter()
            .filter(|(_, r)| r.is_master_config())
            .filter_map(|(id, r)| {
                let source = r.source_path.as_deref()?;
                Some((path::strip_trailing(source).to_string(), *id))
            })
            .collect();
        let references = compute_references(&configs_by_id, &module_configs);
        Self {
            site_configs_by_path,
            configs_by_id,
            module_configs,
            module_config,
            element_views,
            folder_types,
            detail_page_types,
            masters_by_path,
            references,
        }
    }

    // ==================== Lookup ====================

    /// Sitemap record with the longest base path that is a prefix of `path`
    pub fn site_config_for_path(&self, path: &str) -> Option<Arc<ConfigRecord>> {
        // For prefixes of one string, lexicographic max == longest
        path::ancestor_folders(path)
            .into_iter()
            .filter(|folder| self.site_configs_by_path.contains_key(folder))
            .max()
            .and_then(|folder| self.site_configs_by_path.get(&folder).cloned())
    }

    /// Effective configuration for `path`; module configuration if nothing matches
    pub fn lookup(&self, path: &str) -> ConfigFacade {
        match self.site_config_for_path(path) {
            Some(record) => ConfigFacade::new(self.sequence_for(&record)),
            None => self.module_facade(),
        }
    }

    /// Facade positioned at the merged module configuration
    pub fn module_facade(&self) -> ConfigFacade {
        ConfigFacade::new(ConfigSequence::new(
            Arc::clone(&self.module_config),
            Vec::new(),
        ))
    }

    /// Inheritance chain ending at `record`
    pub fn sequence_for(&self, record: &Arc<ConfigRecord>) -> ConfigSequence {
        let mut chain = Vec::new();

        if let Some(base) = record.base_path.as_deref() {
            let mut ancestors = path::ancestor_folders(base);
            ancestors.reverse();
            for folder in ancestors {
                if let Some(ancestor) = self.site_configs_by_path.get(&folder) {
                    if Arc::ptr_eq(ancestor, record) {
                        continue;
                    }
                    self.push_with_masters(ancestor, &mut chain);
                }
            }
        }
        self.push_with_masters(record, &mut chain);

        ConfigSequence::new(Arc::clone(&self.module_config), chain)
    }

    fn push_with_masters(&self, record: &Arc<ConfigRecord>, chain: &mut Vec<Arc<ConfigRecord>>) {
        let mut masters = Vec::new();
        let mut visited: HashSet<StructureId> = record.id.into_iter().collect();
        let mut current = Arc::clone(record);

        while let Some(master_id) = self.linked_master(&current) {
            if !visited.insert(master_id) || masters.len() >= MAX_MASTER_DEPTH {
                warn!(
                    config = %record.describe(),
                    master = %master_id,
                    "Master configuration chain cycles, cutting it"
                );
                break;
            }
            match self.configs_by_id.get(&master_id) {
                Some(master) => {
                    masters.push(Arc::clone(master));
                    current = Arc::clone(master);
                }
                None => {
                    warn!(
                        config = %current.describe(),
                        master = %master_id,
                        "Master configuration not found, omitting it"
                    );
                    break;
                }
            }
        }

        // Deepest master first
        chain.extend(masters.into_iter().rev());
        chain.push(Arc::clone(record));
    }

    /// Master linked from `record`: the id read with the document if that
    /// record is present, otherwise whatever master now lives at the linked path
    fn linked_master(&self, record: &ConfigRecord) -> Option<StructureId> {
        record
            .master_config
            .filter(|id| self.configs_by_id.contains_key(id))
            .or_else(|| {
                let linked = record.master_config_path.as_deref()?;
                self.masters_by_path.get(linked).copied()
            })
            .or(record.master_config)
    }

    /// Records naming `resource`'s path whose reference resolved to another id
    /// (or to nothing) when they were read
    pub fn stale_references(&self, resource: &Resource) -> Vec<DirtyId> {
        let Some(holders) = self.references.get(path::strip_trailing(&resource.root_path)) else {
            return Vec::new();
        };
        let stale: HashSet<DirtyId> = holders
            .iter()
            .filter(|(_, target)| *target != Some(resource.id))
            .map(|(holder, _)| *holder)
            .collect();
        stale.into_iter().collect()
    }

    // ==================== Accessors ====================

    pub fn module_config(&self) -> &Arc<ConfigRecord> {
        &self.module_config
    }

    pub fn module_configs(&self) -> &[Arc<ConfigRecord>] {
        &self.module_configs
    }

    pub fn config_by_id(&self, id: StructureId) -> Option<&Arc<ConfigRecord>> {
        self.configs_by_id.get(&id)
    }

    /// Sitemap records keyed by base folder (trailing `/`)
    pub fn site_configs(&self) -> &HashMap<String, Arc<ConfigRecord>> {
        &self.site_configs_by_path
    }

    pub fn config_count(&self) -> usize {
        self.configs_by_id.len()
    }

    pub fn element_views(&self) -> &HashMap<StructureId, ElementView> {
        &self.element_views
    }

    /// Content folder (trailing `/`) -> resource type name
    pub fn folder_types(&self) -> &HashMap<String, String> {
        &self.folder_types
    }

    pub fn detail_page_types(&self) -> &HashSet<String> {
        &self.detail_page_types
    }

    pub fn has_detail_pages(&self, type_name: &str) -> bool {
        self.detail_page_types.contains(type_name)
    }

    /// Every detail page declared anywhere, module configuration first, then
    /// sitemap and master records in source path order
    pub fn all_detail_pages(&self) -> Vec<&DetailPageInfo> {
        let mut records: Vec<&Arc<ConfigRecord>> = self.configs_by_id.values().collect();
        records.sort_by(|a, b| a.source_path.cmp(&b.source_path));

        std::iter::once(&self.module_config)
            .chain(records)
            .flat_map(|r| r.detail_pages.iter())
            .collect()
    }

    /// Detail pages for a type, across the whole snapshot
    pub fn detail_pages_for_type(&self, type_name: &str) -> Vec<&DetailPageInfo> {
        if !self.has_detail_pages(type_name) {
            return Vec::new();
        }
        self.all_detail_pages()
            .into_iter()
            .filter(|p| p.type_name == type_name)
            .collect()
    }
}

fn index_by_path(index: &mut HashMap<String, Arc<ConfigRecord>>, record: &Arc<ConfigRecord>) {
    match record.kind {
        ConfigKind::Master => {}
        ConfigKind::Module => {
            warn!(config = %record.describe(), "Module configuration passed as site configuration");
        }
        ConfigKind::Sitemap => match record.base_folder_key() {
            Some(key) => {
                if let Some(previous) = index.insert(key.clone(), Arc::clone(record)) {
                    warn!(
                        base_path = %key,
                        replaced = %previous.describe(),
                        config = %record.describe(),
                        "Two sitemap configurations for one base path"
                    );
                }
            }
            None => {
                warn!(
                    config = %record.describe(),
                    "Sitemap configuration without base path, excluded from path lookup"
                );
            }
        },
    }
}

/// Fold module records into one, later modules taking precedence
fn merge_module_configs(records: &[Arc<ConfigRecord>]) -> ConfigRecord {
    let mut sorted: Vec<&Arc<ConfigRecord>> = records.iter().collect();
    sorted.sort_by(|a, b| a.source_path.cmp(&b.source_path));

    let mut merged = ConfigRecord::empty(ConfigKind::Module);
    for module in sorted {
        merged.resource_types = combine(&merged.resource_types, &module.resource_types);
        merged.properties = combine(&merged.properties, &module.properties);
        merged.model_pages = combine(&merged.model_pages, &module.model_pages);
        merged.function_references =
            combine(&merged.function_references, &module.function_references);
        merged.detail_pages = combine_detail_pages(&merged.detail_pages, &module.detail_pages);
        merged.formatter_changes = merged.formatter_changes.combine(&module.formatter_changes);
    }

    sort_by_order(&mut merged.resource_types, |t| t.order);
    sort_by_order(&mut merged.function_references, |f| f.order);
    merged
}

fn compute_folder_types(
    module: &ConfigRecord,
    sites: &HashMap<String, Arc<ConfigRecord>>,
) -> HashMap<String, String> {
    let mut result = HashMap::new();
    add_folder_types(&mut result, module);

    // Deeper configurations win for the same folder
    let mut keys: Vec<&String> = sites.keys().collect();
    keys.sort();
    for key in keys {
        add_folder_types(&mut result, &sites[key]);
    }
    result
}

fn add_folder_types(result: &mut HashMap<String, String>, record: &ConfigRecord) {
    for type_config in record.resource_types.iter().filter(|t| !t.disabled) {
        if let Some(folder) = type_config.folder_path() {
            result.insert(folder, type_config.type_name.clone());
        }
    }
}

fn compute_references(
    configs: &HashMap<StructureId, Arc<ConfigRecord>>,
    modules: &[Arc<ConfigRecord>],
) -> HashMap<String, Vec<(DirtyId, Option<StructureId>)>> {
    let sites = configs
        .iter()
        .map(|(id, r)| (DirtyId::Resource(*id), r));
    let modules = modules.iter().map(|r| (DirtyId::ReloadModules, r));

    let mut result: HashMap<String, Vec<(DirtyId, Option<StructureId>)>> = HashMap::new();
    for (holder, record) in sites.chain(modules) {
        for reference in &record.references {
            result
                .entry(reference.path.clone())
                .or_default()
                .push((holder, reference.target));
        }
    }
    result
}

fn compute_detail_page_types(
    module: &ConfigRecord,
    configs: &HashMap<StructureId, Arc<ConfigRecord>>,
) -> HashSet<String> {
    std::iter::once(module)
        .chain(configs.values().map(|r| r.as_ref()))
        .flat_map(|r| r.detail_pages.iter().map(|p| p.type_name.clone()))
        .collect()
}
