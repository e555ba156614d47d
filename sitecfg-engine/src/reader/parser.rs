use std::collections::BTreeSet;
use std::sync::Arc;

use sitecfg_protocol::{
    type_names, ConfigDocument, DetailPageEntry, ElementViewDocument, FunctionRefEntry,
    ModelPageEntry, PropertyEntry, Resource, ResourceTypeEntry, StructureId,
};
use sitecfg_utils::{Result, SitecfgError};
use tracing::{debug, warn};

use crate::model::{
    ConfigKind, ConfigRecord, DetailPageInfo, ElementView, FolderSpec, FormatterChangeSet,
    FunctionReference, ModelPageConfig, PropertyConfig, ResourceReference, ResourceTypeConfig,
};
use crate::path;
use crate::repository::Repository;

/// Turns a configuration document body into a [`ConfigRecord`]
pub trait DocumentParser: Send + Sync {
    /// `base_path` is `None` for module and master configurations
    fn parse(&self, base_path: Option<&str>, resource: &Resource, body: &str)
        -> Result<ConfigRecord>;

    fn parse_element_view(&self, resource: &Resource, body: &str) -> Result<ElementView>;
}

/// Parser for the TOML document schema
///
/// Page, function and master paths are resolved to structure ids through
/// the repository. Entries whose target does not exist are left out of the
/// record but kept in [`ConfigRecord::references`]; a missing master stays
/// linked by path.
pub struct TomlDocumentParser {
    repository: Arc<dyn Repository>,
}

impl TomlDocumentParser {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    fn kind_for(resource: &Resource) -> Result<ConfigKind> {
        match resource.type_name.as_str() {
            type_names::SITEMAP_CONFIG => Ok(ConfigKind::Sitemap),
            type_names::MASTER_CONFIG => Ok(ConfigKind::Master),
            type_names::MODULE_CONFIG => Ok(ConfigKind::Module),
            other => Err(SitecfgError::invalid_document(
                &resource.root_path,
                format!("resource type '{}' is not a configuration type", other),
            )),
        }
    }

    /// Resolve a referenced path and note it in `references`
    fn resolve(
        &self,
        source: &Resource,
        target: &str,
        what: &str,
        references: &mut Vec<ResourceReference>,
    ) -> Option<Resource> {
        let resolved = match self.repository.read_resource_by_path(target) {
            Ok(resource) => Some(resource),
            Err(e) => {
                warn!(
                    config = %source.root_path,
                    target = %target,
                    error = %e,
                    "Skipping {} until its target can be read",
                    what
                );
                None
            }
        };
        references.push(ResourceReference::new(
            target,
            resolved.as_ref().map(|r| r.id),
        ));
        resolved
    }

    fn resource_type(entry: ResourceTypeEntry, base_path: Option<&str>) -> ResourceTypeConfig {
        let folder = entry
            .folder_path
            .map(FolderSpec::Path)
            .or(entry.folder.map(FolderSpec::Name));
        ResourceTypeConfig {
            type_name: entry.type_name,
            disabled: entry.disabled,
            folder,
            name_pattern: entry.name_pattern,
            order: entry.order,
            create_disabled: entry.create_disabled,
            detail_pages_disabled: entry.detail_pages_disabled,
            folder_base: base_path.map(str::to_string),
        }
    }

    fn property(entry: PropertyEntry) -> PropertyConfig {
        PropertyConfig {
            name: entry.name,
            disabled: entry.disabled,
            widget: entry.widget,
            default: entry.default,
            description: entry.description,
            nice_name: entry.nice_name,
            hidden: entry.hidden,
        }
    }

    fn detail_page(
        &self,
        source: &Resource,
        entry: DetailPageEntry,
        references: &mut Vec<ResourceReference>,
    ) -> Option<DetailPageInfo> {
        let target = self.resolve(source, &entry.page, "detail page", references)?;
        Some(DetailPageInfo {
            type_name: entry.type_name,
            uri: target.root_path,
            id: target.id,
            is_default: entry.default,
        })
    }

    fn model_page(
        &self,
        source: &Resource,
        entry: ModelPageEntry,
        references: &mut Vec<ResourceReference>,
    ) -> Option<ModelPageConfig> {
        let target = self.resolve(source, &entry.page, "model page", references)?;
        Some(ModelPageConfig {
            page: target.id,
            path: target.root_path,
            disabled: entry.disabled,
            is_default: entry.default,
        })
    }

    fn function_ref(
        &self,
        source: &Resource,
        entry: FunctionRefEntry,
        references: &mut Vec<ResourceReference>,
    ) -> Option<FunctionReference> {
        let target = self.resolve(source, &entry.function, "function reference", references)?;
        Some(FunctionReference {
            name: entry.name,
            function: target.id,
            function_path: target.root_path,
            order: entry.order,
            disabled: entry.disabled,
        })
    }

    /// Master link as (resolved id, path); a missing target keeps its path
    fn master(&self, source: &Resource, target: &str) -> (Option<StructureId>, Option<String>) {
        let linked_path = Some(path::strip_trailing(target).to_string());
        match self.repository.read_resource_by_path(target) {
            Ok(master) if master.is_type(type_names::MASTER_CONFIG) => (Some(master.id), linked_path),
            Ok(_) => {
                warn!(
                    config = %source.root_path,
                    target = %target,
                    "Master configuration link does not point at a master configuration"
                );
                (None, None)
            }
            Err(e) => {
                debug!(
                    config = %source.root_path,
                    target = %target,
                    error = %e,
                    "Master configuration not readable yet, keeping link by path"
                );
                (None, linked_path)
            }
        }
    }
}

impl DocumentParser for TomlDocumentParser {
    fn parse(
        &self,
        base_path: Option<&str>,
        resource: &Resource,
        body: &str,
    ) -> Result<ConfigRecord> {
        let kind = Self::kind_for(resource)?;
        let document: ConfigDocument = toml::from_str(body)
            .map_err(|e| SitecfgError::parse(&resource.root_path, e.to_string()))?;

        let (master_config, master_config_path) = match (&document.master_config, kind) {
            (Some(path), ConfigKind::Module) => {
                warn!(config = %resource.root_path, master = %path, "Module configurations cannot link a master configuration");
                (None, None)
            }
            (Some(path), _) => self.master(resource, path),
            (None, _) => (None, None),
        };

        let resource_types = document
            .resource_types
            .into_iter()
            .map(|e| Self::resource_type(e, base_path))
            .collect();
        let properties = document.properties.into_iter().map(Self::property).collect();
        let mut references = Vec::new();
        let detail_pages = document
            .detail_pages
            .into_iter()
            .filter_map(|e| self.detail_page(resource, e, &mut references))
            .collect();
        let model_pages = document
            .model_pages
            .into_iter()
            .filter_map(|e| self.model_page(resource, e, &mut references))
            .collect();
        let function_references = document
            .function_refs
            .into_iter()
            .filter_map(|e| self.function_ref(resource, e, &mut references))
            .collect();

        Ok(ConfigRecord {
            id: Some(resource.id),
            kind,
            base_path: base_path.map(str::to_string),
            source_path: Some(resource.root_path.clone()),
            master_config,
            master_config_path,
            resource_types,
            properties,
            detail_pages,
            model_pages,
            function_references,
            discard_inherited_types: document.discard_types,
            discard_inherited_properties: document.discard_properties,
            discard_inherited_model_pages: document.discard_model_pages,
            create_contents_locally: document.create_contents_locally,
            formatter_changes: FormatterChangeSet {
                remove_all: document.formatters.remove_all,
                add: document.formatters.add.into_iter().collect::<BTreeSet<_>>(),
                remove: document.formatters.remove.into_iter().collect(),
            },
            references,
        })
    }

    fn parse_element_view(&self, resource: &Resource, body: &str) -> Result<ElementView> {
        let document: ElementViewDocument = toml::from_str(body)
            .map_err(|e| SitecfgError::parse(&resource.root_path, e.to_string()))?;
        Ok(ElementView {
            id: resource.id,
            title: document.title,
            root_path: resource.root_path.clone(),
            order: document.order,
        })
    }
}
