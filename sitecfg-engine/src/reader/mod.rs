//! Reading configuration documents from the repository
//!
//! The reader is the only place that touches document bodies. Full reads
//! fail as a whole when the repository cannot list configuration types;
//! single documents that fail to parse are logged and treated as absent.

mod parser;

pub use parser::{DocumentParser, TomlDocumentParser};

use std::sync::Arc;

use sitecfg_protocol::{type_names, Resource, StructureId};
use sitecfg_utils::Result;
use tracing::{debug, info, warn};

use crate::model::{ConfigRecord, ElementView};
use crate::path;
use crate::repository::Repository;
use crate::snapshot::ConfigCacheState;

#[derive(Clone)]
pub struct ConfigReader {
    repository: Arc<dyn Repository>,
    parser: Arc<dyn DocumentParser>,
}

impl ConfigReader {
    /// Reader using the TOML document parser
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        let parser = Arc::new(TomlDocumentParser::new(Arc::clone(&repository)));
        Self::with_parser(repository, parser)
    }

    pub fn with_parser(repository: Arc<dyn Repository>, parser: Arc<dyn DocumentParser>) -> Self {
        Self { repository, parser }
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    /// Read every sitemap, master, module and element view document
    pub fn read_complete_configuration(&self) -> Result<ConfigCacheState> {
        let mut site_records = Vec::new();
        for type_name in [type_names::SITEMAP_CONFIG, type_names::MASTER_CONFIG] {
            for resource in self.repository.list_resources("/", Some(type_name))? {
                if let Some(record) = self.parse_logged(&resource) {
                    site_records.push(record);
                }
            }
        }
        let modules = self.read_module_records()?;
        let views = self.read_element_views()?;

        info!(
            sites = site_records.len(),
            modules = modules.len(),
            views = views.len(),
            "Read complete configuration"
        );
        Ok(ConfigCacheState::build(site_records, modules, views))
    }

    /// Re-read one sitemap or master document
    ///
    /// `Ok(None)` means the id no longer names a usable configuration and
    /// should be removed. `Err` is an I/O failure; the caller keeps stale data.
    pub fn read_site_record(&self, id: StructureId) -> Result<Option<Arc<ConfigRecord>>> {
        let resource = match self.repository.read_resource(id) {
            Ok(resource) => resource,
            Err(e) if e.is_not_found() => {
                debug!(id = %id, "Configuration no longer exists");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if !resource.is_type(type_names::SITEMAP_CONFIG)
            && !resource.is_type(type_names::MASTER_CONFIG)
        {
            debug!(id = %id, path = %resource.root_path, "Resource is no longer a configuration");
            return Ok(None);
        }

        let body = match self.repository.read_body(&resource) {
            Ok(body) => body,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(self.parse_body_logged(&resource, &body))
    }

    /// All module configuration records, in listing order
    pub fn read_module_records(&self) -> Result<Vec<Arc<ConfigRecord>>> {
        Ok(self
            .repository
            .list_resources("/", Some(type_names::MODULE_CONFIG))?
            .iter()
            .filter_map(|r| self.parse_logged(r))
            .collect())
    }

    pub fn read_element_views(&self) -> Result<Vec<ElementView>> {
        let mut views = Vec::new();
        for resource in self
            .repository
            .list_resources("/", Some(type_names::ELEMENT_VIEW))?
        {
            let parsed = self
                .repository
                .read_body(&resource)
                .and_then(|body| self.parser.parse_element_view(&resource, &body));
            match parsed {
                Ok(view) => views.push(view),
                Err(e) => warn!(path = %resource.root_path, error = %e, "Skipping element view"),
            }
        }
        Ok(views)
    }

    fn parse_logged(&self, resource: &Resource) -> Option<Arc<ConfigRecord>> {
        match self.repository.read_body(resource) {
            Ok(body) => self.parse_body_logged(resource, &body),
            Err(e) => {
                warn!(path = %resource.root_path, error = %e, "Could not read configuration");
                None
            }
        }
    }

    fn parse_body_logged(&self, resource: &Resource, body: &str) -> Option<Arc<ConfigRecord>> {
        let base_path = if resource.is_type(type_names::SITEMAP_CONFIG) {
            path::base_path_for_config(&resource.root_path)
        } else {
            None
        };
        match self.parser.parse(base_path.as_deref(), resource, body) {
            Ok(record) => Some(Arc::new(record)),
            Err(e) => {
                warn!(path = %resource.root_path, error = %e, "Ignoring invalid configuration");
                None
            }
        }
    }
}
