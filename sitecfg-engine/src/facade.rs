//! Resolved (already inherited) view of the configuration at one position
//! of an inheritance chain
//!
//! Views are recomputed on every call; callers that need a view repeatedly
//! should keep the returned value.

use serde::Serialize;
use std::sync::Arc;

use crate::merge::{combine, combine_detail_pages};
use crate::model::{
    ConfigRecord, DetailPageInfo, FormatterChangeSet, FunctionReference, ModelPageConfig,
    PropertyConfig, ResourceTypeConfig,
};
use crate::sequence::ConfigSequence;

/// Effective configuration for a lookup
#[derive(Debug, Clone)]
pub struct ConfigFacade {
    sequence: ConfigSequence,
}

/// All resolved views at once, for display and export
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub base_path: Option<String>,
    pub source_path: Option<String>,
    pub is_module_config: bool,
    pub resource_types: Vec<ResourceTypeConfig>,
    pub properties: Vec<PropertyConfig>,
    pub model_pages: Vec<ModelPageConfig>,
    pub detail_pages: Vec<DetailPageInfo>,
    pub function_references: Vec<FunctionReference>,
    pub formatter_changes: FormatterChangeSet,
}

impl ConfigFacade {
    pub fn new(sequence: ConfigSequence) -> Self {
        Self { sequence }
    }

    /// Record at this position of the chain
    pub fn record(&self) -> &Arc<ConfigRecord> {
        self.sequence.config()
    }

    pub fn sequence(&self) -> &ConfigSequence {
        &self.sequence
    }

    pub fn base_path(&self) -> Option<&str> {
        self.record().base_path.as_deref()
    }

    pub fn is_module_config(&self) -> bool {
        self.record().is_module_config()
    }

    /// Facade of the next link towards the module configuration
    pub fn parent(&self) -> Option<ConfigFacade> {
        self.sequence.parent().map(ConfigFacade::new)
    }

    // ==================== Resource Types ====================

    pub fn resource_types(&self) -> Vec<ResourceTypeConfig> {
        let record = self.record();
        let mut inherited = if record.discard_inherited_types {
            Vec::new()
        } else {
            self.parent()
                .map(|p| p.resource_types())
                .unwrap_or_default()
        };

        if record.create_contents_locally {
            if let Some(base) = record.base_path.as_deref() {
                inherited = inherited.iter().map(|t| t.rebased(base)).collect();
            }
        }

        combine(&inherited, &record.resource_types)
    }

    pub fn resource_type(&self, type_name: &str) -> Option<ResourceTypeConfig> {
        self.resource_types()
            .into_iter()
            .find(|t| t.type_name == type_name)
    }

    pub fn is_type_enabled(&self, type_name: &str) -> bool {
        self.resource_type(type_name).is_some()
    }

    /// Folder where new contents of `type_name` are created
    pub fn folder_for_type(&self, type_name: &str) -> Option<String> {
        self.resource_type(type_name).and_then(|t| t.folder_path())
    }

    // ==================== Properties ====================

    pub fn properties(&self) -> Vec<PropertyConfig> {
        let record = self.record();
        let inherited = if record.discard_inherited_properties {
            Vec::new()
        } else {
            self.parent().map(|p| p.properties()).unwrap_or_default()
        };
        combine(&inherited, &record.properties)
    }

    pub fn property(&self, name: &str) -> Option<PropertyConfig> {
        self.properties().into_iter().find(|p| p.name == name)
    }

    // ==================== Model Pages ====================

    pub fn model_pages(&self) -> Vec<ModelPageConfig> {
        let record = self.record();
        let inherited = if record.discard_inherited_model_pages {
            Vec::new()
        } else {
            self.parent().map(|p| p.model_pages()).unwrap_or_default()
        };
        combine(&inherited, &record.model_pages)
    }

    /// The model page flagged as default, else the first one
    pub fn default_model_page(&self) -> Option<ModelPageConfig> {
        let pages = self.model_pages();
        pages
            .iter()
            .find(|p| p.is_default)
            .or_else(|| pages.first())
            .cloned()
    }

    // ==================== Detail Pages ====================

    pub fn detail_pages(&self) -> Vec<DetailPageInfo> {
        let inherited = self.parent().map(|p| p.detail_pages()).unwrap_or_default();
        combine_detail_pages(&inherited, &self.record().detail_pages)
    }

    pub fn detail_pages_for_type(&self, type_name: &str) -> Vec<DetailPageInfo> {
        self.detail_pages()
            .into_iter()
            .filter(|p| p.type_name == type_name)
            .collect()
    }

    // ==================== Function References ====================

    /// Function references are module-global: sitemap and master records
    /// contribute nothing and defer to their parent link
    pub fn function_references(&self) -> Vec<FunctionReference> {
        let record = self.record();
        if !record.is_module_config() {
            return self
                .parent()
                .map(|p| p.function_references())
                .unwrap_or_default();
        }

        let inherited = self
            .parent()
            .filter(|p| p.is_module_config())
            .map(|p| p.function_references())
            .unwrap_or_default();
        combine(&inherited, &record.function_references)
    }

    // ==================== Formatters ====================

    pub fn formatter_changes(&self) -> FormatterChangeSet {
        let inherited = self
            .parent()
            .map(|p| p.formatter_changes())
            .unwrap_or_default();
        inherited.combine(&self.record().formatter_changes)
    }

    pub fn resolve_all(&self) -> ResolvedConfig {
        let record = self.record();
        ResolvedConfig {
            base_path: record.base_path.clone(),
            source_path: record.source_path.clone(),
            is_module_config: record.is_module_config(),
            resource_types: self.resource_types(),
            properties: self.properties(),
            model_pages: self.model_pages(),
            detail_pages: self.detail_pages(),
            function_references: self.function_references(),
            formatter_changes: self.formatter_changes(),
        }
    }
}
