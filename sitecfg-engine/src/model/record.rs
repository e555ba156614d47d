use serde::Serialize;
use sitecfg_protocol::StructureId;

use super::{
    DetailPageInfo, FormatterChangeSet, FunctionReference, ModelPageConfig, PropertyConfig,
    ResourceTypeConfig,
};
use crate::path;

/// Origin of a configuration record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfigKind {
    /// Governs the subtree below its base path
    Sitemap,
    /// Shared settings spliced in before the sitemap configurations referencing it
    Master,
    /// Repository-wide module configuration
    Module,
}

/// Repository path named by a configuration document
///
/// Kept for every detail page, model page and function reference, found or
/// not, so a target created or replaced later can be traced back to the
/// configurations naming it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceReference {
    /// Target path without trailing separator
    pub path: String,
    /// Id the path resolved to when the document was read; `None` if missing
    pub target: Option<StructureId>,
}

impl ResourceReference {
    pub fn new(target_path: &str, target: Option<StructureId>) -> Self {
        Self {
            path: path::strip_trailing(target_path).to_string(),
            target,
        }
    }
}

/// Parsed configuration document
///
/// Records are shared as `Arc<ConfigRecord>` between snapshots and never
/// mutated after construction; a changed document yields a new record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigRecord {
    /// Structure id of the source document; `None` for the merged module record
    pub id: Option<StructureId>,
    pub kind: ConfigKind,
    /// Governed folder without trailing separator; `None` for module and master records
    pub base_path: Option<String>,
    /// Root path of the source document
    pub source_path: Option<String>,
    /// Resolved master configuration, if it existed when the document was read
    pub master_config: Option<StructureId>,
    /// Master configuration path as written, resolved again for every snapshot
    pub master_config_path: Option<String>,
    pub resource_types: Vec<ResourceTypeConfig>,
    pub properties: Vec<PropertyConfig>,
    pub detail_pages: Vec<DetailPageInfo>,
    pub model_pages: Vec<ModelPageConfig>,
    pub function_references: Vec<FunctionReference>,
    pub discard_inherited_types: bool,
    pub discard_inherited_properties: bool,
    pub discard_inherited_model_pages: bool,
    pub create_contents_locally: bool,
    pub formatter_changes: FormatterChangeSet,
    pub references: Vec<ResourceReference>,
}

impl ConfigRecord {
    /// Empty record of the given kind
    pub fn empty(kind: ConfigKind) -> Self {
        Self {
            id: None,
            kind,
            base_path: None,
            source_path: None,
            master_config: None,
            master_config_path: None,
            resource_types: Vec::new(),
            properties: Vec::new(),
            detail_pages: Vec::new(),
            model_pages: Vec::new(),
            function_references: Vec::new(),
            discard_inherited_types: false,
            discard_inherited_properties: false,
            discard_inherited_model_pages: false,
            create_contents_locally: false,
            formatter_changes: FormatterChangeSet::default(),
            references: Vec::new(),
        }
    }

    /// Empty sitemap record for `base_path`
    pub fn sitemap(id: StructureId, base_path: impl Into<String>) -> Self {
        let base_path = base_path.into();
        Self {
            id: Some(id),
            source_path: Some(path::join(
                &base_path,
                &format!("{}/{}", path::CONTENT_FOLDER, path::CONFIG_FILE),
            )),
            base_path: Some(path::strip_trailing(&base_path).to_string()),
            ..Self::empty(ConfigKind::Sitemap)
        }
    }

    pub fn is_module_config(&self) -> bool {
        self.kind == ConfigKind::Module
    }

    pub fn is_master_config(&self) -> bool {
        self.kind == ConfigKind::Master
    }

    /// Base path as a folder key (trailing separator)
    pub fn base_folder_key(&self) -> Option<String> {
        self.base_path.as_deref().map(path::folder_key)
    }

    /// Short description for log messages
    pub fn describe(&self) -> String {
        match (&self.source_path, &self.id) {
            (Some(p), _) => p.clone(),
            (None, Some(id)) => id.to_string(),
            (None, None) => format!("<{:?}>", self.kind),
        }
    }
}
