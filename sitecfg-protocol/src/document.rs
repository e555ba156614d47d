//! Schema of authored configuration documents
//!
//! Documents are TOML. Every list is optional and every flag defaults to
//! `false`, so an empty document is a valid (empty) configuration.
//! Paths inside a document are repository root paths; the reader resolves
//! them to structure ids.

use serde::{Deserialize, Serialize};

/// Sitemap, master or module configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    /// Root path of a master configuration to splice in before this one
    pub master_config: Option<String>,
    /// Ignore resource types inherited from parent configurations
    pub discard_types: bool,
    /// Ignore properties inherited from parent configurations
    pub discard_properties: bool,
    /// Ignore model pages inherited from parent configurations
    pub discard_model_pages: bool,
    /// Create contents of inherited types below this configuration's base path
    pub create_contents_locally: bool,
    #[serde(rename = "resource_type")]
    pub resource_types: Vec<ResourceTypeEntry>,
    #[serde(rename = "property")]
    pub properties: Vec<PropertyEntry>,
    #[serde(rename = "detail_page")]
    pub detail_pages: Vec<DetailPageEntry>,
    #[serde(rename = "model_page")]
    pub model_pages: Vec<ModelPageEntry>,
    #[serde(rename = "function_ref")]
    pub function_refs: Vec<FunctionRefEntry>,
    pub formatters: FormatterEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceTypeEntry {
    pub type_name: String,
    #[serde(default)]
    pub disabled: bool,
    /// Folder name below `<base>/.content/`
    pub folder: Option<String>,
    /// Explicit folder root path; wins over `folder`
    pub folder_path: Option<String>,
    pub name_pattern: Option<String>,
    pub order: Option<i32>,
    pub create_disabled: Option<bool>,
    pub detail_pages_disabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyEntry {
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
    pub widget: Option<String>,
    pub default: Option<String>,
    pub description: Option<String>,
    pub nice_name: Option<String>,
    pub hidden: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailPageEntry {
    pub type_name: String,
    /// Root path of the detail page (a folder or a page inside it)
    pub page: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPageEntry {
    pub page: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionRefEntry {
    pub name: String,
    pub function: String,
    pub order: Option<i32>,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterEntry {
    pub remove_all: bool,
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

/// Element view document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementViewDocument {
    pub title: String,
    pub order: Option<i32>,
}
