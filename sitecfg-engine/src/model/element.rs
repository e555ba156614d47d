use serde::Serialize;
use sitecfg_protocol::StructureId;
use std::hash::Hash;

use crate::path;

/// Capability shared by every keyed configuration element
///
/// The merge engine is generic over this trait: it only needs to know an
/// element's key, whether it is a "turn this off" directive, and how a
/// parent element combines with an overriding child.
pub trait ConfigElement: Clone {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;

    fn is_disabled(&self) -> bool;

    /// Combine this (parent) element with an overriding child element
    fn merge(&self, child: &Self) -> Self;
}

// ==================== Resource Types ====================

/// Where contents of a resource type are created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FolderSpec {
    /// Folder name below `<base>/.content/`
    Name(String),
    /// Explicit root path
    Path(String),
}

/// Resource type rule of a configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceTypeConfig {
    pub type_name: String,
    pub disabled: bool,
    pub folder: Option<FolderSpec>,
    pub name_pattern: Option<String>,
    pub order: Option<i32>,
    pub create_disabled: Option<bool>,
    pub detail_pages_disabled: Option<bool>,
    /// Base path of the configuration the folder is relative to
    pub folder_base: Option<String>,
}

impl ResourceTypeConfig {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            disabled: false,
            folder: None,
            name_pattern: None,
            order: None,
            create_disabled: None,
            detail_pages_disabled: None,
            folder_base: None,
        }
    }

    /// A directive removing an inherited type
    pub fn disabled(type_name: impl Into<String>) -> Self {
        Self {
            disabled: true,
            ..Self::new(type_name)
        }
    }

    /// Root path of the content folder, with trailing separator
    ///
    /// `None` when the folder is relative and no base path is known (a type
    /// declared only in the module configuration without explicit path).
    pub fn folder_path(&self) -> Option<String> {
        let path = match &self.folder {
            Some(FolderSpec::Path(p)) => p.clone(),
            Some(FolderSpec::Name(name)) => {
                let base = self.folder_base.as_deref()?;
                path::join(base, &format!("{}/{}", path::CONTENT_FOLDER, name))
            }
            None => {
                let base = self.folder_base.as_deref()?;
                path::join(
                    base,
                    &format!("{}/{}", path::CONTENT_FOLDER, self.type_name),
                )
            }
        };
        Some(path::folder_key(&path))
    }

    /// Move a relative folder onto another base path
    pub fn rebased(&self, base_path: &str) -> Self {
        let mut copy = self.clone();
        if !matches!(copy.folder, Some(FolderSpec::Path(_))) {
            copy.folder_base = Some(base_path.to_string());
        }
        copy
    }

    pub fn is_creatable(&self) -> bool {
        !self.create_disabled.unwrap_or(false)
    }

    pub fn has_detail_pages_disabled(&self) -> bool {
        self.detail_pages_disabled.unwrap_or(false)
    }
}

impl ConfigElement for ResourceTypeConfig {
    type Key = String;

    fn key(&self) -> String {
        self.type_name.clone()
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn merge(&self, child: &Self) -> Self {
        let (folder, folder_base) = if child.folder.is_some() {
            (child.folder.clone(), child.folder_base.clone())
        } else {
            (self.folder.clone(), self.folder_base.clone())
        };
        Self {
            type_name: child.type_name.clone(),
            disabled: child.disabled,
            folder,
            name_pattern: child.name_pattern.clone().or_else(|| self.name_pattern.clone()),
            order: child.order.or(self.order),
            create_disabled: child.create_disabled.or(self.create_disabled),
            detail_pages_disabled: child.detail_pages_disabled.or(self.detail_pages_disabled),
            folder_base,
        }
    }
}

// ==================== Properties ====================

/// Property definition of a configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertyConfig {
    pub name: String,
    pub disabled: bool,
    pub widget: Option<String>,
    pub default: Option<String>,
    pub description: Option<String>,
    pub nice_name: Option<String>,
    pub hidden: Option<bool>,
}

impl PropertyConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.unwrap_or(false)
    }
}

impl ConfigElement for PropertyConfig {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn merge(&self, child: &Self) -> Self {
        Self {
            name: child.name.clone(),
            disabled: child.disabled,
            widget: child.widget.clone().or_else(|| self.widget.clone()),
            default: child.default.clone().or_else(|| self.default.clone()),
            description: child.description.clone().or_else(|| self.description.clone()),
            nice_name: child.nice_name.clone().or_else(|| self.nice_name.clone()),
            hidden: child.hidden.or(self.hidden),
        }
    }
}

// ==================== Model Pages ====================

/// Model page entry, keyed by the page's structure id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelPageConfig {
    pub page: StructureId,
    pub path: String,
    pub disabled: bool,
    pub is_default: bool,
}

impl ConfigElement for ModelPageConfig {
    type Key = StructureId;

    fn key(&self) -> StructureId {
        self.page
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn merge(&self, child: &Self) -> Self {
        child.clone()
    }
}

// ==================== Function References ====================

/// Named reference to a dynamic function, module-global
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionReference {
    pub name: String,
    pub function: StructureId,
    pub function_path: String,
    pub order: Option<i32>,
    pub disabled: bool,
}

impl ConfigElement for FunctionReference {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn merge(&self, child: &Self) -> Self {
        child.clone()
    }
}
