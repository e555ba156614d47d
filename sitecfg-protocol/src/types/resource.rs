use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ==================== Structure Ids ====================

/// Stable identity of a repository resource
///
/// Survives modifications of the resource; a delete followed by a re-create
/// yields a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureId(Uuid);

impl StructureId {
    /// Create a random id
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derive a deterministic id from a root path
    ///
    /// Used by repositories that have no native identity (e.g. a plain
    /// directory tree).
    pub fn for_path(root_path: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, root_path.as_bytes()))
    }

    /// Wrap an existing uuid
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying uuid
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error returned when a string is not a valid structure id
#[derive(Debug, thiserror::Error)]
#[error("invalid structure id '{input}': {source}")]
pub struct IdParseError {
    input: String,
    source: uuid::Error,
}

impl FromStr for StructureId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self).map_err(|source| IdParseError {
            input: s.to_string(),
            source,
        })
    }
}

// ==================== Resource Types ====================

/// Resource type names the engine reacts to
pub mod type_names {
    /// Sitemap configuration document (`<base>/.content/.config`)
    pub const SITEMAP_CONFIG: &str = "sitemap_config";
    /// Shared configuration referenced by sitemap configurations
    pub const MASTER_CONFIG: &str = "sitemap_master_config";
    /// Repository-wide module configuration
    pub const MODULE_CONFIG: &str = "module_config";
    /// Element view definition
    pub const ELEMENT_VIEW: &str = "element_view";
    /// Folder
    pub const FOLDER: &str = "folder";
    /// Page document
    pub const CONTAINER_PAGE: &str = "containerpage";
    /// Anything else
    pub const PLAIN: &str = "plain";
}

// ==================== Resources ====================

/// Identity, location and type of a repository resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: StructureId,
    /// Absolute path in the repository; folders end with `/`
    pub root_path: String,
    pub type_name: String,
    pub is_folder: bool,
}

impl Resource {
    /// Create a file resource
    pub fn file(id: StructureId, root_path: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id,
            root_path: root_path.into(),
            type_name: type_name.into(),
            is_folder: false,
        }
    }

    /// Create a folder resource; the path gets a trailing `/`
    pub fn folder(id: StructureId, root_path: impl Into<String>) -> Self {
        let mut root_path = root_path.into();
        if !root_path.ends_with('/') {
            root_path.push('/');
        }
        Self {
            id,
            root_path,
            type_name: type_names::FOLDER.to_string(),
            is_folder: true,
        }
    }

    /// Check the resource type
    pub fn is_type(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_path_is_deterministic() {
        let a = StructureId::for_path("/sites/default/.content/.config");
        let b = StructureId::for_path("/sites/default/.content/.config");
        let c = StructureId::for_path("/sites/other/.content/.config");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse_display() {
        let id = StructureId::new_v4();
        let parsed: StructureId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<StructureId>().is_err());
    }

    #[test]
    fn test_folder_gets_trailing_slash() {
        let folder = Resource::folder(StructureId::new_v4(), "/sites/default/news");
        assert_eq!(folder.root_path, "/sites/default/news/");
        assert!(folder.is_folder);
        assert!(folder.is_type(type_names::FOLDER));
    }
}
