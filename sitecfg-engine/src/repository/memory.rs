use parking_lot::RwLock;
use sitecfg_protocol::{type_names, Resource, StructureId};
use sitecfg_utils::{Result, SitecfgError};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::Repository;
use crate::path;

#[derive(Debug, Clone)]
struct Entry {
    resource: Resource,
    body: String,
}

#[derive(Debug, Default)]
struct Tree {
    /// Root path -> entry; folders end with `/`
    entries: BTreeMap<String, Entry>,
    ids: HashMap<StructureId, String>,
}

/// Thread-safe in-memory repository
///
/// Parent folders are created on demand. Resource types must be registered
/// before they can be listed, which lets callers reproduce start-up
/// ordering problems.
#[derive(Debug)]
pub struct InMemoryRepository {
    tree: RwLock<Tree>,
    types: RwLock<HashSet<String>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Repository with every standard type registered
    pub fn new() -> Self {
        let repo = Self::without_types();
        for type_name in [
            type_names::SITEMAP_CONFIG,
            type_names::MASTER_CONFIG,
            type_names::MODULE_CONFIG,
            type_names::ELEMENT_VIEW,
            type_names::FOLDER,
            type_names::CONTAINER_PAGE,
            type_names::PLAIN,
        ] {
            repo.register_type(type_name);
        }
        repo
    }

    /// Repository without registered types
    pub fn without_types() -> Self {
        let repo = Self {
            tree: RwLock::new(Tree::default()),
            types: RwLock::new(HashSet::new()),
        };
        repo.ensure_folder("/");
        repo
    }

    pub fn register_type(&self, type_name: &str) {
        self.types.write().insert(type_name.to_string());
    }

    /// Create the folder and its parents; returns the folder
    pub fn ensure_folder(&self, root_path: &str) -> Resource {
        let key = path::folder_key(root_path);
        let mut tree = self.tree.write();
        Self::ensure_folder_locked(&mut tree, &key)
    }

    fn ensure_folder_locked(tree: &mut Tree, key: &str) -> Resource {
        if let Some(entry) = tree.entries.get(key) {
            return entry.resource.clone();
        }
        if let Some(parent) = path::parent_folder(key) {
            Self::ensure_folder_locked(tree, &parent);
        }
        let resource = Resource::folder(StructureId::new_v4(), key);
        tree.ids.insert(resource.id, key.to_string());
        tree.entries.insert(
            key.to_string(),
            Entry {
                resource: resource.clone(),
                body: String::new(),
            },
        );
        resource
    }

    /// Create or overwrite a file; an existing file keeps its id
    pub fn put_file(&self, root_path: &str, type_name: &str, body: impl Into<String>) -> Resource {
        let body = body.into();
        let mut tree = self.tree.write();
        if let Some(parent) = path::parent_folder(root_path) {
            Self::ensure_folder_locked(&mut tree, &parent);
        }

        let id = tree
            .entries
            .get(root_path)
            .map(|e| e.resource.id)
            .unwrap_or_else(StructureId::new_v4);
        let resource = Resource::file(id, root_path, type_name);
        tree.ids.insert(id, root_path.to_string());
        tree.entries.insert(
            root_path.to_string(),
            Entry {
                resource: resource.clone(),
                body,
            },
        );
        resource
    }

    /// Delete a resource and everything below it; returns the deleted resources
    pub fn delete(&self, root_path: &str) -> Vec<Resource> {
        let mut tree = self.tree.write();
        let keys: Vec<String> = tree
            .entries
            .keys()
            .filter(|k| *k == root_path || k.starts_with(&path::folder_key(root_path)))
            .cloned()
            .collect();

        let mut deleted = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(entry) = tree.entries.remove(&key) {
                tree.ids.remove(&entry.resource.id);
                deleted.push(entry.resource);
            }
        }
        deleted
    }

    /// Move a file, keeping its id; returns (source, destination)
    pub fn move_file(&self, from: &str, to: &str) -> Result<(Resource, Resource)> {
        let mut tree = self.tree.write();
        let entry = tree
            .entries
            .remove(from)
            .ok_or_else(|| SitecfgError::ResourceNotFound(from.to_string()))?;
        if let Some(parent) = path::parent_folder(to) {
            Self::ensure_folder_locked(&mut tree, &parent);
        }

        let source = entry.resource.clone();
        let destination = Resource {
            root_path: to.to_string(),
            ..entry.resource
        };
        tree.ids.insert(destination.id, to.to_string());
        tree.entries.insert(
            to.to_string(),
            Entry {
                resource: destination.clone(),
                body: entry.body,
            },
        );
        Ok((source, destination))
    }

    pub fn len(&self) -> usize {
        self.tree.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Repository for InMemoryRepository {
    fn read_resource(&self, id: StructureId) -> Result<Resource> {
        let tree = self.tree.read();
        tree.ids
            .get(&id)
            .and_then(|p| tree.entries.get(p))
            .map(|e| e.resource.clone())
            .ok_or_else(|| SitecfgError::ResourceIdNotFound(id.to_string()))
    }

    fn read_resource_by_path(&self, root_path: &str) -> Result<Resource> {
        let tree = self.tree.read();
        tree.entries
            .get(root_path)
            .or_else(|| tree.entries.get(&path::folder_key(root_path)))
            .map(|e| e.resource.clone())
            .ok_or_else(|| SitecfgError::ResourceNotFound(root_path.to_string()))
    }

    fn list_resources(&self, root_path: &str, type_name: Option<&str>) -> Result<Vec<Resource>> {
        if let Some(t) = type_name {
            if !self.types.read().contains(t) {
                return Err(SitecfgError::UnknownResourceType(t.to_string()));
            }
        }

        let prefix = path::folder_key(root_path);
        let tree = self.tree.read();
        Ok(tree
            .entries
            .values()
            .map(|e| &e.resource)
            .filter(|r| r.root_path == root_path || r.root_path.starts_with(&prefix))
            .filter(|r| type_name.map_or(true, |t| r.type_name == t))
            .cloned()
            .collect())
    }

    fn read_body(&self, resource: &Resource) -> Result<String> {
        let tree = self.tree.read();
        tree.ids
            .get(&resource.id)
            .and_then(|p| tree.entries.get(p))
            .map(|e| e.body.clone())
            .ok_or_else(|| SitecfgError::ResourceIdNotFound(resource.id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_creates_parents() {
        let repo = InMemoryRepository::new();
        repo.put_file("/sites/a/.content/.config", type_names::SITEMAP_CONFIG, "");
        assert!(repo.read_resource_by_path("/sites/a/.content/").unwrap().is_folder);
        assert!(repo.read_resource_by_path("/sites/a").unwrap().is_folder);
    }

    #[test]
    fn test_overwrite_keeps_id() {
        let repo = InMemoryRepository::new();
        let first = repo.put_file("/a.page", type_names::CONTAINER_PAGE, "one");
        let second = repo.put_file("/a.page", type_names::CONTAINER_PAGE, "two");
        assert_eq!(first.id, second.id);
        assert_eq!(repo.read_body(&second).unwrap(), "two");
    }

    #[test]
    fn test_list_filters_by_type_and_path() {
        let repo = InMemoryRepository::new();
        repo.put_file("/a/.content/.config", type_names::SITEMAP_CONFIG, "");
        repo.put_file("/b/.content/.config", type_names::SITEMAP_CONFIG, "");
        repo.put_file("/a/index.page", type_names::CONTAINER_PAGE, "");

        let configs = repo.list_resources("/", Some(type_names::SITEMAP_CONFIG)).unwrap();
        assert_eq!(configs.len(), 2);
        let under_a = repo.list_resources("/a", None).unwrap();
        assert!(under_a.iter().all(|r| r.root_path.starts_with("/a/")));
    }

    #[test]
    fn test_unregistered_type_fails() {
        let repo = InMemoryRepository::without_types();
        let err = repo
            .list_resources("/", Some(type_names::SITEMAP_CONFIG))
            .unwrap_err();
        assert!(matches!(err, SitecfgError::UnknownResourceType(_)));
    }

    #[test]
    fn test_delete_and_move() {
        let repo = InMemoryRepository::new();
        let file = repo.put_file("/a/x.page", type_names::CONTAINER_PAGE, "");
        let (source, dest) = repo.move_file("/a/x.page", "/b/x.page").unwrap();
        assert_eq!(source.id, dest.id);
        assert_eq!(repo.read_resource(file.id).unwrap().root_path, "/b/x.page");

        let deleted = repo.delete("/b");
        assert_eq!(deleted.len(), 2);
        assert!(repo.read_resource(file.id).unwrap_err().is_not_found());
    }
}
