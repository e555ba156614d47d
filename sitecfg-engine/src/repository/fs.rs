use dashmap::DashMap;
use sitecfg_protocol::{type_names, Resource, StructureId};
use sitecfg_utils::{Result, SitecfgError};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use super::Repository;
use crate::path;

/// Module configurations live below this folder
const MODULES_FOLDER: &str = "/system/modules/";

/// Repository backed by a directory tree
///
/// Resource types are derived from file names and ids are stable UUIDv5
/// values of the root path, so a renamed file gets a new id.
#[derive(Debug)]
pub struct FsRepository {
    root: PathBuf,
    /// Ids seen so far, used to answer lookups by id without a walk
    known: DashMap<StructureId, String>,
}

impl FsRepository {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SitecfgError::ResourceNotFound(root.display().to_string()));
        }
        Ok(Self {
            root,
            known: DashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Previously seen resources at or below `root_path`
    ///
    /// Answers from memory only, so it still works after the subtree was
    /// removed or renamed on disk.
    pub fn known_below(&self, root_path: &str) -> Vec<Resource> {
        let mut found: Vec<Resource> = self
            .known
            .iter()
            .filter(|entry| path::is_prefix_of(root_path, entry.value()))
            .map(|entry| {
                let (id, known_path) = (*entry.key(), entry.value());
                if known_path.ends_with('/') {
                    Resource::folder(id, known_path.as_str())
                } else {
                    Resource::file(id, known_path.as_str(), Self::type_for(known_path, false))
                }
            })
            .collect();
        found.sort_by(|a, b| a.root_path.cmp(&b.root_path));
        found
    }

    /// Type of a resource, from its root path
    pub fn type_for(root_path: &str, is_dir: bool) -> &'static str {
        if is_dir {
            return type_names::FOLDER;
        }
        let name = path::name(root_path);
        if name == path::CONFIG_FILE {
            let parent = path::parent_folder(root_path).unwrap_or_default();
            return if path::name(&parent) == path::CONTENT_FOLDER {
                type_names::SITEMAP_CONFIG
            } else if root_path.starts_with(MODULES_FOLDER) {
                type_names::MODULE_CONFIG
            } else {
                type_names::PLAIN
            };
        }
        if name.ends_with(".masterconfig") {
            type_names::MASTER_CONFIG
        } else if name.ends_with(".view") {
            type_names::ELEMENT_VIEW
        } else if name.ends_with(".page") {
            type_names::CONTAINER_PAGE
        } else {
            type_names::PLAIN
        }
    }

    /// Root path of a filesystem path below the repository root
    ///
    /// `None` for paths outside the root.
    pub fn root_path_for(&self, fs_path: &Path, is_dir: bool) -> Option<String> {
        let relative = fs_path.strip_prefix(&self.root).ok()?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(s) => segments.push(s.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => return None,
            }
        }
        let mut root_path = format!("/{}", segments.join("/"));
        if is_dir && root_path != "/" {
            root_path.push('/');
        }
        Some(root_path)
    }

    /// Build the resource for a root path without touching the filesystem
    pub fn resource_for(&self, root_path: &str, is_dir: bool) -> Resource {
        let id = StructureId::for_path(path::strip_trailing(root_path));
        self.known.insert(id, root_path.to_string());
        if is_dir {
            Resource::folder(id, root_path)
        } else {
            Resource::file(id, root_path, Self::type_for(root_path, false))
        }
    }

    fn fs_path(&self, root_path: &str) -> PathBuf {
        self.root.join(root_path.trim_start_matches('/'))
    }

    fn walk(&self, dir: &Path, out: &mut Vec<Resource>) -> Result<()> {
        let entries = std::fs::read_dir(dir).map_err(|e| SitecfgError::FileRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry?;
            let fs_path = entry.path();
            let is_dir = entry.file_type()?.is_dir();
            let Some(root_path) = self.root_path_for(&fs_path, is_dir) else {
                continue;
            };
            out.push(self.resource_for(&root_path, is_dir));
            if is_dir {
                self.walk(&fs_path, out)?;
            }
        }
        Ok(())
    }
}

impl Repository for FsRepository {
    fn read_resource(&self, id: StructureId) -> Result<Resource> {
        let cached = self.known.get(&id).map(|p| p.value().clone());
        if let Some(root_path) = cached {
            match self.read_resource_by_path(&root_path) {
                Ok(resource) if resource.id == id => return Ok(resource),
                Ok(_) => {}
                // Ids are derived from the path, so the resource cannot be elsewhere
                Err(e) if e.is_not_found() => {
                    self.known.remove(&id);
                    return Err(SitecfgError::ResourceIdNotFound(id.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        // Unknown id: the tree has not been walked since it appeared
        self.list_resources("/", None)?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| SitecfgError::ResourceIdNotFound(id.to_string()))
    }

    fn read_resource_by_path(&self, root_path: &str) -> Result<Resource> {
        let fs_path = self.fs_path(root_path);
        let metadata = std::fs::metadata(&fs_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SitecfgError::ResourceNotFound(root_path.to_string()),
            _ => SitecfgError::FileRead {
                path: fs_path.clone(),
                source: e,
            },
        })?;

        let is_dir = metadata.is_dir();
        let normalized = if is_dir {
            path::folder_key(root_path)
        } else {
            path::strip_trailing(root_path).to_string()
        };
        Ok(self.resource_for(&normalized, is_dir))
    }

    fn list_resources(&self, root_path: &str, type_name: Option<&str>) -> Result<Vec<Resource>> {
        let start = self.read_resource_by_path(root_path)?;
        let mut all = vec![start.clone()];
        if start.is_folder {
            self.walk(&self.fs_path(&start.root_path), &mut all)?;
        }
        Ok(all
            .into_iter()
            .filter(|r| type_name.map_or(true, |t| r.type_name == t))
            .collect())
    }

    fn read_body(&self, resource: &Resource) -> Result<String> {
        let fs_path = self.fs_path(&resource.root_path);
        std::fs::read_to_string(&fs_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SitecfgError::ResourceNotFound(resource.root_path.clone()),
            _ => SitecfgError::FileRead {
                path: fs_path,
                source: e,
            },
        })
    }
}
