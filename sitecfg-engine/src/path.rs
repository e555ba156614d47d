//! Root path helpers
//!
//! Repository paths are absolute, `/`-separated strings. Folder keys always
//! carry a trailing `/`, which makes "is an ancestor of" a plain prefix test.

/// Name of the folder holding a sitemap's configuration and contents
pub const CONTENT_FOLDER: &str = ".content";

/// File name of a sitemap or module configuration document
pub const CONFIG_FILE: &str = ".config";

/// Ensure a trailing separator
pub fn folder_key(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Remove a trailing separator (the root stays `/`)
pub fn strip_trailing(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Parent folder of a path, with trailing separator
///
/// `None` for the root.
pub fn parent_folder(path: &str) -> Option<String> {
    let trimmed = strip_trailing(path);
    if trimmed == "/" || trimmed.is_empty() {
        return None;
    }
    trimmed.rfind('/').map(|idx| trimmed[..=idx].to_string())
}

/// The path itself (as a folder key) followed by every ancestor folder up to `/`
pub fn ancestor_folders(path: &str) -> Vec<String> {
    let mut result = vec![folder_key(path)];
    let mut current = folder_key(path);
    while let Some(parent) = parent_folder(&current) {
        result.push(parent.clone());
        current = parent;
    }
    result
}

/// Last path segment without trailing separator
pub fn name(path: &str) -> &str {
    let trimmed = strip_trailing(path);
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Join a relative name onto a folder path
pub fn join(base: &str, relative: &str) -> String {
    format!(
        "{}/{}",
        strip_trailing(base).trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}

/// Check whether `path` lies at or below `folder`
pub fn is_prefix_of(folder: &str, path: &str) -> bool {
    folder_key(path).starts_with(&folder_key(folder))
}

/// Base path governed by a sitemap configuration document
///
/// `/sites/a/.content/.config` governs `/sites/a`. Returns `None` when the
/// document does not live in a `.content` folder.
pub fn base_path_for_config(config_path: &str) -> Option<String> {
    let content_folder = parent_folder(config_path)?;
    if name(&content_folder) != CONTENT_FOLDER {
        return None;
    }
    let base = parent_folder(&content_folder)?;
    Some(strip_trailing(&base).to_string())
}
