//! XDG locations for sitecfg settings and logs

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "sitecfg";

/// Settings file name inside [`config_dir`]
pub const SETTINGS_FILE_NAME: &str = "sitecfg.toml";

/// `$XDG_CONFIG_HOME/sitecfg`, or `~/.config/sitecfg` when no project dirs resolve
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| under_home(&[".config", APP_NAME]))
}

/// Engine settings file read when no `--settings` path is given
pub fn settings_file() -> PathBuf {
    config_dir().join(SETTINGS_FILE_NAME)
}

/// `$XDG_STATE_HOME/sitecfg`, or `~/.local/state/sitecfg`
///
/// Platforms without a state dir (macOS, Windows) use the fallback too.
pub fn state_dir() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME)
        .and_then(|dirs| dirs.state_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| under_home(&[".local", "state", APP_NAME]))
}

pub fn log_dir() -> PathBuf {
    state_dir().join("log")
}

/// `create_dir_all`, tolerating an existing directory
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path)
}

fn under_home(parts: &[&str]) -> PathBuf {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    parts.iter().fold(home, |acc, part| acc.join(part))
}
