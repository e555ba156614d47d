//! Command implementations

mod query;
mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use sitecfg_engine::{
    ConfigReader, ConfigurationManager, EngineSettings, FsRepository, Project, SettingsLoader,
    DEFAULT_SETTINGS_TOML,
};
use sitecfg_utils::{Result, SitecfgError};
use tokio::runtime::Handle;

use crate::cli::{Cli, Command};

/// Repository, manager and selected cache for one invocation
pub struct Session {
    pub repository: Arc<FsRepository>,
    pub manager: Arc<ConfigurationManager>,
    pub project: Project,
    pub settings: EngineSettings,
}

impl Session {
    fn open(root: Option<PathBuf>, settings: EngineSettings, online: bool) -> Result<Self> {
        let root = root
            .or_else(|| settings.repository.root.clone())
            .ok_or_else(|| SitecfgError::config("no repository root (use --root or SITECFG_ROOT)"))?;

        let repository = Arc::new(FsRepository::new(root)?);
        // A directory has no publishing step: both views read the same tree
        let reader = ConfigReader::new(repository.clone());
        let manager = ConfigurationManager::new(
            reader.clone(),
            reader,
            settings.cache.clone(),
            Handle::current(),
        );

        Ok(Self {
            repository,
            manager: Arc::new(manager),
            project: Project::from_online(online),
            settings,
        })
    }

    /// Initialize only the selected cache, surfacing the failure
    fn initialize_selected(&self) -> Result<()> {
        self.manager.cache(self.project).initialize()
    }
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<i32> {
    if let Command::DefaultSettings = cli.command {
        print!("{}", DEFAULT_SETTINGS_TOML);
        return Ok(0);
    }

    let settings = SettingsLoader::load_and_validate(cli.settings.as_deref())?;
    let session = Session::open(cli.root, settings, cli.online)?;

    if let Command::Watch = cli.command {
        return watch::watch(session).await;
    }

    session.initialize_selected()?;
    let code = match cli.command {
        Command::Resolve { path } => query::resolve(&session, &path),
        Command::DetailPages { type_name } => query::detail_pages(&session, &type_name),
        Command::FolderTypes => query::folder_types(&session),
        Command::IsDetailPage { path } => query::is_detail_page(&session, &path),
        Command::ElementViews => query::element_views(&session),
        Command::Watch | Command::DefaultSettings => Ok(0),
    };
    session.manager.shutdown();
    code
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| SitecfgError::internal(format!("JSON encoding failed: {}", e)))?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("sites/a/.content/.config");
        std::fs::create_dir_all(config.parent().unwrap()).unwrap();
        std::fs::write(&config, "[[resource_type]]\ntype_name = \"article\"\n").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_session_requires_root() {
        let result = Session::open(None, EngineSettings::default(), false);
        assert!(matches!(result, Err(SitecfgError::Config(_))));
    }

    #[tokio::test]
    async fn test_session_resolves_tree() {
        let dir = tree();
        let session =
            Session::open(Some(dir.path().to_path_buf()), EngineSettings::default(), true).unwrap();
        assert_eq!(session.project, Project::Online);

        session.initialize_selected().unwrap();
        let facade = session.manager.lookup("/sites/a/news/", Project::Online);
        assert_eq!(facade.base_path(), Some("/sites/a"));
        assert_eq!(
            facade.folder_for_type("article").as_deref(),
            Some("/sites/a/.content/article/")
        );
        assert_eq!(query::folder_types(&session).unwrap(), 0);
        session.manager.shutdown();
    }

    #[tokio::test]
    async fn test_root_from_settings() {
        let dir = tree();
        let mut settings = EngineSettings::default();
        settings.repository.root = Some(dir.path().to_path_buf());
        let session = Session::open(None, settings, false).unwrap();
        assert_eq!(session.repository.root(), dir.path());
    }
}
