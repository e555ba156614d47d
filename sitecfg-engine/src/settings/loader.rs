//! Settings loader

use std::path::Path;

use sitecfg_utils::{settings_file, Result, SitecfgError};

use super::EngineSettings;

pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from the default location, or defaults if absent
    pub fn load() -> Result<EngineSettings> {
        let path = settings_file();
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            Ok(EngineSettings::default())
        }
    }

    pub fn load_from_path(path: &Path) -> Result<EngineSettings> {
        if !path.exists() {
            return Err(SitecfgError::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| SitecfgError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<EngineSettings> {
        toml::from_str(content).map_err(|e| SitecfgError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn validate(settings: &EngineSettings) -> Result<()> {
        let cache = &settings.cache;
        if cache.update_interval_ms < 100 {
            return Err(SitecfgError::config(
                "cache.update_interval_ms must be at least 100",
            ));
        }
        if cache.settle_delay_ms >= cache.update_interval_ms {
            return Err(SitecfgError::config(
                "cache.settle_delay_ms must be shorter than cache.update_interval_ms",
            ));
        }
        if settings.watcher.debounce_ms < 10 {
            return Err(SitecfgError::config("watcher.debounce_ms must be at least 10"));
        }
        Ok(())
    }

    /// Load from `path` (or the default location) and validate
    pub fn load_and_validate(path: Option<&Path>) -> Result<EngineSettings> {
        let settings = match path {
            Some(p) => Self::load_from_path(p)?,
            None => Self::load()?,
        };
        Self::validate(&settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sitecfg.toml");

        std::fs::write(
            &path,
            r#"
            [cache]
            update_interval_ms = 2000
            "#,
        )
        .unwrap();

        let settings = SettingsLoader::load_and_validate(Some(&path)).unwrap();
        assert_eq!(settings.cache.update_interval_ms, 2000);
        assert_eq!(settings.cache.settle_delay_ms, 250);
        assert!(settings.watcher.enabled);
    }

    #[test]
    fn test_missing_explicit_path() {
        let dir = tempdir().unwrap();
        let err = SettingsLoader::load_from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, SitecfgError::ConfigNotFound(_)));
    }

    #[test]
    fn test_validate_rejects_short_interval() {
        let mut settings = EngineSettings::default();
        settings.cache.update_interval_ms = 50;
        settings.cache.settle_delay_ms = 0;
        assert!(SettingsLoader::validate(&settings).is_err());
    }

    #[test]
    fn test_validate_rejects_long_settle() {
        let mut settings = EngineSettings::default();
        settings.cache.settle_delay_ms = settings.cache.update_interval_ms;
        assert!(SettingsLoader::validate(&settings).is_err());
    }

    #[test]
    fn test_fast_settings_are_valid() {
        let settings = EngineSettings {
            cache: crate::settings::CacheSettings::fast(),
            ..Default::default()
        };
        SettingsLoader::validate(&settings).unwrap();
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = SettingsLoader::parse("invalid { toml", Path::new("test.toml"));
        assert!(matches!(result, Err(SitecfgError::ConfigInvalid { .. })));
    }
}
