use crate::config::{AppConfig, CONFIG_FILE_NAME, HOME_ENV};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct FileConfigRepository {
    base_dir: PathBuf,
}

impl FileConfigRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        Self::new_with(base_dir, |k| std::env::var(k).ok())
    }

    /// Like `new`, reading the environment through `get` so tests need not
    /// touch the process environment.
    pub fn new_with<F>(base_dir: Option<PathBuf>, get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = match base_dir {
            Some(p) => p,
            None => match get(HOME_ENV) {
                Some(home) if !home.is_empty() => PathBuf::from(home),
                _ => {
                    let mut p = dirs::home_dir()
                        .ok_or_else(|| anyhow!("Could not determine home directory"))?;
                    p.push(".stitchline");
                    p
                }
            },
        };
        Ok(Self { base_dir: path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    /// Loads the config, falling back to defaults when no file exists yet.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self.config_path();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        match serde_json::from_str(&content) {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                Ok(AppConfig::default())
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(self.config_path(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::bucket::Granularity;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_gives_defaults() {
        let dir = tempdir().unwrap();
        let repo = FileConfigRepository::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(repo.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let repo = FileConfigRepository::new(Some(dir.path().join("nested"))).unwrap();

        let mut cfg = AppConfig::default();
        cfg.granularity = Granularity::Weekly;
        cfg.rates.rate_per_shift = 450.0;
        repo.save(&cfg).unwrap();

        assert_eq!(repo.load().unwrap(), cfg);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempdir().unwrap();
        let repo = FileConfigRepository::new(Some(dir.path().to_path_buf())).unwrap();
        fs::write(repo.config_path(), "{ not json").unwrap();
        assert_eq!(repo.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_home_env_override() {
        let get = |k: &str| match k {
            "STITCHLINE_HOME" => Some("/srv/stitchline".to_string()),
            _ => None,
        };
        let repo = FileConfigRepository::new_with(None, get).unwrap();
        assert_eq!(repo.base_dir(), Path::new("/srv/stitchline"));
        assert_eq!(repo.config_path(), PathBuf::from("/srv/stitchline/config.json"));
    }
}
