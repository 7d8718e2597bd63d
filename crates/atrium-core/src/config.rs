//! Site configuration loading (`atrium.yaml`)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["atrium.yaml", "atrium.yml"];

/// Default page size for admin lists
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Raw `atrium.yaml` contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfigFile {
    /// Directory holding installed plugin modules
    pub modules_root: PathBuf,

    /// Directory holding installed themes
    pub themes_root: PathBuf,

    /// Repository feed URL for plugins
    #[serde(default)]
    pub plugins_feed: Option<String>,

    /// Repository feed URL for themes
    #[serde(default)]
    pub themes_feed: Option<String>,

    /// Cache directory for feed files and downloaded packages
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Install updates side by side under a versioned path instead of
    /// replacing in place
    #[serde(default)]
    pub multi_install: bool,

    /// Development escape hatch: allow deleting modules whose root lies
    /// outside the managed roots
    #[serde(default)]
    pub dev_mode: bool,
}

/// Loaded site configuration
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// The parsed configuration
    pub config: SiteConfigFile,

    /// Path to the configuration file
    pub config_path: PathBuf,
}

impl SiteConfig {
    /// Load configuration from the specified path or search for it
    ///
    /// Without an explicit path, walks from the working directory upward
    /// until an `atrium.yaml` is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, content) = if let Some(p) = path {
            let content = fs::read_to_string(p).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::config_not_found(p.display().to_string())
                } else {
                    Error::Io(e)
                }
            })?;
            (p.to_owned(), content)
        } else {
            Self::find_config()?
        };

        debug!("Loading site config from {:?}", config_path);
        let config: SiteConfigFile = serde_yaml::from_str(&content)?;

        if config.modules_root.as_os_str().is_empty() {
            return Err(Error::invalid_config("modules_root must not be empty"));
        }
        if config.themes_root.as_os_str().is_empty() {
            return Err(Error::invalid_config("themes_root must not be empty"));
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Search for a config file from the current directory upward
    fn find_config() -> Result<(PathBuf, String)> {
        let mut dir = std::env::current_dir()?;
        loop {
            for name in CONFIG_FILE_NAMES {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    let content = fs::read_to_string(&candidate)?;
                    return Ok((candidate, content));
                }
            }
            if !dir.pop() {
                return Err(Error::config_not_found(CONFIG_FILE_NAMES[0]));
            }
        }
    }

    /// Cache directory, defaulting to the platform cache location
    pub fn cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.config.cache_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("org", "atrium", "atrium")
            .map(|d| d.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".atrium-cache"))
    }

    /// Managed root for a list type ("themes" or anything else = plugins)
    pub fn root_for(&self, list_type: &str) -> &Path {
        if list_type == "themes" {
            &self.config.themes_root
        } else {
            &self.config.modules_root
        }
    }

    /// Feed URL for a list type
    pub fn feed_for(&self, list_type: &str) -> Option<&str> {
        if list_type == "themes" {
            self.config.themes_feed.as_deref()
        } else {
            self.config.plugins_feed.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("atrium.yaml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            "modules_root: /srv/site/plugins\nthemes_root: /srv/site/themes\nplugins_feed: https://repo.example.org/plugins.yaml\n",
        );

        let cfg = SiteConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.config.modules_root, PathBuf::from("/srv/site/plugins"));
        assert_eq!(
            cfg.feed_for("plugins"),
            Some("https://repo.example.org/plugins.yaml")
        );
        assert_eq!(cfg.feed_for("themes"), None);
        assert!(!cfg.config.dev_mode);
    }

    #[test]
    fn test_missing_file_is_config_not_found() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("atrium.yaml");
        let err = SiteConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_empty_root_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "modules_root: \"\"\nthemes_root: /t\n");
        let err = SiteConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_root_for() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "modules_root: /p\nthemes_root: /t\n");
        let cfg = SiteConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.root_for("themes"), Path::new("/t"));
        assert_eq!(cfg.root_for("plugins"), Path::new("/p"));
    }
}
