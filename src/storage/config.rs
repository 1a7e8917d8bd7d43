//! Configuration handling for procrastinate
//!
//! Configuration is stored in `<home>/config.toml`, where home is the
//! `--home` directory when given and the platform config directory otherwise.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default name of the task file
pub const DEFAULT_SAVE_FILENAME: &str = "tasks.jsonl";

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine a home directory; pass --home or set PROCRASTINATE_HOME")]
    NoHome,

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format used when no `--format` flag is given
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings persisted in `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the task file (defaults to the data directory)
    pub save_directory: Option<PathBuf>,

    /// Name of the task file
    pub save_filename: String,

    /// Match search descriptions case-sensitively
    pub case_sensitive_search: bool,

    /// Default output format
    pub default_format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            save_directory: None,
            save_filename: DEFAULT_SAVE_FILENAME.to_string(),
            case_sensitive_search: false,
            default_format: OutputFormat::Text,
        }
    }
}

/// Loaded settings plus the directories they were resolved against
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl Config {
    /// Loads configuration, using `home` for both config and data when given
    pub fn load(home: Option<&Path>) -> Result<Self> {
        let (config_dir, data_dir) = match home {
            Some(home) => (home.to_path_buf(), home.to_path_buf()),
            None => {
                let dirs = Self::project_dirs().ok_or(ConfigError::NoHome)?;
                (
                    dirs.config_dir().to_path_buf(),
                    dirs.data_dir().to_path_buf(),
                )
            }
        };

        let settings = Self::load_settings(&config_dir.join(CONFIG_FILENAME))?;

        Ok(Self {
            settings,
            config_dir,
            data_dir,
        })
    }

    /// Creates an unsaved default configuration rooted at `home`
    pub fn in_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            settings: Settings::default(),
            config_dir: home.clone(),
            data_dir: home,
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "procrastinate")
    }

    fn load_settings(path: &Path) -> Result<Settings> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")
    }

    /// Returns the path of `config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILENAME)
    }

    /// Returns the directory holding the task file
    pub fn save_directory(&self) -> &Path {
        self.settings
            .save_directory
            .as_deref()
            .unwrap_or(&self.data_dir)
    }

    /// Returns the full path of the task file
    pub fn task_file(&self) -> PathBuf {
        self.save_directory().join(&self.settings.save_filename)
    }

    /// Points the task file at a new location; a missing filename keeps the current one
    pub fn set_task_location(&mut self, directory: &Path, filename: Option<&str>) {
        self.settings.save_directory = Some(directory.to_path_buf());
        if let Some(filename) = filename {
            self.settings.save_filename = filename.to_string();
        }
    }

    /// Writes the settings to `config.toml`
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                self.config_dir.display()
            )
        })?;

        let path = self.config_path();
        let content =
            toml::to_string_pretty(&self.settings).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }
}
