use crate::celebrations::{Window, DEFAULT_WINDOW_DAYS};
use crate::directory::DEFAULT_PAGE_SIZE;
use crate::roster::ImportDefaults;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub celebrations: CelebrationsConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub roster: RosterConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CelebrationsConfig {
    pub window_days: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct DirectoryConfig {
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct RosterConfig {
    pub placeholder_avatar: Option<String>,
    pub placeholder_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            celebrations: CelebrationsConfig { window_days: Some(DEFAULT_WINDOW_DAYS) },
            directory: DirectoryConfig { page_size: Some(DEFAULT_PAGE_SIZE) },
            roster: RosterConfig { placeholder_avatar: None, placeholder_password: None },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save()?;
            return Ok(default_config);
        }

        // Read and parse config file
        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Serialize and save config
        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Celebration window starting at `today`, using the configured length.
    pub fn reminder_window(&self, today: NaiveDate) -> Window {
        Window::next_days(today, self.celebrations.window_days.unwrap_or(DEFAULT_WINDOW_DAYS))
    }

    pub fn page_size(&self) -> usize {
        self.directory.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Roster defaults with any configured overrides applied.
    pub fn import_defaults(&self) -> ImportDefaults {
        let mut defaults = ImportDefaults::default();
        if let Some(avatar) = &self.roster.placeholder_avatar {
            defaults.placeholder_avatar = avatar.clone();
        }
        if let Some(password) = &self.roster.placeholder_password {
            defaults.placeholder_password = password.clone();
        }
        defaults
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("org", "parishbook", "parishbook")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
