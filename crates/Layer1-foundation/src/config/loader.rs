//! Configuration Loader
//!
//! ## Search order (lowest to highest priority)
//!
//! 1. User-level: `~/.toolrelay/settings.json`
//! 2. Project-level: `.toolrelay/settings.json`
//! 3. Local (gitignored): `.toolrelay/settings.local.json`
//! 4. Explicit file passed on the command line
//!
//! Each level overrides the previous one field by field.

use super::AgentConfig;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Settings directory name
pub const CONFIG_DIR_NAME: &str = ".toolrelay";

/// Settings file path info
#[derive(Debug, Clone)]
struct ConfigPath {
    path: PathBuf,
    /// Higher wins
    priority: u8,
    description: &'static str,
}

/// Settings loader
pub struct ConfigLoader {
    search_paths: Vec<ConfigPath>,
}

impl ConfigLoader {
    /// Loader with the default search paths
    pub fn new(working_dir: &Path) -> Self {
        let mut paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            paths.push(ConfigPath {
                path: home.join(CONFIG_DIR_NAME).join("settings.json"),
                priority: 10,
                description: "User settings",
            });
        }

        paths.push(ConfigPath {
            path: working_dir.join(CONFIG_DIR_NAME).join("settings.json"),
            priority: 20,
            description: "Project settings",
        });

        paths.push(ConfigPath {
            path: working_dir.join(CONFIG_DIR_NAME).join("settings.local.json"),
            priority: 30,
            description: "Local settings",
        });

        paths.sort_by_key(|p| p.priority);

        Self {
            search_paths: paths,
        }
    }

    /// Loader with custom search paths, in priority order
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        let search_paths = paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| ConfigPath {
                path,
                priority: i as u8,
                description: "Custom",
            })
            .collect();

        Self { search_paths }
    }

    /// Load every discovered file and merge them
    ///
    /// Discovered files that fail to parse are skipped with a warning.
    pub fn load_all(&self) -> AgentConfig {
        let mut merged = AgentConfig::new();

        for config_path in &self.search_paths {
            if !config_path.path.exists() {
                continue;
            }

            match load_config_from_file(&config_path.path) {
                Ok(config) => {
                    info!(
                        "Loaded {} from: {}",
                        config_path.description,
                        config_path.path.display()
                    );
                    merged = merged.merge(config);
                }
                Err(e) => {
                    warn!(
                        "Failed to load settings from {}: {}",
                        config_path.path.display(),
                        e
                    );
                }
            }
        }

        merged
    }

    /// Discovered settings plus an explicit file on top
    ///
    /// Unlike discovered files, an explicit file must exist and parse.
    pub fn load_with(&self, explicit: Option<&Path>) -> Result<AgentConfig> {
        let merged = self.load_all();

        match explicit {
            Some(path) => Ok(merged.merge(load_config_from_file(path)?)),
            None => Ok(merged),
        }
    }

    /// Settings files that currently exist
    pub fn existing_files(&self) -> Vec<PathBuf> {
        self.search_paths
            .iter()
            .filter(|p| p.path.exists())
            .map(|p| p.path.clone())
            .collect()
    }
}

/// Load one settings file
pub fn load_config_from_file(path: &Path) -> Result<AgentConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("cannot read settings {}: {}", path.display(), e))
    })?;

    let config: AgentConfig = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("invalid settings at {}: {}", path.display(), e))
    })?;

    debug!(
        "Loaded config from {}: server {:?}, model {:?}",
        path.display(),
        config.server.command,
        config.model
    );

    Ok(config)
}
