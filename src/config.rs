use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{SplitOptions, PARAGRAPHS_PER_CHUNK};

/// Configuration for docx-chunker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Directory holding originals, chunks and merged documents
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// Paragraphs per chunk when splitting
    #[serde(default = "default_paragraphs_per_chunk")]
    pub paragraphs_per_chunk: usize,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("public")
}

fn default_paragraphs_per_chunk() -> usize {
    PARAGRAPHS_PER_CHUNK
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_root: default_storage_root(),
            paragraphs_per_chunk: default_paragraphs_per_chunk(),
        }
    }
}

impl Config {
    /// Load config from the config directory
    pub fn load() -> Result<Self> {
        match Self::get_config_path() {
            Some(config_path) => Self::load_from(&config_path),
            None => Ok(Config::default()),
        }
    }

    /// Load config from a file, or the defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the config directory
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::get_config_path() {
            self.save_to(&config_path)?;
        }

        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docx-chunker").join("config.toml"))
    }

    /// Initialize default config file
    pub fn init_default() -> Result<()> {
        let config = Config::default();
        config.save()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.paragraphs_per_chunk == 0 {
            bail!("paragraphs_per_chunk must be at least 1");
        }
        Ok(())
    }

    pub fn split_options(&self) -> SplitOptions {
        SplitOptions {
            paragraphs_per_chunk: self.paragraphs_per_chunk,
        }
    }
}
