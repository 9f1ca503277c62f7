//! Configuration loading and file filtering.
//!
//! Configuration is stored in TOML. Every section and key is optional:
//!
//! ```toml
//! [organizer]
//! skip_category_dirs = true
//! log_file = "file_organizer.log"
//!
//! [extensions]
//! ".webp" = "Images"
//! "flac" = "Music"
//!
//! [filters]
//! skip_hidden = false
//! exclude_names = [".DS_Store", "Thumbs.db"]
//! exclude_patterns = ["*.part", "**/node_modules/**"]
//! exclude_regex = ["^~\\$"]
//! ```

use crate::audit::DEFAULT_LOG_FILE;
use crate::file_category::{Category, FileMapper};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".file-sorter.toml";

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    #[error("IO error reading configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    pub organizer: OrganizerSettings,
    /// Extra or overriding extension mappings.
    pub extensions: BTreeMap<String, Category>,
    pub filters: FilterRules,
    /// The file this configuration was read from, if any.
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// `[organizer]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerSettings {
    /// Leave `root/Images`, `root/Text`, ... out of the walk.
    pub skip_category_dirs: bool,
    /// Where the audit log is appended.
    pub log_file: PathBuf,
}

impl Default for OrganizerSettings {
    fn default() -> Self {
        Self {
            skip_category_dirs: true,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// `[filters]` section. By default every regular file is organized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Skip files whose name starts with `.`.
    pub skip_hidden: bool,
    /// Exact file names to leave alone.
    pub exclude_names: Vec<String>,
    /// Glob patterns matched against the file name and the full path.
    pub exclude_patterns: Vec<String>,
    /// Regexes matched against the file name.
    pub exclude_regex: Vec<String>,
}

impl SorterConfig {
    /// Loads configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given (must exist)
    /// 2. `.file-sorter.toml` in the current directory
    /// 3. `~/.config/file-sorter/config.toml`
    /// 4. built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("file-sorter")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Loads configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration text. The result has no [`source`](Self::source).
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Path of the file this configuration was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Builds the extension mapper: the built-in table plus `[extensions]`.
    pub fn mapper(&self) -> FileMapper {
        let mut mapper = FileMapper::default();
        for (ext, category) in &self.extensions {
            mapper.add_extension_mapping(ext, *category);
        }
        mapper
    }

    /// Validates and compiles the `[filters]` section.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Pre-parsed filter rules.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    skip_hidden: bool,
    exclude_names: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude_patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .exclude_regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden: rules.skip_hidden,
            exclude_names: rules.exclude_names.iter().cloned().collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Whether the file at `file_path` should be organized.
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.skip_hidden && file_name.starts_with('.') {
            return false;
        }
        if self.exclude_names.contains(&*file_name) {
            return false;
        }
        if self
            .exclude_patterns
            .iter()
            .any(|p| p.matches(&file_name) || p.matches_path(file_path))
        {
            return false;
        }
        !self.exclude_regexes.iter().any(|r| r.is_match(&file_name))
    }
}
