//! Configuration management for datafinder
//!
//! Supports loading configuration from TOML files with CLI overrides.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::finder::{QueryOptions, RootCandidates};
use crate::positions::{PositionRule, RegexPositions};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub finder: FinderConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

/// Root and folder registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Root candidates; the first existing directory wins
    #[serde(default = "default_root")]
    pub root: Vec<String>,

    /// Folders to search, relative to the root or absolute
    #[serde(default)]
    pub folders: Vec<String>,

    /// Fail instead of skipping when a folder does not exist
    #[serde(default)]
    pub strict: bool,
}

/// Default query settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Glob pattern applied at every depth below each folder
    #[serde(default)]
    pub pattern: Option<String>,

    /// Drop files whose single-pattern rules do not all match
    #[serde(default = "default_true")]
    pub require_match: bool,

    /// Segment extraction rules
    #[serde(default)]
    pub extract: Vec<ExtractConfig>,
}

/// One segment rule. Exactly one of `pattern` and `classify` must be set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Segment index counted from the file name (0) outward
    pub position: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classify: Option<Vec<ClassConfig>>,
}

/// Classifier candidate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassConfig {
    pub label: String,
    pub pattern: String,
}

fn default_root() -> Vec<String> {
    vec![".".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            folders: Vec::new(),
            strict: false,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            pattern: None,
            require_match: true,
            extract: Vec::new(),
        }
    }
}

impl FinderConfig {
    /// Root candidates in configured order.
    pub fn root_candidates(&self) -> RootCandidates {
        RootCandidates::from(self.root.clone())
    }
}

impl ExtractConfig {
    /// Convert into a position rule.
    pub fn to_rule(&self) -> Result<PositionRule> {
        match (&self.pattern, &self.classify) {
            (Some(pattern), None) => Ok(PositionRule::Pattern(pattern.clone())),
            (None, Some(classes)) => Ok(PositionRule::Classifier(
                classes
                    .iter()
                    .map(|c| (c.label.clone(), c.pattern.clone()))
                    .collect(),
            )),
            (Some(_), Some(_)) => bail!(
                "Extraction rule at position {} sets both pattern and classify",
                self.position
            ),
            (None, None) => bail!(
                "Extraction rule at position {} needs either pattern or classify",
                self.position
            ),
        }
    }
}

impl QueryConfig {
    /// Position map built from the configured rules, in file order.
    pub fn positions(&self) -> Result<RegexPositions> {
        let mut positions = RegexPositions::new();
        for rule in &self.extract {
            positions.insert(rule.position, rule.to_rule()?);
        }
        Ok(positions)
    }

    /// Query options from this configuration.
    pub fn options(&self, verbose: bool) -> Result<QueryOptions> {
        Ok(QueryOptions::new()
            .positions(self.positions()?)
            .require_match(self.require_match)
            .verbose(verbose))
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from default locations
    ///
    /// Search order:
    /// 1. DATAFINDER_CONFIG environment variable
    /// 2. ./datafinder.toml (current directory)
    /// 3. ~/.config/datafinder/config.toml (user config)
    pub fn from_default_locations() -> Result<Option<(Self, PathBuf)>> {
        if let Ok(env_path) = std::env::var("DATAFINDER_CONFIG") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                let config = Self::from_file(&path)?;
                return Ok(Some((config, path)));
            }
        }

        let local_path = PathBuf::from("datafinder.toml");
        if local_path.exists() {
            let config = Self::from_file(&local_path)?;
            return Ok(Some((config, local_path)));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir.join("datafinder").join("config.toml");
            if user_path.exists() {
                let config = Self::from_file(&user_path)?;
                return Ok(Some((config, user_path)));
            }
        }

        Ok(None)
    }

    /// Generate a template configuration file
    pub fn generate_template() -> String {
        r#"# datafinder configuration
# Generated template - customize as needed

[finder]
# Root candidates; the first one that is an existing directory is used
root = ["."]

# Folders to search, relative to the root or absolute
folders = [
    # "raw",
    # "/mnt/archive/raw",
]

# Fail on a missing folder instead of skipping it with a warning
strict = false

[query]
# Glob applied at every depth below each folder
# pattern = "*.tif"

# Drop files whose pattern rules do not all match
require_match = true

# Segment rules. Position 0 is the file name, 1 its parent directory, and so
# on; negative positions count from the outermost segment.
#
# [[query.extract]]
# position = 0
# pattern = '(?P<condition>\w{3})(?P<id>\d{3})_(?P<type>\w*)\.tif'
#
# [[query.extract]]
# position = 1
# classify = [
#     { label = "control", pattern = "ctrl" },
#     { label = "treated", pattern = "trt" },
# ]
"#
        .to_string()
    }

    /// Write template config to the specified path
    pub fn write_template(path: &Path) -> Result<()> {
        let template = Self::generate_template();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
        }

        std::fs::write(path, template)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Merge CLI overrides into the configuration
    ///
    /// CLI roots replace the configured candidates, folders are appended,
    /// and a CLI pattern replaces the configured one.
    pub fn with_overrides(
        mut self,
        roots: Vec<String>,
        extra_folders: Vec<String>,
        pattern: Option<String>,
    ) -> Self {
        if !roots.is_empty() {
            self.finder.root = roots;
        }

        self.finder.folders.extend(extra_folders);

        if let Some(pattern) = pattern {
            self.query.pattern = Some(pattern);
        }

        self
    }
}
