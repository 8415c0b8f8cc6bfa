//! Build settings and YAML overrides.
//!
//! Every build command starts from [`Settings`] filled in from its CLI
//! arguments. A `--config-filepath` YAML file can override any key; YAML
//! values win over CLI values. Overriding never touches the original
//! settings value, it returns a new one.
//!
//! ```yaml
//! root_path: ~/data/cmip6      # or root_paths: [..]
//! depth: 3
//! exclude_patterns: ["*/latest"]
//! filename: nird_cmip6
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use catalog_builder::BuilderOptions;
use catalog_common::{CatalogError, CatalogResult};
use serde::Deserialize;

/// A string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Keys accepted in a YAML config file. All optional; unknown keys are ignored.
///
/// `root_path` and `root_paths` may both be given; their entries are joined
/// in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigOverrides {
    pub root_path: Option<OneOrMany>,
    pub root_paths: Option<OneOrMany>,
    pub depth: Option<usize>,
    pub csv_filepath: Option<String>,
    pub filename: Option<String>,
    pub exclude_patterns: Option<Vec<String>>,
    pub include_patterns: Option<Vec<String>>,
    pub cmip_version: Option<u8>,
    pub pick_latest_version: Option<bool>,
    pub nthreads: Option<usize>,
    pub directory: Option<String>,
}

impl ConfigOverrides {
    /// Root paths from either key, `None` when neither is set.
    pub fn roots(&self) -> Option<Vec<String>> {
        match (&self.root_path, &self.root_paths) {
            (None, None) => None,
            (one, many) => Some(
                one.iter()
                    .chain(many)
                    .flat_map(|roots| roots.clone().into_vec())
                    .collect(),
            ),
        }
    }

    pub fn from_yaml(text: &str) -> CatalogResult<Self> {
        // An empty file parses as null
        Ok(serde_yaml::from_str::<Option<Self>>(text)?.unwrap_or_default())
    }

    pub fn load(path: &Path) -> CatalogResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            CatalogError::config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&text)
    }
}

/// Expand `~` and environment variables in a path-like value.
pub fn expand(value: &str) -> CatalogResult<String> {
    shellexpand::full(value)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| CatalogError::config(format!("cannot expand '{}': {}", value, e)))
}

/// Resolved settings of a build command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root_paths: Vec<String>,
    pub depth: usize,
    pub exclude_patterns: Vec<String>,
    pub include_patterns: Vec<String>,
    pub threads: usize,
    /// Base name of the written catalog
    pub filename: Option<String>,
    /// Exact table path (CESM-PPE)
    pub csv_filepath: Option<String>,
    pub cmip_version: u8,
    pub pick_latest_version: bool,
    pub directory: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_paths: Vec::new(),
            depth: 0,
            exclude_patterns: Vec::new(),
            include_patterns: vec![catalog_builder::DEFAULT_INCLUDE_PATTERN.to_string()],
            threads: 1,
            filename: None,
            csv_filepath: None,
            cmip_version: 6,
            pick_latest_version: false,
            directory: "./".to_string(),
        }
    }
}

impl Settings {
    /// A copy of these settings with every key present in `overrides`
    /// replaced. Path-like values are shell-expanded.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> CatalogResult<Settings> {
        let o = overrides.clone();
        let merged = Settings {
            root_paths: o.roots().unwrap_or_else(|| self.root_paths.clone()),
            depth: o.depth.unwrap_or(self.depth),
            exclude_patterns: o
                .exclude_patterns
                .unwrap_or_else(|| self.exclude_patterns.clone()),
            include_patterns: o
                .include_patterns
                .unwrap_or_else(|| self.include_patterns.clone()),
            threads: o.nthreads.unwrap_or(self.threads),
            filename: o.filename.or_else(|| self.filename.clone()),
            csv_filepath: o.csv_filepath.or_else(|| self.csv_filepath.clone()),
            cmip_version: o.cmip_version.unwrap_or(self.cmip_version),
            pick_latest_version: o.pick_latest_version.unwrap_or(self.pick_latest_version),
            directory: o.directory.unwrap_or_else(|| self.directory.clone()),
        };
        merged.expanded()
    }

    /// Apply overrides from an optional config file.
    pub fn resolve(&self, config_filepath: Option<&Path>) -> CatalogResult<Settings> {
        match config_filepath {
            Some(path) => self.with_overrides(&ConfigOverrides::load(path)?),
            None => self.expanded(),
        }
    }

    fn expanded(&self) -> CatalogResult<Settings> {
        Ok(Settings {
            root_paths: self
                .root_paths
                .iter()
                .map(|p| expand(p))
                .collect::<CatalogResult<_>>()?,
            csv_filepath: self.csv_filepath.as_deref().map(expand).transpose()?,
            directory: expand(&self.directory)?,
            ..self.clone()
        })
    }

    pub fn builder_options(&self) -> BuilderOptions {
        BuilderOptions {
            paths: self.root_paths.iter().map(PathBuf::from).collect(),
            depth: self.depth,
            exclude_patterns: self.exclude_patterns.clone(),
            include_patterns: self.include_patterns.clone(),
            threads: self.threads,
            pick_latest_version: self.pick_latest_version,
        }
    }
}
