//! Asset discovery.
//!
//! Each root is walked down to `depth` directory levels. Directories at the
//! depth limit become work units whose files are listed recursively; files
//! met above the limit are taken directly. Exclusion patterns prune whole
//! directories as well as single files.
//!
//! Patterns use shell (fnmatch) semantics against the full path: `*` matches
//! any run of characters including `/`.

use std::path::{Path, PathBuf};

use catalog_common::{CatalogError, CatalogResult};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Assets are NetCDF files unless told otherwise.
pub const DEFAULT_INCLUDE_PATTERN: &str = "*.nc";

/// A compiled list of glob patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl PatternSet {
    pub fn new(patterns: &[String]) -> CatalogResult<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| CatalogError::Glob {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| CatalogError::Glob {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;
        Ok(Self {
            patterns: patterns.to_vec(),
            set,
        })
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.set.is_match(path)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Where to look and what to keep.
#[derive(Debug, Clone)]
pub(crate) struct Discovery {
    pub depth: usize,
    pub exclude: PatternSet,
    pub include: PatternSet,
}

/// A unit of listing work found during the shallow walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WorkUnit {
    Directory(PathBuf),
    File(PathBuf),
}

impl Discovery {
    fn wanted(&self, path: &Path) -> bool {
        self.include.is_match(path) && !self.exclude.is_match(path)
    }

    /// Walk `root` to the depth limit.
    pub fn work_units(&self, root: &Path) -> Vec<WorkUnit> {
        let walker = WalkDir::new(root)
            .follow_links(true)
            .max_depth(self.depth)
            .into_iter()
            .filter_entry(|entry| !self.exclude.is_match(entry.path()));

        let mut units = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                if entry.depth() == self.depth {
                    units.push(WorkUnit::Directory(entry.into_path()));
                }
            } else if self.wanted(entry.path()) {
                units.push(WorkUnit::File(entry.into_path()));
            }
        }
        units
    }

    /// Files of one work unit.
    pub fn list(&self, unit: &WorkUnit) -> Vec<PathBuf> {
        let dir = match unit {
            WorkUnit::File(path) => return vec![path.clone()],
            WorkUnit::Directory(dir) => dir,
        };

        let files: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(true)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !self.exclude.is_match(entry.path()))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| !entry.file_type().is_dir() && self.wanted(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        debug!(dir = %dir.display(), files = files.len(), "Listed work unit");
        files
    }
}
