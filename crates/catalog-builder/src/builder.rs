//! The catalog builder.

use std::path::PathBuf;
use std::time::Instant;

use asset_parsers::AssetParser;
use catalog_common::{CatalogError, CatalogResult, InvalidAsset, ParseOutcome};
use esm_catalog::CatalogTable;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::clean::{clean, pick_latest_version};
use crate::discovery::{Discovery, PatternSet, DEFAULT_INCLUDE_PATTERN};

/// Options for one build.
#[derive(Debug, Clone)]
pub struct BuilderOptions {
    /// Root directories (or single files) to scan
    pub paths: Vec<PathBuf>,
    /// Directory levels walked before listing recursively
    pub depth: usize,
    pub exclude_patterns: Vec<String>,
    pub include_patterns: Vec<String>,
    /// Worker pool size
    pub threads: usize,
    /// Keep only the newest version of each dataset
    pub pick_latest_version: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            depth: 0,
            exclude_patterns: Vec::new(),
            include_patterns: vec![DEFAULT_INCLUDE_PATTERN.to_string()],
            threads: 1,
            pick_latest_version: false,
        }
    }
}

/// Result of a build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub table: CatalogTable,
    pub invalid_assets: Vec<InvalidAsset>,
    pub files_discovered: usize,
    /// Rows dropped by latest-version selection
    pub superseded: usize,
}

/// Scans roots and turns every discovered file into a catalog row.
pub struct Builder {
    options: BuilderOptions,
    discovery: Discovery,
}

impl Builder {
    /// Validate options. Fails before touching any data when a root is
    /// missing, the pool would be empty, or a pattern does not compile.
    pub fn new(options: BuilderOptions) -> CatalogResult<Self> {
        if options.paths.is_empty() {
            return Err(CatalogError::config("at least one root path is required"));
        }
        if let Some(missing) = options.paths.iter().find(|p| !p.exists()) {
            return Err(CatalogError::config(format!(
                "root path does not exist: {}",
                missing.display()
            )));
        }
        if options.threads == 0 {
            return Err(CatalogError::config("thread count must be at least 1"));
        }

        let discovery = Discovery {
            depth: options.depth,
            exclude: PatternSet::new(&options.exclude_patterns)?,
            include: PatternSet::new(&options.include_patterns)?,
        };

        Ok(Self { options, discovery })
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    fn pool(&self) -> CatalogResult<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.threads)
            .thread_name(|i| format!("catalog-worker-{}", i))
            .build()
            .map_err(|e| CatalogError::ThreadPool(e.to_string()))
    }

    fn discover_in(&self, pool: &rayon::ThreadPool) -> Vec<PathBuf> {
        let units: Vec<_> = self
            .options
            .paths
            .iter()
            .flat_map(|root| self.discovery.work_units(root))
            .collect();
        debug!(work_units = units.len(), "Walked roots");

        let mut files: Vec<PathBuf> = pool.install(|| {
            units
                .par_iter()
                .flat_map_iter(|unit| self.discovery.list(unit))
                .collect()
        });
        files.sort();
        files.dedup();
        files
    }

    /// List every asset that would be parsed, sorted.
    pub fn discover(&self) -> CatalogResult<Vec<PathBuf>> {
        Ok(self.discover_in(&self.pool()?))
    }

    /// Discover, parse and clean.
    pub fn build(&self, parser: &dyn AssetParser) -> CatalogResult<BuildReport> {
        let started = Instant::now();
        let pool = self.pool()?;

        let files = self.discover_in(&pool);
        info!(
            family = %parser.family(),
            roots = self.options.paths.len(),
            files = files.len(),
            "Discovered assets"
        );

        let outcomes: Vec<ParseOutcome> =
            pool.install(|| files.par_iter().map(|path| parser.parse(path)).collect());
        let parsed = outcomes.iter().filter(|o| o.is_parsed()).count();
        info!(parsed, failed = outcomes.len() - parsed, "Parsed assets");

        let (mut records, invalid_assets) = clean(outcomes);
        let mut superseded = 0;
        if self.options.pick_latest_version {
            let (latest, dropped) = pick_latest_version(records);
            records = latest;
            superseded = dropped;
        }
        info!(
            rows = records.len(),
            invalid = invalid_assets.len(),
            superseded,
            "Cleaned catalog"
        );

        let mut table = CatalogTable::from_records(parser.columns(), &records);
        table.sort_by_column("path")?;

        info!(elapsed_ms = started.elapsed().as_millis() as u64, "Build complete");
        Ok(BuildReport {
            table,
            invalid_assets,
            files_discovered: files.len(),
            superseded,
        })
    }
}
