//! `esmcat cesm-ppe`: catalog CESM perturbed-parameter ensemble output.

use std::path::Path;

use anyhow::{Context, Result};
use asset_parsers::CesmPpeParser;
use catalog_builder::Builder;
use catalog_common::CatalogError;
use esm_catalog::{AggregationPlan, CatalogWriter, SaveOptions, SavedCatalog};
use tracing::info;

use crate::cli::CesmPpeArgs;
use crate::config::Settings;

/// Exclusions applied when none are given.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*/parameter_262_w_control.nc"];

impl CesmPpeArgs {
    pub fn settings(&self) -> Settings {
        Settings {
            root_paths: self.root_paths.clone(),
            depth: self.depth,
            exclude_patterns: self.exclude_patterns.clone().unwrap_or_else(|| {
                DEFAULT_EXCLUDE_PATTERNS.iter().map(|s| s.to_string()).collect()
            }),
            threads: self.nthreads,
            csv_filepath: self.csv_filepath.clone(),
            ..Settings::default()
        }
    }
}

pub fn run(args: &CesmPpeArgs) -> Result<SavedCatalog> {
    let settings = args.settings().resolve(args.config_filepath.as_deref())?;
    let csv_filepath = settings.csv_filepath.clone().ok_or_else(|| {
        CatalogError::config("Please provide csv-filepath. e.g.: './cesm_ppe.csv.gz'")
    })?;

    info!(
        roots = ?settings.root_paths,
        depth = settings.depth,
        threads = settings.threads,
        "Building CESM PPE catalog"
    );

    let builder = Builder::new(settings.builder_options())?;
    let mut report = builder.build(&CesmPpeParser)?;
    super::log_build(&report);

    let mut options = SaveOptions::for_table_path(Path::new(&csv_filepath));
    options.compression |= args.compression;

    CatalogWriter::new(options)
        .save(&mut report.table, &AggregationPlan::cesm_ppe(args.grouping.into()))
        .context("Failed to write CESM PPE catalog")
}
