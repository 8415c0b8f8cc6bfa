//! `esmcat cmip`: catalog a CMIP5 or CMIP6 archive.

use anyhow::{Context, Result};
use asset_parsers::{parser_for, DatasetFamily};
use catalog_builder::Builder;
use catalog_common::CatalogError;
use esm_catalog::{AggregationPlan, CatalogWriter, SaveOptions, SavedCatalog};
use tracing::info;

use crate::cli::CmipArgs;
use crate::config::Settings;

/// Exclusions applied when none are given.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "*/files/*",
    "*/latest",
    ".cmorout/*",
    "*/NorCPM1/*",
    "*/NorESM1-F/*",
    "*/NorESM2-LM/*",
    "*/NorESM2-MM/*",
];

impl CmipArgs {
    pub fn settings(&self) -> Settings {
        Settings {
            root_paths: self.root_paths.clone(),
            depth: self.depth,
            exclude_patterns: self.exclude_patterns.clone().unwrap_or_else(|| {
                DEFAULT_EXCLUDE_PATTERNS.iter().map(|s| s.to_string()).collect()
            }),
            include_patterns: self
                .include_patterns
                .clone()
                .unwrap_or_else(|| Settings::default().include_patterns),
            threads: self.nthreads,
            filename: self.file_name.clone(),
            cmip_version: self.cmip_version,
            pick_latest_version: self.pick_latest_version,
            directory: self.directory.clone(),
            ..Settings::default()
        }
    }
}

pub fn run(args: &CmipArgs) -> Result<SavedCatalog> {
    let settings = args.settings().resolve(args.config_filepath.as_deref())?;

    let family = DatasetFamily::from_cmip_version(settings.cmip_version).ok_or_else(|| {
        CatalogError::config(format!(
            "cmip_version = {} is not valid. Valid options include: 5 and 6.",
            settings.cmip_version
        ))
    })?;
    let name = settings
        .filename
        .clone()
        .ok_or_else(|| CatalogError::config("--file-name is required"))?;

    info!(
        family = %family,
        roots = ?settings.root_paths,
        depth = settings.depth,
        threads = settings.threads,
        "Building CMIP catalog"
    );

    let builder = Builder::new(settings.builder_options())?;
    let mut report = builder.build(parser_for(family).as_ref())?;
    super::log_build(&report);

    let options = SaveOptions {
        compression: args.compression,
        description: args.description.clone(),
        ..SaveOptions::new(&settings.directory, name)
    };
    let saved = CatalogWriter::new(options)
        .save(&mut report.table, &AggregationPlan::for_family(family))
        .context("Failed to write CMIP catalog")?;
    Ok(saved)
}
