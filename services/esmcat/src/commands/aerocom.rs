//! `esmcat aerocom`: catalog Aerocom model output.

use anyhow::{Context, Result};
use asset_parsers::AerocomParser;
use catalog_builder::Builder;
use esm_catalog::{AggregationPlan, CatalogWriter, SaveOptions, SavedCatalog};
use tracing::info;

use crate::cli::AerocomArgs;
use crate::config::Settings;

impl AerocomArgs {
    pub fn settings(&self) -> Settings {
        Settings {
            root_paths: self.root_paths.clone(),
            depth: self.depth,
            exclude_patterns: self.exclude_patterns.clone().unwrap_or_default(),
            threads: self.nthreads,
            filename: Some(self.catalog_name.clone()),
            directory: self.directory.clone(),
            ..Settings::default()
        }
    }
}

pub fn run(args: &AerocomArgs) -> Result<SavedCatalog> {
    let settings = args.settings().resolve(args.config_filepath.as_deref())?;
    let name = settings
        .filename
        .clone()
        .unwrap_or_else(|| args.catalog_name.clone());

    info!(roots = ?settings.root_paths, depth = settings.depth, "Building Aerocom catalog");

    let builder = Builder::new(settings.builder_options())?;
    let mut report = builder.build(&AerocomParser)?;
    super::log_build(&report);

    let options = SaveOptions {
        compression: args.compression,
        ..SaveOptions::new(&settings.directory, name)
    };
    CatalogWriter::new(options)
        .save(&mut report.table, &AggregationPlan::aerocom())
        .context("Failed to write Aerocom catalog")
}
