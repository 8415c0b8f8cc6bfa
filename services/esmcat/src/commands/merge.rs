//! `esmcat merge-cmip-catalogs`: merge local and published CMIP catalogs.

use anyhow::{Context, Result};
use esm_catalog::{load_metadata, CatalogMerger, MergeOptions, MergeReport};
use serde_json::Map;
use tracing::info;

use crate::cli::MergeArgs;

impl MergeArgs {
    pub fn merge_options(&self) -> Result<MergeOptions> {
        let metadata = match &self.metadata_file {
            Some(path) => load_metadata(path)
                .with_context(|| format!("Failed to read metadata file {}", path.display()))?,
            None => Map::new(),
        };
        Ok(MergeOptions {
            catalogs: self.catalogs.clone(),
            remote_catalogs: self.url_remote_tables.clone(),
            name: self.name.clone(),
            outdir: self.outdir.clone(),
            compression: self.compression,
            table_id: self.table_id.clone(),
            metadata,
        })
    }
}

pub async fn run(args: &MergeArgs) -> Result<MergeReport> {
    let options = args.merge_options()?;
    info!(
        catalogs = options.catalogs.len(),
        remote = options.remote_catalogs.len(),
        "Merging CMIP catalogs"
    );

    let report = CatalogMerger::new(options)
        .merge()
        .await
        .context("Failed to merge catalogs")?;
    info!(
        rows = report.saved.rows,
        table = %report.saved.table_path.display(),
        "Merge finished"
    );
    Ok(report)
}
