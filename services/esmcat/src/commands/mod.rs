//! Subcommand implementations.

pub mod aerocom;
pub mod cesm_ppe;
pub mod cmip;
pub mod merge;

use anyhow::{Context, Result};
use catalog_builder::BuildReport;
use tracing::{info, warn};

use crate::cli::Command;

/// Log the outcome of a build.
pub(crate) fn log_build(report: &BuildReport) {
    if !report.invalid_assets.is_empty() {
        warn!(
            count = report.invalid_assets.len(),
            "Some assets could not be parsed and were left out"
        );
    }
    info!(
        files = report.files_discovered,
        rows = report.table.len(),
        invalid = report.invalid_assets.len(),
        "Build finished"
    );
}

/// Run a subcommand to completion.
///
/// Builds are CPU bound and run on the blocking pool; the merge runs on the
/// async runtime because it may fetch remote catalogs.
pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Cmip(args) => {
            tokio::task::spawn_blocking(move || cmip::run(&args))
                .await
                .context("cmip build task failed")??;
        }
        Command::CesmPpe(args) => {
            tokio::task::spawn_blocking(move || cesm_ppe::run(&args))
                .await
                .context("cesm-ppe build task failed")??;
        }
        Command::Aerocom(args) => {
            tokio::task::spawn_blocking(move || aerocom::run(&args))
                .await
                .context("aerocom build task failed")??;
        }
        Command::MergeCmipCatalogs(args) => {
            merge::run(&args).await?;
        }
    }
    Ok(())
}
