//! Merging CMIP catalogs.
//!
//! Local tables are concatenated and version-normalized, optionally extended
//! with rows from published remote catalogs that the local archive does not
//! already hold, then reconciled into one CMIP6 catalog:
//!
//! 1. `format` is `netcdf`, or `zarr` for rows whose location is in `zstore`
//! 2. null `time_range` becomes `*`
//! 3. duplicates on (path, version) are dropped, first occurrence wins

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use catalog_common::{CatalogError, CatalogResult};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::aggregation::AggregationPlan;
use crate::descriptor::Attribute;
use crate::remote::{http_client, load_remote_tables};
use crate::table::CatalogTable;
use crate::writer::{AssetFormat, CatalogWriter, SaveOptions, SavedCatalog};

/// Wildcard written for rows without a time range.
pub const TIME_RANGE_WILDCARD: &str = "*";

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Local table files (`.csv` or `.csv.gz`)
    pub catalogs: Vec<PathBuf>,
    /// Published catalog descriptors (URL or local JSON path)
    pub remote_catalogs: Vec<String>,
    pub name: String,
    pub outdir: PathBuf,
    pub compression: bool,
    pub table_id: Option<String>,
    /// Extra descriptor keys
    pub metadata: Map<String, Value>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            catalogs: Vec::new(),
            remote_catalogs: Vec::new(),
            name: "merge_cmip".to_string(),
            outdir: PathBuf::from("./"),
            compression: false,
            table_id: None,
            metadata: Map::new(),
        }
    }
}

/// Row counts from each merge stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub local_rows: usize,
    pub remote_rows_added: usize,
    pub remote_rows_skipped: usize,
    pub zarr_rows: usize,
    pub rows_without_location: usize,
    pub duplicates_removed: usize,
}

#[derive(Debug, Clone)]
pub struct MergeReport {
    pub stats: MergeStats,
    pub saved: SavedCatalog,
}

/// Read a YAML mapping of extra descriptor keys.
pub fn load_metadata(path: &Path) -> CatalogResult<Map<String, Value>> {
    let text = fs::read_to_string(path)?;
    match serde_yaml::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(CatalogError::config(format!(
            "metadata file {} must contain a mapping",
            path.display()
        ))),
    }
}

/// Read and concatenate local tables, normalizing `version`.
pub fn load_local_tables(paths: &[PathBuf]) -> CatalogResult<CatalogTable> {
    if paths.is_empty() {
        return Err(CatalogError::config("no catalogs to merge"));
    }
    let tables = paths
        .iter()
        .map(|path| {
            let table = CatalogTable::read_path(path)?;
            info!(path = %path.display(), rows = table.len(), "Loaded catalog");
            Ok(table)
        })
        .collect::<CatalogResult<Vec<_>>>()?;

    let mut table = CatalogTable::concat(tables);
    table.normalize_versions()?;
    Ok(table)
}

/// Append remote rows whose values on the shared columns do not match any
/// local row. Returns (added, skipped).
pub fn append_remote(local: &mut CatalogTable, mut remote: CatalogTable) -> CatalogResult<(usize, usize)> {
    remote.normalize_versions()?;

    let shared: Vec<String> = local
        .columns()
        .iter()
        .filter(|c| remote.has_column(c))
        .cloned()
        .collect();
    let local_idx: Vec<usize> = shared.iter().filter_map(|c| local.column_index(c)).collect();
    let remote_idx: Vec<usize> = shared.iter().filter_map(|c| remote.column_index(c)).collect();

    let skipped = if shared.is_empty() {
        0
    } else {
        let local_keys: HashSet<Vec<Option<&str>>> = local
            .rows()
            .map(|row| CatalogTable::key(row, &local_idx))
            .collect();
        remote.retain(|row| !local_keys.contains(&CatalogTable::key(row, &remote_idx)))
    };

    let added = remote.len();
    local.append(remote);
    Ok((added, skipped))
}

/// Derive `format`, backfill `path` from `zstore` and wildcard missing time
/// ranges. Returns (zarr rows, rows dropped for having no location).
pub fn reconcile_locations(table: &mut CatalogTable) -> CatalogResult<(usize, usize)> {
    let path_idx = table.ensure_column("path");
    table.fill_column("format", "netcdf");
    let format_idx = table.ensure_column("format");

    let mut zarr = 0;
    if let Some(zstore_idx) = table.column_index("zstore") {
        for row in table.rows_mut() {
            if row[path_idx].is_none() && row[zstore_idx].is_some() {
                row[path_idx] = row[zstore_idx].take();
                row[format_idx] = Some("zarr".to_string());
                zarr += 1;
            }
        }
        table.drop_column("zstore");
    }

    let path_idx = table.ensure_column("path");
    let dropped = table.retain(|row| row[path_idx].is_some());
    if dropped > 0 {
        warn!(rows = dropped, "Dropped rows with neither path nor zstore");
    }

    table.ensure_column("time_range");
    table.fill_nulls("time_range", TIME_RANGE_WILDCARD)?;

    Ok((zarr, dropped))
}

/// Combines CMIP catalogs into one.
pub struct CatalogMerger {
    options: MergeOptions,
}

impl CatalogMerger {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    /// Build the merged table without writing it.
    pub async fn merged_table(&self) -> CatalogResult<(CatalogTable, MergeStats)> {
        let opts = &self.options;
        let mut stats = MergeStats::default();

        let mut table = load_local_tables(&opts.catalogs)?;
        stats.local_rows = table.len();

        if !opts.remote_catalogs.is_empty() {
            let client = http_client()?;
            let remote = load_remote_tables(&client, &opts.remote_catalogs).await?;
            let (added, skipped) = append_remote(&mut table, remote)?;
            info!(added, skipped, "Joined remote catalogs");
            stats.remote_rows_added = added;
            stats.remote_rows_skipped = skipped;
        }

        let (zarr, dropped) = reconcile_locations(&mut table)?;
        stats.zarr_rows = zarr;
        stats.rows_without_location = dropped;

        table.ensure_column("version");
        stats.duplicates_removed = table.drop_duplicates(&["path", "version"])?;

        Ok((table, stats))
    }

    fn save_options(&self) -> SaveOptions {
        let opts = &self.options;
        SaveOptions {
            compression: opts.compression,
            id: opts.table_id.clone(),
            format: AssetFormat::Column("format".to_string()),
            attributes: Some(Attribute::cmip6_vocabularies()),
            metadata: opts.metadata.clone(),
            ..SaveOptions::new(&opts.outdir, &opts.name)
        }
    }

    pub async fn merge(&self) -> CatalogResult<MergeReport> {
        let (mut table, stats) = self.merged_table().await?;
        info!(
            rows = table.len(),
            duplicates = stats.duplicates_removed,
            zarr = stats.zarr_rows,
            "Merged catalogs"
        );

        let saved = CatalogWriter::new(self.save_options()).save(&mut table, &AggregationPlan::cmip6())?;
        Ok(MergeReport { stats, saved })
    }
}
