//! Writes a catalog table and its descriptor side by side.

use std::fs;
use std::path::{Path, PathBuf};

use catalog_common::CatalogResult;
use serde_json::{Map, Value};
use tracing::info;

use crate::aggregation::AggregationPlan;
use crate::descriptor::{Assets, Attribute, EsmCatalog};
use crate::table::CatalogTable;

/// How the descriptor declares asset formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetFormat {
    /// Every asset has this format (e.g. `netcdf`)
    Fixed(String),
    /// Per-row format read from a column
    Column(String),
}

impl Default for AssetFormat {
    fn default() -> Self {
        AssetFormat::Fixed("netcdf".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Output directory, created if missing
    pub directory: PathBuf,
    /// Base name of the `.csv[.gz]` and `.json` files
    pub name: String,
    /// Exact table file name inside `directory`, overriding `<name>.csv[.gz]`
    pub table_file: Option<String>,
    pub compression: bool,
    pub id: Option<String>,
    pub description: Option<String>,
    pub format: AssetFormat,
    /// Descriptor attributes; defaults to every table column without vocabulary
    pub attributes: Option<Vec<Attribute>>,
    /// Extra top-level descriptor keys
    pub metadata: Map<String, Value>,
}

impl SaveOptions {
    pub fn new(directory: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            name: name.into(),
            table_file: None,
            compression: false,
            id: None,
            description: None,
            format: AssetFormat::default(),
            attributes: None,
            metadata: Map::new(),
        }
    }

    /// Options that write the table to exactly `table_path`.
    ///
    /// The descriptor goes next to it as `<stem>.json`. A `.gz` suffix turns
    /// on compression; turning compression on later keeps the file name.
    pub fn for_table_path(table_path: &Path) -> Self {
        let directory = match table_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = table_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let compression = file_name.ends_with(".gz");
        let name = file_name
            .trim_end_matches(".gz")
            .trim_end_matches(".csv")
            .to_string();

        Self {
            compression,
            table_file: Some(file_name),
            ..Self::new(directory, name)
        }
    }

    pub fn table_file_name(&self) -> String {
        if let Some(table_file) = &self.table_file {
            return table_file.clone();
        }
        if self.compression {
            format!("{}.csv.gz", self.name)
        } else {
            format!("{}.csv", self.name)
        }
    }

    pub fn descriptor_file_name(&self) -> String {
        format!("{}.json", self.name)
    }
}

/// Paths of a written catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCatalog {
    pub table_path: PathBuf,
    pub descriptor_path: PathBuf,
    pub rows: usize,
}

pub struct CatalogWriter {
    options: SaveOptions,
}

impl CatalogWriter {
    pub fn new(options: SaveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SaveOptions {
        &self.options
    }

    /// Build the descriptor for `table` without writing anything.
    pub fn descriptor(&self, table: &CatalogTable, plan: &AggregationPlan) -> EsmCatalog {
        let opts = &self.options;
        let assets = match &opts.format {
            AssetFormat::Fixed(format) => Assets {
                column_name: "path".to_string(),
                format: Some(format.clone()),
                format_column_name: None,
            },
            AssetFormat::Column(column) => Assets {
                column_name: "path".to_string(),
                format: None,
                format_column_name: Some(column.clone()),
            },
        };

        let mut catalog = EsmCatalog::new(opts.table_file_name(), assets, plan);
        catalog.id = Some(opts.id.clone().unwrap_or_else(|| opts.name.clone()));
        catalog.description = opts.description.clone();
        catalog.attributes = opts
            .attributes
            .clone()
            .unwrap_or_else(|| Attribute::for_columns(table.columns()));
        catalog.merge_extra(opts.metadata.clone());
        catalog
    }

    /// Write `<name>.csv[.gz]` and `<name>.json` into the output directory.
    ///
    /// Plan columns missing from the table are added as null columns first.
    pub fn save(&self, table: &mut CatalogTable, plan: &AggregationPlan) -> CatalogResult<SavedCatalog> {
        let opts = &self.options;
        fs::create_dir_all(&opts.directory)?;

        for column in plan.referenced_columns() {
            table.ensure_column(column);
        }
        if let AssetFormat::Column(column) = &opts.format {
            table.ensure_column(column);
        }

        let table_path = opts.directory.join(opts.table_file_name());
        table.write_path(&table_path, opts.compression)?;

        let descriptor_path = opts.directory.join(opts.descriptor_file_name());
        self.descriptor(table, plan).write(&descriptor_path)?;

        info!(
            table = %table_path.display(),
            descriptor = %descriptor_path.display(),
            rows = table.len(),
            "Catalog written"
        );

        Ok(SavedCatalog {
            table_path,
            descriptor_path,
            rows: table.len(),
        })
    }
}
