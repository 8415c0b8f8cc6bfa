//! ESM collection catalogs.
//!
//! A catalog is a CSV table with one row per asset plus a JSON descriptor
//! (the intake-esm "esmcat" format) that names the table, the role of its
//! columns, and how rows aggregate into datasets. This crate provides:
//!
//! - [`CatalogTable`]: in-memory table with CSV / gzip CSV I/O
//! - [`AggregationPlan`]: per-family aggregation rules
//! - [`EsmCatalog`]: the descriptor document
//! - [`CatalogWriter`]: writes table and descriptor side by side
//! - [`CatalogMerger`]: combines local and remote CMIP catalogs

pub mod aggregation;
pub mod descriptor;
pub mod merge;
pub mod remote;
pub mod table;
pub mod writer;

pub use aggregation::{Aggregation, AggregationKind, AggregationPlan, CesmGrouping};
pub use descriptor::{AggregationControl, Assets, Attribute, EsmCatalog, ESMCAT_VERSION};
pub use merge::{load_metadata, CatalogMerger, MergeOptions, MergeReport, MergeStats};
pub use remote::{http_client, load_remote_table, load_remote_tables};
pub use table::{normalize_version, CatalogTable};
pub use writer::{AssetFormat, CatalogWriter, SaveOptions, SavedCatalog};
