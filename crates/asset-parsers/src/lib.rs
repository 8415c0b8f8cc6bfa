//! Per-family asset parsers for climate model output.
//!
//! Each parser turns one discovered file path into an [`AssetRecord`] (or an
//! invalid-asset outcome) by splitting the path against the family's
//! directory and filename templates. The CESM-PPE parser additionally opens
//! the file to read variable attributes and the time axis.
//!
//! Parsers are stateless and shared across worker threads, so everything
//! goes through the [`AssetParser`] trait object.

pub mod aerocom;
pub mod cesm_ppe;
pub mod cmip;
mod family;
mod path;

use std::path::Path;

use catalog_common::ParseOutcome;

pub use aerocom::AerocomParser;
pub use catalog_common::{AssetRecord, FieldValue, InvalidAsset};
pub use cesm_ppe::CesmPpeParser;
pub use cmip::{Cmip5DirectoryParser, Cmip6DirectoryParser};
pub use family::{DatasetFamily, UnknownFamily};

/// Extracts catalog fields from one asset.
///
/// Implementations never panic and never fail past this boundary: any
/// problem with a path or file becomes [`ParseOutcome::Invalid`].
pub trait AssetParser: Send + Sync {
    /// Dataset family this parser handles.
    fn family(&self) -> DatasetFamily;

    /// Catalog columns in schema order. Records may omit optional columns.
    fn columns(&self) -> &'static [&'static str];

    /// Parse one file.
    fn parse(&self, path: &Path) -> ParseOutcome;
}

/// Default parser for a dataset family.
pub fn parser_for(family: DatasetFamily) -> Box<dyn AssetParser> {
    match family {
        DatasetFamily::Cmip5 => Box::new(Cmip5DirectoryParser),
        DatasetFamily::Cmip6 => Box::new(Cmip6DirectoryParser),
        DatasetFamily::CesmPpe => Box::new(CesmPpeParser),
        DatasetFamily::Aerocom => Box::new(AerocomParser),
    }
}
