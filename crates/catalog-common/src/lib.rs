//! Common types shared across the ESM catalog crates.
//!
//! Parsers produce [`ParseOutcome`] values, the builder collects the
//! [`AssetRecord`]s into a catalog table, and every fallible library
//! operation reports a [`CatalogError`].

pub mod error;
pub mod record;

pub use error::{CatalogError, CatalogResult};
pub use record::{AssetRecord, FieldValue, InvalidAsset, ParseOutcome};
