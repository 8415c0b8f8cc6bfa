//! Shared test utilities for the esm-catalogs workspace.
//!
//! - Fixture directory trees laid out like real model archives
//! - Sample asset paths for every supported dataset family
//! - Synthetic NetCDF history files
//!
//! ```ignore
//! use test_utils::{samples, FixtureTree};
//!
//! let tree = FixtureTree::new();
//! tree.touch(samples::CMIP6_TAS);
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;
