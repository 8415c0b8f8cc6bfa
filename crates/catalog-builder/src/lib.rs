//! Catalog building: discover assets under root directories, parse them on
//! a bounded worker pool, and clean the results into a catalog table.
//!
//! ```ignore
//! let builder = Builder::new(BuilderOptions {
//!     paths: vec!["/projects/NS9034K/CMIP6".into()],
//!     depth: 4,
//!     ..BuilderOptions::default()
//! })?;
//! let report = builder.build(&Cmip6DirectoryParser)?;
//! ```

mod builder;
pub mod clean;
pub mod discovery;

pub use builder::{BuildReport, Builder, BuilderOptions};
pub use clean::{clean, pick_latest_version};
pub use discovery::{PatternSet, DEFAULT_INCLUDE_PATTERN};
