//! Command-line tools for building and merging ESM collection catalogs.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Command};
