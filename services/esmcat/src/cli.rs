//! Command-line definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use esm_catalog::CesmGrouping;

#[derive(Parser, Debug)]
#[command(name = "esmcat")]
#[command(about = "Management of intake-esm catalogs for climate model output")]
#[command(version)]
pub struct Cli {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a catalog of CMIP data assets
    Cmip(CmipArgs),
    /// Build a catalog of CESM PPE data assets
    CesmPpe(CesmPpeArgs),
    /// Build a catalog of Aerocom data assets
    Aerocom(AerocomArgs),
    /// Merge a list of CMIP catalogs
    MergeCmipCatalogs(MergeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CmipArgs {
    /// Root paths of the CMIP project output
    #[arg(short = 'r', long, num_args = 1..)]
    pub root_paths: Vec<String>,

    /// Name to use when saving the built catalog
    #[arg(short = 'f', long = "file-name")]
    pub file_name: Option<String>,

    /// Directory levels walked before listing files recursively
    #[arg(long, default_value_t = 4)]
    pub depth: usize,

    /// Only catalog the latest version of each dataset
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub pick_latest_version: bool,

    /// CMIP phase (5 or 6)
    #[arg(long, default_value_t = 6)]
    pub cmip_version: u8,

    /// Glob patterns to exclude from the build
    #[arg(long, num_args = 1..)]
    pub exclude_patterns: Option<Vec<String>>,

    /// Glob patterns a file must match to be cataloged
    #[arg(long, num_args = 1..)]
    pub include_patterns: Option<Vec<String>>,

    /// YAML file overriding build arguments
    #[arg(long)]
    pub config_filepath: Option<PathBuf>,

    /// Worker threads
    #[arg(long, default_value_t = 1)]
    pub nthreads: usize,

    /// Gzip the catalog table
    #[arg(long)]
    pub compression: bool,

    /// Where to store the catalog
    #[arg(long = "dir", visible_alias = "directory", default_value = "./")]
    pub directory: String,

    /// Description of the collection
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    /// experiment × frequency
    #[default]
    ExperimentFrequency,
    /// experiment × frequency × model × coordinate
    AerocomStyle,
}

impl From<Grouping> for CesmGrouping {
    fn from(grouping: Grouping) -> Self {
        match grouping {
            Grouping::ExperimentFrequency => CesmGrouping::ExperimentFrequency,
            Grouping::AerocomStyle => CesmGrouping::AerocomStyle,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CesmPpeArgs {
    /// Root paths of the CESM PPE output
    #[arg(short = 'r', long, num_args = 1..)]
    pub root_paths: Vec<String>,

    #[arg(long, default_value_t = 4)]
    pub depth: usize,

    /// Where to save the catalog table, e.g. ./cesm_ppe.csv.gz
    #[arg(long)]
    pub csv_filepath: Option<String>,

    #[arg(long, num_args = 1..)]
    pub exclude_patterns: Option<Vec<String>>,

    #[arg(long)]
    pub config_filepath: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    pub nthreads: usize,

    #[arg(long)]
    pub compression: bool,

    /// Groupby columns of the aggregation plan
    #[arg(long, value_enum, default_value_t = Grouping::ExperimentFrequency)]
    pub grouping: Grouping,
}

#[derive(Args, Debug, Clone)]
pub struct AerocomArgs {
    /// Root paths of the Aerocom data
    #[arg(required = true)]
    pub root_paths: Vec<String>,

    #[arg(short, long, default_value_t = 2)]
    pub depth: usize,

    #[arg(long, default_value_t = 2)]
    pub nthreads: usize,

    #[arg(short, long)]
    pub compression: bool,

    #[arg(long = "dir", visible_alias = "directory", default_value = "./")]
    pub directory: String,

    #[arg(long, default_value = "aerocom")]
    pub catalog_name: String,

    #[arg(long, num_args = 1..)]
    pub exclude_patterns: Option<Vec<String>>,

    #[arg(long)]
    pub config_filepath: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Catalog tables to merge
    #[arg(short, long, num_args = 1.., required = true)]
    pub catalogs: Vec<PathBuf>,

    /// Name of the merged catalog
    #[arg(long, default_value = "merge_cmip")]
    pub name: String,

    #[arg(long, default_value = "./")]
    pub outdir: PathBuf,

    #[arg(long)]
    pub compression: bool,

    /// Published catalogs to join with the local tables, e.g.
    /// https://storage.googleapis.com/cmip6/pangeo-cmip6.json
    #[arg(long, num_args = 1..)]
    pub url_remote_tables: Vec<String>,

    /// Identifier of the merged catalog
    #[arg(long)]
    pub table_id: Option<String>,

    /// YAML file with extra descriptor metadata
    #[arg(long)]
    pub metadata_file: Option<PathBuf>,
}
