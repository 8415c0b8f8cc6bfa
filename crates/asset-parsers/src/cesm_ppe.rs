//! CESM perturbed-parameter ensemble (PPE) history files.
//!
//! File names look like `cc_PPE_250_ensemble_PD.131.h0.IWC.nc`: the last
//! underscore token holds `<experiment>.<ensemble>.<stream>.<variable>`.
//! Everything else comes from the file itself.

use std::path::Path;

use catalog_common::{AssetRecord, ParseOutcome};
use netcdf_parser::NetCdfDataset;
use tracing::debug;

use crate::{AssetParser, DatasetFamily};

const COLUMNS: &[&str] = &[
    "experiment",
    "ensemble",
    "frequency",
    "variable",
    "units",
    "long_name",
    "vertical_levels",
    "start_time",
    "end_time",
    "time_range",
    "path",
];

/// Experiment code to experiment name; unknown codes pass through.
pub fn experiment_name(code: &str) -> &str {
    match code {
        "PD" => "present-day",
        "PI" => "pre-industrial",
        other => other,
    }
}

/// History stream to output frequency; unknown streams pass through.
pub fn stream_frequency(stream: &str) -> &str {
    match stream {
        "h0" => "monthly",
        "h1" => "daily",
        other => other,
    }
}

/// Attributes encoded in a PPE file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpeFilename {
    pub experiment: String,
    pub ensemble: i64,
    pub frequency: String,
    pub variable: String,
}

impl PpeFilename {
    pub fn parse(path: &Path) -> Result<Self, String> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or("missing file name")?;

        let last = stem.rsplit('_').next().unwrap_or(stem);
        let parts: Vec<&str> = last.split('.').collect();
        let [experiment, ensemble, stream, variable, ..] = parts.as_slice() else {
            return Err(format!(
                "expected <experiment>.<ensemble>.<stream>.<variable> in '{}'",
                last
            ));
        };

        let ensemble = ensemble
            .parse()
            .map_err(|_| format!("ensemble '{}' is not an integer", ensemble))?;

        Ok(Self {
            experiment: experiment_name(experiment).to_string(),
            ensemble,
            frequency: stream_frequency(stream).to_string(),
            variable: variable.to_string(),
        })
    }
}

/// Parser for CESM-PPE history files. Opens every file it parses.
#[derive(Debug, Clone, Copy, Default)]
pub struct CesmPpeParser;

impl CesmPpeParser {
    fn parse_file(&self, path: &Path) -> Result<AssetRecord, String> {
        let name = PpeFilename::parse(path)?;

        let ds = NetCdfDataset::open(path).map_err(|e| e.to_string())?;
        let variable = name.variable.as_str();

        let units = ds.variable_attribute(variable, "units").map_err(|e| e.to_string())?;
        let long_name = ds
            .variable_attribute(variable, "long_name")
            .map_err(|e| e.to_string())?;
        let vertical_levels = ds.vertical_levels(variable).unwrap_or_else(|| {
            debug!(path = %path.display(), variable, "No vertical coordinate, assuming one level");
            1
        });
        let (start, end) = ds.time_bounds().map_err(|e| e.to_string())?;
        let (start_time, end_time) = (start.format_date(), end.format_date());

        let mut record = AssetRecord::new();
        record.insert("experiment", name.experiment);
        record.insert("ensemble", name.ensemble);
        record.insert("frequency", name.frequency);
        record.insert("variable", name.variable.clone());
        record.insert_opt("units", units);
        record.insert_opt("long_name", long_name);
        record.insert("vertical_levels", vertical_levels);
        record.insert("time_range", format!("{}-{}", start_time, end_time));
        record.insert("start_time", start_time);
        record.insert("end_time", end_time);
        record.insert("path", path.to_string_lossy().into_owned());
        Ok(record)
    }
}

impl AssetParser for CesmPpeParser {
    fn family(&self) -> DatasetFamily {
        DatasetFamily::CesmPpe
    }

    fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn parse(&self, path: &Path) -> ParseOutcome {
        match self.parse_file(path) {
            Ok(record) => ParseOutcome::Parsed(record),
            Err(reason) => ParseOutcome::invalid(path, reason),
        }
    }
}
