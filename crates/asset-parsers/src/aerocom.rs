//! Aerocom model output.
//!
//! Paths follow `.../<experiment>/<model>_<run>/<file>` with AeroCom-3 file
//! names `aerocom3_<model-run>_<variable>_<coordinate>_<period>_<frequency>.nc`.
//! The model-run token may itself contain underscores, so fields are taken
//! from the end of the file name.

use std::path::Path;

use catalog_common::{AssetRecord, ParseOutcome};

use crate::path::segments;
use crate::{AssetParser, DatasetFamily};

const COLUMNS: &[&str] = &[
    "experiment",
    "model",
    "variable",
    "coordinate",
    "frequency",
    "time",
    "path",
];

/// Experiment directory name to experiment id; unknown names pass through.
pub fn experiment_name(directory: &str) -> &str {
    match directory {
        "glb" => "histSST-dust-glb",
        "glb-piaer" => "histSST-dust-glb-piaer",
        "histSST" => "histSST",
        "spt" => "histSST-dust-spt",
        other => other,
    }
}

/// Parser for Aerocom files. Path-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct AerocomParser;

impl AerocomParser {
    fn parse_path(&self, path: &Path) -> Result<AssetRecord, String> {
        let parts = segments(path).ok_or("path is not valid UTF-8")?;
        let [.., experiment, run, filename] = parts.as_slice() else {
            return Err(format!("expected at least 3 path segments, found {}", parts.len()));
        };

        let tokens: Vec<&str> = filename.split('_').collect();
        let [.., variable, coordinate, time, last] = tokens.as_slice() else {
            return Err(format!(
                "file name '{}' has {} tokens, expected at least 4",
                filename,
                tokens.len()
            ));
        };
        let frequency = last.split('.').next().unwrap_or(*last);
        let model = run.split('_').next().unwrap_or(*run);

        let mut record = AssetRecord::with_path(path);
        record.insert("experiment", experiment_name(experiment));
        record.insert("model", model);
        record.insert("variable", *variable);
        record.insert("coordinate", *coordinate);
        record.insert("frequency", frequency);
        record.insert("time", *time);
        Ok(record)
    }
}

impl AssetParser for AerocomParser {
    fn family(&self) -> DatasetFamily {
        DatasetFamily::Aerocom
    }

    fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn parse(&self, path: &Path) -> ParseOutcome {
        match self.parse_path(path) {
            Ok(record) => ParseOutcome::Parsed(record),
            Err(reason) => ParseOutcome::invalid(path, reason),
        }
    }
}
