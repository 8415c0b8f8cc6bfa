//! CMIP5 and CMIP6 parsers driven by the DRS directory layout.
//!
//! Both archives store one variable per directory, with every classification
//! attribute encoded in the path:
//!
//! ```text
//! CMIP6: <mip_era>/<activity_id>/<institution_id>/<source_id>/<experiment_id>/
//!        <member_id>/<table_id>/<variable_id>/<grid_label>/<version>/<file>
//! CMIP5: <product_id>/<institute>/<model>/<experiment>/<frequency>/
//!        <modeling_realm>/<mip_table>/<ensemble_member>/<version>/<variable>/<file>
//! ```
//!
//! File names only contribute the time range. Versions are kept verbatim
//! (`v20190815`); the builder's cleaning pass normalizes them.

use std::path::Path;

use catalog_common::{AssetRecord, ParseOutcome};

use crate::path::{segments, strip_nc, tail};
use crate::{AssetParser, DatasetFamily};

/// Directory attributes of a CMIP6 path, outermost first.
pub const CMIP6_DIRECTORY_TEMPLATE: [&str; 10] = [
    "mip_era",
    "activity_id",
    "institution_id",
    "source_id",
    "experiment_id",
    "member_id",
    "table_id",
    "variable_id",
    "grid_label",
    "version",
];

/// Directory attributes of a CMIP5 path, outermost first.
pub const CMIP5_DIRECTORY_TEMPLATE: [&str; 10] = [
    "product_id",
    "institute",
    "model",
    "experiment",
    "frequency",
    "modeling_realm",
    "mip_table",
    "ensemble_member",
    "version",
    "variable",
];

const CMIP6_COLUMNS: &[&str] = &[
    "mip_era",
    "activity_id",
    "institution_id",
    "source_id",
    "experiment_id",
    "member_id",
    "dcpp_init_year",
    "table_id",
    "variable_id",
    "grid_label",
    "version",
    "time_range",
    "path",
];

const CMIP5_COLUMNS: &[&str] = &[
    "product_id",
    "institute",
    "model",
    "experiment",
    "frequency",
    "modeling_realm",
    "mip_table",
    "ensemble_member",
    "version",
    "variable",
    "temporal_subset",
    "path",
];

/// Match the ten directory segments above the file against `template`.
///
/// Returns the filled record and the file name tokens.
fn parse_drs<'a>(
    path: &'a Path,
    template: &[&str; 10],
    min_filename_tokens: usize,
) -> Result<(AssetRecord, Vec<&'a str>), String> {
    let parts = segments(path).ok_or("path is not valid UTF-8")?;
    let parts = tail(&parts, template.len() + 1).ok_or_else(|| {
        format!(
            "expected at least {} path segments, found {}",
            template.len() + 1,
            parts.len()
        )
    })?;

    let (directories, filename) = parts.split_at(template.len());
    let tokens: Vec<&str> = strip_nc(filename[0]).split('_').collect();
    if tokens.len() < min_filename_tokens {
        return Err(format!(
            "file name '{}' has {} tokens, expected at least {}",
            filename[0],
            tokens.len(),
            min_filename_tokens
        ));
    }

    let mut record = AssetRecord::with_path(path);
    for (column, value) in template.iter().zip(directories) {
        record.insert(*column, *value);
    }
    Ok((record, tokens))
}

/// Split a decadal-prediction member id (`s1960-r1i1p1f1`) into the
/// initialization year and the plain member id.
pub fn split_sub_experiment(member_id: &str) -> Option<(i64, &str)> {
    let (sub_experiment, member) = member_id.split_once('-')?;
    let year = sub_experiment.strip_prefix('s')?.parse().ok()?;
    Some((year, member))
}

/// Parser for the CMIP6 DRS layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cmip6DirectoryParser;

impl AssetParser for Cmip6DirectoryParser {
    fn family(&self) -> DatasetFamily {
        DatasetFamily::Cmip6
    }

    fn columns(&self) -> &'static [&'static str] {
        CMIP6_COLUMNS
    }

    fn parse(&self, path: &Path) -> ParseOutcome {
        // <variable_id>_<table_id>_<source_id>_<experiment_id>_<member_id>_<grid_label>[_<time_range>]
        let (mut record, tokens) = match parse_drs(path, &CMIP6_DIRECTORY_TEMPLATE, 6) {
            Ok(parsed) => parsed,
            Err(reason) => return ParseOutcome::invalid(path, reason),
        };

        record.insert_opt("time_range", tokens.get(6).copied());

        let member = record.get_str("member_id").map(str::to_string);
        if let Some((year, member_id)) = member.as_deref().and_then(split_sub_experiment) {
            record.insert("dcpp_init_year", year);
            record.insert("member_id", member_id);
        }

        ParseOutcome::Parsed(record)
    }
}

/// Parser for the CMIP5 DRS layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cmip5DirectoryParser;

impl AssetParser for Cmip5DirectoryParser {
    fn family(&self) -> DatasetFamily {
        DatasetFamily::Cmip5
    }

    fn columns(&self) -> &'static [&'static str] {
        CMIP5_COLUMNS
    }

    fn parse(&self, path: &Path) -> ParseOutcome {
        // <variable>_<mip_table>_<model>_<experiment>_<ensemble_member>[_<temporal_subset>]
        match parse_drs(path, &CMIP5_DIRECTORY_TEMPLATE, 5) {
            Ok((mut record, tokens)) => {
                record.insert_opt("temporal_subset", tokens.get(5).copied());
                ParseOutcome::Parsed(record)
            }
            Err(reason) => ParseOutcome::invalid(path, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_common::FieldValue;
    use test_utils::samples;

    fn parse6(relative: &str) -> AssetRecord {
        let path = Path::new("/archive").join(relative);
        Cmip6DirectoryParser.parse(&path).into_result().unwrap()
    }

    #[test]
    fn test_cmip6_all_drs_attributes() {
        let record = parse6(samples::CMIP6_TAS);
        assert_eq!(record.get_str("mip_era"), Some("CMIP6"));
        assert_eq!(record.get_str("activity_id"), Some("CMIP"));
        assert_eq!(record.get_str("institution_id"), Some("NCC"));
        assert_eq!(record.get_str("source_id"), Some("NorESM2-LM"));
        assert_eq!(record.get_str("experiment_id"), Some("historical"));
        assert_eq!(record.get_str("member_id"), Some("r1i1p1f1"));
        assert_eq!(record.get_str("table_id"), Some("Amon"));
        assert_eq!(record.get_str("variable_id"), Some("tas"));
        assert_eq!(record.get_str("grid_label"), Some("gn"));
        assert_eq!(record.get_str("version"), Some("v20190815"));
        assert_eq!(record.get_str("time_range"), Some("185001-185912"));
        assert!(record.path().unwrap().starts_with("/archive/CMIP6/"));
        assert!(!record.contains("dcpp_init_year"));
    }

    #[test]
    fn test_cmip6_fixed_field_has_no_time_range() {
        let record = parse6(samples::CMIP6_AREACELLA);
        assert_eq!(record.get_str("table_id"), Some("fx"));
        assert!(!record.contains("time_range"));
    }

    #[test]
    fn test_cmip6_sub_experiment_member() {
        let record = parse6(samples::CMIP6_DCPP);
        assert_eq!(record.get("dcpp_init_year"), Some(&FieldValue::Integer(1960)));
        assert_eq!(record.get_str("member_id"), Some("r1i1p1f1"));
    }

    #[test]
    fn test_cmip6_short_path_is_invalid() {
        let outcome = Cmip6DirectoryParser.parse(Path::new("/Amon/tas/gn/v1/tas_Amon_a_b_c_gn.nc"));
        let invalid = outcome.into_result().unwrap_err();
        assert!(invalid.reason.contains("path segments"));
    }

    #[test]
    fn test_cmip6_short_filename_is_invalid() {
        let path = Path::new("/CMIP6/CMIP/NCC/NorESM2-LM/historical/r1i1p1f1/Amon/tas/gn/v20190815/tas_Amon.nc");
        assert!(!Cmip6DirectoryParser.parse(path).is_parsed());
    }

    #[test]
    fn test_cmip5_path() {
        let path = Path::new("/projects/cmip5").join(samples::CMIP5_TAS);
        let record = Cmip5DirectoryParser.parse(&path).into_result().unwrap();
        assert_eq!(record.get_str("product_id"), Some("output1"));
        assert_eq!(record.get_str("institute"), Some("NCC"));
        assert_eq!(record.get_str("model"), Some("NorESM1-M"));
        assert_eq!(record.get_str("experiment"), Some("historical"));
        assert_eq!(record.get_str("frequency"), Some("mon"));
        assert_eq!(record.get_str("modeling_realm"), Some("atmos"));
        assert_eq!(record.get_str("mip_table"), Some("Amon"));
        assert_eq!(record.get_str("ensemble_member"), Some("r1i1p1"));
        assert_eq!(record.get_str("version"), Some("v20110901"));
        assert_eq!(record.get_str("variable"), Some("tas"));
        assert_eq!(record.get_str("temporal_subset"), Some("185001-200512"));
    }

    #[test]
    fn test_split_sub_experiment() {
        assert_eq!(split_sub_experiment("s1960-r1i1p1f1"), Some((1960, "r1i1p1f1")));
        assert_eq!(split_sub_experiment("r1i1p1f1"), None);
        assert_eq!(split_sub_experiment("sXX-r1i1p1f1"), None);
    }

    #[test]
    fn test_columns_cover_record_keys() {
        let record = parse6(samples::CMIP6_DCPP);
        for key in record.keys() {
            assert!(CMIP6_COLUMNS.contains(&key), "{} missing from schema", key);
        }
    }
}
