//! CESM-PPE parsing against generated history files.

use asset_parsers::{AssetParser, CesmPpeParser, FieldValue};
use test_utils::{samples, write_history_file, FixtureTree, HistoryFileSpec};

#[test]
fn test_parse_generated_history_file() {
    let tree = FixtureTree::new();
    let path = tree.path(samples::CESM_PPE_FILENAME);
    write_history_file(&path, &HistoryFileSpec::default()).unwrap();

    let record = CesmPpeParser.parse(&path).into_result().unwrap();

    assert_eq!(record.get_str("experiment"), Some("present-day"));
    assert_eq!(record.get("ensemble"), Some(&FieldValue::Integer(131)));
    assert_eq!(record.get_str("frequency"), Some("monthly"));
    assert_eq!(record.get_str("variable"), Some("IWC"));
    assert_eq!(record.get_str("units"), Some("kg/m3"));
    assert_eq!(record.get_str("long_name"), Some("Grid box average ice water content"));
    assert_eq!(record.get("vertical_levels"), Some(&FieldValue::Integer(32)));
    assert_eq!(record.get_str("start_time"), Some("2000-02-01"));
    assert_eq!(record.get_str("end_time"), Some("2000-04-01"));
    assert_eq!(record.get_str("time_range"), Some("2000-02-01-2000-04-01"));
    assert_eq!(record.path(), Some(path.to_str().unwrap()));
}

#[test]
fn test_surface_variable_defaults_to_one_level() {
    let tree = FixtureTree::new();
    let path = tree.path("cc_PPE_250_ensemble_PI.002.h1.TS.nc");
    let spec = HistoryFileSpec {
        variable: "TS".to_string(),
        units: Some("K".to_string()),
        long_name: None,
        levels: 0,
        ..HistoryFileSpec::default()
    };
    write_history_file(&path, &spec).unwrap();

    let record = CesmPpeParser.parse(&path).into_result().unwrap();

    assert_eq!(record.get_str("experiment"), Some("pre-industrial"));
    assert_eq!(record.get_str("frequency"), Some("daily"));
    assert_eq!(record.get("vertical_levels"), Some(&FieldValue::Integer(1)));
    assert!(!record.contains("long_name"));
}

#[test]
fn test_variable_missing_from_file_is_invalid() {
    let tree = FixtureTree::new();
    // Name says CLDICE but the file only holds IWC
    let path = tree.path("cc_PPE_250_ensemble_PD.131.h0.CLDICE.nc");
    write_history_file(&path, &HistoryFileSpec::default()).unwrap();

    let invalid = CesmPpeParser.parse(&path).into_result().unwrap_err();
    assert!(invalid.reason.contains("CLDICE"));
}
