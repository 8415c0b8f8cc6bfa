//! Builder runs over fixture archives.

use std::path::PathBuf;

use asset_parsers::{AerocomParser, Cmip6DirectoryParser};
use catalog_builder::{Builder, BuilderOptions};
use test_utils::{samples, FixtureTree};

fn cmip6_tree() -> FixtureTree {
    let tree = FixtureTree::new();
    tree.touch(samples::CMIP6_TAS);
    tree.touch(samples::CMIP6_TAS_NEWER);
    tree.touch(samples::CMIP6_AREACELLA);
    tree.touch(samples::CMIP6_DCPP);
    // Not an asset
    tree.touch("CMIP6/CMIP/NCC/NorESM2-LM/historical/r1i1p1f1/Amon/tas/gn/v20190815/README.txt");
    tree
}

fn options(tree: &FixtureTree) -> BuilderOptions {
    BuilderOptions {
        paths: vec![tree.root().to_path_buf()],
        depth: 4,
        threads: 2,
        ..BuilderOptions::default()
    }
}

#[test]
fn test_discover_only_netcdf() {
    let tree = cmip6_tree();
    let files = Builder::new(options(&tree)).unwrap().discover().unwrap();
    assert_eq!(files.len(), 4);
    assert!(files.iter().all(|f| f.extension().unwrap() == "nc"));
    assert!(files.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_discovery_depth_does_not_lose_files() {
    let tree = cmip6_tree();
    for depth in [0, 1, 3, 6, 12] {
        let opts = BuilderOptions {
            depth,
            ..options(&tree)
        };
        let files = Builder::new(opts).unwrap().discover().unwrap();
        assert_eq!(files.len(), 4, "depth {}", depth);
    }
}

#[test]
fn test_exclusions_prune_before_parsing() {
    let tree = cmip6_tree();
    let opts = BuilderOptions {
        exclude_patterns: vec!["*/NorCPM1/*".to_string(), "*/fx/*".to_string()],
        ..options(&tree)
    };
    let report = Builder::new(opts).unwrap().build(&Cmip6DirectoryParser).unwrap();

    assert_eq!(report.files_discovered, 2);
    let sources = report.table.column_values("source_id").unwrap();
    assert!(sources.iter().all(|s| *s == Some("NorESM2-LM")));
    let tables = report.table.column_values("table_id").unwrap();
    assert!(!tables.contains(&Some("fx")));
}

#[test]
fn test_excluded_directory_is_not_walked() {
    let tree = cmip6_tree();
    tree.touch("CMIP6/CMIP/NCC/NorESM2-LM/historical/r1i1p1f1/Amon/tas/gn/latest/tas_Amon_NorESM2-LM_historical_r1i1p1f1_gn_185001-185912.nc");
    let opts = BuilderOptions {
        exclude_patterns: vec!["*/latest".to_string()],
        ..options(&tree)
    };
    let files = Builder::new(opts).unwrap().discover().unwrap();
    assert_eq!(files.len(), 4);
}

#[test]
fn test_build_cmip6_latest_version() {
    let tree = cmip6_tree();
    let opts = BuilderOptions {
        pick_latest_version: true,
        ..options(&tree)
    };
    let report = Builder::new(opts).unwrap().build(&Cmip6DirectoryParser).unwrap();

    assert!(report.invalid_assets.is_empty());
    assert_eq!(report.superseded, 1);
    assert_eq!(report.table.len(), 3);

    let tas: Vec<usize> = (0..report.table.len())
        .filter(|&i| report.table.get(i, "variable_id") == Some("tas"))
        .collect();
    assert_eq!(tas.len(), 1);
    assert_eq!(report.table.get(tas[0], "version"), Some("20200218"));

    let dcpp = (0..report.table.len())
        .find(|&i| report.table.get(i, "source_id") == Some("NorCPM1"))
        .unwrap();
    assert_eq!(report.table.get(dcpp, "dcpp_init_year"), Some("1960"));
    assert_eq!(report.table.get(dcpp, "member_id"), Some("r1i1p1f1"));
}

#[test]
fn test_build_keeps_all_versions_by_default() {
    let tree = cmip6_tree();
    let report = Builder::new(options(&tree)).unwrap().build(&Cmip6DirectoryParser).unwrap();
    assert_eq!(report.superseded, 0);
    assert_eq!(report.table.len(), 4);
    assert_eq!(report.table.columns()[0], "mip_era");
}

#[test]
fn test_invalid_assets_are_reported_not_written() {
    let tree = FixtureTree::new();
    tree.touch("glb/NorESM2-LM_histSST/aerocom3_NorESM2-LM_od550aer_Column_2010_monthly.nc");
    tree.touch("glb/NorESM2-LM_histSST/broken.nc");

    let opts = BuilderOptions {
        depth: 2,
        ..options(&tree)
    };
    let report = Builder::new(opts).unwrap().build(&AerocomParser).unwrap();

    assert_eq!(report.files_discovered, 2);
    assert_eq!(report.table.len(), 1);
    assert_eq!(report.invalid_assets.len(), 1);
    assert!(report.invalid_assets[0].path.ends_with("broken.nc"));
}

#[test]
fn test_missing_root_fails_before_scan() {
    let opts = BuilderOptions {
        paths: vec![PathBuf::from("/nonexistent/archive")],
        ..BuilderOptions::default()
    };
    let err = Builder::new(opts).err().unwrap();
    assert!(err.is_configuration_error());
}

#[test]
fn test_zero_threads_rejected() {
    let tree = FixtureTree::new();
    let opts = BuilderOptions {
        threads: 0,
        ..options(&tree)
    };
    assert!(Builder::new(opts).err().unwrap().is_configuration_error());
}
