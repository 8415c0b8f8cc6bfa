//! End-to-end catalog merges on temporary directories.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use esm_catalog::{CatalogMerger, CatalogTable, EsmCatalog, MergeOptions};
use test_utils::FixtureTree;

const LOCAL_A: &str = "\
activity_id,institution_id,source_id,experiment_id,member_id,table_id,variable_id,grid_label,version,time_range,path
CMIP,NCC,NorESM2-LM,historical,r1i1p1f1,Amon,tas,gn,v20190815,185001-185912,/nird/tas_1850.nc
CMIP,NCC,NorESM2-LM,historical,r1i1p1f1,Amon,tas,gn,v20190815,186001-186912,/nird/tas_1860.nc
CMIP,NCC,NorESM2-LM,historical,r1i1p1f1,fx,areacella,gn,v20190815,,/nird/areacella.nc
";

const LOCAL_B: &str = "\
activity_id,institution_id,source_id,experiment_id,member_id,table_id,variable_id,grid_label,version,time_range,path
CMIP,NCC,NorESM2-LM,historical,r1i1p1f1,Amon,tas,gn,v20190815,185001-185912,/nird/tas_1850.nc
CMIP,NCC,NorESM2-MM,historical,r1i1p1f1,Amon,pr,gn,v20191108,185001-186912,/nird/pr_1850.nc
";

const REMOTE: &str = "\
activity_id,institution_id,source_id,experiment_id,member_id,table_id,variable_id,grid_label,zstore,dcpp_init_year,version
CMIP,NCC,NorESM2-LM,historical,r1i1p1f1,Amon,tas,gn,gs://cmip6/NorESM2-LM/tas/,,20190815
CMIP,NCAR,CESM2,historical,r1i1p1f1,Amon,tas,gn,gs://cmip6/CESM2/tas/,,20190308
";

fn options(tree: &FixtureTree, catalogs: Vec<PathBuf>) -> MergeOptions {
    MergeOptions {
        catalogs,
        outdir: tree.path("out"),
        ..MergeOptions::default()
    }
}

fn unique_keys(table: &CatalogTable) -> HashSet<(Option<String>, Option<String>)> {
    let paths = table.column_values("path").unwrap();
    let versions = table.column_values("version").unwrap();
    paths
        .into_iter()
        .zip(versions)
        .map(|(p, v)| (p.map(str::to_string), v.map(str::to_string)))
        .collect()
}

#[tokio::test]
async fn test_merge_local_catalogs() {
    let tree = FixtureTree::new();
    let a = tree.write("a.csv", LOCAL_A.as_bytes());
    let b = tree.write("b.csv", LOCAL_B.as_bytes());

    let report = CatalogMerger::new(options(&tree, vec![a, b])).merge().await.unwrap();

    assert_eq!(report.stats.local_rows, 5);
    assert_eq!(report.stats.duplicates_removed, 1);
    assert_eq!(report.saved.rows, 4);
    assert!(report.saved.table_path.ends_with("merge_cmip.csv"));

    let merged = CatalogTable::read_path(&report.saved.table_path).unwrap();
    let versions: HashSet<_> = merged.column_values("version").unwrap().into_iter().flatten().collect();
    assert_eq!(versions, HashSet::from(["20190815", "20191108"]));

    // fx fields have no time range
    let areacella = (0..merged.len())
        .find(|&i| merged.get(i, "variable_id") == Some("areacella"))
        .unwrap();
    assert_eq!(merged.get(areacella, "time_range"), Some("*"));
    assert!((0..merged.len()).all(|i| merged.get(i, "format") == Some("netcdf")));
}

#[tokio::test]
async fn test_merge_with_itself_is_idempotent() {
    let tree = FixtureTree::new();
    let a = tree.write("a.csv", LOCAL_A.as_bytes());
    let original = CatalogTable::read_path(&a).unwrap();

    let report = CatalogMerger::new(options(&tree, vec![a.clone(), a]))
        .merge()
        .await
        .unwrap();

    let merged = CatalogTable::read_path(&report.saved.table_path).unwrap();
    assert_eq!(merged.len(), original.len());
    assert_eq!(unique_keys(&merged).len(), original.len());
}

#[tokio::test]
async fn test_merge_descriptor() {
    let tree = FixtureTree::new();
    let a = tree.write("a.csv", LOCAL_A.as_bytes());
    let metadata = tree.write("meta.yaml", b"title: NIRD CMIP6 holdings\nlicense: CC-BY-4.0\n");

    let mut opts = options(&tree, vec![a]);
    opts.table_id = Some("nird_cmip6".to_string());
    opts.compression = true;
    opts.metadata = esm_catalog::load_metadata(&metadata).unwrap();

    let report = CatalogMerger::new(opts).merge().await.unwrap();
    assert!(report.saved.table_path.ends_with("merge_cmip.csv.gz"));

    let descriptor = EsmCatalog::read(&report.saved.descriptor_path).unwrap();
    assert_eq!(descriptor.id.as_deref(), Some("nird_cmip6"));
    assert_eq!(descriptor.catalog_file, "merge_cmip.csv.gz");
    assert_eq!(descriptor.assets.format_column_name.as_deref(), Some("format"));
    assert_eq!(descriptor.attributes.len(), 10);
    assert_eq!(descriptor.extra["title"], "NIRD CMIP6 holdings");

    let control = descriptor.aggregation_control.unwrap();
    assert_eq!(control.variable_column_name, "variable_id");
    assert_eq!(control.groupby_attrs, ["activity_id", "institution_id"]);
}

fn publish_remote(tree: &FixtureTree) -> String {
    tree.write("remote/pangeo.csv", REMOTE.as_bytes());
    let descriptor = r#"{
        "esmcat_version": "0.1.0",
        "id": "pangeo-cmip6",
        "catalog_file": "pangeo.csv",
        "attributes": [],
        "assets": {"column_name": "zstore", "format": "zarr"}
    }"#;
    let path = tree.write("remote/pangeo.json", descriptor.as_bytes());
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_merge_with_remote_catalog() {
    let tree = FixtureTree::new();
    let a = tree.write("a.csv", LOCAL_A.as_bytes());

    let mut opts = options(&tree, vec![a]);
    opts.remote_catalogs = vec![publish_remote(&tree)];

    let report = CatalogMerger::new(opts).merge().await.unwrap();
    // NorESM2-LM tas v20190815 is already held locally
    assert_eq!(report.stats.remote_rows_skipped, 1);
    assert_eq!(report.stats.remote_rows_added, 1);
    assert_eq!(report.stats.zarr_rows, 1);
    assert_eq!(report.saved.rows, 4);

    let merged = CatalogTable::read_path(&report.saved.table_path).unwrap();
    assert!(!merged.has_column("zstore"));
    let zarr: Vec<usize> = (0..merged.len())
        .filter(|&i| merged.get(i, "format") == Some("zarr"))
        .collect();
    assert_eq!(zarr.len(), 1);
    assert_eq!(merged.get(zarr[0], "path"), Some("gs://cmip6/CESM2/tas/"));
    assert_eq!(merged.get(zarr[0], "source_id"), Some("CESM2"));
    assert_eq!(merged.get(zarr[0], "time_range"), Some("*"));
}

#[tokio::test]
async fn test_remote_rows_with_other_versions_are_kept() {
    let tree = FixtureTree::new();
    let local = "\
activity_id,institution_id,source_id,experiment_id,member_id,table_id,variable_id,grid_label,version,path
CMIP,NCC,NorESM2-LM,historical,r1i1p1f1,Amon,tas,gn,v20200101,/nird/tas.nc
";
    let a = tree.write("a.csv", local.as_bytes());

    let mut opts = options(&tree, vec![a]);
    opts.remote_catalogs = vec![publish_remote(&tree)];

    let report = CatalogMerger::new(opts).merge().await.unwrap();
    assert_eq!(report.stats.remote_rows_skipped, 0);
    assert_eq!(report.stats.remote_rows_added, 2);
    assert_eq!(report.saved.rows, 3);
}

#[tokio::test]
async fn test_missing_catalog_is_fatal() {
    let tree = FixtureTree::new();
    let result = CatalogMerger::new(options(&tree, vec![Path::new("/nonexistent.csv").to_path_buf()]))
        .merge()
        .await;
    assert!(result.is_err());
    assert!(!tree.path("out").exists());
}

#[tokio::test]
async fn test_gzip_local_input() {
    use flate2::write::GzEncoder;
    use std::io::Write;

    let tree = FixtureTree::new();
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(LOCAL_B.as_bytes()).unwrap();
    let gz = tree.write("b.csv.gz", &encoder.finish().unwrap());

    let report = CatalogMerger::new(options(&tree, vec![gz])).merge().await.unwrap();
    assert_eq!(report.saved.rows, 2);
    fs::remove_file(&report.saved.table_path).unwrap();
}
