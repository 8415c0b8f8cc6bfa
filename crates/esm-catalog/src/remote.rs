//! Loading published catalogs (descriptor plus table) for merging.
//!
//! A location is either an HTTP(S) URL or a local path to a descriptor JSON.
//! The descriptor's `catalog_file` is resolved relative to the descriptor
//! unless it is already absolute.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use catalog_common::{CatalogError, CatalogResult};
use flate2::read::MultiGzDecoder;
use futures::future::try_join_all;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::table::{is_gzip_path, CatalogTable};

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// A resolved table location.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TableSource {
    Url(Url),
    File(PathBuf),
}

/// Build the HTTP client used for remote catalogs.
pub fn http_client() -> CatalogResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(300))
        .connect_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| CatalogError::Remote(format!("Failed to create HTTP client: {}", e)))
}

async fn fetch(client: &Client, url: &Url) -> CatalogResult<Bytes> {
    debug!(url = %url, "Fetching");
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| CatalogError::Remote(format!("{}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(CatalogError::Remote(format!("{}: HTTP {}", url, response.status())));
    }

    response
        .bytes()
        .await
        .map_err(|e| CatalogError::Remote(format!("{}: {}", url, e)))
}

fn catalog_file(descriptor: &[u8], location: &str) -> CatalogResult<String> {
    let json: Value = serde_json::from_slice(descriptor)?;
    json.get("catalog_file")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CatalogError::Remote(format!("{}: descriptor has no catalog_file", location)))
}

/// Resolve `catalog_file` against the descriptor location.
fn resolve(location: &str, catalog_file: &str) -> CatalogResult<TableSource> {
    if is_url(catalog_file) {
        return Url::parse(catalog_file)
            .map(TableSource::Url)
            .map_err(|e| CatalogError::Remote(format!("{}: {}", catalog_file, e)));
    }

    if is_url(location) {
        let base = Url::parse(location).map_err(|e| CatalogError::Remote(format!("{}: {}", location, e)))?;
        return base
            .join(catalog_file)
            .map(TableSource::Url)
            .map_err(|e| CatalogError::Remote(format!("{}: {}", catalog_file, e)));
    }

    let file = Path::new(catalog_file);
    if file.is_absolute() {
        return Ok(TableSource::File(file.to_path_buf()));
    }
    let parent = Path::new(location).parent().unwrap_or_else(|| Path::new(""));
    Ok(TableSource::File(parent.join(file)))
}

fn parse_table(data: &[u8], name: &str) -> CatalogResult<CatalogTable> {
    if is_gzip_path(name) {
        CatalogTable::read_csv(MultiGzDecoder::new(data))
    } else {
        CatalogTable::read_csv(data)
    }
}

/// Load one published catalog's table.
#[instrument(skip(client))]
pub async fn load_remote_table(client: &Client, location: &str) -> CatalogResult<CatalogTable> {
    let descriptor = if is_url(location) {
        let url = Url::parse(location).map_err(|e| CatalogError::Remote(format!("{}: {}", location, e)))?;
        fetch(client, &url).await?
    } else {
        Bytes::from(tokio::fs::read(location).await?)
    };

    let source = resolve(location, &catalog_file(&descriptor, location)?)?;
    let table = match &source {
        TableSource::Url(url) => parse_table(&fetch(client, url).await?, url.path())?,
        TableSource::File(path) => {
            let data = tokio::fs::read(path).await?;
            parse_table(&data, &path.to_string_lossy())?
        }
    };

    info!(location, rows = table.len(), "Loaded remote catalog");
    Ok(table)
}

/// Load several published catalogs concurrently and concatenate them in
/// the order given.
pub async fn load_remote_tables(client: &Client, locations: &[String]) -> CatalogResult<CatalogTable> {
    let tables = try_join_all(locations.iter().map(|loc| load_remote_table(client, loc))).await?;
    Ok(CatalogTable::concat(tables))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_url() {
        let source = resolve("https://storage.googleapis.com/cmip6/pangeo-cmip6.json", "pangeo-cmip6.csv").unwrap();
        assert_eq!(
            source,
            TableSource::Url(Url::parse("https://storage.googleapis.com/cmip6/pangeo-cmip6.csv").unwrap())
        );
    }

    #[test]
    fn test_resolve_absolute_url_wins() {
        let source = resolve("/local/cat.json", "https://example.org/table.csv.gz").unwrap();
        assert!(matches!(source, TableSource::Url(_)));
    }

    #[test]
    fn test_resolve_local_relative() {
        let source = resolve("/data/catalogs/cat.json", "cat.csv").unwrap();
        assert_eq!(source, TableSource::File(PathBuf::from("/data/catalogs/cat.csv")));

        let source = resolve("/data/catalogs/cat.json", "/elsewhere/cat.csv").unwrap();
        assert_eq!(source, TableSource::File(PathBuf::from("/elsewhere/cat.csv")));
    }

    #[test]
    fn test_missing_catalog_file() {
        let err = catalog_file(br#"{"esmcat_version": "0.1.0"}"#, "x.json").unwrap_err();
        assert!(matches!(err, CatalogError::Remote(_)));
    }
}
