//! In-memory catalog tables.
//!
//! A table is an ordered column list plus rows of optional string cells.
//! Empty CSV cells read as null and nulls write as empty cells, which keeps
//! tables interchangeable with the ones pandas reads and writes.

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use catalog_common::{AssetRecord, CatalogError, CatalogResult};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Strip a one-character non-digit prefix (`v20190815`) and parse the rest.
///
/// Plain integers parse as-is; anything else is `None`.
pub fn normalize_version(value: &str) -> Option<i64> {
    let value = value.trim();
    let digits = match value.chars().next() {
        Some(first) if !first.is_ascii_digit() && first != '-' => &value[first.len_utf8()..],
        _ => value,
    };
    digits.parse().ok()
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Whether a path names a gzip-compressed table.
pub fn is_gzip_path(path: &str) -> bool {
    path.ends_with(".gz")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl CatalogTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from parsed records.
    ///
    /// Columns follow `schema` order; record keys missing from the schema are
    /// appended in sorted order. Absent fields become nulls.
    pub fn from_records(schema: &[&str], records: &[AssetRecord]) -> Self {
        let mut columns: Vec<String> = schema.iter().map(|s| s.to_string()).collect();
        let extra: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.keys())
            .filter(|k| !schema.contains(k))
            .collect();
        columns.extend(extra.into_iter().map(str::to_string));

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).map(|v| v.to_string()))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<String>]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn require_column(&self, name: &str) -> CatalogResult<usize> {
        self.column_index(name)
            .ok_or_else(|| CatalogError::MissingColumn(name.to_string()))
    }

    /// Cell value, `None` for a null cell or unknown column.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// Values of one column in row order.
    pub fn column_values(&self, name: &str) -> CatalogResult<Vec<Option<&str>>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_deref()).collect())
    }

    /// Append a row given as (column, value) pairs; unknown columns are added.
    pub fn push_row<'a, I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (&'a str, Option<String>)>,
    {
        let mut row = vec![None; self.columns.len()];
        for (column, value) in cells {
            let idx = self.ensure_column(column);
            if row.len() < self.columns.len() {
                row.resize(self.columns.len(), None);
            }
            row[idx] = value;
        }
        self.rows.push(row);
    }

    /// Add an all-null column if it does not exist. Returns its index.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }

    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }

    /// Set every cell of `column` to `value`, adding the column if needed.
    pub fn fill_column(&mut self, column: &str, value: &str) {
        let idx = self.ensure_column(column);
        for row in &mut self.rows {
            row[idx] = Some(value.to_string());
        }
    }

    /// Replace nulls in `column` with `value`. Returns the number replaced.
    pub fn fill_nulls(&mut self, column: &str, value: &str) -> CatalogResult<usize> {
        let idx = self.require_column(column)?;
        let mut filled = 0;
        for row in &mut self.rows {
            if row[idx].is_none() {
                row[idx] = Some(value.to_string());
                filled += 1;
            }
        }
        Ok(filled)
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut Vec<Option<String>>> {
        self.rows.iter_mut()
    }

    /// Keep rows for which `keep` returns true. Returns the number removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Option<String>]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Normalize every `version` cell to a plain integer string.
    ///
    /// Null versions stay null; a value that is not a version is an error.
    pub fn normalize_versions(&mut self) -> CatalogResult<()> {
        let Some(idx) = self.column_index("version") else {
            return Ok(());
        };
        for row in &mut self.rows {
            if let Some(value) = row[idx].as_deref() {
                let version = normalize_version(value).ok_or_else(|| CatalogError::InvalidValue {
                    column: "version".to_string(),
                    value: value.to_string(),
                })?;
                row[idx] = Some(version.to_string());
            }
        }
        Ok(())
    }

    /// Key tuple of one row over the given column indices.
    pub(crate) fn key<'a>(row: &'a [Option<String>], indices: &[usize]) -> Vec<Option<&'a str>> {
        indices.iter().map(|&i| row[i].as_deref()).collect()
    }

    /// Drop rows repeating an earlier row's values on `keys`, keeping the first.
    /// Returns the number removed.
    pub fn drop_duplicates(&mut self, keys: &[&str]) -> CatalogResult<usize> {
        let indices = keys
            .iter()
            .map(|k| self.require_column(k))
            .collect::<CatalogResult<Vec<_>>>()?;

        let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(self.rows.len());
        Ok(self.retain(|row| {
            let key = Self::key(row, &indices)
                .into_iter()
                .map(|cell| cell.map(str::to_string))
                .collect();
            seen.insert(key)
        }))
    }

    /// Sort rows by one column, nulls first. Stable.
    pub fn sort_by_column(&mut self, column: &str) -> CatalogResult<()> {
        let idx = self.require_column(column)?;
        self.rows.sort_by(|a, b| a[idx].cmp(&b[idx]));
        Ok(())
    }

    /// Concatenate tables. Columns are the union in first-seen order.
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = CatalogTable>,
    {
        let mut result = CatalogTable::default();
        for table in tables {
            result.append(table);
        }
        result
    }

    /// Append another table's rows, aligning columns by name.
    pub fn append(&mut self, other: CatalogTable) {
        let mapping: Vec<usize> = other
            .columns
            .iter()
            .map(|column| self.ensure_column(column))
            .collect();

        let width = self.columns.len();
        for row in other.rows {
            let mut aligned = vec![None; width];
            for (cell, &idx) in row.into_iter().zip(&mapping) {
                aligned[idx] = cell;
            }
            self.rows.push(aligned);
        }
    }

    // =========================================================================
    // CSV I/O
    // =========================================================================

    /// Read a CSV table with a header row.
    pub fn read_csv<R: Read>(reader: R) -> CatalogResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let columns: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let row = (0..columns.len())
                .map(|i| record.get(i).filter(|s| !s.is_empty()).map(str::to_string))
                .collect();
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Read a table file. Gzip is detected by suffix or by content.
    pub fn read_path(path: &Path) -> CatalogResult<Self> {
        let mut file = BufReader::new(File::open(path)?);
        let gzip = is_gzip_path(&path.to_string_lossy()) || file.fill_buf()?.starts_with(&GZIP_MAGIC);
        if gzip {
            Self::read_csv(MultiGzDecoder::new(file))
        } else {
            Self::read_csv(file)
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> CatalogResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.columns)?;
        for row in &self.rows {
            csv_writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write a table file, gzip-compressed when `compress` is set.
    pub fn write_path(&self, path: &Path, compress: bool) -> CatalogResult<()> {
        let file = BufWriter::new(File::create(path)?);
        if compress {
            let mut encoder = GzEncoder::new(file, Compression::default());
            self.write_csv(&mut encoder)?;
            encoder.finish()?.flush()?;
        } else {
            let mut file = file;
            self.write_csv(&mut file)?;
            file.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> CatalogTable {
        let mut table = CatalogTable::new(columns.iter().map(|s| s.to_string()).collect());
        for row in rows {
            table.push_row(
                columns
                    .iter()
                    .zip(row.iter())
                    .map(|(c, v)| (*c, (!v.is_empty()).then(|| v.to_string()))),
            );
        }
        table
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("v20190815"), Some(20190815));
        assert_eq!(normalize_version("20190815"), Some(20190815));
        assert_eq!(normalize_version("vlatest"), None);
        assert_eq!(normalize_version(""), None);
    }

    #[test]
    fn test_from_records_schema_order() {
        let mut a = AssetRecord::with_path(Path::new("/a.nc"));
        a.insert("variable", "IWC");
        a.insert("ensemble", 3i64);
        let mut b = AssetRecord::with_path(Path::new("/b.nc"));
        b.insert("extra", "x");

        let table = CatalogTable::from_records(&["variable", "ensemble", "path"], &[a, b]);
        assert_eq!(table.columns(), ["variable", "ensemble", "path", "extra"]);
        assert_eq!(table.get(0, "ensemble"), Some("3"));
        assert_eq!(table.get(1, "variable"), None);
        assert_eq!(table.get(1, "extra"), Some("x"));
    }

    #[test]
    fn test_csv_nulls_round_trip() {
        let t = table(&["path", "time_range"], &[&["/a.nc", ""], &["/b.nc", "1850-1900"]]);
        let mut buf = Vec::new();
        t.write_csv(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "path,time_range\n/a.nc,\n/b.nc,1850-1900\n");

        let read = CatalogTable::read_csv(buf.as_slice()).unwrap();
        assert_eq!(read, t);
    }

    #[test]
    fn test_concat_aligns_columns() {
        let a = table(&["path", "version"], &[&["/a.nc", "1"]]);
        let b = table(&["zstore", "path"], &[&["gs://x", ""]]);
        let merged = CatalogTable::concat(vec![a, b]);
        assert_eq!(merged.columns(), ["path", "version", "zstore"]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(1, "zstore"), Some("gs://x"));
        assert_eq!(merged.get(1, "version"), None);
    }

    #[test]
    fn test_drop_duplicates_keeps_first() {
        let mut t = table(
            &["path", "version", "source"],
            &[&["/a.nc", "1", "first"], &["/a.nc", "1", "second"], &["/a.nc", "2", "third"]],
        );
        let removed = t.drop_duplicates(&["path", "version"]).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(t.column_values("source").unwrap(), vec![Some("first"), Some("third")]);
    }

    #[test]
    fn test_drop_duplicates_missing_column() {
        let mut t = table(&["path"], &[]);
        assert!(matches!(
            t.drop_duplicates(&["path", "version"]),
            Err(CatalogError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_normalize_versions_rejects_garbage() {
        let mut t = table(&["version"], &[&["v20200101"], &[""], &["20190101"]]);
        t.normalize_versions().unwrap();
        assert_eq!(
            t.column_values("version").unwrap(),
            vec![Some("20200101"), None, Some("20190101")]
        );

        let mut bad = table(&["version"], &[&["latest"]]);
        assert!(bad.normalize_versions().is_err());
    }

    #[test]
    fn test_ensure_and_drop_column() {
        let mut t = table(&["path"], &[&["/a.nc"]]);
        assert_eq!(t.ensure_column("format"), 1);
        assert_eq!(t.ensure_column("format"), 1);
        assert_eq!(t.get(0, "format"), None);
        assert!(t.drop_column("format"));
        assert!(!t.drop_column("format"));
        assert_eq!(t.columns(), ["path"]);
    }
}
