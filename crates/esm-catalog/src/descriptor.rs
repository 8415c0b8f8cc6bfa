//! The catalog descriptor (intake-esm `esmcat` JSON document).

use std::fs;
use std::path::Path;

use catalog_common::CatalogResult;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aggregation::{Aggregation, AggregationPlan};

/// Descriptor schema version written to every catalog.
pub const ESMCAT_VERSION: &str = "0.1.0";

/// Column names of the CMIP6 directory template.
pub const CMIP6_VOCABULARY_ATTRIBUTES: [&str; 10] = [
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

const CMIP6_CV_BASE: &str = "https://raw.githubusercontent.com/WCRP-CMIP/CMIP6_CVs/master";

/// A catalog column and its controlled-vocabulary location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub column_name: String,
    #[serde(default)]
    pub vocabulary: String,
}

impl Attribute {
    pub fn new(column_name: &str, vocabulary: &str) -> Self {
        Self {
            column_name: column_name.to_string(),
            vocabulary: vocabulary.to_string(),
        }
    }

    /// Attributes without vocabularies, one per column.
    pub fn for_columns<S: AsRef<str>>(columns: &[S]) -> Vec<Self> {
        columns.iter().map(|c| Self::new(c.as_ref(), "")).collect()
    }

    /// CMIP6 directory-template attributes with WCRP vocabulary URLs.
    pub fn cmip6_vocabularies() -> Vec<Self> {
        CMIP6_VOCABULARY_ATTRIBUTES
            .iter()
            .map(|att| Self::new(att, &format!("{}/CMIP6_{}.json", CMIP6_CV_BASE, att)))
            .collect()
    }
}

/// Where asset locations and their formats come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    pub column_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_column_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationControl {
    pub variable_column_name: String,
    pub groupby_attrs: Vec<String>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
}

impl From<&AggregationPlan> for AggregationControl {
    fn from(plan: &AggregationPlan) -> Self {
        Self {
            variable_column_name: plan.variable_column_name().to_string(),
            groupby_attrs: plan.groupby_attrs().to_vec(),
            aggregations: plan.aggregations().to_vec(),
        }
    }
}

/// A complete catalog descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsmCatalog {
    pub esmcat_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub catalog_file: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    pub assets: Assets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_control: Option<AggregationControl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Additional top-level keys, such as merged metadata
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EsmCatalog {
    pub fn new(catalog_file: String, assets: Assets, plan: &AggregationPlan) -> Self {
        Self {
            esmcat_version: ESMCAT_VERSION.to_string(),
            id: None,
            description: None,
            catalog_file,
            attributes: Vec::new(),
            assets,
            aggregation_control: Some(plan.into()),
            last_updated: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            extra: Map::new(),
        }
    }

    /// Merge extra top-level keys. Keys naming descriptor fields are ignored.
    pub fn merge_extra(&mut self, metadata: Map<String, Value>) {
        const RESERVED: &[&str] = &[
            "esmcat_version",
            "id",
            "description",
            "catalog_file",
            "attributes",
            "assets",
            "aggregation_control",
            "last_updated",
        ];
        for (key, value) in metadata {
            if !RESERVED.contains(&key.as_str()) {
                self.extra.insert(key, value);
            }
        }
    }

    pub fn to_json(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn write(&self, path: &Path) -> CatalogResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read(path: &Path) -> CatalogResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
