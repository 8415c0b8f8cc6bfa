//! Aggregation plans: how catalog rows combine into datasets.
//!
//! Plans are fixed per dataset family and never change after construction.
//! They are pure metadata; nothing here opens data.

use std::collections::BTreeMap;
use std::fmt;

use asset_parsers::DatasetFamily;
use serde::{Deserialize, Serialize};

/// How rows sharing a groupby key are combined on one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    /// Distinct values become separate variables of one dataset
    Union,
    /// Concatenate along an existing dimension
    JoinExisting,
    /// Stack along a new dimension
    JoinNew,
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregationKind::Union => "union",
            AggregationKind::JoinExisting => "join_existing",
            AggregationKind::JoinNew => "join_new",
        };
        f.write_str(name)
    }
}

/// One aggregation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    #[serde(rename = "type")]
    pub kind: AggregationKind,
    pub attribute_name: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl Aggregation {
    pub fn union(attribute: &str) -> Self {
        Self {
            kind: AggregationKind::Union,
            attribute_name: attribute.to_string(),
            options: BTreeMap::new(),
        }
    }

    /// Join along the existing `time` dimension.
    pub fn join_existing_time(attribute: &str) -> Self {
        Self {
            kind: AggregationKind::JoinExisting,
            attribute_name: attribute.to_string(),
            options: options(&[("dim", "time"), ("coords", "minimal"), ("compat", "override")]),
        }
    }

    pub fn join_new(attribute: &str) -> Self {
        Self {
            kind: AggregationKind::JoinNew,
            attribute_name: attribute.to_string(),
            options: options(&[("coords", "minimal"), ("compat", "override")]),
        }
    }
}

fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Groupby variants for CESM-PPE catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CesmGrouping {
    /// experiment × frequency
    #[default]
    ExperimentFrequency,
    /// experiment × frequency × model × coordinate, as used by Aerocom
    AerocomStyle,
}

/// Aggregation steps plus the grouping that partitions rows into datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationPlan {
    variable_column_name: String,
    groupby_attrs: Vec<String>,
    aggregations: Vec<Aggregation>,
}

impl AggregationPlan {
    fn new(variable: &str, groupby: &[&str], aggregations: Vec<Aggregation>) -> Self {
        Self {
            variable_column_name: variable.to_string(),
            groupby_attrs: groupby.iter().map(|s| s.to_string()).collect(),
            aggregations,
        }
    }

    pub fn cmip6() -> Self {
        Self::new(
            "variable_id",
            &["activity_id", "institution_id"],
            vec![
                Aggregation::union("variable_id"),
                Aggregation::join_existing_time("time_range"),
                Aggregation::join_new("member_id"),
            ],
        )
    }

    pub fn cmip5() -> Self {
        Self::new(
            "variable",
            &["product_id", "institute"],
            vec![
                Aggregation::union("variable"),
                Aggregation::join_existing_time("temporal_subset"),
                Aggregation::join_new("ensemble_member"),
            ],
        )
    }

    pub fn cesm_ppe(grouping: CesmGrouping) -> Self {
        let groupby: &[&str] = match grouping {
            CesmGrouping::ExperimentFrequency => &["experiment", "frequency"],
            CesmGrouping::AerocomStyle => &["experiment", "frequency", "model", "coordinate"],
        };
        Self::new(
            "variable",
            groupby,
            vec![
                Aggregation::union("variable"),
                Aggregation::join_existing_time("time_range"),
                Aggregation::join_new("ensemble"),
            ],
        )
    }

    pub fn aerocom() -> Self {
        Self::new(
            "variable",
            &["experiment", "frequency", "model", "coordinate"],
            vec![
                Aggregation::union("variable"),
                Aggregation::join_existing_time("time"),
            ],
        )
    }

    /// Default plan for a dataset family.
    pub fn for_family(family: DatasetFamily) -> Self {
        match family {
            DatasetFamily::Cmip5 => Self::cmip5(),
            DatasetFamily::Cmip6 => Self::cmip6(),
            DatasetFamily::CesmPpe => Self::cesm_ppe(CesmGrouping::default()),
            DatasetFamily::Aerocom => Self::aerocom(),
        }
    }

    pub fn variable_column_name(&self) -> &str {
        &self.variable_column_name
    }

    pub fn groupby_attrs(&self) -> &[String] {
        &self.groupby_attrs
    }

    pub fn aggregations(&self) -> &[Aggregation] {
        &self.aggregations
    }

    /// Every column the plan refers to, without duplicates, in plan order.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        let names = std::iter::once(self.variable_column_name.as_str())
            .chain(self.groupby_attrs.iter().map(String::as_str))
            .chain(self.aggregations.iter().map(|a| a.attribute_name.as_str()));
        for name in names {
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmip6_plan() {
        let plan = AggregationPlan::cmip6();
        assert_eq!(plan.variable_column_name(), "variable_id");
        assert_eq!(plan.groupby_attrs(), ["activity_id", "institution_id"]);

        let kinds: Vec<_> = plan.aggregations().iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AggregationKind::Union, AggregationKind::JoinExisting, AggregationKind::JoinNew]
        );
        assert_eq!(plan.aggregations()[1].options["dim"], "time");
        assert!(!plan.aggregations()[2].options.contains_key("dim"));
    }

    #[test]
    fn test_aerocom_has_no_join_new() {
        let plan = AggregationPlan::aerocom();
        assert!(plan
            .aggregations()
            .iter()
            .all(|a| a.kind != AggregationKind::JoinNew));
        assert_eq!(plan.aggregations()[1].attribute_name, "time");
    }

    #[test]
    fn test_cesm_grouping_variants() {
        let default = AggregationPlan::cesm_ppe(CesmGrouping::ExperimentFrequency);
        let aerocom_style = AggregationPlan::cesm_ppe(CesmGrouping::AerocomStyle);
        assert_eq!(default.groupby_attrs(), ["experiment", "frequency"]);
        assert_eq!(aerocom_style.groupby_attrs().len(), 4);
        assert_eq!(default.aggregations(), aerocom_style.aggregations());
    }

    #[test]
    fn test_referenced_columns_are_unique() {
        let plan = AggregationPlan::cmip6();
        assert_eq!(
            plan.referenced_columns(),
            vec!["variable_id", "activity_id", "institution_id", "time_range", "member_id"]
        );
    }

    #[test]
    fn test_aggregation_serialization() {
        let json = serde_json::to_value(Aggregation::join_new("member_id")).unwrap();
        assert_eq!(json["type"], "join_new");
        assert_eq!(json["attribute_name"], "member_id");
        assert_eq!(json["options"]["compat"], "override");
    }
}
