//! Dataset family identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kinds of archive the catalog tools understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetFamily {
    Cmip5,
    Cmip6,
    CesmPpe,
    Aerocom,
}

impl DatasetFamily {
    pub const ALL: [DatasetFamily; 4] = [
        DatasetFamily::Cmip5,
        DatasetFamily::Cmip6,
        DatasetFamily::CesmPpe,
        DatasetFamily::Aerocom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetFamily::Cmip5 => "cmip5",
            DatasetFamily::Cmip6 => "cmip6",
            DatasetFamily::CesmPpe => "cesm-ppe",
            DatasetFamily::Aerocom => "aerocom",
        }
    }

    /// CMIP family for a phase number (5 or 6).
    pub fn from_cmip_version(version: u8) -> Option<Self> {
        match version {
            5 => Some(DatasetFamily::Cmip5),
            6 => Some(DatasetFamily::Cmip6),
            _ => None,
        }
    }

    /// Whether rows carry a `version` column eligible for latest-version selection.
    pub fn is_versioned(&self) -> bool {
        matches!(self, DatasetFamily::Cmip5 | DatasetFamily::Cmip6)
    }
}

impl fmt::Display for DatasetFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("Unknown dataset family: {0}")]
pub struct UnknownFamily(pub String);

impl FromStr for DatasetFamily {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cmip5" => Ok(DatasetFamily::Cmip5),
            "cmip6" => Ok(DatasetFamily::Cmip6),
            "cesm-ppe" | "cesm_ppe" => Ok(DatasetFamily::CesmPpe),
            "aerocom" => Ok(DatasetFamily::Aerocom),
            _ => Err(UnknownFamily(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for family in DatasetFamily::ALL {
            assert_eq!(family.name().parse::<DatasetFamily>().unwrap(), family);
        }
        assert!("cmip7".parse::<DatasetFamily>().is_err());
    }

    #[test]
    fn test_cmip_version() {
        assert_eq!(DatasetFamily::from_cmip_version(5), Some(DatasetFamily::Cmip5));
        assert_eq!(DatasetFamily::from_cmip_version(6), Some(DatasetFamily::Cmip6));
        assert_eq!(DatasetFamily::from_cmip_version(4), None);
        assert!(!DatasetFamily::Aerocom.is_versioned());
    }
}
