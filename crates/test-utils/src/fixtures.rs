//! Common test fixtures for catalog tests.
//!
//! Sample paths follow the directory layouts of the real archives, and
//! [`FixtureTree`] materializes them under a temporary root.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Sample asset paths, relative to an archive root unless noted.
pub mod samples {
    /// CESM perturbed-parameter ensemble history file name.
    pub const CESM_PPE_FILENAME: &str = "cc_PPE_250_ensemble_PD.131.h0.IWC.nc";

    /// Absolute Aerocom path as found on the archive.
    pub const AEROCOM_PATH: &str = "/lustre/storeB/project/aerocom/aerocom-users-database/DURF/histSST-dust-glb/NorESM2-LM_histSST_DURF-dust-glb/aerocom3_NorESM2-LM-histSST_DURF-dust-glb_ztp_Column_1949_monthly.nc";

    /// CMIP6 monthly near-surface temperature.
    pub const CMIP6_TAS: &str = "CMIP6/CMIP/NCC/NorESM2-LM/historical/r1i1p1f1/Amon/tas/gn/v20190815/tas_Amon_NorESM2-LM_historical_r1i1p1f1_gn_185001-185912.nc";

    /// Same dataset as [`CMIP6_TAS`], later version.
    pub const CMIP6_TAS_NEWER: &str = "CMIP6/CMIP/NCC/NorESM2-LM/historical/r1i1p1f1/Amon/tas/gn/v20200218/tas_Amon_NorESM2-LM_historical_r1i1p1f1_gn_185001-185912.nc";

    /// CMIP6 fixed field (no time range in the file name).
    pub const CMIP6_AREACELLA: &str = "CMIP6/CMIP/NCC/NorESM2-LM/historical/r1i1p1f1/fx/areacella/gn/v20190815/areacella_fx_NorESM2-LM_historical_r1i1p1f1_gn.nc";

    /// CMIP6 decadal hindcast with a sub-experiment member id.
    pub const CMIP6_DCPP: &str = "CMIP6/DCPP/NCC/NorCPM1/dcppA-hindcast/s1960-r1i1p1f1/Amon/pr/gn/v20190914/pr_Amon_NorCPM1_dcppA-hindcast_s1960-r1i1p1f1_gn_196011-197012.nc";

    /// CMIP5 monthly near-surface temperature.
    pub const CMIP5_TAS: &str = "output1/NCC/NorESM1-M/historical/mon/atmos/Amon/r1i1p1/v20110901/tas/tas_Amon_NorESM1-M_historical_r1i1p1_185001-200512.nc";
}

/// A temporary directory tree populated with (mostly empty) asset files.
///
/// The tree is removed when the fixture is dropped.
pub struct FixtureTree {
    dir: TempDir,
}

impl FixtureTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::Builder::new()
                .prefix("esm_catalog_")
                .tempdir()
                .expect("Failed to create fixture directory"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a relative fixture entry (not created).
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Create an empty file, including parent directories.
    pub fn touch(&self, relative: &str) -> PathBuf {
        self.write(relative, b"")
    }

    /// Create a file with the given contents, including parent directories.
    pub fn write(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture parent directory");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// Create an empty directory, including parents.
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).expect("Failed to create fixture directory");
        path
    }
}

impl Default for FixtureTree {
    fn default() -> Self {
        Self::new()
    }
}
