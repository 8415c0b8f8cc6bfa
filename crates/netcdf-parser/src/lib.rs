//! NetCDF header inspection for catalog content parsers.
//!
//! Catalog building only needs a handful of facts from each file: attributes
//! of one data variable, the size of its vertical axis, and the first and last
//! values of the time axis. This crate exposes exactly that over the native
//! `netcdf` library, decoding CF time units for every calendar used by
//! climate models (see [`calendar`]).
//!
//! File handles live inside [`NetCdfDataset`] and are released when it is
//! dropped, so callers get deterministic cleanup on every exit path.

pub mod calendar;
pub mod error;
pub mod native;

use std::path::{Path, PathBuf};

use tracing::trace;

pub use calendar::{decode_time, decode_times, Calendar, CfDateTime, TimeUnits};
pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;

use native::get_string_attr;

/// CF standard names that identify a vertical coordinate.
const VERTICAL_STANDARD_NAMES: &[&str] = &[
    "air_pressure",
    "altitude",
    "atmosphere_hybrid_height_coordinate",
    "atmosphere_hybrid_sigma_pressure_coordinate",
    "atmosphere_ln_pressure_coordinate",
    "atmosphere_sigma_coordinate",
    "atmosphere_sleve_coordinate",
    "depth",
    "geopotential_height",
    "height",
    "height_above_geopotential_datum",
    "height_above_mean_sea_level",
    "height_above_reference_ellipsoid",
    "model_level_number",
    "ocean_s_coordinate",
    "ocean_sigma_coordinate",
    "ocean_sigma_z_coordinate",
];

/// Name of the time coordinate variable.
pub const TIME_VARIABLE: &str = "time";

/// An open NetCDF file.
pub struct NetCdfDataset {
    file: netcdf::File,
    path: PathBuf,
}

impl NetCdfDataset {
    /// Open a NetCDF file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> NetCdfResult<Self> {
        let path = path.as_ref();
        let file = native::open(path)?;
        trace!(path = %path.display(), "Opened NetCDF file");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    fn variable(&self, name: &str) -> NetCdfResult<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))
    }

    /// Read a string attribute of a variable.
    ///
    /// Fails if the variable does not exist; a missing attribute is `Ok(None)`.
    pub fn variable_attribute(&self, variable: &str, attribute: &str) -> NetCdfResult<Option<String>> {
        let var = self.variable(variable)?;
        Ok(get_string_attr(&var, attribute))
    }

    /// Number of vertical levels of `variable`.
    ///
    /// Looks for exactly one dimension of the variable whose coordinate
    /// variable follows the CF vertical-axis conventions (`axis = "Z"`,
    /// `positive = up|down`, or a vertical standard name). Returns `None`
    /// when the variable has no such dimension or more than one.
    pub fn vertical_levels(&self, variable: &str) -> Option<usize> {
        let var = self.file.variable(variable)?;

        let vertical: Vec<usize> = var
            .dimensions()
            .iter()
            .filter(|dim| {
                self.file
                    .variable(&dim.name())
                    .map(|coord| is_vertical_coordinate(&coord))
                    .unwrap_or(false)
            })
            .map(|dim| dim.len())
            .collect();

        match vertical.as_slice() {
            [levels] => Some(*levels),
            _ => None,
        }
    }

    /// Decode the full time axis.
    pub fn time_axis(&self) -> NetCdfResult<Vec<CfDateTime>> {
        let var = self.variable(TIME_VARIABLE)?;

        let units = get_string_attr(&var, "units")
            .ok_or_else(|| NetCdfError::MissingData("time units attribute".to_string()))?;
        let units = TimeUnits::parse(&units)?;
        let calendar = Calendar::from_attribute(get_string_attr(&var, "calendar").as_deref())?;

        let values: Vec<f64> = var
            .get_values(..)
            .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read time: {}", e)))?;

        decode_times(&values, &units, calendar)
    }

    /// First and last decoded time values.
    pub fn time_bounds(&self) -> NetCdfResult<(CfDateTime, CfDateTime)> {
        let times = self.time_axis()?;
        match (times.first(), times.last()) {
            (Some(first), Some(last)) => Ok((*first, *last)),
            _ => Err(NetCdfError::MissingData("time axis is empty".to_string())),
        }
    }
}

fn is_vertical_coordinate(var: &netcdf::Variable) -> bool {
    if var.dimensions().len() != 1 {
        return false;
    }
    if get_string_attr(var, "axis").is_some_and(|axis| axis.eq_ignore_ascii_case("z")) {
        return true;
    }
    if get_string_attr(var, "positive")
        .is_some_and(|p| p.eq_ignore_ascii_case("up") || p.eq_ignore_ascii_case("down"))
    {
        return true;
    }
    get_string_attr(var, "standard_name")
        .is_some_and(|name| VERTICAL_STANDARD_NAMES.contains(&name.as_str()))
}
