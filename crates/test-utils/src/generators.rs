//! Synthetic NetCDF files shaped like model history output.
//!
//! Files are small (a handful of grid points) but carry the attributes and
//! coordinates that content parsers read: data variable `units` and
//! `long_name`, CF vertical coordinates, and a CF time axis.

use std::path::Path;

/// Description of a synthetic history file.
#[derive(Debug, Clone)]
pub struct HistoryFileSpec {
    pub variable: String,
    pub units: Option<String>,
    pub long_name: Option<String>,
    /// Number of `lev` levels on the data variable; 0 for a surface field.
    pub levels: usize,
    pub time_values: Vec<f64>,
    pub time_units: String,
    pub calendar: Option<String>,
}

impl Default for HistoryFileSpec {
    /// Three monthly records of CESM ice water content on 32 levels.
    fn default() -> Self {
        Self {
            variable: "IWC".to_string(),
            units: Some("kg/m3".to_string()),
            long_name: Some("Grid box average ice water content".to_string()),
            levels: 32,
            time_values: vec![31.0, 59.0, 90.0],
            time_units: "days since 2000-01-01 00:00:00".to_string(),
            calendar: Some("noleap".to_string()),
        }
    }
}

/// Write a synthetic history file to `path`.
///
/// An `ilev` interface coordinate (levels + 1) is always written but never
/// attached to the data variable, mirroring CAM output.
pub fn write_history_file(path: &Path, spec: &HistoryFileSpec) -> Result<(), netcdf::Error> {
    const LAT: usize = 2;

    let mut file = netcdf::create(path)?;
    file.add_attribute("source", "CAM")?;

    let ntime = spec.time_values.len();
    file.add_dimension("time", ntime)?;
    file.add_dimension("lat", LAT)?;
    let ilevels = spec.levels.max(1) + 1;
    file.add_dimension("ilev", ilevels)?;

    {
        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("units", spec.time_units.as_str())?;
        if let Some(calendar) = &spec.calendar {
            time.put_attribute("calendar", calendar.as_str())?;
        }
        time.put_values(&spec.time_values, ..)?;
    }

    {
        let mut lat = file.add_variable::<f64>("lat", &["lat"])?;
        lat.put_attribute("units", "degrees_north")?;
        lat.put_values(&[-45.0, 45.0], ..)?;
    }

    {
        let mut ilev = file.add_variable::<f64>("ilev", &["ilev"])?;
        ilev.put_attribute("positive", "down")?;
        let values: Vec<f64> = (0..ilevels).map(|i| i as f64 * 10.0).collect();
        ilev.put_values(&values, ..)?;
    }

    let mut dims = vec!["time"];
    if spec.levels > 0 {
        file.add_dimension("lev", spec.levels)?;
        let mut lev = file.add_variable::<f64>("lev", &["lev"])?;
        lev.put_attribute("positive", "down")?;
        lev.put_attribute("standard_name", "atmosphere_hybrid_sigma_pressure_coordinate")?;
        let values: Vec<f64> = (0..spec.levels).map(|i| i as f64 * 10.0 + 5.0).collect();
        lev.put_values(&values, ..)?;
        dims.push("lev");
    }
    dims.push("lat");

    let mut data = file.add_variable::<f32>(&spec.variable, &dims)?;
    if let Some(units) = &spec.units {
        data.put_attribute("units", units.as_str())?;
    }
    if let Some(long_name) = &spec.long_name {
        data.put_attribute("long_name", long_name.as_str())?;
    }
    let size = ntime * spec.levels.max(1) * LAT;
    data.put_values(&vec![0.0f32; size], ..)?;

    Ok(())
}
