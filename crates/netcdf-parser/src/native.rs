//! Native NetCDF access using the netcdf library.
//!
//! Thin helpers over the `netcdf` crate: opening files with HDF5 diagnostics
//! silenced, and reading optional attributes without tripping HDF5 error
//! output.

use std::path::Path;
use std::sync::Once;

use netcdf::AttributeValue;

use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). When scanning thousands of files in parallel
/// this drowns the log output:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// This function disables that output by calling H5Eset_auto2 with null handlers.
/// It only needs to be called once per process, but is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Open a NetCDF file read-only.
pub fn open(path: &Path) -> NetCdfResult<netcdf::File> {
    silence_hdf5_errors();

    netcdf::open(path).map_err(|e| NetCdfError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get a string attribute.
pub(crate) fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(mut values) if !values.is_empty() => Some(values.swap_remove(0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_idempotent() {
        silence_hdf5_errors();
        silence_hdf5_errors();
    }

    #[test]
    fn test_open_missing_file() {
        let err = open(Path::new("/nonexistent/file.nc")).unwrap_err();
        assert!(matches!(err, NetCdfError::Open { .. }));
    }
}
