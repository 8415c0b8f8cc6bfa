//! Path splitting helpers shared by the parsers.

use std::path::{Component, Path};

/// Normal path components as UTF-8 strings.
///
/// Returns `None` for a path with a non-UTF-8 component.
pub(crate) fn segments(path: &Path) -> Option<Vec<&str>> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_str()),
            _ => None,
        })
        .collect()
}

/// The last `n` segments, or `None` if the path is shorter.
pub(crate) fn tail<'s, 'a>(segments: &'s [&'a str], n: usize) -> Option<&'s [&'a str]> {
    segments.len().checked_sub(n).map(|start| &segments[start..])
}

/// File name with a trailing `.nc` removed.
pub(crate) fn strip_nc(filename: &str) -> &str {
    filename.strip_suffix(".nc").unwrap_or(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_drop_root() {
        let parts = segments(Path::new("/a/b/c.nc")).unwrap();
        assert_eq!(parts, vec!["a", "b", "c.nc"]);
    }

    #[test]
    fn test_tail() {
        let parts = ["a", "b", "c"];
        assert_eq!(tail(&parts, 2), Some(&["b", "c"][..]));
        assert_eq!(tail(&parts, 4), None);
    }

    #[test]
    fn test_strip_nc() {
        assert_eq!(strip_nc("tas_Amon.nc"), "tas_Amon");
        assert_eq!(strip_nc("tas_Amon.nc4"), "tas_Amon.nc4");
    }
}
