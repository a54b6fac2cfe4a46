//! Grid identity for combining rasters

use std::fmt;

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::GeoTransform;

/// The spatial identity of a raster grid.
///
/// Two rasters may be combined pixel-wise only when their descriptors
/// match: same dimensions, same transform, equivalent CRS. Anything else
/// is a hard error; nothing in this crate resamples.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDescriptor {
    pub rows: usize,
    pub cols: usize,
    pub transform: GeoTransform,
    pub crs: Option<CRS>,
}

impl GridDescriptor {
    /// Whether another descriptor denotes the same grid.
    ///
    /// CRS handling: two untagged grids match; a tagged grid never
    /// matches an untagged one, since alignment cannot be verified.
    pub fn matches(&self, other: &GridDescriptor) -> bool {
        if self.rows != other.rows || self.cols != other.cols {
            return false;
        }
        if self.transform != other.transform {
            return false;
        }
        match (self.crs, other.crs) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Ground area covered by one pixel, in squared map units
    pub fn cell_area(&self) -> f64 {
        self.transform.cell_area()
    }
}

impl fmt::Display for GridDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let crs = match self.crs {
            Some(crs) => crs.to_string(),
            None => "no CRS".to_string(),
        };
        write!(
            f,
            "{}x{} px, cell {}x{}, origin ({}, {}), {}",
            self.cols,
            self.rows,
            self.transform.pixel_width,
            self.transform.pixel_height,
            self.transform.origin_x,
            self.transform.origin_y,
            crs
        )
    }
}

/// Fail with a `GridMismatch` error unless the two descriptors match.
///
/// `context` names the raster being checked, for the error message.
pub fn ensure_same_grid(
    context: &str,
    expected: &GridDescriptor,
    actual: &GridDescriptor,
) -> Result<()> {
    if expected.matches(actual) {
        return Ok(());
    }
    Err(Error::GridMismatch {
        context: context.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(rows: usize, cols: usize) -> GridDescriptor {
        GridDescriptor {
            rows,
            cols,
            transform: GeoTransform::new(600_000.0, 3_400_000.0, 20.0, -20.0),
            crs: Some(CRS::from_epsg(32643)),
        }
    }

    #[test]
    fn test_matching_grids() {
        let a = descriptor(64, 64);
        let b = descriptor(64, 64);
        assert!(a.matches(&b));
        assert!(ensure_same_grid("test raster", &a, &b).is_ok());
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = descriptor(64, 64);
        let b = descriptor(64, 65);
        assert!(!a.matches(&b));

        let err = ensure_same_grid("post-fire nir band", &a, &b).unwrap_err();
        let msg = err.to_string();
        assert!(
            msg.contains("post-fire nir band"),
            "error should name the raster: {}",
            msg
        );
    }

    #[test]
    fn test_transform_mismatch() {
        let a = descriptor(64, 64);
        let mut b = descriptor(64, 64);
        b.transform = GeoTransform::new(600_010.0, 3_400_000.0, 20.0, -20.0);
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_crs_mismatch() {
        let a = descriptor(64, 64);
        let mut b = descriptor(64, 64);
        b.crs = Some(CRS::from_epsg(4326));
        assert!(!a.matches(&b));

        // Tagged vs untagged is a mismatch, untagged vs untagged is not
        let mut c = descriptor(64, 64);
        c.crs = None;
        assert!(!a.matches(&c));
        let mut d = descriptor(64, 64);
        d.crs = None;
        assert!(c.matches(&d));
    }
}
