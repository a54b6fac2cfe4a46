//! Region-of-interest geometry checks and pixel windows
//!
//! ROIs are `geo_types::MultiPolygon<f64>` in the raster's CRS. Validation
//! rejects geometry no aggregation could interpret; the pixel window clips
//! the geometry's bounding box to the grid so aggregation never scans
//! pixels that cannot intersect the ROI.

use agniscan_core::raster::GridDescriptor;
use agniscan_core::{Error, Result};
use geo::BoundingRect;
use geo_types::{LineString, MultiPolygon};
use std::ops::Range;

/// Reject ROIs with degenerate rings or non-finite coordinates.
///
/// An empty `MultiPolygon` is valid; it selects nothing. Rings must be
/// closed with at least four coordinates (three distinct vertices).
pub fn validate_roi(roi: &MultiPolygon<f64>) -> Result<()> {
    for (poly_idx, polygon) in roi.0.iter().enumerate() {
        check_ring(polygon.exterior(), poly_idx, "exterior")?;
        for (ring_idx, interior) in polygon.interiors().iter().enumerate() {
            check_ring(interior, poly_idx, &format!("interior {}", ring_idx))?;
        }
    }
    Ok(())
}

fn check_ring(ring: &LineString<f64>, polygon: usize, which: &str) -> Result<()> {
    if ring.0.len() < 4 {
        return Err(Error::InvalidRoi(format!(
            "{} ring of polygon {} has {} coordinates, a closed ring needs at least 4",
            which,
            polygon,
            ring.0.len()
        )));
    }
    for coord in &ring.0 {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return Err(Error::InvalidRoi(format!(
                "{} ring of polygon {} contains a non-finite coordinate",
                which, polygon
            )));
        }
    }
    Ok(())
}

/// Half-open pixel ranges covering an ROI's bounding box on a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub row0: usize,
    pub row1: usize,
    pub col0: usize,
    pub col1: usize,
}

impl PixelWindow {
    pub fn rows(&self) -> Range<usize> {
        self.row0..self.row1
    }

    pub fn cols(&self) -> Range<usize> {
        self.col0..self.col1
    }
}

/// Clip an ROI's bounding box to a grid.
///
/// Returns `None` when the ROI is empty, lies entirely outside the grid,
/// or the grid transform is degenerate. The window is conservative: it
/// covers every pixel whose center could fall inside the geometry.
pub fn pixel_window(roi: &MultiPolygon<f64>, grid: &GridDescriptor) -> Option<PixelWindow> {
    let rect = roi.bounding_rect()?;
    let (min, max) = (rect.min(), rect.max());

    let corners = [
        grid.transform.geo_to_pixel(min.x, min.y),
        grid.transform.geo_to_pixel(min.x, max.y),
        grid.transform.geo_to_pixel(max.x, min.y),
        grid.transform.geo_to_pixel(max.x, max.y),
    ];

    let mut min_col = f64::INFINITY;
    let mut max_col = f64::NEG_INFINITY;
    let mut min_row = f64::INFINITY;
    let mut max_row = f64::NEG_INFINITY;
    for (col, row) in corners {
        if col.is_nan() || row.is_nan() {
            return None;
        }
        min_col = min_col.min(col);
        max_col = max_col.max(col);
        min_row = min_row.min(row);
        max_row = max_row.max(row);
    }

    let row0 = min_row.floor().clamp(0.0, grid.rows as f64) as usize;
    let row1 = (max_row.floor() + 1.0).clamp(0.0, grid.rows as f64) as usize;
    let col0 = min_col.floor().clamp(0.0, grid.cols as f64) as usize;
    let col1 = (max_col.floor() + 1.0).clamp(0.0, grid.cols as f64) as usize;

    if row0 >= row1 || col0 >= col1 {
        return None;
    }

    Some(PixelWindow {
        row0,
        row1,
        col0,
        col1,
    })
}
