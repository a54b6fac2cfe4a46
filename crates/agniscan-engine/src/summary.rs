//! Per-ROI area aggregation
//!
//! Reduces a fused classification to per-class pixel counts and areas over
//! a polygonal region of interest. A pixel belongs to the ROI when its
//! center falls inside the geometry, so no pixel is ever counted twice
//! even for overlapping polygons of one multipolygon.
//!
//! Aggregation is deterministic under any thread count: rows are tallied
//! in parallel into integer partials and folded in row order.

use crate::fusion::FusedClassification;
use crate::maybe_rayon::*;
use crate::roi::{pixel_window, validate_roi};
use crate::severity::SeverityClass;
use agniscan_core::{ensure_same_grid, Result};
use geo::Contains;
use geo_types::{MultiPolygon, Point};
use serde::Serialize;
use std::collections::BTreeMap;

const M2_PER_HECTARE: f64 = 10_000.0;

/// Pixel count and ground area of one severity class within an ROI
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClassArea {
    pub pixels: usize,
    /// Area in squared map units
    pub area: f64,
    /// Area in hectares, assuming map units of meters
    pub hectares: f64,
}

/// Aggregated classification figures for one ROI.
///
/// `total_pixels` counts every grid pixel whose center lies inside the
/// ROI; `nodata_pixels` is the subset excluded from classification. The
/// five class entries always sum to `total_pixels - nodata_pixels`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub classes: BTreeMap<SeverityClass, ClassArea>,
    pub total_pixels: usize,
    pub nodata_pixels: usize,
    pub burned_area: f64,
    pub burned_hectares: f64,
    /// Mean agreement over classified (non-no-data) pixels
    pub mean_agreement: f64,
    /// Fraction of ROI pixels that are no-data; 1.0 for an empty ROI
    pub nodata_fraction: f64,
}

impl AnalysisSummary {
    /// Figures for one class; zero if the class never occurs
    pub fn class(&self, class: SeverityClass) -> ClassArea {
        self.classes.get(&class).copied().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    counts: [usize; 5],
    nodata: usize,
    agreement_sum: u64,
    total: usize,
}

impl Tally {
    fn merge(mut self, other: Tally) -> Tally {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts) {
            *mine += theirs;
        }
        self.nodata += other.nodata;
        self.agreement_sum += other.agreement_sum;
        self.total += other.total;
        self
    }
}

/// Aggregate a fused classification over one ROI.
///
/// The ROI must be valid per [`validate_roi`] and expressed in the
/// raster's CRS. An ROI that selects no pixels (empty geometry, or
/// entirely outside the grid) yields the zero summary with a no-data
/// fraction of 1.0 rather than an error.
pub fn summarize(
    classification: &FusedClassification,
    roi: &MultiPolygon<f64>,
) -> Result<AnalysisSummary> {
    validate_roi(roi)?;

    let grid = classification.descriptor();
    // Rasters loaded from separate files may disagree
    ensure_same_grid(
        "agreement raster",
        &grid,
        &classification.agreement.descriptor(),
    )?;
    let window = match pixel_window(roi, &grid) {
        Some(window) => window,
        None => return Ok(build_summary(Tally::default(), grid.cell_area())),
    };

    let severity = &classification.severity;
    let agreement = &classification.agreement;
    let transform = grid.transform;
    let cols = window.cols();

    let partials: Vec<Tally> = window
        .rows()
        .into_par_iter()
        .map(|row| {
            let mut tally = Tally::default();
            for col in cols.clone() {
                let (x, y) = transform.pixel_to_geo(col, row);
                if !roi.contains(&Point::new(x, y)) {
                    continue;
                }
                tally.total += 1;

                let code = unsafe { severity.get_unchecked(row, col) };
                match SeverityClass::from_code(code) {
                    Some(class) => {
                        tally.counts[class.code() as usize] += 1;
                        tally.agreement_sum +=
                            unsafe { agreement.get_unchecked(row, col) } as u64;
                    }
                    // The no-data code and any unknown code count as no-data
                    None => tally.nodata += 1,
                }
            }
            tally
        })
        .collect();

    // Fold partials in row order
    let tally = partials.into_iter().fold(Tally::default(), Tally::merge);
    Ok(build_summary(tally, grid.cell_area()))
}

/// Aggregate one classification over several ROIs.
///
/// Each ROI is summarized independently; one invalid geometry does not
/// poison the rest of the batch.
pub fn summarize_batch(
    classification: &FusedClassification,
    rois: &[MultiPolygon<f64>],
) -> Vec<Result<AnalysisSummary>> {
    rois.iter().map(|roi| summarize(classification, roi)).collect()
}

fn build_summary(tally: Tally, cell_area: f64) -> AnalysisSummary {
    let mut classes = BTreeMap::new();
    let mut burned_area = 0.0;
    for class in SeverityClass::SCALE {
        let pixels = tally.counts[class.code() as usize];
        let area = pixels as f64 * cell_area;
        classes.insert(
            class,
            ClassArea {
                pixels,
                area,
                hectares: area / M2_PER_HECTARE,
            },
        );
        if class.is_burned() {
            burned_area += area;
        }
    }

    let classified = tally.total - tally.nodata;
    let mean_agreement = if classified > 0 {
        tally.agreement_sum as f64 / classified as f64
    } else {
        0.0
    };
    let nodata_fraction = if tally.total > 0 {
        tally.nodata as f64 / tally.total as f64
    } else {
        1.0
    };

    AnalysisSummary {
        classes,
        total_pixels: tally.total,
        nodata_pixels: tally.nodata,
        burned_area,
        burned_hectares: burned_area / M2_PER_HECTARE,
        mean_agreement,
        nodata_fraction,
    }
}
