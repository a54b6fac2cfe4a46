//! Per-index thresholding
//!
//! Turns the continuous indicator rasters into integer-coded class rasters:
//! dNBR through the graded severity scale, BAI and dNDVI through single
//! burn/no-burn cuts.

use crate::maybe_rayon::*;
use crate::severity::{BurnVerdict, SeverityScale, NODATA_CODE};
use agniscan_core::raster::Raster;
use agniscan_core::{Error, Result};
use ndarray::Array2;

/// Classify a dNBR raster onto a severity scale.
///
/// No-data input pixels map to [`NODATA_CODE`].
pub fn classify_severity(dnbr: &Raster<f64>, scale: &SeverityScale) -> Result<Raster<u8>> {
    scale.validate()?;

    let (rows, cols) = dnbr.shape();
    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![NODATA_CODE; cols];
            for col in 0..cols {
                let value = unsafe { dnbr.get_unchecked(row, col) };
                if dnbr.is_nodata(value) {
                    continue;
                }
                row_data[col] = scale.classify(value).code();
            }
            row_data
        })
        .collect();

    build_classes(dnbr, rows, cols, data)
}

/// Apply a single burn threshold to an index raster.
///
/// Pixels at or above `threshold` become [`BurnVerdict::Burned`], pixels
/// below it [`BurnVerdict::NotBurned`]; no-data stays [`NODATA_CODE`].
pub fn classify_verdict(index: &Raster<f64>, threshold: f64) -> Result<Raster<u8>> {
    if !threshold.is_finite() {
        return Err(Error::InvalidParameter {
            name: "threshold",
            value: format!("{:?}", threshold),
            reason: "threshold must be finite".to_string(),
        });
    }

    let (rows, cols) = index.shape();
    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![NODATA_CODE; cols];
            for col in 0..cols {
                let value = unsafe { index.get_unchecked(row, col) };
                if index.is_nodata(value) {
                    continue;
                }
                row_data[col] = if value >= threshold {
                    BurnVerdict::Burned.code()
                } else {
                    BurnVerdict::NotBurned.code()
                };
            }
            row_data
        })
        .collect();

    build_classes(index, rows, cols, data)
}

fn build_classes(
    template: &Raster<f64>,
    rows: usize,
    cols: usize,
    data: Vec<u8>,
) -> Result<Raster<u8>> {
    let mut output = template.with_same_meta::<u8>(rows, cols);
    output.set_nodata(Some(NODATA_CODE));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}
