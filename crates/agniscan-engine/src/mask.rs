//! Agricultural mask application
//!
//! Restricts the indicator stack to farmland pixels before thresholding so
//! that spectrally burn-like surfaces outside agriculture (water, urban
//! fabric, bare rock) never reach the classifier.

use crate::indices::IndexStack;
use crate::maybe_rayon::*;
use agniscan_core::raster::Raster;
use agniscan_core::{ensure_same_grid, Result};
use ndarray::Array2;

/// Land-cover code marking agricultural pixels in the mask raster
pub const FARMLAND: u8 = 1;

/// Blank out every non-farmland pixel of the indicator stack.
///
/// A pixel survives only where the mask holds [`FARMLAND`]; everywhere else
/// (other classes, mask nodata) the three indices become NaN no-data. The
/// mask must share the stack's grid.
pub fn apply_mask(stack: &IndexStack, mask: &Raster<u8>) -> Result<IndexStack> {
    ensure_same_grid("agricultural mask", &stack.descriptor(), &mask.descriptor())?;

    Ok(IndexStack {
        dnbr: mask_band(&stack.dnbr, mask)?,
        bai: mask_band(&stack.bai, mask)?,
        dndvi: mask_band(&stack.dndvi, mask)?,
    })
}

fn mask_band(band: &Raster<f64>, mask: &Raster<u8>) -> Result<Raster<f64>> {
    let (rows, cols) = band.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let m = unsafe { mask.get_unchecked(row, col) };
                if mask.is_nodata(m) || m != FARMLAND {
                    continue;
                }
                row_data[col] = unsafe { band.get_unchecked(row, col) };
            }
            row_data
        })
        .collect();

    let mut output = band.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() = Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| agniscan_core::Error::Other(e.to_string()))?;
    Ok(output)
}
