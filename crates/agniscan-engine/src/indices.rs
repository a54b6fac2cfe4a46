//! Spectral burn indices
//!
//! dNBR, BAI and dNDVI computed from paired pre-/post-fire acquisitions.
//! All functions operate on single-band rasters (one band per raster) and
//! emit NaN no-data wherever an input pixel is no-data or a denominator
//! vanishes; infinities never leave this module.

use crate::bands::{Band, BandSet};
use crate::maybe_rayon::*;
use agniscan_core::raster::Raster;
use agniscan_core::{ensure_same_grid, Error, Result};
use ndarray::Array2;

/// Charcoal reference reflectance for the red band in BAI
pub const BAI_RED_REF: f64 = 0.1;
/// Charcoal reference reflectance for the NIR band in BAI
pub const BAI_NIR_REF: f64 = 0.06;

/// The three spectral indicators consumed by the triple-check fusion.
///
/// All three share the grid of the input bands.
#[derive(Debug, Clone)]
pub struct IndexStack {
    /// Differenced Normalized Burn Ratio (pre minus post)
    pub dnbr: Raster<f64>,
    /// Burn Area Index of the post-fire acquisition
    pub bai: Raster<f64>,
    /// Differenced NDVI (pre minus post)
    pub dndvi: Raster<f64>,
}

impl IndexStack {
    /// Grid identity shared by the three indices
    pub fn descriptor(&self) -> agniscan_core::raster::GridDescriptor {
        self.dnbr.descriptor()
    }
}

// ---------------------------------------------------------------------------
// Generic normalized difference
// ---------------------------------------------------------------------------

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Result is in the range [-1, 1]. Pixels where the denominator vanishes
/// or either input is nodata are set to NaN.
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    check_grids("normalized difference inputs", band_a, band_b)?;

    let (rows, cols) = band_a.shape();
    let nodata_a = band_a.nodata();
    let nodata_b = band_b.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };

                if is_nodata_f64(a, nodata_a) || is_nodata_f64(b, nodata_b) {
                    continue;
                }

                let sum = a + b;
                if sum.abs() < 1e-10 {
                    continue; // Avoid division by zero
                }

                row_data[col] = (a - b) / sum;
            }
            row_data
        })
        .collect();

    build_output(band_a, rows, cols, data)
}

// ---------------------------------------------------------------------------
// NBR / NDVI
// ---------------------------------------------------------------------------

/// Normalized Burn Ratio
///
/// `NBR = (NIR - SWIR) / (NIR + SWIR)`
///
/// Healthy vegetation scores high; burn scars drop sharply because charred
/// surfaces reflect strongly in SWIR and weakly in NIR.
pub fn nbr(nir: &Raster<f64>, swir: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, swir)
}

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, red)
}

// ---------------------------------------------------------------------------
// BAI
// ---------------------------------------------------------------------------

/// Burn Area Index (Chuvieco & Martin)
///
/// `BAI = 1 / ((0.1 - Red)^2 + (0.06 - NIR)^2)`
///
/// Measures spectral distance to the charcoal reference point; large values
/// mean char/ash-like reflectance. Computed on the post-fire acquisition
/// only.
pub fn bai(red: &Raster<f64>, nir: &Raster<f64>) -> Result<Raster<f64>> {
    check_grids("BAI inputs", red, nir)?;

    let (rows, cols) = red.shape();
    let nodata_red = red.nodata();
    let nodata_nir = nir.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let r = unsafe { red.get_unchecked(row, col) };
                let n = unsafe { nir.get_unchecked(row, col) };

                if is_nodata_f64(r, nodata_red) || is_nodata_f64(n, nodata_nir) {
                    continue;
                }

                let dr = BAI_RED_REF - r;
                let dn = BAI_NIR_REF - n;
                let denom = dr * dr + dn * dn;
                if denom < 1e-10 {
                    continue; // Pixel sits on the reference point
                }

                row_data[col] = 1.0 / denom;
            }
            row_data
        })
        .collect();

    build_output(red, rows, cols, data)
}

// ---------------------------------------------------------------------------
// Differencing
// ---------------------------------------------------------------------------

/// Difference two index rasters: `pre - post`
///
/// NaN in either input propagates to the output.
pub fn index_difference(pre: &Raster<f64>, post: &Raster<f64>) -> Result<Raster<f64>> {
    check_grids("index difference inputs", pre, post)?;

    let (rows, cols) = pre.shape();
    let nodata_pre = pre.nodata();
    let nodata_post = post.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let before = unsafe { pre.get_unchecked(row, col) };
                let after = unsafe { post.get_unchecked(row, col) };

                if is_nodata_f64(before, nodata_pre) || is_nodata_f64(after, nodata_post) {
                    continue;
                }

                row_data[col] = before - after;
            }
            row_data
        })
        .collect();

    build_output(pre, rows, cols, data)
}

// ---------------------------------------------------------------------------
// Index stack
// ---------------------------------------------------------------------------

/// Compute the full indicator stack from two aligned acquisitions.
///
/// Enforces that all six bands share one grid before any arithmetic;
/// a missing band or mismatched grid is fatal.
pub fn compute_indices(pre: &BandSet, post: &BandSet) -> Result<IndexStack> {
    let grid = post.band(Band::Nir)?.descriptor();
    pre.ensure_grid(&grid)?;
    post.ensure_grid(&grid)?;

    let nbr_pre = nbr(pre.band(Band::Nir)?, pre.band(Band::Swir)?)?;
    let nbr_post = nbr(post.band(Band::Nir)?, post.band(Band::Swir)?)?;
    let dnbr = index_difference(&nbr_pre, &nbr_post)?;

    let ndvi_pre = ndvi(pre.band(Band::Nir)?, pre.band(Band::Red)?)?;
    let ndvi_post = ndvi(post.band(Band::Nir)?, post.band(Band::Red)?)?;
    let dndvi = index_difference(&ndvi_pre, &ndvi_post)?;

    let bai_post = bai(post.band(Band::Red)?, post.band(Band::Nir)?)?;

    Ok(IndexStack {
        dnbr,
        bai: bai_post,
        dndvi,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_nodata_f64(value: f64, nodata: Option<f64>) -> bool {
    if value.is_nan() {
        return true;
    }
    match nodata {
        Some(nd) => (value - nd).abs() < f64::EPSILON,
        None => false,
    }
}

fn check_grids(context: &str, a: &Raster<f64>, b: &Raster<f64>) -> Result<()> {
    ensure_same_grid(context, &a.descriptor(), &b.descriptor())
}

fn build_output(
    template: &Raster<f64>,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
) -> Result<Raster<f64>> {
    let mut output = template.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::Acquisition;
    use agniscan_core::GeoTransform;
    use approx::assert_relative_eq;

    fn make_band(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    #[test]
    fn test_normalized_difference_basic() {
        let a = make_band(5, 5, 0.8);
        let b = make_band(5, 5, 0.2);

        let result = normalized_difference(&a, &b).unwrap();
        let val = result.get(2, 2).unwrap();

        // (0.8 - 0.2) / (0.8 + 0.2) = 0.6
        assert!((val - 0.6).abs() < 1e-10, "Expected 0.6, got {}", val);
    }

    #[test]
    fn test_normalized_difference_zero_denominator() {
        let a = make_band(3, 3, 0.5);
        let b = make_band(3, 3, -0.5);

        let result = normalized_difference(&a, &b).unwrap();
        let val = result.get(1, 1).unwrap();

        assert!(val.is_nan(), "Vanishing denominator should be NaN, got {}", val);
    }

    #[test]
    fn test_nbr_burn_drop() {
        // Healthy vegetation: high NIR, low SWIR
        let nbr_healthy = nbr(&make_band(3, 3, 0.6), &make_band(3, 3, 0.2)).unwrap();
        // Burned: NIR collapses, SWIR rises
        let nbr_burned = nbr(&make_band(3, 3, 0.15), &make_band(3, 3, 0.35)).unwrap();

        let healthy = nbr_healthy.get(1, 1).unwrap();
        let burned = nbr_burned.get(1, 1).unwrap();
        assert!(
            healthy > burned,
            "NBR must drop after a burn: {} vs {}",
            healthy,
            burned
        );
    }

    #[test]
    fn test_bai_charcoal_peak() {
        // Reflectance near the charcoal reference point scores high
        let near = bai(&make_band(3, 3, 0.12), &make_band(3, 3, 0.08)).unwrap();
        // Green vegetation is far away from it
        let far = bai(&make_band(3, 3, 0.05), &make_band(3, 3, 0.55)).unwrap();

        let near_val = near.get(1, 1).unwrap();
        let far_val = far.get(1, 1).unwrap();
        assert!(
            near_val > far_val,
            "BAI should peak near charcoal reflectance: {} vs {}",
            near_val,
            far_val
        );

        // Exact value: 1 / ((0.1-0.12)^2 + (0.06-0.08)^2) = 1250
        assert!(
            (near_val - 1250.0).abs() < 1e-6,
            "Expected 1250, got {}",
            near_val
        );
    }

    #[test]
    fn test_bai_reference_point_is_nodata() {
        let result = bai(&make_band(3, 3, BAI_RED_REF), &make_band(3, 3, BAI_NIR_REF)).unwrap();
        assert!(result.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_index_difference() {
        let pre = make_band(4, 4, 0.5);
        let post = make_band(4, 4, 0.1);

        let diff = index_difference(&pre, &post).unwrap();
        let val = diff.get(2, 2).unwrap();
        assert!((val - 0.4).abs() < 1e-10, "Expected 0.4, got {}", val);
    }

    #[test]
    fn test_nodata_propagates() {
        let mut nir = make_band(5, 5, 0.5);
        nir.set_nodata(Some(-9999.0));
        nir.set(2, 2, -9999.0).unwrap();

        let red = make_band(5, 5, 0.1);

        let result = ndvi(&nir, &red).unwrap();
        let val = result.get(2, 2).unwrap();

        assert!(val.is_nan(), "Nodata pixel should be NaN, got {}", val);
        assert!(!result.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_grid_mismatch() {
        let a = make_band(5, 5, 1.0);
        let b = make_band(5, 10, 1.0);

        let result = normalized_difference(&a, &b);
        assert!(result.is_err(), "Should fail on grid mismatch");
    }

    #[test]
    fn test_compute_indices_missing_band() {
        let pre = BandSet::new(Acquisition::PreFire)
            .with_band(Band::Red, make_band(3, 3, 0.2))
            .with_band(Band::Nir, make_band(3, 3, 0.6))
            .with_band(Band::Swir, make_band(3, 3, 0.2));
        // Post set lacks SWIR
        let post = BandSet::new(Acquisition::PostFire)
            .with_band(Band::Red, make_band(3, 3, 0.12))
            .with_band(Band::Nir, make_band(3, 3, 0.12));

        let err = compute_indices(&pre, &post).unwrap_err();
        let msg = err.to_string();
        assert!(
            msg.contains("post-fire") && msg.contains("swir"),
            "unexpected message: {}",
            msg
        );
    }

    #[test]
    fn test_compute_indices_values() {
        let pre = BandSet::new(Acquisition::PreFire)
            .with_band(Band::Red, make_band(3, 3, 0.2))
            .with_band(Band::Nir, make_band(3, 3, 0.6))
            .with_band(Band::Swir, make_band(3, 3, 0.2));
        let post = BandSet::new(Acquisition::PostFire)
            .with_band(Band::Red, make_band(3, 3, 0.12))
            .with_band(Band::Nir, make_band(3, 3, 0.12))
            .with_band(Band::Swir, make_band(3, 3, 0.12));

        let stack = compute_indices(&pre, &post).unwrap();

        // NBR_pre = 0.4/0.8 = 0.5, NBR_post = 0 -> dNBR = 0.5
        assert_relative_eq!(stack.dnbr.get(1, 1).unwrap(), 0.5, epsilon = 1e-10);
        // NDVI_pre = 0.5, NDVI_post = 0 -> dNDVI = 0.5
        assert_relative_eq!(stack.dndvi.get(1, 1).unwrap(), 0.5, epsilon = 1e-10);
        // BAI = 1 / ((0.1-0.12)^2 + (0.06-0.12)^2) = 1/0.004 = 250
        assert_relative_eq!(stack.bai.get(1, 1).unwrap(), 250.0, epsilon = 1e-6);
    }
}
