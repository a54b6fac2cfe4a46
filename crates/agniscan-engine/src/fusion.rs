//! Triple-check fusion
//!
//! Combines the three thresholded indicators into one classification. A
//! pixel keeps its dNBR severity only when dNBR, BAI and dNDVI all call it
//! burned; partial agreement demotes it to unburned. The per-pixel
//! agreement count is retained alongside the fused severity so downstream
//! reporting can distinguish confident unburned pixels from demoted ones.

use crate::maybe_rayon::*;
use crate::severity::{BurnVerdict, SeverityClass, NODATA_CODE};
use agniscan_core::raster::{GridDescriptor, Raster};
use agniscan_core::{ensure_same_grid, Error, Result};
use ndarray::Array2;

/// Agreement count at which a pixel keeps its severity
pub const FULL_AGREEMENT: u8 = 3;

/// Output of the triple-check fusion: fused severity plus the per-pixel
/// count of indicators that called the pixel burned.
///
/// Both rasters share the input grid. Severity uses [`SeverityClass`]
/// codes with [`NODATA_CODE`] for excluded pixels; agreement is 0 to 3
/// everywhere, including no-data pixels.
#[derive(Debug, Clone)]
pub struct FusedClassification {
    pub severity: Raster<u8>,
    pub agreement: Raster<u8>,
}

impl FusedClassification {
    /// Grid identity shared by both rasters
    pub fn descriptor(&self) -> GridDescriptor {
        self.severity.descriptor()
    }

    /// Fused severity class at a pixel; `None` for no-data
    pub fn severity_at(&self, row: usize, col: usize) -> Result<Option<SeverityClass>> {
        let code = self.severity.get(row, col)?;
        Ok(SeverityClass::from_code(code))
    }

    /// Agreement count at a pixel
    pub fn agreement_at(&self, row: usize, col: usize) -> Result<u8> {
        self.agreement.get(row, col)
    }
}

/// Fuse the three thresholded indicator rasters.
///
/// `severity` carries [`SeverityClass`] codes from the dNBR channel;
/// `bai` and `dndvi` carry [`BurnVerdict`] codes. Any indicator at
/// [`NODATA_CODE`] makes the fused pixel no-data with agreement 0.
pub fn fuse(
    severity: &Raster<u8>,
    bai: &Raster<u8>,
    dndvi: &Raster<u8>,
) -> Result<FusedClassification> {
    let grid = severity.descriptor();
    ensure_same_grid("BAI verdict", &grid, &bai.descriptor())?;
    ensure_same_grid("dNDVI verdict", &grid, &dndvi.descriptor())?;

    let (rows, cols) = severity.shape();
    let burned_code = BurnVerdict::Burned.code();
    let unburned_code = SeverityClass::Unburned.code();

    let pairs: Vec<(u8, u8)> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![(NODATA_CODE, 0u8); cols];
            for col in 0..cols {
                let sev = unsafe { severity.get_unchecked(row, col) };
                let bai_v = unsafe { bai.get_unchecked(row, col) };
                let ndvi_v = unsafe { dndvi.get_unchecked(row, col) };

                if sev == NODATA_CODE || bai_v == NODATA_CODE || ndvi_v == NODATA_CODE {
                    continue;
                }

                let dnbr_burned = sev != unburned_code;
                let agreement = dnbr_burned as u8
                    + (bai_v == burned_code) as u8
                    + (ndvi_v == burned_code) as u8;

                let fused = if agreement == FULL_AGREEMENT {
                    sev
                } else {
                    unburned_code
                };
                row_data[col] = (fused, agreement);
            }
            row_data
        })
        .collect();

    let (severity_data, agreement_data): (Vec<u8>, Vec<u8>) = pairs.into_iter().unzip();

    let mut fused_severity = severity.with_same_meta::<u8>(rows, cols);
    fused_severity.set_nodata(Some(NODATA_CODE));
    *fused_severity.data_mut() = Array2::from_shape_vec((rows, cols), severity_data)
        .map_err(|e| Error::Other(e.to_string()))?;

    let mut agreement = severity.with_same_meta::<u8>(rows, cols);
    *agreement.data_mut() = Array2::from_shape_vec((rows, cols), agreement_data)
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(FusedClassification {
        severity: fused_severity,
        agreement,
    })
}
