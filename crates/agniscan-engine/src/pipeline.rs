//! End-to-end classification pipeline
//!
//! Wires the stages together: spectral indices, agricultural masking,
//! per-index thresholding, triple-check fusion. Pixels outside the
//! agricultural mask come out as unburned with agreement 0, not as
//! no-data: the mask states they are known non-candidates, whereas
//! no-data means the inputs could not support a decision.

use crate::bands::BandSet;
use crate::fusion::{fuse, FusedClassification};
use crate::indices::{compute_indices, IndexStack};
use crate::mask::{apply_mask, FARMLAND};
use crate::severity::{ClassifierConfig, SeverityClass};
use crate::threshold::{classify_severity, classify_verdict};
use agniscan_core::raster::Raster;
use agniscan_core::Result;

/// Run the full classification for one scene pair.
///
/// `pre` and `post` must carry red, NIR and SWIR bands on one shared grid;
/// `agri_mask` marks farmland pixels with [`FARMLAND`] on that same grid.
pub fn classify(
    pre: &BandSet,
    post: &BandSet,
    agri_mask: &Raster<u8>,
    config: &ClassifierConfig,
) -> Result<FusedClassification> {
    let (classification, _) = classify_with_indices(pre, post, agri_mask, config)?;
    Ok(classification)
}

/// Like [`classify`], but also returns the masked indicator stack so
/// callers can export the intermediate dNBR, BAI and dNDVI rasters.
pub fn classify_with_indices(
    pre: &BandSet,
    post: &BandSet,
    agri_mask: &Raster<u8>,
    config: &ClassifierConfig,
) -> Result<(FusedClassification, IndexStack)> {
    config.validate()?;

    let indices = compute_indices(pre, post)?;
    let masked = apply_mask(&indices, agri_mask)?;

    let severity = classify_severity(&masked.dnbr, &config.severity_scale)?;
    let bai = classify_verdict(&masked.bai, config.bai_threshold)?;
    let dndvi = classify_verdict(&masked.dndvi, config.ndvi_threshold)?;

    let mut fused = fuse(&severity, &bai, &dndvi)?;
    settle_non_farmland(&mut fused, agri_mask);

    Ok((fused, masked))
}

/// Mark non-farmland pixels as unburned rather than no-data.
///
/// After masking, every pixel outside the farmland class reaches fusion
/// as no-data. Those pixels were deliberately excluded, so the final
/// product reports them as unburned with zero agreement.
fn settle_non_farmland(fused: &mut FusedClassification, agri_mask: &Raster<u8>) {
    let (rows, cols) = agri_mask.shape();
    let unburned = SeverityClass::Unburned.code();

    for row in 0..rows {
        for col in 0..cols {
            let m = unsafe { agri_mask.get_unchecked(row, col) };
            if !agri_mask.is_nodata(m) && m == FARMLAND {
                continue;
            }
            unsafe {
                fused.severity.set_unchecked(row, col, unburned);
                fused.agreement.set_unchecked(row, col, 0);
            }
        }
    }
}
