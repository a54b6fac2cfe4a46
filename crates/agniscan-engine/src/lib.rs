//! # agniscan engine
//!
//! Multi-index fusion classification of agricultural stubble-burn scars.
//!
//! The engine takes paired pre-/post-fire RED/NIR/SWIR acquisitions plus a
//! farmland mask and produces a per-pixel burn severity raster with an
//! agreement count, then aggregates it over regions of interest:
//!
//! 1. **indices**: dNBR, BAI and dNDVI from the raw bands
//! 2. **mask**: restriction of the indices to farmland pixels
//! 3. **threshold**: per-index categorical classification
//! 4. **fusion**: triple-check agreement fusion into one severity
//! 5. **summary**: per-ROI area and agreement statistics
//!
//! Every stage is a pure function over immutable rasters; outputs are
//! bit-identical whether or not the `parallel` feature is enabled.

pub mod bands;
pub mod fusion;
pub mod indices;
pub mod mask;
mod maybe_rayon;
pub mod pipeline;
pub mod roi;
pub mod severity;
pub mod source;
pub mod summary;
pub mod threshold;

pub use bands::{Acquisition, Band, BandSet};
pub use fusion::{fuse, FusedClassification};
pub use indices::{compute_indices, IndexStack};
pub use mask::apply_mask;
pub use pipeline::{classify, classify_with_indices};
pub use severity::{BurnVerdict, ClassifierConfig, SeverityClass, SeverityScale};
pub use summary::{summarize, summarize_batch, AnalysisSummary, ClassArea};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bands::{Acquisition, Band, BandSet};
    pub use crate::fusion::{fuse, FusedClassification};
    pub use crate::indices::{compute_indices, IndexStack};
    pub use crate::mask::apply_mask;
    pub use crate::pipeline::{classify, classify_with_indices};
    pub use crate::severity::{BurnVerdict, ClassifierConfig, SeverityClass, SeverityScale};
    pub use crate::source::{AcquisitionWindow, ImagerySource, LandCoverSource};
    pub use crate::summary::{summarize, summarize_batch, AnalysisSummary, ClassArea};
    pub use agniscan_core::prelude::*;
}
