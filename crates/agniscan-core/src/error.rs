//! Workspace-wide error type

use thiserror::Error;

/// Anything that can fail while reading, aligning or classifying rasters.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tiff(#[from] tiff::TiffError),

    #[error("Cell data does not fill a {width}x{height} grid")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Cell ({row}, {col}) lies outside the {rows}x{cols} grid")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Grid mismatch for {context}: expected {expected}, got {actual}")]
    GridMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    #[error("{acquisition} acquisition is missing the {band} band")]
    MissingBand { acquisition: String, band: String },

    #[error("Invalid ROI geometry: {0}")]
    InvalidRoi(String),

    #[error("Invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unsupported TIFF sample format")]
    UnsupportedSample,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
