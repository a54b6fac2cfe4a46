//! # agniscan core
//!
//! Raster substrate for the agniscan burn-scar mapper.
//!
//! This crate provides:
//! - `Raster<T>`: generic georeferenced raster grid
//! - `GeoTransform`: affine transformation for georeferencing
//! - `GridDescriptor`: the identity under which rasters may be combined
//! - `CRS`: coordinate reference system tags
//! - Native GeoTIFF reading and writing
//!
//! It knows nothing about burn indices or classification; those live in
//! `agniscan-engine`.

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{ensure_same_grid, GeoTransform, GridDescriptor, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{
        ensure_same_grid, GeoTransform, GridDescriptor, Raster, RasterElement,
    };
}
