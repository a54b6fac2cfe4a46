//! Raster data structures and operations

mod descriptor;
mod element;
mod geotransform;
mod grid;

pub use descriptor::{ensure_same_grid, GridDescriptor};
pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};
