//! I/O operations for reading and writing geospatial data

mod native;

pub use native::{read_geotiff, write_geotiff, write_geotiff_u8};
