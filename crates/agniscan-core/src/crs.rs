//! Coordinate reference system identity

use std::fmt;

/// A coordinate reference system identified by its EPSG code.
///
/// Burn mapping runs on projected scene grids (UTM zones for Sentinel-2
/// products) where cell areas are meaningful in square metres. Nothing
/// here reprojects; the code exists so that rasters from different zones
/// refuse to combine. Grids without a recognizable code carry `None` at
/// the raster level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CRS(u32);

impl CRS {
    pub fn from_epsg(code: u32) -> Self {
        Self(code)
    }

    pub fn epsg(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}
