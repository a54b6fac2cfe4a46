//! Band bookkeeping for paired acquisitions
//!
//! The burn indices need three bands per acquisition. `BandSet` keys them
//! by [`Band`] so a missing input surfaces as a proper error instead of a
//! positional mix-up.

use std::collections::HashMap;
use std::fmt;

use agniscan_core::raster::{GridDescriptor, Raster};
use agniscan_core::{ensure_same_grid, Error, Result};

/// Spectral bands consumed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// Visible red
    Red,
    /// Near-infrared
    Nir,
    /// Shortwave infrared
    Swir,
}

impl Band {
    /// All bands required for one acquisition, in a fixed order.
    pub const ALL: [Band; 3] = [Band::Red, Band::Nir, Band::Swir];

    /// Sentinel-2 designation for this band (20 m resolution set)
    pub fn sentinel2(&self) -> &'static str {
        match self {
            Band::Red => "B04",
            Band::Nir => "B08",
            Band::Swir => "B12",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Band::Red => "red",
            Band::Nir => "nir",
            Band::Swir => "swir",
        };
        write!(f, "{}", name)
    }
}

/// Which side of the burn window an acquisition covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Acquisition {
    PreFire,
    PostFire,
}

impl fmt::Display for Acquisition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Acquisition::PreFire => "pre-fire",
            Acquisition::PostFire => "post-fire",
        };
        write!(f, "{}", name)
    }
}

/// The band rasters of one acquisition.
#[derive(Debug, Clone)]
pub struct BandSet {
    acquisition: Acquisition,
    bands: HashMap<Band, Raster<f64>>,
}

impl BandSet {
    /// Create an empty band set for an acquisition
    pub fn new(acquisition: Acquisition) -> Self {
        Self {
            acquisition,
            bands: HashMap::new(),
        }
    }

    /// Which acquisition this set belongs to
    pub fn acquisition(&self) -> Acquisition {
        self.acquisition
    }

    /// Insert or replace a band raster
    pub fn insert(&mut self, band: Band, raster: Raster<f64>) {
        self.bands.insert(band, raster);
    }

    /// Builder-style insert
    pub fn with_band(mut self, band: Band, raster: Raster<f64>) -> Self {
        self.insert(band, raster);
        self
    }

    /// Look up a band, failing with `MissingBand` when absent
    pub fn band(&self, band: Band) -> Result<&Raster<f64>> {
        self.bands.get(&band).ok_or_else(|| Error::MissingBand {
            acquisition: self.acquisition.to_string(),
            band: band.to_string(),
        })
    }

    /// Grid descriptor of this set, from the first present band in
    /// `Band::ALL` order
    pub fn descriptor(&self) -> Option<GridDescriptor> {
        Band::ALL
            .iter()
            .find_map(|band| self.bands.get(band))
            .map(|raster| raster.descriptor())
    }

    /// Verify that every required band is present and on the expected grid
    pub fn ensure_grid(&self, expected: &GridDescriptor) -> Result<()> {
        for band in Band::ALL {
            let raster = self.band(band)?;
            let context = format!("{} {} band", self.acquisition, band);
            ensure_same_grid(&context, expected, &raster.descriptor())?;
        }
        Ok(())
    }
}
