//! Imagery and land-cover acquisition seams
//!
//! The pipeline itself never talks to a catalog or archive; callers hand
//! it rasters. These traits are the seam where real providers (STAC
//! catalogs, tile archives, test fixtures) plug in, plus the date
//! conventions for picking a pre-fire baseline.

use crate::bands::{Acquisition, Band, BandSet};
use agniscan_core::raster::{GridDescriptor, Raster};
use agniscan_core::{ensure_same_grid, Error, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Days between the end of the pre-fire baseline and the fire window start
pub const PRE_FIRE_GAP_DAYS: i64 = 15;
/// Length of the pre-fire baseline in days
pub const PRE_FIRE_SPAN_DAYS: i64 = 60;

// ---------------------------------------------------------------------------
// Acquisition window
// ---------------------------------------------------------------------------

/// Closed date interval for selecting imagery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl AcquisitionWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<AcquisitionWindow> {
        if start > end {
            return Err(Error::InvalidParameter {
                name: "acquisition_window",
                value: format!("{} to {}", start, end),
                reason: "start date is after end date".to_string(),
            });
        }
        Ok(AcquisitionWindow { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Baseline window for this fire window.
    ///
    /// Ends [`PRE_FIRE_GAP_DAYS`] before the fire window starts and spans
    /// [`PRE_FIRE_SPAN_DAYS`], long enough to find a cloud-free scene
    /// while the gap keeps early fire activity out of the baseline.
    pub fn pre_fire_window(&self) -> AcquisitionWindow {
        AcquisitionWindow {
            start: self.start - Duration::days(PRE_FIRE_SPAN_DAYS),
            end: self.start - Duration::days(PRE_FIRE_GAP_DAYS),
        }
    }
}

impl fmt::Display for AcquisitionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Provider traits
// ---------------------------------------------------------------------------

/// Provider of single-band surface reflectance rasters.
///
/// Implementations resolve a window, acquisition role and band to one
/// raster on the requested grid (compositing, cloud filtering and
/// resampling are the provider's business).
pub trait ImagerySource {
    fn fetch(
        &self,
        window: &AcquisitionWindow,
        acquisition: Acquisition,
        band: Band,
        grid: &GridDescriptor,
    ) -> Result<Raster<f64>>;

    /// Fetch all bands the pipeline needs for one acquisition
    fn fetch_band_set(
        &self,
        window: &AcquisitionWindow,
        acquisition: Acquisition,
        grid: &GridDescriptor,
    ) -> Result<BandSet> {
        let mut set = BandSet::new(acquisition);
        for band in Band::ALL {
            set.insert(band, self.fetch(window, acquisition, band, grid)?);
        }
        Ok(set)
    }
}

/// Provider of agricultural land-cover masks.
///
/// Land-cover products are released annually and lag the calendar, so a
/// fire year may have no product of its own yet.
pub trait LandCoverSource {
    /// Most recent year a product exists for
    fn latest_year(&self) -> i32;

    /// Farmland mask for a product year on the requested grid
    fn agricultural_mask(&self, year: i32, grid: &GridDescriptor) -> Result<Raster<u8>>;

    /// Snap a requested year back to the newest available product
    fn clamp_year(&self, year: i32) -> i32 {
        year.min(self.latest_year())
    }
}

// ---------------------------------------------------------------------------
// In-memory fixtures
// ---------------------------------------------------------------------------

/// [`ImagerySource`] backed by preloaded rasters, for tests and offline
/// runs. Fixtures have no archive to search, so the window is ignored.
#[derive(Debug, Clone, Default)]
pub struct FixtureImagery {
    bands: HashMap<(Acquisition, Band), Raster<f64>>,
}

impl FixtureImagery {
    pub fn new() -> FixtureImagery {
        FixtureImagery {
            bands: HashMap::new(),
        }
    }

    pub fn insert(&mut self, acquisition: Acquisition, band: Band, raster: Raster<f64>) {
        self.bands.insert((acquisition, band), raster);
    }

    pub fn with_band(mut self, acquisition: Acquisition, band: Band, raster: Raster<f64>) -> Self {
        self.insert(acquisition, band, raster);
        self
    }
}

impl ImagerySource for FixtureImagery {
    fn fetch(
        &self,
        _window: &AcquisitionWindow,
        acquisition: Acquisition,
        band: Band,
        grid: &GridDescriptor,
    ) -> Result<Raster<f64>> {
        let raster = self
            .bands
            .get(&(acquisition, band))
            .ok_or_else(|| Error::MissingBand {
                acquisition: acquisition.to_string(),
                band: band.to_string(),
            })?;
        ensure_same_grid(
            &format!("{} {} band", acquisition, band),
            grid,
            &raster.descriptor(),
        )?;
        Ok(raster.clone())
    }
}

/// [`LandCoverSource`] backed by one preloaded mask
#[derive(Debug, Clone)]
pub struct FixtureLandCover {
    mask: Raster<u8>,
    latest_year: i32,
}

impl FixtureLandCover {
    pub fn new(mask: Raster<u8>, latest_year: i32) -> FixtureLandCover {
        FixtureLandCover { mask, latest_year }
    }
}

impl LandCoverSource for FixtureLandCover {
    fn latest_year(&self) -> i32 {
        self.latest_year
    }

    fn agricultural_mask(&self, _year: i32, grid: &GridDescriptor) -> Result<Raster<u8>> {
        ensure_same_grid("agricultural mask", grid, &self.mask.descriptor())?;
        Ok(self.mask.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agniscan_core::GeoTransform;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_band(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    #[test]
    fn test_window_rejects_inverted_dates() {
        assert!(AcquisitionWindow::new(date(2023, 11, 20), date(2023, 11, 10)).is_err());
        assert!(AcquisitionWindow::new(date(2023, 11, 10), date(2023, 11, 10)).is_ok());
    }

    #[test]
    fn test_pre_fire_window() {
        let fire = AcquisitionWindow::new(date(2023, 11, 15), date(2023, 12, 1)).unwrap();
        let baseline = fire.pre_fire_window();

        assert_eq!(baseline.start(), date(2023, 9, 16));
        assert_eq!(baseline.end(), date(2023, 10, 31));
    }

    #[test]
    fn test_fixture_fetch_band_set() {
        let window = AcquisitionWindow::new(date(2023, 11, 1), date(2023, 11, 30)).unwrap();
        let grid = make_band(2, 2, 0.0).descriptor();

        let source = FixtureImagery::new()
            .with_band(Acquisition::PostFire, Band::Red, make_band(2, 2, 0.1))
            .with_band(Acquisition::PostFire, Band::Nir, make_band(2, 2, 0.2))
            .with_band(Acquisition::PostFire, Band::Swir, make_band(2, 2, 0.3));

        let set = source
            .fetch_band_set(&window, Acquisition::PostFire, &grid)
            .unwrap();
        assert!((set.band(Band::Swir).unwrap().get(0, 0).unwrap() - 0.3).abs() < 1e-10);

        // Pre-fire side was never loaded
        let err = source
            .fetch_band_set(&window, Acquisition::PreFire, &grid)
            .unwrap_err();
        assert!(err.to_string().contains("pre-fire"));
    }

    #[test]
    fn test_fixture_fetch_grid_mismatch() {
        let window = AcquisitionWindow::new(date(2023, 11, 1), date(2023, 11, 30)).unwrap();
        let source =
            FixtureImagery::new().with_band(Acquisition::PostFire, Band::Red, make_band(2, 2, 0.1));

        let wrong_grid = make_band(4, 4, 0.0).descriptor();
        assert!(source
            .fetch(&window, Acquisition::PostFire, Band::Red, &wrong_grid)
            .is_err());
    }

    #[test]
    fn test_land_cover_year_clamp() {
        let fixture = FixtureLandCover::new(Raster::filled(2, 2, 1u8), 2023);
        assert_eq!(fixture.clamp_year(2025), 2023);
        assert_eq!(fixture.clamp_year(2020), 2020);
    }
}
