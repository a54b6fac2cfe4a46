//! The raster grid type

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, GridDescriptor, RasterElement};
use ndarray::Array2;

/// A single-band georeferenced grid.
///
/// Cells live in a row-major `ndarray` array; the transform and optional
/// CRS tie them to map coordinates, and an optional sentinel marks cells
/// that carry no measurement. Reflectance bands and spectral indices use
/// `Raster<f64>` with NaN as the sentinel, classification products use
/// `Raster<u8>` with an explicit code.
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    data: Array2<T>,
    transform: GeoTransform,
    crs: Option<CRS>,
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Zero-filled raster with default georeferencing
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::zero())
    }

    /// Raster with every cell set to `value`
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
            transform: GeoTransform::default(),
            crs: None,
            nodata: None,
        }
    }

    /// Build a raster from row-major cell values.
    ///
    /// Fails when the vector does not hold exactly `rows * cols` cells.
    pub fn from_vec(cells: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        let data = Array2::from_shape_vec((rows, cols), cells).map_err(|_| {
            Error::InvalidDimensions {
                width: cols,
                height: rows,
            }
        })?;
        Ok(Self {
            data,
            transform: GeoTransform::default(),
            crs: None,
            nodata: None,
        })
    }

    /// Zero-filled raster of another element type on this raster's grid.
    ///
    /// Carries the transform and CRS over but not the no-data sentinel,
    /// which rarely survives a change of element type.
    pub fn with_same_meta<U: RasterElement>(&self, rows: usize, cols: usize) -> Raster<U> {
        Raster {
            data: Array2::zeros((rows, cols)),
            transform: self.transform,
            crs: self.crs,
            nodata: None,
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total cell count
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cell value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Cell value at (row, col) without bounds checking.
    ///
    /// # Safety
    /// `row` and `col` must be inside the grid.
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        unsafe { *self.data.uget((row, col)) }
    }

    /// Write a cell at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            }),
        }
    }

    /// Write a cell at (row, col) without bounds checking.
    ///
    /// # Safety
    /// `row` and `col` must be inside the grid.
    pub unsafe fn set_unchecked(&mut self, row: usize, col: usize, value: T) {
        unsafe {
            *self.data.uget_mut((row, col)) = value;
        }
    }

    /// Borrow the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Mutably borrow the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    pub fn crs(&self) -> Option<CRS> {
        self.crs
    }

    pub fn set_crs(&mut self, crs: Option<CRS>) {
        self.crs = crs;
    }

    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// The identity under which this raster may be combined with others
    pub fn descriptor(&self) -> GridDescriptor {
        GridDescriptor {
            rows: self.rows(),
            cols: self.cols(),
            transform: self.transform,
            crs: self.crs,
        }
    }

    /// Pixel edge length in map units
    pub fn cell_size(&self) -> f64 {
        self.transform.cell_size()
    }

    /// Extent as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }

    /// Whether `value` is this raster's no-data sentinel
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Min, max, mean and valid-cell count over the grid.
    ///
    /// No-data cells are excluded from every figure.
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum = 0.0;
        let mut valid = 0usize;

        for &value in self.data.iter() {
            if self.is_nodata(value) {
                continue;
            }
            if min.is_none_or(|m| value < m) {
                min = Some(value);
            }
            if max.is_none_or(|m| value > m) {
                max = Some(value);
            }
            if let Some(v) = value.to_f64() {
                sum += v;
                valid += 1;
            }
        }

        let mean = if valid > 0 {
            Some(sum / valid as f64)
        } else {
            None
        };

        RasterStatistics {
            min,
            max,
            mean,
            valid_count: valid,
            nodata_count: self.len() - valid,
        }
    }
}

/// Summary figures over one raster's cells
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_shapes() {
        let zeros: Raster<f64> = Raster::new(6, 9);
        assert_eq!(zeros.shape(), (6, 9));
        assert_eq!(zeros.len(), 54);

        let ones: Raster<u8> = Raster::filled(2, 2, 1);
        assert_eq!(ones.get(1, 1).unwrap(), 1);
    }

    #[test]
    fn test_from_vec_requires_matching_length() {
        let ok = Raster::from_vec(vec![0.1, 0.2, 0.3, 0.4], 2, 2);
        assert!(ok.is_ok());

        let short = Raster::from_vec(vec![0.1, 0.2, 0.3], 2, 2);
        assert!(short.is_err(), "3 cells cannot fill a 2x2 grid");
    }

    #[test]
    fn test_access_bounds() {
        let mut raster: Raster<f64> = Raster::new(4, 4);
        raster.set(3, 3, 0.75).unwrap();

        assert_eq!(raster.get(3, 3).unwrap(), 0.75);
        assert!(raster.get(4, 0).is_err());
        assert!(raster.set(0, 4, 1.0).is_err());
    }

    #[test]
    fn test_statistics_skip_nodata() {
        let mut raster = Raster::from_vec(vec![0.1, 0.4, f64::NAN, 0.7], 2, 2).unwrap();
        raster.set_nodata(Some(f64::NAN));

        let stats = raster.statistics();
        assert_eq!(stats.min, Some(0.1));
        assert_eq!(stats.max, Some(0.7));
        assert_eq!(stats.valid_count, 3);
        assert_eq!(stats.nodata_count, 1);
        assert!((stats.mean.unwrap() - 0.4).abs() < 1e-10);
    }

    #[test]
    fn test_integer_code_sentinel() {
        let mut classes: Raster<u8> = Raster::filled(3, 3, 2);
        classes.set_nodata(Some(255));
        classes.set(0, 0, 255).unwrap();

        assert!(classes.is_nodata(255));
        assert!(!classes.is_nodata(2));
        assert_eq!(classes.statistics().valid_count, 8);
    }

    #[test]
    fn test_descriptor_carries_metadata() {
        let mut raster: Raster<f64> = Raster::new(8, 16);
        raster.set_transform(GeoTransform::new(600_000.0, 3_400_000.0, 20.0, -20.0));
        raster.set_crs(Some(CRS::from_epsg(32643)));

        let desc = raster.descriptor();
        assert_eq!(desc.rows, 8);
        assert_eq!(desc.cols, 16);
        assert_eq!(desc.transform.pixel_width, 20.0);
        assert_eq!(desc.crs.map(|c| c.epsg()), Some(32643));
    }

    #[test]
    fn test_with_same_meta_changes_type_keeps_grid() {
        let mut band: Raster<f64> = Raster::new(5, 5);
        band.set_transform(GeoTransform::new(0.0, 100.0, 20.0, -20.0));
        band.set_nodata(Some(f64::NAN));

        let classes: Raster<u8> = band.with_same_meta(5, 5);
        assert_eq!(classes.transform(), band.transform());
        assert_eq!(classes.nodata(), None, "sentinel must not carry over");
    }
}
