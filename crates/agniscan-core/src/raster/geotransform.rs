//! Affine georeferencing
//!
//! Scene grids in this crate are georeferenced with the usual six-parameter
//! affine model. Satellite products are delivered north-up, so the rotation
//! terms are almost always zero, but the math keeps them so that nothing
//! breaks on the odd rotated tile.

/// Mapping between pixel indices and map coordinates.
///
/// ```text
/// x = origin_x + col * pixel_width  + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// The origin is the outer corner of pixel (0, 0). A north-up grid has a
/// positive `pixel_width`, a negative `pixel_height` and zero rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// Map x of the grid's upper-left corner
    pub origin_x: f64,
    /// Map y of the grid's upper-left corner
    pub origin_y: f64,
    /// Column step in map units
    pub pixel_width: f64,
    /// Row step in map units, negative when north is up
    pub pixel_height: f64,
    /// Row shear term, zero for north-up grids
    pub row_rotation: f64,
    /// Column shear term, zero for north-up grids
    pub col_rotation: f64,
}

impl GeoTransform {
    /// North-up transform from an origin and the two pixel steps
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width + row * self.row_rotation,
            self.origin_y + col * self.col_rotation + row * self.pixel_height,
        )
    }

    /// Map coordinates of a pixel's center.
    ///
    /// Centers are what area aggregation tests against a polygon, so the
    /// half-pixel offset lives here and nowhere else.
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Map coordinates of a pixel's upper-left corner
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64, row as f64)
    }

    /// Fractional pixel position of a map coordinate.
    ///
    /// Inverts the affine model; callers floor the result to get indices.
    /// A transform whose determinant vanishes has no inverse and yields
    /// NaN coordinates.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;
        if det.abs() < 1e-10 {
            return (f64::NAN, f64::NAN);
        }

        let rel_x = x - self.origin_x;
        let rel_y = y - self.origin_y;
        let col = (rel_x * self.pixel_height - rel_y * self.row_rotation) / det;
        let row = (rel_y * self.pixel_width - rel_x * self.col_rotation) / det;
        (col, row)
    }

    /// Edge length of a pixel, assuming square cells
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Ground area of one pixel in squared map units.
    ///
    /// This is the absolute determinant of the affine model, so it stays
    /// correct for rotated grids too.
    pub fn cell_area(&self) -> f64 {
        (self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation).abs()
    }

    /// Extent of a `width` x `height` grid as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        let corners = [
            self.pixel_to_geo_corner(0, 0),
            self.pixel_to_geo_corner(width, 0),
            self.pixel_to_geo_corner(0, height),
            self.pixel_to_geo_corner(width, height),
        ];

        let mut bounds = (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in corners {
            bounds.0 = bounds.0.min(x);
            bounds.1 = bounds.1.min(y);
            bounds.2 = bounds.2.max(x);
            bounds.3 = bounds.3.max(y);
        }
        bounds
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}
