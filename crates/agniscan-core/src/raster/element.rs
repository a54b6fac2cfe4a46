//! Cell value types

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Types a raster cell can hold.
///
/// Reflectance and index grids store `f64`, classification grids store
/// `u8` class codes. The implementations differ only in sentinel
/// semantics: floats treat NaN as missing whether or not a sentinel was
/// declared, integers only ever match an explicit code.
pub trait RasterElement:
    Copy + Debug + PartialOrd + NumCast + Zero + Send + Sync + 'static
{
    /// Sentinel for samples that cannot be represented in this type
    fn default_nodata() -> Self;

    /// Whether this value is missing data under the given sentinel
    fn is_nodata(self, nodata: Option<Self>) -> bool;

    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

impl RasterElement for f64 {
    fn default_nodata() -> Self {
        f64::NAN
    }

    fn is_nodata(self, nodata: Option<Self>) -> bool {
        if self.is_nan() {
            return true;
        }
        match nodata {
            Some(sentinel) => (self - sentinel).abs() < f64::EPSILON * 100.0,
            None => false,
        }
    }
}

impl RasterElement for u8 {
    fn default_nodata() -> Self {
        u8::MAX
    }

    fn is_nodata(self, nodata: Option<Self>) -> bool {
        nodata == Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_is_always_missing() {
        assert!(f64::NAN.is_nodata(None));
        assert!(f64::NAN.is_nodata(Some(-9999.0)));
        assert!(!0.0f64.is_nodata(None));
        assert!((-9999.0f64).is_nodata(Some(-9999.0)));
    }

    #[test]
    fn test_code_needs_explicit_sentinel() {
        assert!(!255u8.is_nodata(None));
        assert!(255u8.is_nodata(Some(255)));
        assert!(!4u8.is_nodata(Some(255)));
    }
}
