//! Severity classes, verdicts and classifier configuration
//!
//! Class rasters are integer-coded `Raster<u8>`; the codes here are the
//! on-disk contract for every exported classification product.

use agniscan_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved raster code for pixels excluded from classification
pub const NODATA_CODE: u8 = 255;

// ---------------------------------------------------------------------------
// Severity classes
// ---------------------------------------------------------------------------

/// Burn severity class on the USGS dNBR scale.
///
/// Codes 0 through 4 are ordered by increasing severity; [`NODATA_CODE`]
/// marks excluded pixels and never participates in ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityClass {
    Unburned,
    Low,
    ModerateLow,
    ModerateHigh,
    High,
}

impl SeverityClass {
    /// All classes in severity order
    pub const SCALE: [SeverityClass; 5] = [
        SeverityClass::Unburned,
        SeverityClass::Low,
        SeverityClass::ModerateLow,
        SeverityClass::ModerateHigh,
        SeverityClass::High,
    ];

    /// Raster code for this class
    pub fn code(self) -> u8 {
        match self {
            SeverityClass::Unburned => 0,
            SeverityClass::Low => 1,
            SeverityClass::ModerateLow => 2,
            SeverityClass::ModerateHigh => 3,
            SeverityClass::High => 4,
        }
    }

    /// Decode a raster code; [`NODATA_CODE`] and unknown codes give `None`
    pub fn from_code(code: u8) -> Option<SeverityClass> {
        match code {
            0 => Some(SeverityClass::Unburned),
            1 => Some(SeverityClass::Low),
            2 => Some(SeverityClass::ModerateLow),
            3 => Some(SeverityClass::ModerateHigh),
            4 => Some(SeverityClass::High),
            _ => None,
        }
    }

    /// Human-readable class name
    pub fn name(self) -> &'static str {
        match self {
            SeverityClass::Unburned => "unburned",
            SeverityClass::Low => "low",
            SeverityClass::ModerateLow => "moderate-low",
            SeverityClass::ModerateHigh => "moderate-high",
            SeverityClass::High => "high",
        }
    }

    /// Whether this class counts toward burned area
    pub fn is_burned(self) -> bool {
        !matches!(self, SeverityClass::Unburned)
    }
}

impl fmt::Display for SeverityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Binary verdicts
// ---------------------------------------------------------------------------

/// Binary outcome of a single corroborating indicator (BAI or dNDVI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnVerdict {
    NotBurned,
    Burned,
}

impl BurnVerdict {
    /// Raster code for this verdict
    pub fn code(self) -> u8 {
        match self {
            BurnVerdict::NotBurned => 0,
            BurnVerdict::Burned => 1,
        }
    }

    /// Decode a raster code
    pub fn from_code(code: u8) -> Option<BurnVerdict> {
        match code {
            0 => Some(BurnVerdict::NotBurned),
            1 => Some(BurnVerdict::Burned),
            _ => None,
        }
    }
}

impl fmt::Display for BurnVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurnVerdict::NotBurned => write!(f, "not burned"),
            BurnVerdict::Burned => write!(f, "burned"),
        }
    }
}

// ---------------------------------------------------------------------------
// Severity scale
// ---------------------------------------------------------------------------

/// One breakpoint of a severity scale: values strictly below `upper` that
/// did not match an earlier break fall into `class`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityBreak {
    pub upper: f64,
    pub class: SeverityClass,
}

/// Ordered dNBR breakpoints mapping index values to severity classes.
///
/// Breaks are tested in order; a value at or above every break falls into
/// `top`. The default is the USGS dNBR scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityScale {
    pub breaks: Vec<SeverityBreak>,
    pub top: SeverityClass,
}

impl SeverityScale {
    /// USGS dNBR severity thresholds
    pub fn usgs() -> SeverityScale {
        SeverityScale {
            breaks: vec![
                SeverityBreak {
                    upper: 0.10,
                    class: SeverityClass::Unburned,
                },
                SeverityBreak {
                    upper: 0.27,
                    class: SeverityClass::Low,
                },
                SeverityBreak {
                    upper: 0.44,
                    class: SeverityClass::ModerateLow,
                },
                SeverityBreak {
                    upper: 0.66,
                    class: SeverityClass::ModerateHigh,
                },
            ],
            top: SeverityClass::High,
        }
    }

    /// Map a dNBR value onto the scale
    pub fn classify(&self, value: f64) -> SeverityClass {
        for brk in &self.breaks {
            if value < brk.upper {
                return brk.class;
            }
        }
        self.top
    }

    /// Reject scales with non-finite or non-increasing breakpoints
    pub fn validate(&self) -> Result<()> {
        let mut previous = f64::NEG_INFINITY;
        for brk in &self.breaks {
            if !brk.upper.is_finite() {
                return Err(Error::InvalidParameter {
                    name: "severity_scale",
                    value: format!("{:?}", brk.upper),
                    reason: "breakpoints must be finite".to_string(),
                });
            }
            if brk.upper <= previous {
                return Err(Error::InvalidParameter {
                    name: "severity_scale",
                    value: format!("{:?}", brk.upper),
                    reason: "breakpoints must be strictly increasing".to_string(),
                });
            }
            previous = brk.upper;
        }
        Ok(())
    }
}

impl Default for SeverityScale {
    fn default() -> Self {
        SeverityScale::usgs()
    }
}

// ---------------------------------------------------------------------------
// Classifier configuration
// ---------------------------------------------------------------------------

/// Tunable thresholds of the classification pipeline.
///
/// The defaults reproduce the published stubble-burn setup: USGS dNBR
/// breakpoints, BAI at 89.0 and dNDVI at 0.2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// dNBR breakpoints for the severity channel
    pub severity_scale: SeverityScale,
    /// Minimum BAI for a pixel to corroborate a burn
    pub bai_threshold: f64,
    /// Minimum dNDVI for a pixel to corroborate a burn
    pub ndvi_threshold: f64,
}

impl ClassifierConfig {
    /// Reject configurations no classification run could honor
    pub fn validate(&self) -> Result<()> {
        self.severity_scale.validate()?;
        if !self.bai_threshold.is_finite() {
            return Err(Error::InvalidParameter {
                name: "bai_threshold",
                value: format!("{:?}", self.bai_threshold),
                reason: "threshold must be finite".to_string(),
            });
        }
        if !self.ndvi_threshold.is_finite() {
            return Err(Error::InvalidParameter {
                name: "ndvi_threshold",
                value: format!("{:?}", self.ndvi_threshold),
                reason: "threshold must be finite".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            severity_scale: SeverityScale::usgs(),
            bai_threshold: 89.0,
            ndvi_threshold: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_codes_roundtrip() {
        for class in SeverityClass::SCALE {
            assert_eq!(SeverityClass::from_code(class.code()), Some(class));
        }
        assert_eq!(SeverityClass::from_code(NODATA_CODE), None);
        assert_eq!(SeverityClass::from_code(5), None);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(SeverityClass::Unburned < SeverityClass::Low);
        assert!(SeverityClass::ModerateHigh < SeverityClass::High);
        assert!(!SeverityClass::Unburned.is_burned());
        assert!(SeverityClass::Low.is_burned());
    }

    #[test]
    fn test_usgs_breakpoints() {
        let scale = SeverityScale::usgs();

        assert_eq!(scale.classify(-0.3), SeverityClass::Unburned);
        assert_eq!(scale.classify(0.09), SeverityClass::Unburned);
        // Boundary values belong to the class above
        assert_eq!(scale.classify(0.10), SeverityClass::Low);
        assert_eq!(scale.classify(0.27), SeverityClass::ModerateLow);
        assert_eq!(scale.classify(0.44), SeverityClass::ModerateHigh);
        assert_eq!(scale.classify(0.66), SeverityClass::High);
        assert_eq!(scale.classify(1.2), SeverityClass::High);
    }

    #[test]
    fn test_scale_validation() {
        assert!(SeverityScale::usgs().validate().is_ok());

        let decreasing = SeverityScale {
            breaks: vec![
                SeverityBreak {
                    upper: 0.4,
                    class: SeverityClass::Unburned,
                },
                SeverityBreak {
                    upper: 0.1,
                    class: SeverityClass::Low,
                },
            ],
            top: SeverityClass::High,
        };
        assert!(decreasing.validate().is_err());

        let non_finite = SeverityScale {
            breaks: vec![SeverityBreak {
                upper: f64::NAN,
                class: SeverityClass::Unburned,
            }],
            top: SeverityClass::High,
        };
        assert!(non_finite.validate().is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = ClassifierConfig::default();
        assert!((config.bai_threshold - 89.0).abs() < 1e-10);
        assert!((config.ndvi_threshold - 0.2).abs() < 1e-10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_json() {
        // Omitted fields fall back to defaults
        let config: ClassifierConfig = serde_json::from_str(r#"{"bai_threshold": 120.0}"#).unwrap();
        assert!((config.bai_threshold - 120.0).abs() < 1e-10);
        assert!((config.ndvi_threshold - 0.2).abs() < 1e-10);
        assert_eq!(config.severity_scale, SeverityScale::usgs());
    }

    #[test]
    fn test_config_rejects_nan_threshold() {
        let config = ClassifierConfig {
            bai_threshold: f64::NAN,
            ..ClassifierConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
