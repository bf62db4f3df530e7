//! Age-band boundaries and derived per-band factors.
//!
//! Raw output buckets measurements into a fixed ordered sequence of age
//! bands. Band indices are 1-based: band 1 spans 0 to the first boundary,
//! band `i` spans `boundary[i-2]..boundary[i-1]`. The boundary sequence must
//! mirror the monitoring section of the scenario template.

use crate::error::{CoreError, CoreResult};

/// Default boundary sequence (years), matching the default template.
pub const DEFAULT_BOUNDARIES: [f64; 8] = [0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 100.0];

/// Validated, ordered age-band boundary sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeBands {
    boundaries: Vec<f64>,
}

impl AgeBands {
    pub fn new(boundaries: Vec<f64>) -> CoreResult<Self> {
        if boundaries.is_empty() {
            return Err(CoreError::InvalidBoundaries {
                what: "boundary sequence is empty".to_string(),
            });
        }
        for pair in boundaries.windows(2) {
            if pair[1] <= pair[0] {
                return Err(CoreError::InvalidBoundaries {
                    what: format!("not strictly increasing at {} -> {}", pair[0], pair[1]),
                });
            }
        }
        if boundaries[0] <= 0.0 {
            return Err(CoreError::InvalidBoundaries {
                what: format!("first boundary must be positive, got {}", boundaries[0]),
            });
        }
        Ok(Self { boundaries })
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Number of bands (one per boundary, the first spanning from 0).
    pub fn band_count(&self) -> usize {
        self.boundaries.len()
    }

    /// Upper boundary of a 1-based band index, if in range.
    pub fn upper(&self, band: u32) -> Option<f64> {
        if band == 0 {
            return None;
        }
        self.boundaries.get(band as usize - 1).copied()
    }

    /// Lower boundary of a 1-based band index, if in range.
    pub fn lower(&self, band: u32) -> Option<f64> {
        match band {
            0 => None,
            1 => Some(0.0),
            _ => self.boundaries.get(band as usize - 2).copied(),
        }
    }

    /// Reporting label, e.g. `0-0.5` or `5-10`.
    pub fn label(&self, band: u32) -> Option<String> {
        Some(format!("{}-{}", self.lower(band)?, self.upper(band)?))
    }

    /// Person-time correction factor for partial-year bands.
    ///
    /// Bands entirely above one year of age contribute full person-years;
    /// the sub-year bands contribute only their own width of the year, so
    /// the host-count denominator is scaled by the band's upper boundary.
    pub fn years_at_risk(&self, band: u32) -> Option<f64> {
        self.upper(band).map(|upper| upper.min(1.0))
    }
}

impl Default for AgeBands {
    fn default() -> Self {
        Self {
            boundaries: DEFAULT_BOUNDARIES.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_shape() {
        let bands = AgeBands::default();
        assert_eq!(bands.band_count(), 8);
        assert_eq!(bands.lower(1), Some(0.0));
        assert_eq!(bands.upper(1), Some(0.5));
        assert_eq!(bands.lower(3), Some(1.0));
        assert_eq!(bands.upper(8), Some(100.0));
        assert_eq!(bands.upper(9), None);
        assert_eq!(bands.upper(0), None);
    }

    #[test]
    fn labels() {
        let bands = AgeBands::default();
        assert_eq!(bands.label(1).unwrap(), "0-0.5");
        assert_eq!(bands.label(2).unwrap(), "0.5-1");
        assert_eq!(bands.label(5).unwrap(), "5-10");
    }

    #[test]
    fn years_at_risk_caps_at_one() {
        let bands = AgeBands::default();
        assert_eq!(bands.years_at_risk(1), Some(0.5));
        assert_eq!(bands.years_at_risk(2), Some(1.0));
        assert_eq!(bands.years_at_risk(3), Some(1.0));
        assert_eq!(bands.years_at_risk(8), Some(1.0));
    }

    #[test]
    fn rejects_bad_boundaries() {
        assert!(AgeBands::new(vec![]).is_err());
        assert!(AgeBands::new(vec![1.0, 1.0]).is_err());
        assert!(AgeBands::new(vec![2.0, 1.0]).is_err());
        assert!(AgeBands::new(vec![0.0, 1.0]).is_err());
    }
}
