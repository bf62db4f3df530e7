//! Monthly transmission seasonality profiles.
//!
//! A scenario's transmission forcing is either flat across the year
//! (perennial) or follows a smooth annual cycle (seasonal). The seasonal
//! profile is derived from a sinusoidal daily curve with period 365,
//! re-sampled at one point per month and rescaled so the peak month is
//! exactly 1.0. The profile is a pure function of the mode: every scenario
//! sharing a mode gets the identical 12-vector.

use core::fmt;
use std::f64::consts::TAU;
use std::str::FromStr;

use crate::error::CoreError;

pub const MONTHS: usize = 12;

/// Day-of-year offset of the first monthly sample.
const FIRST_SAMPLE_DAY: usize = 13;
/// Day stride between monthly samples.
const SAMPLE_STRIDE: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SeasonalityMode {
    Perennial,
    Seasonal,
}

impl SeasonalityMode {
    pub const ALL: [SeasonalityMode; 2] = [SeasonalityMode::Perennial, SeasonalityMode::Seasonal];

    pub fn as_str(self) -> &'static str {
        match self {
            SeasonalityMode::Perennial => "perennial",
            SeasonalityMode::Seasonal => "seasonal",
        }
    }
}

impl fmt::Display for SeasonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SeasonalityMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perennial" => Ok(SeasonalityMode::Perennial),
            "seasonal" => Ok(SeasonalityMode::Seasonal),
            other => Err(CoreError::UnknownMode(other.to_string())),
        }
    }
}

/// Monthly multipliers for the given mode.
///
/// Deterministic and side-effect free; the seasonal vector always has a
/// maximum of exactly 1.0.
pub fn monthly_profile(mode: SeasonalityMode) -> [f64; MONTHS] {
    match mode {
        SeasonalityMode::Perennial => [1.0; MONTHS],
        SeasonalityMode::Seasonal => seasonal_profile(),
    }
}

fn seasonal_profile() -> [f64; MONTHS] {
    let mut profile = [0.0; MONTHS];
    for (month, value) in profile.iter_mut().enumerate() {
        let day = (FIRST_SAMPLE_DAY + month * SAMPLE_STRIDE) as f64;
        *value = 1.0 + (TAU * day / 365.0).sin();
    }
    let max = profile.iter().copied().fold(f64::MIN, f64::max);
    for value in &mut profile {
        *value /= max;
    }
    profile
}
