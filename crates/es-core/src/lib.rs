//! es-core: stable foundation for episweep.
//!
//! Contains:
//! - measures (measure name <-> output code table)
//! - age (age-band boundaries, labels, years-at-risk factors)
//! - seasonality (monthly transmission profile synthesis)
//! - error (shared error types)

pub mod age;
pub mod error;
pub mod measures;
pub mod seasonality;

// Re-exports: nice ergonomics for downstream crates
pub use age::AgeBands;
pub use error::{CoreError, CoreResult};
pub use measures::Measure;
pub use seasonality::{MONTHS, SeasonalityMode, monthly_profile};
