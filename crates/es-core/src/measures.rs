//! Measure name <-> output-code table.
//!
//! The simulator identifies each reported quantity by an integer code in its
//! raw output. The mapping is versioned alongside the simulator (version 44
//! here) and treated as a read-only lookup. Raw rows may carry codes that are
//! not in this table; aggregation passes them through untouched.

use core::fmt;

/// Named epidemiological measures and their version-44 output codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum Measure {
    /// Number of hosts per age group (population denominator).
    NHost = 0,
    /// Number of infected hosts.
    NInfect = 1,
    /// Expected number of infected hosts.
    NExpected = 2,
    /// Number of hosts with patent (detectable) infection.
    NPatent = 3,
    /// Uncomplicated clinical episodes.
    NUncomp = 14,
    /// Severe clinical episodes.
    NSevere = 15,
    /// Indirect malaria deaths.
    NIndDeaths = 18,
    /// Direct malaria deaths.
    NDirDeaths = 19,
    /// Inoculation rate as experienced by the simulated population.
    SimulatedEir = 36,
    ExpectedDirectDeaths = 74,
    ExpectedHospitalDeaths = 75,
    ExpectedIndirectDeaths = 76,
    ExpectedSevere = 78,
}

impl Measure {
    pub const ALL: [Measure; 13] = [
        Measure::NHost,
        Measure::NInfect,
        Measure::NExpected,
        Measure::NPatent,
        Measure::NUncomp,
        Measure::NSevere,
        Measure::NIndDeaths,
        Measure::NDirDeaths,
        Measure::SimulatedEir,
        Measure::ExpectedDirectDeaths,
        Measure::ExpectedHospitalDeaths,
        Measure::ExpectedIndirectDeaths,
        Measure::ExpectedSevere,
    ];

    /// Integer code used in raw output files.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Simulator-facing measure name.
    pub fn name(self) -> &'static str {
        match self {
            Measure::NHost => "nHost",
            Measure::NInfect => "nInfect",
            Measure::NExpected => "nExpectd",
            Measure::NPatent => "nPatent",
            Measure::NUncomp => "nUncomp",
            Measure::NSevere => "nSevere",
            Measure::NIndDeaths => "nIndDeaths",
            Measure::NDirDeaths => "nDirDeaths",
            Measure::SimulatedEir => "simulatedEIR",
            Measure::ExpectedDirectDeaths => "expectedDirectDeaths",
            Measure::ExpectedHospitalDeaths => "expectedHospitalDeaths",
            Measure::ExpectedIndirectDeaths => "expectedIndirectDeaths",
            Measure::ExpectedSevere => "expectedSevere",
        }
    }

    pub fn from_code(code: i32) -> Option<Measure> {
        Measure::ALL.iter().copied().find(|m| m.code() == code)
    }

    pub fn from_name(name: &str) -> Option<Measure> {
        Measure::ALL.iter().copied().find(|m| m.name() == name)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
