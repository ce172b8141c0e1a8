//! sim_core: core types, reference data, option domains, and diagnostics.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! simulator (`sim_algo`, `sim_io`, `sim_pipeline`, `sim_cli`).
//!
//! - Name tokens: `PartyId`, `UnitName`, `RegionId`
//! - `VoteDistribution` (party → percentage) with renormalization
//! - Immutable reference data: party registry, historical relations, baselines
//! - `Scenario`: national input, district pairings and options for one run
//! - Option domains: `SwingType`, `ScoringMethod`, `SimulationOptions`
//! - Deterministic ordering helpers (registry order for tie-breaks)
//! - A diagnostics channel for non-fatal data-quality findings
//!
//! Serialization derives are gated behind the `serde` feature (on by default).

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken,
        DomainOutOfRange(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken => write!(f, "invalid token"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod ids;
pub mod votes;
pub mod parties;
pub mod reference;
pub mod scenario;
pub mod determinism;
pub mod diagnostics;
pub mod variables;

pub use diagnostics::{Diagnostic, Diagnostics, Severity, Subject};
pub use ids::{PartyId, RegionId, UnitName};
pub use parties::{Bloc, HistoricalTable, PartyClass, PartyInfo, PartyRegistry};
pub use reference::ReferenceData;
pub use scenario::{Pairing, Scenario};
pub use variables::{CoalitionParams, ScoringMethod, SimulationOptions, SwingType};
pub use votes::VoteDistribution;
