//! variables.rs
//! Canonical option types, enums with explicit wire tokens, model constants,
//! and `SimulationOptions` with safe defaults plus domain validation.

use std::collections::BTreeMap;
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::RegionId;
use crate::parties::PartyClass;
use crate::votes::VoteDistribution;

/// ------------ Model constants ------------

/// A total further than this from 100 (percentage points) is rescaled and reported.
pub const VOTE_TOTAL_TOLERANCE_PCT: f64 = 1.0;

/// Seats per multi-member district in the reference scenario.
pub const DEFAULT_SEATS_PER_DISTRICT: u32 = 6;

/// Length of the national closest-contests list.
pub const DEFAULT_CLOSEST_CONTESTS_LIMIT: usize = 10;

/// Bounded-proportional swing: per-class vote-share ceilings (percent).
pub const CEILING_MAJOR_PCT: f64 = 75.0;
pub const CEILING_MINOR_PCT: f64 = 25.0;
pub const CEILING_OTHER_PCT: f64 = 20.0;

/// Bounded-proportional swing: a decline below this ratio is dampened.
pub const SEVERE_DECLINE_RATIO: f64 = 0.5;
/// Share of a severe loss that is forgiven.
pub const DECLINE_DAMPING: f64 = 0.3;
/// Floor (percent) under bounded swing; parties never vanish.
pub const BOUNDED_FLOOR_PCT: f64 = 0.1;

/// Logistic swing: baseline clamp and log-ratio damping.
pub const LOGISTIC_CLAMP_LOW_PCT: f64 = 0.5;
pub const LOGISTIC_CLAMP_HIGH_PCT: f64 = 99.5;
pub const LOGISTIC_DAMPING: f64 = 0.7;
/// Ratios are floored here before `ln`.
pub const LOGISTIC_MIN_RATIO: f64 = 0.01;

/// Placeholder for a target party the projection dropped: `max(target * 1%, 0.01)`.
pub const PLACEHOLDER_FRACTION: f64 = 0.01;
pub const PLACEHOLDER_MIN_PCT: f64 = 0.01;

/// Ceiling for a party class under bounded swing.
#[inline]
pub fn ceiling_for(class: PartyClass) -> f64 {
    match class {
        PartyClass::Major => CEILING_MAJOR_PCT,
        PartyClass::Minor => CEILING_MINOR_PCT,
        PartyClass::Other => CEILING_OTHER_PCT,
    }
}

/// ------------ Macros ------------

/// Define an enum with explicit wire tokens, `FromStr`, `Display`, and a
/// `TOKENS` list (used by the CLI value parser).
macro_rules! serde_enum {
    ($(#[$m:meta])* $name:ident => { $($variant:ident = $token:literal),+ $(,)? }) => {
        $(#[$m])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum $name {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $token))]
                $variant,
            )+
        }

        impl $name {
            pub const TOKENS: &'static [&'static str] = &[$($token),+];

            pub fn as_token(self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_token())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok($name::$variant),)+
                    _ => Err(CoreError::InvalidToken),
                }
            }
        }
    };
}

/// ------------ Canonical enums (wire tokens explicit) ------------

serde_enum!(
    /// Swing transform applied to every sub-unit baseline.
    SwingType => {
        Uniform              = "uniform",
        Proportional         = "proportional",
        ProportionalBounded  = "proportional-bounded",
        ProportionalLogistic = "proportional-logistic",
        Regional             = "regional",
    }
);

serde_enum!(
    /// Pairwise compatibility formula used by the coalition engine.
    ScoringMethod => {
        IdeologyHistory = "ideology_history",
        BlocAffinity    = "bloc_affinity",
    }
);

impl Default for SwingType {
    fn default() -> Self { SwingType::Uniform }
}

impl Default for ScoringMethod {
    fn default() -> Self { ScoringMethod::IdeologyHistory }
}

/// ------------ Coalition engine knobs ------------

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoalitionParams {
    pub method: ScoringMethod,
    /// Weight of the `5 - |distance|` term.
    pub ideology_weight: f64,
    /// Weight of the `historical * 2` term.
    pub history_weight: f64,
    /// A pair scoring strictly below this disconnects the coalition.
    pub disconnect_below: f64,
    /// Largest coalition size searched (1..=3).
    pub max_parties: usize,
    /// Number of ranked coalitions returned.
    pub top_n: usize,
    /// Excess seats below this: "Minimum Connected Winning".
    pub minimum_excess: u32,
    /// Excess seats below this: "Minimal Connected Winning"; at or above: "Oversized".
    pub minimal_excess: u32,
}

impl Default for CoalitionParams {
    fn default() -> Self {
        Self {
            method: ScoringMethod::IdeologyHistory,
            ideology_weight: 0.6,
            history_weight: 0.4,
            disconnect_below: -5.0,
            max_parties: 3,
            top_n: 5,
            minimum_excess: 3,
            minimal_excess: 5,
        }
    }
}

/// ------------ Simulation options ------------

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationOptions {
    pub swing_type: SwingType,
    /// Region → extra percentage-point delta per party (regional swing only).
    pub regional_swings: BTreeMap<RegionId, VoteDistribution>,
    pub seats_per_district: u32,
    pub closest_contests_limit: usize,
    pub coalition: CoalitionParams,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            swing_type: SwingType::Uniform,
            regional_swings: BTreeMap::new(),
            seats_per_district: DEFAULT_SEATS_PER_DISTRICT,
            closest_contests_limit: DEFAULT_CLOSEST_CONTESTS_LIMIT,
            coalition: CoalitionParams::default(),
        }
    }
}

/// -------- Validation (domain + cross-field consistency) --------

#[derive(Debug, Clone, PartialEq)]
pub enum VarsError {
    Domain(String),
    Consistency(String),
}

impl fmt::Display for VarsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarsError::Domain(m) => write!(f, "domain: {m}"),
            VarsError::Consistency(m) => write!(f, "consistency: {m}"),
        }
    }
}

impl std::error::Error for VarsError {}

pub type VarsResult<T> = Result<T, VarsError>;

impl SimulationOptions {
    /// Validate numeric domains and cross-field consistency.
    pub fn validate_domains(&self) -> VarsResult<()> {
        if self.seats_per_district == 0 {
            return Err(VarsError::Domain("seats_per_district must be at least 1".into()));
        }
        for (region, deltas) in &self.regional_swings {
            if deltas.iter().any(|(_, v)| !v.is_finite()) {
                return Err(VarsError::Domain(format!("regional swing for '{region}' must be finite")));
            }
        }
        self.coalition.validate_domains()
    }
}

impl CoalitionParams {
    pub fn validate_domains(&self) -> VarsResult<()> {
        for (k, v) in [
            ("ideology_weight", self.ideology_weight),
            ("history_weight", self.history_weight),
            ("disconnect_below", self.disconnect_below),
        ] {
            if !v.is_finite() {
                return Err(VarsError::Domain(format!("coalition.{k} must be finite, got {v}")));
            }
        }
        if self.ideology_weight < 0.0 || self.history_weight < 0.0 {
            return Err(VarsError::Domain("coalition weights must be non-negative".into()));
        }
        if !(1..=3).contains(&self.max_parties) {
            return Err(VarsError::Domain(format!(
                "coalition.max_parties must be in 1..=3, got {}",
                self.max_parties
            )));
        }
        if self.top_n == 0 {
            return Err(VarsError::Domain("coalition.top_n must be at least 1".into()));
        }
        if self.minimum_excess > self.minimal_excess {
            return Err(VarsError::Consistency(
                "coalition.minimum_excess exceeds coalition.minimal_excess".into(),
            ));
        }
        Ok(())
    }
}
