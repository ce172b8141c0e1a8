//! One simulation request: national vote input, district pairings, options.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::UnitName;
use crate::variables::SimulationOptions;
use crate::votes::VoteDistribution;

/// Two sub-units merged into one multi-member district.
pub type Pairing = (UnitName, UnitName);

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scenario {
    pub national_votes: VoteDistribution,
    pub pairings: Vec<Pairing>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: SimulationOptions,
}

impl Scenario {
    pub fn new(national_votes: VoteDistribution, pairings: Vec<Pairing>) -> Self {
        Self { national_votes, pairings, options: SimulationOptions::default() }
    }

    pub fn with_options(mut self, options: SimulationOptions) -> Self {
        self.options = options;
        self
    }
}
