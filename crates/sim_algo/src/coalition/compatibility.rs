//! Pairwise and coalition-level compatibility scores.
//!
//! Pair score (`ScoringMethod::IdeologyHistory`):
//!   `w_i × clamp(5 − |pos_a − pos_b|, −5, 5) + w_h × (clamp(hist, −2, 2) × 2)`
//! Pair score (`ScoringMethod::BlocAffinity`):
//!   same bloc 8, centre–left 5, centre–right 3, left–right −8, otherwise 0.
//! Same party is always 10.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sim_core::{
    ids::PartyId,
    parties::{Bloc, HistoricalTable, PartyRegistry, HISTORY_MAX, HISTORY_MIN, IDEOLOGY_CENTRE},
    variables::{CoalitionParams, ScoringMethod},
};

pub const SAME_PARTY_SCORE: f64 = 10.0;

/// Reference tables the scorer reads.
#[derive(Clone, Copy, Debug)]
pub struct Scorer<'a> {
    pub parties: &'a PartyRegistry,
    pub history: &'a HistoricalTable,
    pub params: &'a CoalitionParams,
}

impl Scorer<'_> {
    pub fn pair(&self, a: &PartyId, b: &PartyId) -> f64 {
        if a == b {
            return SAME_PARTY_SCORE;
        }
        match self.params.method {
            ScoringMethod::IdeologyHistory => self.ideology_history(a, b),
            ScoringMethod::BlocAffinity => {
                bloc_affinity(self.parties.bloc_of(a), self.parties.bloc_of(b))
            }
        }
    }

    fn ideology_history(&self, a: &PartyId, b: &PartyId) -> f64 {
        let distance = (self.parties.ideology(a) - self.parties.ideology(b)).abs();
        let ideological = (IDEOLOGY_CENTRE - distance).clamp(-IDEOLOGY_CENTRE, IDEOLOGY_CENTRE);
        let historical = self.history.score(a, b).clamp(HISTORY_MIN, HISTORY_MAX) * 2.0;
        self.params.ideology_weight * ideological + self.params.history_weight * historical
    }

    /// Aggregate compatibility of `members` (registry order expected).
    pub fn coalition(&self, members: &[PartyId]) -> CompatibilityScore {
        let positions = members.iter().map(|p| self.parties.ideology(p));
        let (lo, hi) = positions.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
        let ideological_range = if members.is_empty() { 0.0 } else { hi - lo };

        let mut sum = 0.0;
        let mut pairs = 0u32;
        let mut minimum = SAME_PARTY_SCORE;
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                let s = self.pair(a, b);
                sum += s;
                pairs += 1;
                minimum = minimum.min(s);
            }
        }
        let average = if pairs > 0 { sum / f64::from(pairs) } else { SAME_PARTY_SCORE };

        CompatibilityScore {
            average,
            minimum,
            ideological_range,
            connected: minimum >= self.params.disconnect_below,
        }
    }
}

fn bloc_affinity(a: Option<Bloc>, b: Option<Bloc>) -> f64 {
    use Bloc::*;
    match (a, b) {
        (Some(x), Some(y)) if x == y => 8.0,
        (Some(Centre), Some(Left)) | (Some(Left), Some(Centre)) => 5.0,
        (Some(Centre), Some(Right)) | (Some(Right), Some(Centre)) => 3.0,
        (Some(Left), Some(Right)) | (Some(Right), Some(Left)) => -8.0,
        _ => 0.0,
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompatibilityScore {
    pub average: f64,
    pub minimum: f64,
    pub ideological_range: f64,
    /// False when any pair scores below the disconnection cut.
    pub connected: bool,
}
