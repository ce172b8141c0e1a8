//! Tipping points, seat stability and closest margins.
//!
//! Every function here reads the closing quotient table (see
//! `Apportionment::closing_table`): the first `seats` rows are allocated, the
//! rest unallocated. Nothing here changes an allocation.
//!
//! A seat cannot flip to the party already holding it, so (incumbent,
//! challenger) pairs from the same party are skipped.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sim_core::ids::PartyId;

use crate::allocation::dhondt::QuotientRow;

/// Grid size on each side of the sensitivity surface.
pub const SENSITIVITY_DEPTH: usize = 3;
/// Scenarios needing this many points or more are dropped.
pub const MAX_SHIFT_PCT: f64 = 10.0;
/// Likelihood cut-offs (percentage points).
pub const HIGH_BELOW_PCT: f64 = 1.0;
pub const MEDIUM_BELOW_PCT: f64 = 3.0;

/// Seat-stability cut-offs on the relative margin.
pub const LAST_SEAT_TOSS_UP_BELOW: f64 = 1.0;
pub const LAST_SEAT_LEANING_BELOW: f64 = 3.0;
pub const SECOND_LAST_LEANING_BELOW: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Likelihood {
    High,
    Medium,
    Low,
}

impl Likelihood {
    pub fn from_shift(shift: f64) -> Self {
        if shift < HIGH_BELOW_PCT {
            Likelihood::High
        } else if shift < MEDIUM_BELOW_PCT {
            Likelihood::Medium
        } else {
            Likelihood::Low
        }
    }
}

/// One way a seat could change hands.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlipScenario {
    pub incumbent: PartyId,
    pub incumbent_quotient: f64,
    pub challenger: PartyId,
    pub challenger_quotient: f64,
    /// Seats the challenger already holds.
    pub challenger_seats: u32,
    /// Percentage points the challenger needs to gain.
    pub vote_shift: f64,
    pub likelihood: Likelihood,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TippingPoints {
    /// Most vulnerable winner against the strongest challenger.
    pub primary: Option<FlipScenario>,
    /// Up to 3 × 3 scenarios under `MAX_SHIFT_PCT`, ascending by shift, one
    /// per (incumbent, challenger) pair.
    pub scenarios: Vec<FlipScenario>,
}

fn flip(incumbent: &QuotientRow, challenger: &QuotientRow) -> FlipScenario {
    let vote_shift =
        (incumbent.quotient - challenger.quotient) * f64::from(challenger.seats_so_far + 1);
    FlipScenario {
        incumbent: incumbent.party.clone(),
        incumbent_quotient: incumbent.quotient,
        challenger: challenger.party.clone(),
        challenger_quotient: challenger.quotient,
        challenger_seats: challenger.seats_so_far,
        vote_shift,
        likelihood: Likelihood::from_shift(vote_shift),
    }
}

fn split(table: &[QuotientRow], seats: u32) -> (&[QuotientRow], &[QuotientRow]) {
    table.split_at((seats as usize).min(table.len()))
}

/// Tipping-point analysis of a closing table.
pub fn tipping_points(table: &[QuotientRow], seats: u32) -> TippingPoints {
    let (allocated, unallocated) = split(table, seats);
    let Some(weakest) = allocated.last() else {
        return TippingPoints::default();
    };

    let primary = unallocated
        .iter()
        .find(|c| c.party != weakest.party)
        .map(|c| flip(weakest, c));

    let mut scenarios: Vec<FlipScenario> = Vec::new();
    for incumbent in allocated.iter().rev().take(SENSITIVITY_DEPTH) {
        for challenger in unallocated.iter().take(SENSITIVITY_DEPTH) {
            if challenger.party == incumbent.party {
                continue;
            }
            let s = flip(incumbent, challenger);
            if s.vote_shift < MAX_SHIFT_PCT {
                scenarios.push(s);
            }
        }
    }
    // Stable sort keeps grid order for equal shifts; each (incumbent,
    // challenger) pair then keeps only its cheapest flip.
    scenarios.sort_by(|a, b| a.vote_shift.total_cmp(&b.vote_shift));
    let mut seen = BTreeSet::new();
    scenarios.retain(|s| seen.insert((s.incumbent.clone(), s.challenger.clone())));

    TippingPoints { primary, scenarios }
}

/// Gap between the last allocated quotient and the best other-party challenger.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeatMargin {
    pub winner: PartyId,
    pub runner_up: PartyId,
    pub margin: f64,
    /// `margin / last allocated quotient * 100`.
    pub relative_margin: f64,
}

pub fn closest_margin(table: &[QuotientRow], seats: u32) -> Option<SeatMargin> {
    let (allocated, unallocated) = split(table, seats);
    let last = allocated.last()?;
    let challenger = unallocated.iter().find(|c| c.party != last.party)?;
    let margin = last.quotient - challenger.quotient;
    let relative_margin = if last.quotient > 0.0 { margin / last.quotient * 100.0 } else { 0.0 };
    Some(SeatMargin {
        winner: last.party.clone(),
        runner_up: challenger.party.clone(),
        margin,
        relative_margin,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Stability {
    Solid,
    Leaning,
    TossUp,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeatStability {
    /// 1-based position in award order.
    pub seat: u32,
    pub party: PartyId,
    pub quotient: f64,
    pub stability: Stability,
}

/// Label every allocated seat from the district's relative margin.
pub fn seat_stability(table: &[QuotientRow], seats: u32) -> Vec<SeatStability> {
    let (allocated, _) = split(table, seats);
    let relative = closest_margin(table, seats).map(|m| m.relative_margin);
    let n = allocated.len();
    allocated
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let stability = match relative {
                Some(rm) if i + 1 == n => {
                    if rm < LAST_SEAT_TOSS_UP_BELOW {
                        Stability::TossUp
                    } else if rm < LAST_SEAT_LEANING_BELOW {
                        Stability::Leaning
                    } else {
                        Stability::Solid
                    }
                }
                Some(rm) if i + 2 == n && rm < SECOND_LAST_LEANING_BELOW => Stability::Leaning,
                _ => Stability::Solid,
            };
            SeatStability { seat: i as u32 + 1, party: r.party.clone(), quotient: r.quotient, stability }
        })
        .collect()
}
