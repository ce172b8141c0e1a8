//! Electoral-system metrics over national seat totals.
//!
//! - Seat share = seats / total × 100.
//! - Majority threshold = ceil(total / 2).
//! - Gallagher least-squares index over the union of parties (absent ⇒ 0).
//! - Laakso–Taagepera effective number of parties, 0 when every share is 0.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sim_core::{ids::PartyId, votes::VoteDistribution};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElectionMetrics {
    pub total_seats: u32,
    pub majority_threshold: u32,
    pub has_overall_majority: bool,
    /// Most seats; ties go to the first in canonical order. `None` when no seats.
    pub largest_party: Option<PartyId>,
    pub seat_shares: BTreeMap<PartyId, f64>,
    pub gallagher_index: f64,
    pub effective_parties_votes: f64,
    pub effective_parties_seats: f64,
}

#[inline]
pub fn majority_threshold(total_seats: u32) -> u32 {
    total_seats.div_ceil(2)
}

/// Seat shares in percent; empty when `total == 0`.
pub fn seat_shares(seats: &BTreeMap<PartyId, u32>) -> BTreeMap<PartyId, f64> {
    let total: u32 = seats.values().sum();
    if total == 0 {
        return BTreeMap::new();
    }
    seats
        .iter()
        .map(|(p, &s)| (p.clone(), f64::from(s) / f64::from(total) * 100.0))
        .collect()
}

/// `sqrt(½ Σ (v_i − s_i)²)` over every party in either map.
pub fn gallagher_index(vote_shares: &VoteDistribution, seat_shares: &BTreeMap<PartyId, f64>) -> f64 {
    let parties: BTreeSet<&PartyId> = vote_shares.parties().chain(seat_shares.keys()).collect();
    let sum_sq: f64 = parties
        .into_iter()
        .map(|p| {
            let d = vote_shares.get(p) - seat_shares.get(p).copied().unwrap_or(0.0);
            d * d
        })
        .sum();
    (sum_sq / 2.0).sqrt()
}

/// `1 / Σ (share / 100)²`; 0 when the denominator is 0.
pub fn effective_number_of_parties<I>(shares: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let denom: f64 = shares.into_iter().map(|s| (s / 100.0) * (s / 100.0)).sum();
    if denom > 0.0 { 1.0 / denom } else { 0.0 }
}

/// Largest seat holder; scans `order` then any other holder by id.
pub fn largest_party(seats: &BTreeMap<PartyId, u32>, order: &[PartyId]) -> Option<PartyId> {
    let scan = order.iter().chain(seats.keys().filter(|p| !order.contains(p)));
    let mut best: Option<(&PartyId, u32)> = None;
    for p in scan {
        let s = seats.get(p).copied().unwrap_or(0);
        if s > best.map_or(0, |(_, b)| b) {
            best = Some((p, s));
        }
    }
    best.map(|(p, _)| p.clone())
}

/// All metrics for a run. `vote_shares` is the national input after renormalization.
pub fn compute_metrics(
    vote_shares: &VoteDistribution,
    seats: &BTreeMap<PartyId, u32>,
    order: &[PartyId],
) -> ElectionMetrics {
    let total_seats: u32 = seats.values().sum();
    let threshold = majority_threshold(total_seats);
    let shares = seat_shares(seats);
    ElectionMetrics {
        total_seats,
        majority_threshold: threshold,
        has_overall_majority: total_seats > 0 && seats.values().any(|&s| s >= threshold),
        largest_party: largest_party(seats, order),
        gallagher_index: gallagher_index(vote_shares, &shares),
        effective_parties_votes: effective_number_of_parties(vote_shares.iter().map(|(_, v)| v)),
        effective_parties_seats: effective_number_of_parties(shares.values().copied()),
        seat_shares: shares,
    }
}
