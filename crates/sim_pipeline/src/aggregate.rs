//! AGGREGATE stage: national seat totals, metrics, coalitions, closest contests.
//!
//! Failed districts contribute zero seats and no closest contest.

use std::collections::BTreeMap;

use sim_algo::{compute_metrics, find_coalitions, CoalitionContext};
use sim_core::{
    ids::PartyId, reference::ReferenceData, variables::SimulationOptions, votes::VoteDistribution,
};

use crate::{ClosestContest, DistrictResult, NationalMetrics};

/// Sum district seats; every party in `order` is present, zero or not.
pub fn seat_totals(districts: &[DistrictResult], order: &[PartyId]) -> BTreeMap<PartyId, u32> {
    let mut totals: BTreeMap<PartyId, u32> = order.iter().map(|p| (p.clone(), 0)).collect();
    for d in districts {
        for (p, &s) in &d.seats {
            *totals.entry(p.clone()).or_insert(0) += s;
        }
    }
    totals
}

pub fn national_metrics(
    reference: &ReferenceData,
    national: &VoteDistribution,
    totals: &BTreeMap<PartyId, u32>,
    order: &[PartyId],
    options: &SimulationOptions,
) -> NationalMetrics {
    let election = compute_metrics(national, totals, order);
    let ctx = CoalitionContext {
        parties: &reference.parties,
        history: &reference.history,
        principal_rivals: reference.principal_rivals.as_ref(),
        params: &options.coalition,
    };
    let coalitions = if election.total_seats == 0 {
        Vec::new()
    } else {
        find_coalitions(totals, election.majority_threshold, &ctx)
    };
    NationalMetrics { election, coalitions }
}

/// Tightest last seats nationally, smallest margin first (ties by district).
pub fn closest_contests(districts: &[DistrictResult], limit: usize) -> Vec<ClosestContest> {
    let mut out: Vec<ClosestContest> = districts
        .iter()
        .filter(|d| !d.is_failed())
        .filter_map(|d| {
            let m = d.closest.as_ref()?;
            Some(ClosestContest {
                district: d.index,
                name: d.name.clone(),
                winner: m.winner.clone(),
                runner_up: m.runner_up.clone(),
                margin: m.margin,
                relative_margin: m.relative_margin,
            })
        })
        .collect();
    out.sort_by(|a, b| a.margin.total_cmp(&b.margin).then(a.district.cmp(&b.district)));
    out.truncate(limit);
    out
}
