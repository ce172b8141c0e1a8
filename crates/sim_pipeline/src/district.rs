//! DISTRICT stage: one pairing in, one `DistrictResult` out.
//!
//! combine (elector-weighted) → regional delta → swing → allocate → closing
//! table → tipping points, seat stability, closest margin.
//!
//! A district that fails is isolated: it gets a `District.Failed` diagnostic
//! and a placeholder result with every seat count at zero.

use std::collections::BTreeMap;

use sim_algo::{
    apply_swing, blend_regional_deltas, closest_margin, combine_votes, seat_stability, tipping_points,
    AllocError, SwingContext, TippingPoints, WeightedUnit,
};
use sim_core::{
    diagnostics::{Diagnostics, Subject},
    ids::{PartyId, RegionId, UnitName},
    reference::ReferenceData,
    scenario::Pairing,
    variables::{SimulationOptions, SwingType},
    votes::VoteDistribution,
};

use crate::{Apportioner, DistrictResult};

/// Inputs shared by every district of one run.
pub struct RunContext<'a> {
    pub reference: &'a ReferenceData,
    /// National input after validation.
    pub national: &'a VoteDistribution,
    pub options: &'a SimulationOptions,
    /// Canonical party order for tie-breaks.
    pub order: &'a [PartyId],
    pub apportioner: &'a dyn Apportioner,
}

/// Compute one district, isolating any failure.
pub fn run_district(ctx: &RunContext<'_>, index: usize, pairing: &Pairing, diags: &mut Diagnostics) -> DistrictResult {
    match compute(ctx, index, pairing, diags) {
        Ok(result) => {
            tracing::debug!(
                district = index,
                name = %result.name,
                seats = ?result.seats,
                "district allocated"
            );
            result
        }
        Err(e) => {
            let name = district_name(pairing);
            diags.error("District.Failed", Subject::District(index), format!("{name}: {e}"));
            placeholder(ctx, index, pairing, name, e.to_string())
        }
    }
}

fn compute(
    ctx: &RunContext<'_>,
    index: usize,
    pairing: &Pairing,
    diags: &mut Diagnostics,
) -> Result<DistrictResult, AllocError> {
    let (a, b) = pairing;
    let empty = VoteDistribution::new();
    let combined = combine_votes(
        WeightedUnit {
            name: a,
            votes: ctx.reference.baseline(a).unwrap_or(&empty),
            electors: ctx.reference.electors(a),
        },
        WeightedUnit {
            name: b,
            votes: ctx.reference.baseline(b).unwrap_or(&empty),
            electors: ctx.reference.electors(b),
        },
        diags,
    );

    let swing_ctx = SwingContext {
        national_baseline: &ctx.reference.national_baseline,
        target: ctx.national,
        parties: &ctx.reference.parties,
    };
    let delta = regional_delta(ctx, a, b);
    let votes = apply_swing(&combined, &swing_ctx, ctx.options.swing_type, delta.as_ref());

    let seats = ctx.options.seats_per_district;
    let apportionment = ctx.apportioner.apportion(&votes, seats, ctx.order)?;
    let table = apportionment.closing_table();

    Ok(DistrictResult {
        index,
        name: district_name(pairing),
        units: pairing.clone(),
        regions: regions(ctx.reference, pairing),
        tipping: tipping_points(&table, seats),
        stability: seat_stability(&table, seats),
        closest: closest_margin(&table, seats),
        votes,
        seats: apportionment.seats,
        history: apportionment.history,
        error: None,
    })
}

/// Regional delta for the district: the shared region's delta, or an
/// elector-weighted blend when the sub-units sit in different regions.
fn regional_delta(ctx: &RunContext<'_>, a: &UnitName, b: &UnitName) -> Option<VoteDistribution> {
    let swings = &ctx.options.regional_swings;
    if ctx.options.swing_type != SwingType::Regional || swings.is_empty() {
        return None;
    }
    let lookup = |u: &UnitName| ctx.reference.region_of(u).and_then(|r| swings.get(r));
    let (da, db) = (lookup(a), lookup(b));
    if da.is_none() && db.is_none() {
        return None;
    }
    let weight = |u: &UnitName| ctx.reference.electors(u).filter(|&n| n > 0).unwrap_or(1) as f64;
    Some(blend_regional_deltas(da, weight(a), db, weight(b)))
}

fn regions(reference: &ReferenceData, (a, b): &Pairing) -> (Option<RegionId>, Option<RegionId>) {
    (reference.region_of(a).cloned(), reference.region_of(b).cloned())
}

fn district_name((a, b): &Pairing) -> String {
    format!("{a} + {b}")
}

fn placeholder(
    ctx: &RunContext<'_>,
    index: usize,
    pairing: &Pairing,
    name: String,
    error: String,
) -> DistrictResult {
    DistrictResult {
        index,
        name,
        units: pairing.clone(),
        regions: regions(ctx.reference, pairing),
        votes: VoteDistribution::new(),
        seats: ctx.order.iter().map(|p| (p.clone(), 0)).collect::<BTreeMap<_, _>>(),
        history: Vec::new(),
        tipping: TippingPoints::default(),
        stability: Vec::new(),
        closest: None,
        error: Some(error),
    }
}
