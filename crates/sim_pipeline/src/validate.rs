//! VALIDATE stage: refuse malformed configuration, report everything else.
//!
//! Fatal (`PipelineError`): an empty pairing list, options out of domain.
//! Non-fatal (diagnostics): unknown units, national shares that are negative,
//! missing, unregistered or off-total, regional deltas that cannot apply.
//! The national input leaves this stage sanitized and summing to 100.

use std::collections::BTreeSet;

use sim_core::{
    diagnostics::{Diagnostics, Subject},
    ids::UnitName,
    reference::ReferenceData,
    scenario::{Pairing, Scenario},
    variables::{SimulationOptions, SwingType, VOTE_TOTAL_TOLERANCE_PCT},
    votes::VoteDistribution,
};

use crate::PipelineError;

/// Check inputs without running; returns the sorted findings.
pub fn validate_inputs(reference: &ReferenceData, scenario: &Scenario) -> Result<Diagnostics, PipelineError> {
    let mut diags = Diagnostics::new();
    prepare(reference, scenario, &mut diags)?;
    diags.sort_stably();
    Ok(diags)
}

/// Validate and return the effective national distribution.
pub(crate) fn prepare(
    reference: &ReferenceData,
    scenario: &Scenario,
    diags: &mut Diagnostics,
) -> Result<VoteDistribution, PipelineError> {
    scenario
        .options
        .validate_domains()
        .map_err(|e| PipelineError::InvalidOptions(e.to_string()))?;
    if scenario.pairings.is_empty() {
        return Err(PipelineError::InvalidConfig("district pairing list is empty".into()));
    }

    check_pairings(reference, &scenario.pairings, diags);
    check_regional(reference, &scenario.options, diags);
    Ok(national_votes(reference, &scenario.national_votes, diags))
}

fn check_pairings(reference: &ReferenceData, pairings: &[Pairing], diags: &mut Diagnostics) {
    let mut unknown: BTreeSet<&UnitName> = BTreeSet::new();
    for (i, (a, b)) in pairings.iter().enumerate() {
        if a == b {
            diags.warn(
                "District.SelfPaired",
                Subject::District(i),
                format!("'{a}' is paired with itself"),
            );
        }
        for u in [a, b] {
            if !reference.knows_unit(u) {
                unknown.insert(u);
            }
        }
    }
    for u in unknown {
        diags.warn(
            "Unit.Unknown",
            Subject::Unit(u.clone()),
            format!("unknown unit '{u}'; using an empty baseline"),
        );
    }
}

fn check_regional(reference: &ReferenceData, options: &SimulationOptions, diags: &mut Diagnostics) {
    let regional = options.swing_type == SwingType::Regional;
    if regional && options.regional_swings.is_empty() {
        diags.warn(
            "Swing.RegionalFallback",
            Subject::Option("regional_swings".into()),
            "regional swing without regional deltas; behaves as uniform",
        );
    }
    if !regional && !options.regional_swings.is_empty() {
        diags.warn(
            "Swing.RegionalIgnored",
            Subject::Option("regional_swings".into()),
            format!("regional deltas are ignored under '{}' swing", options.swing_type),
        );
    }
    for region in options.regional_swings.keys() {
        if !reference.regions.contains_key(region) {
            diags.warn(
                "Region.Unknown",
                Subject::Region(region.clone()),
                format!("no unit belongs to region '{region}'"),
            );
        }
    }
}

fn national_votes(reference: &ReferenceData, raw: &VoteDistribution, diags: &mut Diagnostics) -> VoteDistribution {
    let (clean, touched) = raw.sanitized();
    for p in touched {
        diags.warn(
            "Votes.Sanitized",
            Subject::Party(p.clone()),
            format!("national share for '{p}' is negative or not finite; using 0"),
        );
    }
    for p in clean.parties().filter(|p| !reference.parties.contains(p)) {
        diags.warn(
            "Party.Unknown",
            Subject::Party(p.clone()),
            format!("'{p}' is not in the party registry"),
        );
    }
    for p in reference.parties.ids().filter(|p| !clean.contains(p)) {
        diags.warn(
            "Party.Missing",
            Subject::Party(p.clone()),
            format!("no national share for '{p}'; treated as 0"),
        );
    }

    let total = clean.total();
    if total <= 0.0 {
        diags.warn("Votes.Empty", Subject::Root, "national shares are empty or all zero");
        return clean;
    }
    if !clean.sums_to_full(VOTE_TOTAL_TOLERANCE_PCT) {
        diags.warn(
            "Votes.Renormalized",
            Subject::Root,
            format!("national shares total {total:.2}; rescaled to 100"),
        );
    }
    clean.renormalized()
}
