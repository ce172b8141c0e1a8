//! Vote combiner: merge two sub-unit distributions into one district
//! distribution, weighted by electorate.
//!
//! Contract:
//! - Value per party = elector-weighted mean over the union of keys (absent ⇒ 0).
//! - A missing or zero electorate counts as 1 and is reported, never fatal.
//! - If the weighted total is more than `VOTE_TOTAL_TOLERANCE_PCT` away from
//!   100, every value is rescaled by `100 / total`.

use sim_core::{
    diagnostics::{Diagnostics, Subject},
    ids::UnitName,
    variables::VOTE_TOTAL_TOLERANCE_PCT,
    votes::{VoteDistribution, FULL_SHARE},
};

/// One side of a district pairing.
#[derive(Clone, Copy, Debug)]
pub struct WeightedUnit<'a> {
    pub name: &'a UnitName,
    pub votes: &'a VoteDistribution,
    /// `None` when the reference data has no electorate for this unit.
    pub electors: Option<u64>,
}

/// Effective electorate weight; problems are reported and replaced by 1.
fn effective_electors(u: &WeightedUnit<'_>, diags: &mut Diagnostics) -> f64 {
    match u.electors {
        Some(n) if n > 0 => n as f64,
        Some(_) => {
            diags.warn(
                "Electors.Invalid",
                Subject::Unit(u.name.clone()),
                format!("elector count for '{}' is 0; using 1", u.name),
            );
            1.0
        }
        None => {
            diags.warn(
                "Electors.Missing",
                Subject::Unit(u.name.clone()),
                format!("no elector count for '{}'; using 1", u.name),
            );
            1.0
        }
    }
}

/// Elector-weighted merge of two sub-unit distributions.
pub fn combine_votes(
    a: WeightedUnit<'_>,
    b: WeightedUnit<'_>,
    diags: &mut Diagnostics,
) -> VoteDistribution {
    let wa = effective_electors(&a, diags);
    let wb = effective_electors(&b, diags);
    let total_weight = wa + wb;

    let combined: VoteDistribution = a
        .votes
        .parties()
        .chain(b.votes.parties())
        .map(|p| {
            let v = (a.votes.get(p) * wa + b.votes.get(p) * wb) / total_weight;
            (p.clone(), v)
        })
        .collect();

    let total = combined.total();
    if total <= 0.0 {
        diags.warn(
            "Votes.Empty",
            Subject::Unit(a.name.clone()),
            format!("'{}' + '{}' combine to an empty distribution", a.name, b.name),
        );
        return combined;
    }
    if (total - FULL_SHARE).abs() > VOTE_TOTAL_TOLERANCE_PCT {
        tracing::debug!(unit_a = %a.name, unit_b = %b.name, total, "rescaling combined votes");
        return combined.renormalized();
    }
    combined
}
