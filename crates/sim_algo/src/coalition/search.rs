//! Coalition search, classification and ranking.
//!
//! Candidates are every 1..=`max_parties` subset of seat-holding parties whose
//! seats reach the majority threshold. Classification is first-match:
//! Single Party Government, Grand Coalition, Ideologically Disconnected,
//! Minimum Connected Winning, Minimal Connected Winning, Oversized. The excess
//! ladder is exhaustive, so `Practical` is a wire label only.
//!
//! Ranking: preferred (connected and excess below `minimal_excess`) first,
//! then average compatibility descending, party count ascending, seats
//! ascending, then registry order of the member list.

use core::cmp::Ordering;
use core::fmt;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sim_core::{
    determinism::{canonical_parties, cmp_desc, rank_in},
    ids::PartyId,
    parties::{HistoricalTable, PartyRegistry},
    variables::CoalitionParams,
};

use super::compatibility::{CompatibilityScore, Scorer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CoalitionKind {
    #[cfg_attr(feature = "serde", serde(rename = "Single Party Government"))]
    SinglePartyGovernment,
    #[cfg_attr(feature = "serde", serde(rename = "Grand Coalition"))]
    GrandCoalition,
    #[cfg_attr(feature = "serde", serde(rename = "Ideologically Disconnected"))]
    IdeologicallyDisconnected,
    #[cfg_attr(feature = "serde", serde(rename = "Minimum Connected Winning"))]
    MinimumConnectedWinning,
    #[cfg_attr(feature = "serde", serde(rename = "Minimal Connected Winning"))]
    MinimalConnectedWinning,
    #[cfg_attr(feature = "serde", serde(rename = "Oversized"))]
    Oversized,
    #[cfg_attr(feature = "serde", serde(rename = "Practical Coalition"))]
    Practical,
}

impl CoalitionKind {
    pub fn label(self) -> &'static str {
        match self {
            CoalitionKind::SinglePartyGovernment => "Single Party Government",
            CoalitionKind::GrandCoalition => "Grand Coalition",
            CoalitionKind::IdeologicallyDisconnected => "Ideologically Disconnected",
            CoalitionKind::MinimumConnectedWinning => "Minimum Connected Winning",
            CoalitionKind::MinimalConnectedWinning => "Minimal Connected Winning",
            CoalitionKind::Oversized => "Oversized",
            CoalitionKind::Practical => "Practical Coalition",
        }
    }
}

impl fmt::Display for CoalitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coalition {
    /// Members in registry order.
    pub parties: Vec<PartyId>,
    pub seats: u32,
    pub party_seats: BTreeMap<PartyId, u32>,
    /// `seats - threshold`.
    pub excess_seats: u32,
    /// `excess_seats + 1`.
    pub majority: u32,
    pub compatibility: CompatibilityScore,
    pub kind: CoalitionKind,
}

impl Coalition {
    pub fn contains(&self, p: &PartyId) -> bool {
        self.parties.contains(p)
    }
}

/// Everything the engine needs besides the seat totals.
#[derive(Clone, Copy, Debug)]
pub struct CoalitionContext<'a> {
    pub parties: &'a PartyRegistry,
    pub history: &'a HistoricalTable,
    pub principal_rivals: Option<&'a (PartyId, PartyId)>,
    pub params: &'a CoalitionParams,
}

impl<'a> CoalitionContext<'a> {
    fn scorer(&self) -> Scorer<'a> {
        Scorer { parties: self.parties, history: self.history, params: self.params }
    }
}

/// Enumerate, score, classify and rank winning coalitions; returns the top `top_n`.
pub fn find_coalitions(
    seats: &BTreeMap<PartyId, u32>,
    threshold: u32,
    ctx: &CoalitionContext<'_>,
) -> Vec<Coalition> {
    let holders: Vec<&PartyId> = seats.iter().filter(|(_, s)| **s > 0).map(|(p, _)| p).collect();
    let order = canonical_parties(ctx.parties, holders);
    let max = ctx.params.max_parties.min(order.len());

    let mut out: Vec<Coalition> = Vec::new();
    let mut members: Vec<usize> = Vec::with_capacity(max);
    for size in 1..=max {
        subsets(order.len(), size, 0, &mut members, &mut |idx: &[usize]| {
            let parties: Vec<PartyId> = idx.iter().map(|&i| order[i].clone()).collect();
            let total: u32 = parties.iter().map(|p| seats.get(p).copied().unwrap_or(0)).sum();
            if total >= threshold {
                out.push(build(parties, total, threshold, seats, ctx));
            }
        });
    }

    out.sort_by(|a, b| rank(a, b, ctx.params, &order));
    out.truncate(ctx.params.top_n);
    tracing::debug!(found = out.len(), threshold, "coalition search done");
    out
}

/// Visit every `size`-subset of `0..n` in lexicographic order.
fn subsets(n: usize, size: usize, from: usize, cur: &mut Vec<usize>, f: &mut dyn FnMut(&[usize])) {
    if cur.len() == size {
        f(cur);
        return;
    }
    for i in from..n {
        cur.push(i);
        subsets(n, size, i + 1, cur, f);
        cur.pop();
    }
}

fn build(
    parties: Vec<PartyId>,
    total: u32,
    threshold: u32,
    seats: &BTreeMap<PartyId, u32>,
    ctx: &CoalitionContext<'_>,
) -> Coalition {
    let compatibility = ctx.scorer().coalition(&parties);
    let excess_seats = total - threshold;
    let kind = classify(&parties, excess_seats, &compatibility, ctx);
    let party_seats = parties
        .iter()
        .map(|p| (p.clone(), seats.get(p).copied().unwrap_or(0)))
        .collect();
    Coalition {
        parties,
        seats: total,
        party_seats,
        excess_seats,
        majority: excess_seats + 1,
        compatibility,
        kind,
    }
}

fn classify(
    parties: &[PartyId],
    excess: u32,
    score: &CompatibilityScore,
    ctx: &CoalitionContext<'_>,
) -> CoalitionKind {
    if parties.len() == 1 {
        return CoalitionKind::SinglePartyGovernment;
    }
    if let Some((a, b)) = ctx.principal_rivals {
        if parties.contains(a) && parties.contains(b) {
            return CoalitionKind::GrandCoalition;
        }
    }
    if !score.connected {
        return CoalitionKind::IdeologicallyDisconnected;
    }
    if excess < ctx.params.minimum_excess {
        CoalitionKind::MinimumConnectedWinning
    } else if excess < ctx.params.minimal_excess {
        CoalitionKind::MinimalConnectedWinning
    } else {
        CoalitionKind::Oversized
    }
}

fn preferred(c: &Coalition, params: &CoalitionParams) -> bool {
    c.compatibility.connected && c.excess_seats < params.minimal_excess
}

fn rank(a: &Coalition, b: &Coalition, params: &CoalitionParams, order: &[PartyId]) -> Ordering {
    preferred(b, params)
        .cmp(&preferred(a, params))
        .then_with(|| cmp_desc(a.compatibility.average, b.compatibility.average))
        .then_with(|| a.parties.len().cmp(&b.parties.len()))
        .then_with(|| a.seats.cmp(&b.seats))
        .then_with(|| positions(a, order).cmp(&positions(b, order)))
}

fn positions(c: &Coalition, order: &[PartyId]) -> Vec<usize> {
    c.parties.iter().map(|p| rank_in(order, p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::parties::{Bloc, PartyClass, PartyInfo};
    use sim_core::variables::ScoringMethod;

    fn pid(s: &str) -> PartyId { s.parse().unwrap() }

    fn registry() -> PartyRegistry {
        let row = |id: &str, ideology: f64, bloc, order_index| PartyInfo {
            id: pid(id),
            name: id.into(),
            ideology,
            class: PartyClass::Major,
            bloc: Some(bloc),
            order_index,
        };
        PartyRegistry::new(vec![
            row("Lab", 3.5, Bloc::Left, 0),
            row("Con", 7.0, Bloc::Right, 1),
            row("Plaid", 3.0, Bloc::Left, 2),
            row("LD", 5.0, Bloc::Centre, 3),
            row("Ref", 8.5, Bloc::Right, 4),
        ])
        .unwrap()
    }

    fn seats(pairs: &[(&str, u32)]) -> BTreeMap<PartyId, u32> {
        pairs.iter().map(|(p, s)| (pid(p), *s)).collect()
    }

    #[test]
    fn single_party_majority_is_listed_with_excess() {
        let reg = registry();
        let hist = HistoricalTable::new();
        let params = CoalitionParams::default();
        let ctx = CoalitionContext { parties: &reg, history: &hist, principal_rivals: None, params: &params };
        let s = seats(&[("Lab", 34), ("Con", 16), ("Plaid", 10)]);
        let found = find_coalitions(&s, 30, &ctx);
        let single = found.iter().find(|c| c.parties == vec![pid("Lab")]).unwrap();
        assert_eq!(single.kind, CoalitionKind::SinglePartyGovernment);
        assert_eq!(single.excess_seats, 4);
        assert_eq!(single.majority, 5);
        assert_eq!(found[0].parties, vec![pid("Lab")]);
        assert!(found.iter().all(|c| c.seats >= 30));
        assert!(found.len() <= 5);
    }

    #[test]
    fn classification_ladder() {
        let reg = registry();
        let hist = HistoricalTable::new();
        let params = CoalitionParams { method: ScoringMethod::BlocAffinity, ..CoalitionParams::default() };
        let rivals = (pid("Lab"), pid("Con"));
        let ctx = CoalitionContext {
            parties: &reg,
            history: &hist,
            principal_rivals: Some(&rivals),
            params: &params,
        };
        let s = seats(&[("Lab", 25), ("Con", 20), ("Plaid", 8), ("LD", 4), ("Ref", 3)]);
        let all = find_coalitions(&s, 30, &CoalitionContext {
            params: &CoalitionParams { top_n: 100, ..params.clone() },
            ..ctx
        });
        let kind_of = |ids: &[&str]| {
            let ids: Vec<PartyId> = ids.iter().map(|s| pid(s)).collect();
            all.iter().find(|c| c.parties == ids).map(|c| c.kind)
        };
        assert_eq!(kind_of(&["Lab", "Con"]), Some(CoalitionKind::GrandCoalition));
        // 33 seats, excess 3.
        assert_eq!(kind_of(&["Lab", "Plaid"]), Some(CoalitionKind::MinimalConnectedWinning));
        assert_eq!(kind_of(&["Lab", "Plaid", "Ref"]), Some(CoalitionKind::IdeologicallyDisconnected));
        assert_eq!(kind_of(&["Lab", "LD", "Ref"]), Some(CoalitionKind::IdeologicallyDisconnected));
        assert_eq!(kind_of(&["Con", "Plaid", "LD"]), Some(CoalitionKind::IdeologicallyDisconnected));
        assert_eq!(kind_of(&["Lab", "Plaid", "LD"]), Some(CoalitionKind::Oversized));
        assert_eq!(kind_of(&["Lab", "LD"]), None);
        assert!(all.iter().all(|c| c.kind != CoalitionKind::Practical));
    }

    #[test]
    fn minimum_connected_when_lean() {
        let reg = registry();
        let hist = HistoricalTable::new();
        let params = CoalitionParams::default();
        let ctx = CoalitionContext { parties: &reg, history: &hist, principal_rivals: None, params: &params };
        let s = seats(&[("Lab", 22), ("Plaid", 9), ("Con", 20), ("Ref", 9)]);
        let found = find_coalitions(&s, 30, &ctx);
        // Lab+Plaid = 31, excess 1.
        let c = found.iter().find(|c| c.parties == vec![pid("Lab"), pid("Plaid")]).unwrap();
        assert_eq!(c.kind, CoalitionKind::MinimumConnectedWinning);
        assert_eq!(found[0].parties, c.parties);
    }

    #[test]
    fn parties_without_seats_are_ignored() {
        let reg = registry();
        let hist = HistoricalTable::new();
        let params = CoalitionParams::default();
        let ctx = CoalitionContext { parties: &reg, history: &hist, principal_rivals: None, params: &params };
        let s = seats(&[("Lab", 40), ("LD", 0)]);
        let found = find_coalitions(&s, 30, &ctx);
        assert!(found.iter().all(|c| !c.contains(&pid("LD"))));
    }

    #[test]
    fn no_seats_no_coalitions() {
        let reg = registry();
        let hist = HistoricalTable::new();
        let params = CoalitionParams::default();
        let ctx = CoalitionContext { parties: &reg, history: &hist, principal_rivals: None, params: &params };
        assert!(find_coalitions(&BTreeMap::new(), 0, &ctx).is_empty());
    }
}
