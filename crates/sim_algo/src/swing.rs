//! Swing model: project a baseline distribution forward to a target national
//! distribution.
//!
//! Contract:
//! - The transform runs over the baseline's parties. A party absent from the
//!   target counts as target 0; a party absent from the national baseline has
//!   zero swing (its baseline is taken equal to its target).
//! - Every target party missing from the projection is inserted with a
//!   placeholder of `max(target * 1%, 0.01)`.
//! - The result is always renormalized to sum to 100. Under bounded swing the
//!   renormalization also redistributes any excess over a class ceiling.
//!
//! Determinism:
//! - Pure `f64` arithmetic over `BTreeMap` iteration; no RNG, no I/O.

use std::collections::BTreeSet;

use sim_core::{
    ids::PartyId,
    parties::PartyRegistry,
    variables::{
        ceiling_for, SwingType, BOUNDED_FLOOR_PCT, DECLINE_DAMPING, LOGISTIC_CLAMP_HIGH_PCT,
        LOGISTIC_CLAMP_LOW_PCT, LOGISTIC_DAMPING, LOGISTIC_MIN_RATIO, PLACEHOLDER_FRACTION,
        PLACEHOLDER_MIN_PCT, SEVERE_DECLINE_RATIO,
    },
    votes::{VoteDistribution, FULL_SHARE},
};

/// Slack used when testing a value against its ceiling.
const CEILING_EPS: f64 = 1e-9;

/// National-level inputs shared by every district of one run.
#[derive(Clone, Copy, Debug)]
pub struct SwingContext<'a> {
    /// Distribution the sub-unit baselines were recorded under.
    pub national_baseline: &'a VoteDistribution,
    /// User-supplied national distribution.
    pub target: &'a VoteDistribution,
    /// Party classes (ceilings under bounded swing).
    pub parties: &'a PartyRegistry,
}

impl SwingContext<'_> {
    /// National baseline for `p`, falling back to the target (zero swing).
    fn national(&self, p: &PartyId) -> f64 {
        if self.national_baseline.contains(p) {
            self.national_baseline.get(p)
        } else {
            self.target.get(p)
        }
    }

    /// Percentage-point swing for `p`.
    fn delta(&self, p: &PartyId) -> f64 {
        self.target.get(p) - self.national(p)
    }

    /// `target / national`, or `None` when the national baseline is 0.
    fn ratio(&self, p: &PartyId) -> Option<f64> {
        let nb = self.national(p);
        (nb > 0.0).then(|| self.target.get(p) / nb)
    }
}

/// Project `baseline` under `swing`.
///
/// `regional_delta` is only read by `SwingType::Regional`; when it is `None`
/// the regional transform degenerates to uniform swing.
pub fn apply_swing(
    baseline: &VoteDistribution,
    ctx: &SwingContext<'_>,
    swing: SwingType,
    regional_delta: Option<&VoteDistribution>,
) -> VoteDistribution {
    let mut out: VoteDistribution = baseline
        .iter()
        .map(|(p, b)| {
            let v = match swing {
                SwingType::Uniform => uniform(b, ctx, p),
                SwingType::Proportional => proportional(b, ctx, p),
                SwingType::ProportionalBounded => bounded(b, ctx, p),
                SwingType::ProportionalLogistic => logistic(b, ctx, p),
                SwingType::Regional => {
                    let extra = regional_delta.map_or(0.0, |d| d.get(p));
                    (uniform(b, ctx, p) + extra).max(0.0)
                }
            };
            (p.clone(), v)
        })
        .collect();

    insert_placeholders(&mut out, ctx.target);

    match swing {
        SwingType::ProportionalBounded => {
            renormalize_with_ceilings(&out, |p| ceiling_for(ctx.parties.class_of(p)))
        }
        _ => out.renormalized(),
    }
}

/// Uniform: add the national percentage-point delta; floor at 0.
fn uniform(b: f64, ctx: &SwingContext<'_>, p: &PartyId) -> f64 {
    (b + ctx.delta(p)).max(0.0)
}

/// Classic proportional: scale by `target / national`.
/// With a zero national baseline: target if the sub-unit had the party, else 0.
fn proportional(b: f64, ctx: &SwingContext<'_>, p: &PartyId) -> f64 {
    match ctx.ratio(p) {
        Some(r) => b * r,
        None => zero_baseline_fallback(b, ctx, p),
    }
}

fn zero_baseline_fallback(b: f64, ctx: &SwingContext<'_>, p: &PartyId) -> f64 {
    if b > 0.0 { ctx.target.get(p) } else { 0.0 }
}

/// Bounded proportional: `1 + sqrt(r - 1)` for growth, capped at the class
/// ceiling; severe decline (r < 0.5) loses 30% less and floors at 0.1.
fn bounded(b: f64, ctx: &SwingContext<'_>, p: &PartyId) -> f64 {
    let ceiling = ceiling_for(ctx.parties.class_of(p));
    let Some(r) = ctx.ratio(p) else {
        return zero_baseline_fallback(b, ctx, p).min(ceiling);
    };
    if r > 1.0 {
        (b * (1.0 + (r - 1.0).sqrt())).min(ceiling)
    } else if r < SEVERE_DECLINE_RATIO {
        let v = b * (1.0 - (1.0 - r) * (1.0 - DECLINE_DAMPING));
        if b > 0.0 { v.max(BOUNDED_FLOOR_PCT) } else { v }
    } else {
        b * r
    }
}

/// Logistic: shift the clamped baseline's log-odds by `0.7 * ln(r)`.
fn logistic(b: f64, ctx: &SwingContext<'_>, p: &PartyId) -> f64 {
    let Some(r) = ctx.ratio(p) else {
        return zero_baseline_fallback(b, ctx, p);
    };
    let share = b.clamp(LOGISTIC_CLAMP_LOW_PCT, LOGISTIC_CLAMP_HIGH_PCT) / FULL_SHARE;
    let logit = (share / (1.0 - share)).ln() + LOGISTIC_DAMPING * r.max(LOGISTIC_MIN_RATIO).ln();
    FULL_SHARE / (1.0 + (-logit).exp())
}

/// Insert a small non-zero share for every target party the projection lacks.
fn insert_placeholders(out: &mut VoteDistribution, target: &VoteDistribution) {
    for (p, t) in target.iter() {
        if !out.contains(p) {
            out.set(p.clone(), (t * PLACEHOLDER_FRACTION).max(PLACEHOLDER_MIN_PCT));
        }
    }
}

/// Renormalize to 100 while keeping every party at or under `ceiling(p)`.
///
/// Excess above a ceiling is pinned and the remainder rescaled over the
/// uncapped parties, repeating until nothing is over. When the ceilings cannot
/// add up to 100 the plain renormalization is returned.
pub fn renormalize_with_ceilings<F>(dist: &VoteDistribution, ceiling: F) -> VoteDistribution
where
    F: Fn(&PartyId) -> f64,
{
    let mut out = dist.renormalized();
    let mut capped: BTreeSet<PartyId> = BTreeSet::new();

    for _ in 0..=out.len() {
        let over: Vec<PartyId> = out
            .iter()
            .filter(|(p, v)| !capped.contains(*p) && *v > ceiling(p) + CEILING_EPS)
            .map(|(p, _)| p.clone())
            .collect();
        if over.is_empty() {
            return out;
        }
        for p in over {
            out.set(p.clone(), ceiling(&p));
            capped.insert(p);
        }

        let capped_total: f64 = capped.iter().map(|p| out.get(p)).sum();
        let free_total: f64 = out.iter().filter(|(p, _)| !capped.contains(*p)).map(|(_, v)| v).sum();
        let room = FULL_SHARE - capped_total;
        if room < -CEILING_EPS || (free_total <= 0.0 && room > CEILING_EPS) {
            tracing::debug!(room, free_total, "ceilings infeasible; plain renormalization");
            return dist.renormalized();
        }
        if free_total > 0.0 {
            let k = room.max(0.0) / free_total;
            let free: Vec<(PartyId, f64)> = out
                .iter()
                .filter(|(p, _)| !capped.contains(*p))
                .map(|(p, v)| (p.clone(), v * k))
                .collect();
            for (p, v) in free {
                out.set(p, v);
            }
        }
    }
    out
}

/// Blend two regional deltas by electorate weight over the union of parties.
pub fn blend_regional_deltas(
    a: Option<&VoteDistribution>,
    weight_a: f64,
    b: Option<&VoteDistribution>,
    weight_b: f64,
) -> VoteDistribution {
    let total = weight_a + weight_b;
    let (wa, wb) = if total > 0.0 { (weight_a / total, weight_b / total) } else { (0.5, 0.5) };
    let empty = VoteDistribution::new();
    let (a, b) = (a.unwrap_or(&empty), b.unwrap_or(&empty));
    a.parties()
        .chain(b.parties())
        .map(|p| (p.clone(), a.get(p) * wa + b.get(p) * wb))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::parties::{PartyClass, PartyInfo};

    fn pid(s: &str) -> PartyId { s.parse().unwrap() }

    fn dist(pairs: &[(&str, f64)]) -> VoteDistribution {
        pairs.iter().map(|(p, v)| (pid(p), *v)).collect()
    }

    fn registry() -> PartyRegistry {
        let row = |id: &str, class, order_index| PartyInfo {
            id: pid(id),
            name: id.into(),
            ideology: 5.0,
            class,
            bloc: None,
            order_index,
        };
        PartyRegistry::new(vec![
            row("A", PartyClass::Major, 0),
            row("B", PartyClass::Major, 1),
            row("G", PartyClass::Minor, 2),
            row("O", PartyClass::Other, 3),
        ])
        .unwrap()
    }

    fn close(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

    #[test]
    fn uniform_adds_delta_and_floors() {
        let reg = registry();
        let nb = dist(&[("A", 40.0), ("B", 40.0), ("G", 20.0)]);
        let target = dist(&[("A", 50.0), ("B", 40.0), ("G", 10.0)]);
        let ctx = SwingContext { national_baseline: &nb, target: &target, parties: &reg };
        let base = dist(&[("A", 30.0), ("B", 65.0), ("G", 5.0)]);
        let out = apply_swing(&base, &ctx, SwingType::Uniform, None);
        // A 40, B 65, G 0 → total 105
        assert!(close(out.get(&pid("A")), 40.0 * 100.0 / 105.0));
        assert_eq!(out.get(&pid("G")), 0.0);
        assert!(close(out.total(), 100.0));
    }

    #[test]
    fn identical_baseline_and_target_is_identity() {
        let reg = registry();
        let nb = dist(&[("A", 50.0), ("B", 30.0), ("G", 20.0)]);
        let ctx = SwingContext { national_baseline: &nb, target: &nb, parties: &reg };
        for swing in [SwingType::Uniform, SwingType::Proportional, SwingType::ProportionalBounded] {
            let out = apply_swing(&nb, &ctx, swing, None);
            for (p, v) in nb.iter() {
                assert!(close(out.get(p), v), "{swing}: {p}");
            }
        }
    }

    #[test]
    fn proportional_scales_and_handles_zero_baseline() {
        let reg = registry();
        let nb = dist(&[("A", 50.0), ("B", 50.0), ("G", 0.0)]);
        let target = dist(&[("A", 25.0), ("B", 65.0), ("G", 10.0)]);
        let ctx = SwingContext { national_baseline: &nb, target: &target, parties: &reg };
        let base = dist(&[("A", 40.0), ("B", 40.0), ("G", 20.0)]);
        let out = apply_swing(&base, &ctx, SwingType::Proportional, None);
        // A 20, B 52, G falls back to target 10 → total 82
        assert!(close(out.get(&pid("A")), 20.0 * 100.0 / 82.0));
        assert!(close(out.get(&pid("G")), 10.0 * 100.0 / 82.0));
    }

    #[test]
    fn missing_national_baseline_means_no_swing() {
        let reg = registry();
        let nb = dist(&[("A", 50.0), ("B", 50.0)]);
        let target = dist(&[("A", 50.0), ("B", 40.0), ("O", 10.0)]);
        let ctx = SwingContext { national_baseline: &nb, target: &target, parties: &reg };
        let base = dist(&[("A", 45.0), ("B", 45.0), ("O", 10.0)]);
        let out = apply_swing(&base, &ctx, SwingType::Uniform, None);
        // A 45, B 35, O 10 (unchanged) → total 90
        assert!(close(out.get(&pid("O")), 10.0 * 100.0 / 90.0));
    }

    #[test]
    fn bounded_growth_is_dampened_and_capped() {
        let reg = registry();
        let nb = dist(&[("A", 49.0), ("B", 49.0), ("G", 2.0)]);
        let target = dist(&[("A", 40.0), ("B", 40.0), ("G", 20.0)]);
        let ctx = SwingContext { national_baseline: &nb, target: &target, parties: &reg };
        let base = dist(&[("A", 10.0), ("B", 10.0), ("G", 80.0)]);
        let out = apply_swing(&base, &ctx, SwingType::ProportionalBounded, None);
        assert!(out.get(&pid("G")) <= 25.0 + 1e-9);
        assert!(close(out.total(), 100.0));
    }

    #[test]
    fn bounded_severe_decline_is_softened_and_floored() {
        let reg = registry();
        let nb = dist(&[("A", 50.0), ("B", 30.0), ("G", 20.0)]);
        let target = dist(&[("A", 50.0), ("B", 48.0), ("G", 2.0)]);
        let ctx = SwingContext { national_baseline: &nb, target: &target, parties: &reg };
        assert!(close(bounded(10.0, &ctx, &pid("G")), 10.0 * (1.0 - 0.9 * 0.7)));
        assert_eq!(bounded(0.05, &ctx, &pid("G")), BOUNDED_FLOOR_PCT);
    }

    #[test]
    fn logistic_stays_inside_open_interval() {
        let reg = registry();
        let nb = dist(&[("A", 10.0), ("B", 90.0)]);
        let target = dist(&[("A", 90.0), ("B", 10.0)]);
        let ctx = SwingContext { national_baseline: &nb, target: &target, parties: &reg };
        let base = dist(&[("A", 99.9), ("B", 0.1)]);
        let out = apply_swing(&base, &ctx, SwingType::ProportionalLogistic, None);
        for (_, v) in out.iter() {
            assert!(v > 0.0 && v < 100.0);
        }
    }

    #[test]
    fn logistic_raw_output_never_reaches_bounds() {
        let reg = registry();
        let nb = dist(&[("A", 1.0), ("B", 99.0)]);
        let target = dist(&[("A", 99.0), ("B", 1.0)]);
        let ctx = SwingContext { national_baseline: &nb, target: &target, parties: &reg };
        // Before renormalization, from both ends of the baseline range.
        for b in [0.0, 100.0] {
            for p in ["A", "B"] {
                let v = logistic(b, &ctx, &pid(p));
                assert!(v > 0.0 && v < 100.0, "{p} from {b}: {v}");
            }
        }
        let rising = logistic(100.0, &ctx, &pid("A"));
        let falling = logistic(0.0, &ctx, &pid("B"));
        assert!(rising > 99.5 && falling < 0.5);
    }

    #[test]
    fn regional_adds_on_top_of_uniform() {
        let reg = registry();
        let nb = dist(&[("A", 50.0), ("B", 50.0)]);
        let ctx = SwingContext { national_baseline: &nb, target: &nb, parties: &reg };
        let delta = dist(&[("A", 10.0), ("B", -10.0)]);
        let out = apply_swing(&nb, &ctx, SwingType::Regional, Some(&delta));
        assert!(close(out.get(&pid("A")), 60.0));
        let plain = apply_swing(&nb, &ctx, SwingType::Regional, None);
        assert!(close(plain.get(&pid("A")), 50.0));
    }

    #[test]
    fn target_party_absent_from_baseline_gets_placeholder() {
        let reg = registry();
        let nb = dist(&[("A", 50.0), ("B", 50.0)]);
        let target = dist(&[("A", 45.0), ("B", 45.0), ("G", 10.0)]);
        let ctx = SwingContext { national_baseline: &nb, target: &target, parties: &reg };
        let base = dist(&[("A", 50.0), ("B", 50.0)]);
        let out = apply_swing(&base, &ctx, SwingType::Proportional, None);
        assert!(out.get(&pid("G")) > 0.0);
        assert!(close(out.total(), 100.0));
    }

    #[test]
    fn blend_weights_by_electorate() {
        let a = dist(&[("A", 4.0)]);
        let b = dist(&[("A", -2.0), ("B", 3.0)]);
        let out = blend_regional_deltas(Some(&a), 3.0, Some(&b), 1.0);
        assert!(close(out.get(&pid("A")), 2.5));
        assert!(close(out.get(&pid("B")), 0.75));
        let one_sided = blend_regional_deltas(Some(&a), 1.0, None, 1.0);
        assert!(close(one_sided.get(&pid("A")), 2.0));
    }

    #[test]
    fn ceilings_redistribute_excess() {
        let d = dist(&[("G", 60.0), ("A", 20.0), ("B", 20.0)]);
        let out = renormalize_with_ceilings(&d, |p| if p.as_str() == "G" { 25.0 } else { 75.0 });
        assert!(close(out.get(&pid("G")), 25.0));
        assert!(close(out.get(&pid("A")), 37.5));
        assert!(close(out.total(), 100.0));
    }
}
