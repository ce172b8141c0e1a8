//! Determinism utilities: stable ordering for parties.
//!
//! This module is **I/O-free**. It provides:
//! - Stable total orders for core tokens/entities
//! - The canonical party order used by every tie-break in the engine
//! - A total order for `f64` scores that never panics on NaN

use core::cmp::Ordering;

use crate::ids::PartyId;
use crate::parties::{PartyInfo, PartyRegistry};

/* -------------------------------------------------------------------------- */
/*                               Stable Ordering                              */
/* -------------------------------------------------------------------------- */

/// Provide a **total**, stable order for values that must sort canonically.
pub trait StableOrd {
    fn stable_cmp(&self, other: &Self) -> Ordering;
}

impl StableOrd for PartyId {
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl StableOrd for PartyInfo {
    /// Canonical party order is **always** `(order_index, id)`.
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        match self.order_index.cmp(&other.order_index) {
            Ordering::Equal => self.id.as_str().cmp(other.id.as_str()),
            o => o,
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                             Canonical party order                           */
/* -------------------------------------------------------------------------- */

/// Canonical order for a set of party keys: registered parties in registry
/// order first, then unregistered ones by id.
///
/// Every "first party wins" tie-break in the engine scans this list.
pub fn canonical_parties<'a, I>(registry: &PartyRegistry, keys: I) -> Vec<PartyId>
where
    I: IntoIterator<Item = &'a PartyId>,
{
    let mut keys: Vec<&PartyId> = keys.into_iter().collect();
    keys.sort_by(|a, b| cmp_parties(registry, a, b));
    keys.dedup();
    keys.into_iter().cloned().collect()
}

/// Compare two parties by registry position (unregistered last, then by id).
pub fn cmp_parties(registry: &PartyRegistry, a: &PartyId, b: &PartyId) -> Ordering {
    let ra = registry.position(a).unwrap_or(usize::MAX);
    let rb = registry.position(b).unwrap_or(usize::MAX);
    match ra.cmp(&rb) {
        Ordering::Equal => a.stable_cmp(b),
        o => o,
    }
}

/// Index of `id` within a canonical list (`usize::MAX` when absent).
#[inline]
pub fn rank_in(order: &[PartyId], id: &PartyId) -> usize {
    order.iter().position(|p| p == id).unwrap_or(usize::MAX)
}

/* -------------------------------------------------------------------------- */
/*                                 Float order                                 */
/* -------------------------------------------------------------------------- */

/// Descending comparison for scores (`total_cmp`, so NaN never panics).
#[inline]
pub fn cmp_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/* ---------------------------------- Tests --------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parties::PartyClass;

    fn pid(s: &str) -> PartyId { s.parse().unwrap() }

    fn registry() -> PartyRegistry {
        let row = |id: &str, order_index: u16| PartyInfo {
            id: pid(id),
            name: id.into(),
            ideology: 5.0,
            class: PartyClass::Major,
            bloc: None,
            order_index,
        };
        PartyRegistry::new(vec![row("Labour", 0), row("Conservatives", 1), row("Plaid", 2)]).unwrap()
    }

    #[test]
    fn registered_first_then_by_id() {
        let reg = registry();
        let keys = [pid("Zeta"), pid("Plaid"), pid("Alpha"), pid("Labour")];
        let got = canonical_parties(&reg, keys.iter());
        let got: Vec<&str> = got.iter().map(PartyId::as_str).collect();
        assert_eq!(got, vec!["Labour", "Plaid", "Alpha", "Zeta"]);
    }

    #[test]
    fn party_info_order_is_index_then_id() {
        let reg = registry();
        let mut rows: Vec<PartyInfo> = reg.iter().cloned().collect();
        rows.reverse();
        rows.sort_by(|a, b| a.stable_cmp(b));
        assert_eq!(rows[0].id.as_str(), "Labour");
    }

    #[test]
    fn desc_handles_nan() {
        let mut v = [1.0, f64::NAN, 3.0];
        v.sort_by(|a, b| cmp_desc(*a, *b));
        assert_eq!(v[1], 3.0);
    }
}
