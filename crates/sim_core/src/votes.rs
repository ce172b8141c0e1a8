//! Vote-share distributions (party → percentage).
//!
//! A `VoteDistribution` is a value type: every pipeline stage takes one by
//! reference and returns a new one. Keys are held in a `BTreeMap` so iteration
//! and serialization are always in `PartyId` order; callers that need registry
//! order go through `determinism::canonical_parties`.
//!
//! The intended invariant is "non-negative, sums to 100", but inputs are not
//! trusted: use [`VoteDistribution::sanitized`] and
//! [`VoteDistribution::renormalized`] at the boundaries.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::PartyId;

/// Target total for a distribution, in percentage points.
pub const FULL_SHARE: f64 = 100.0;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VoteDistribution(BTreeMap<PartyId, f64>);

impl VoteDistribution {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Share for `party`; an absent key reads as 0.
    #[inline]
    pub fn get(&self, party: &PartyId) -> f64 {
        self.0.get(party).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn contains(&self, party: &PartyId) -> bool {
        self.0.contains_key(party)
    }

    pub fn set(&mut self, party: PartyId, share: f64) {
        self.0.insert(party, share);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PartyId, f64)> + '_ {
        self.0.iter().map(|(k, v)| (k, *v))
    }

    pub fn parties(&self) -> impl Iterator<Item = &PartyId> + '_ {
        self.0.keys()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plain sum of all values.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// True when the total is within `tolerance` points of 100.
    pub fn sums_to_full(&self, tolerance: f64) -> bool {
        (self.total() - FULL_SHARE).abs() <= tolerance
    }

    /// Copy with NaN, infinite and negative values replaced by 0, plus the
    /// parties that were touched (in key order).
    pub fn sanitized(&self) -> (Self, Vec<PartyId>) {
        let mut touched = Vec::new();
        let map = self
            .0
            .iter()
            .map(|(k, &v)| {
                if v.is_finite() && v >= 0.0 {
                    (k.clone(), v)
                } else {
                    touched.push(k.clone());
                    (k.clone(), 0.0)
                }
            })
            .collect();
        (Self(map), touched)
    }

    /// Rescale so values sum to exactly 100.
    ///
    /// An all-zero distribution is split evenly across its keys; an empty one
    /// stays empty.
    pub fn renormalized(&self) -> Self {
        let total = self.total();
        if self.0.is_empty() {
            return Self::new();
        }
        if total > 0.0 && total.is_finite() {
            let k = FULL_SHARE / total;
            return Self(self.0.iter().map(|(p, v)| (p.clone(), v * k)).collect());
        }
        let even = FULL_SHARE / self.0.len() as f64;
        Self(self.0.keys().map(|p| (p.clone(), even)).collect())
    }
}

impl FromIterator<(PartyId, f64)> for VoteDistribution {
    fn from_iter<I: IntoIterator<Item = (PartyId, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a VoteDistribution {
    type Item = (&'a PartyId, &'a f64);
    type IntoIter = std::collections::btree_map::Iter<'a, PartyId, f64>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
