//! Party reference data: registry (ideology, class, bloc, order) and the
//! pairwise historical-relations table.
//!
//! Both are immutable once built; tests substitute their own fixtures.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::determinism::StableOrd;
use crate::errors::CoreError;
use crate::ids::PartyId;

/// Left-right scale bounds for `PartyInfo::ideology`.
pub const IDEOLOGY_MIN: f64 = 0.0;
pub const IDEOLOGY_MAX: f64 = 10.0;
/// Position assumed for parties missing from the registry.
pub const IDEOLOGY_CENTRE: f64 = 5.0;

/// Historical-relations scores live in [-2, 2].
pub const HISTORY_MIN: f64 = -2.0;
pub const HISTORY_MAX: f64 = 2.0;

/// Party class; selects the vote-share ceiling under bounded swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PartyClass {
    Major,
    Minor,
    #[default]
    Other,
}

/// Coarse ideological bloc used by the bloc-affinity scoring method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Bloc {
    Left,
    Centre,
    Right,
}

/// One registry row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartyInfo {
    pub id: PartyId,
    pub name: String,
    /// 0 (left) ..= 10 (right)
    pub ideology: f64,
    pub class: PartyClass,
    pub bloc: Option<Bloc>,
    /// Registry position; defines the stable iteration order used for ties.
    pub order_index: u16,
}

/// Fixed, closed set of parties in canonical `(order_index, id)` order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartyRegistry {
    parties: Vec<PartyInfo>,
}

impl PartyRegistry {
    /// Build a registry, sorting rows canonically.
    ///
    /// Errors on duplicate ids, duplicate `order_index`, or an ideology outside
    /// `[0, 10]`.
    pub fn new(mut parties: Vec<PartyInfo>) -> Result<Self, CoreError> {
        let mut ids = BTreeSet::new();
        let mut idx = BTreeSet::new();
        for p in &parties {
            if !ids.insert(p.id.clone()) {
                return Err(CoreError::DomainOutOfRange("party id duplicated"));
            }
            if !idx.insert(p.order_index) {
                return Err(CoreError::DomainOutOfRange("party order_index duplicated"));
            }
            if !p.ideology.is_finite() || !(IDEOLOGY_MIN..=IDEOLOGY_MAX).contains(&p.ideology) {
                return Err(CoreError::DomainOutOfRange("party ideology"));
            }
        }
        parties.sort_by(|a, b| a.stable_cmp(b));
        Ok(Self { parties })
    }

    pub fn get(&self, id: &PartyId) -> Option<&PartyInfo> {
        self.parties.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PartyId) -> bool {
        self.get(id).is_some()
    }

    /// Rows in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &PartyInfo> + '_ {
        self.parties.iter()
    }

    /// Ids in canonical order.
    pub fn ids(&self) -> impl Iterator<Item = &PartyId> + '_ {
        self.parties.iter().map(|p| &p.id)
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }

    /// Ideological position; unregistered parties sit at the centre.
    pub fn ideology(&self, id: &PartyId) -> f64 {
        self.get(id).map_or(IDEOLOGY_CENTRE, |p| p.ideology)
    }

    /// Class; unregistered parties are `Other`.
    pub fn class_of(&self, id: &PartyId) -> PartyClass {
        self.get(id).map_or(PartyClass::Other, |p| p.class)
    }

    pub fn bloc_of(&self, id: &PartyId) -> Option<Bloc> {
        self.get(id).and_then(|p| p.bloc)
    }

    /// Registry position, `None` for unregistered parties.
    pub fn position(&self, id: &PartyId) -> Option<usize> {
        self.parties.iter().position(|p| &p.id == id)
    }
}

/// One wire row of the historical table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoricalRelation {
    pub a: PartyId,
    pub b: PartyId,
    pub score: f64,
}

/// Symmetric pairwise historical-relations lookup; absent pairs score 0.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<HistoricalRelation>", into = "Vec<HistoricalRelation>")
)]
pub struct HistoricalTable {
    pairs: BTreeMap<(PartyId, PartyId), f64>,
}

#[inline]
fn ordered(a: &PartyId, b: &PartyId) -> (PartyId, PartyId) {
    if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) }
}

impl HistoricalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symmetric score. Errors when the score leaves `[-2, 2]` or a
    /// party is paired with itself.
    pub fn insert(&mut self, a: &PartyId, b: &PartyId, score: f64) -> Result<(), CoreError> {
        if a == b {
            return Err(CoreError::DomainOutOfRange("historical pair with itself"));
        }
        if !score.is_finite() || !(HISTORY_MIN..=HISTORY_MAX).contains(&score) {
            return Err(CoreError::DomainOutOfRange("historical score"));
        }
        self.pairs.insert(ordered(a, b), score);
        Ok(())
    }

    /// Score for the unordered pair; 0 when unknown.
    pub fn score(&self, a: &PartyId, b: &PartyId) -> f64 {
        self.pairs.get(&ordered(a, b)).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl TryFrom<Vec<HistoricalRelation>> for HistoricalTable {
    type Error = CoreError;
    fn try_from(rows: Vec<HistoricalRelation>) -> Result<Self, Self::Error> {
        let mut t = HistoricalTable::new();
        for r in rows {
            t.insert(&r.a, &r.b, r.score)?;
        }
        Ok(t)
    }
}

impl From<HistoricalTable> for Vec<HistoricalRelation> {
    fn from(t: HistoricalTable) -> Self {
        t.pairs
            .into_iter()
            .map(|((a, b), score)| HistoricalRelation { a, b, score })
            .collect()
    }
}
