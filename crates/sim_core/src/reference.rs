//! Reference data injected into every simulation: party registry, historical
//! relations, per-unit baselines and electorates, regions, and the national
//! baseline the swing is measured against.
//!
//! Nothing here is global; `sim_io` builds one from JSON and tests build their
//! own with the `with_*` helpers.

use std::collections::BTreeMap;

use crate::ids::{PartyId, RegionId, UnitName};
use crate::parties::{HistoricalTable, PartyRegistry};
use crate::votes::VoteDistribution;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub parties: PartyRegistry,
    pub history: HistoricalTable,
    /// The two historically opposed largest parties ("Grand Coalition" test).
    pub principal_rivals: Option<(PartyId, PartyId)>,
    /// National distribution the baselines were recorded under.
    pub national_baseline: VoteDistribution,
    pub baselines: BTreeMap<UnitName, VoteDistribution>,
    pub electors: BTreeMap<UnitName, u64>,
    pub regions: BTreeMap<RegionId, Vec<UnitName>>,
}

impl ReferenceData {
    pub fn new(parties: PartyRegistry, national_baseline: VoteDistribution) -> Self {
        Self { parties, national_baseline, ..Self::default() }
    }

    pub fn with_history(mut self, history: HistoricalTable) -> Self {
        self.history = history;
        self
    }

    pub fn with_principal_rivals(mut self, a: PartyId, b: PartyId) -> Self {
        self.principal_rivals = Some((a, b));
        self
    }

    pub fn with_unit(mut self, name: UnitName, baseline: VoteDistribution, electors: u64) -> Self {
        self.baselines.insert(name.clone(), baseline);
        self.electors.insert(name, electors);
        self
    }

    pub fn with_region(mut self, region: RegionId, units: Vec<UnitName>) -> Self {
        self.regions.insert(region, units);
        self
    }

    pub fn baseline(&self, unit: &UnitName) -> Option<&VoteDistribution> {
        self.baselines.get(unit)
    }

    pub fn electors(&self, unit: &UnitName) -> Option<u64> {
        self.electors.get(unit).copied()
    }

    /// First region (in `RegionId` order) listing `unit`.
    pub fn region_of(&self, unit: &UnitName) -> Option<&RegionId> {
        self.regions
            .iter()
            .find(|(_, units)| units.iter().any(|u| u == unit))
            .map(|(r, _)| r)
    }

    pub fn knows_unit(&self, unit: &UnitName) -> bool {
        self.baselines.contains_key(unit)
    }
}
