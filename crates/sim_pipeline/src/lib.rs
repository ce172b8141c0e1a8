//! sim_pipeline: the simulation orchestrator (validate → per-district
//! combine/swing/allocate/tipping → aggregate → metrics → coalitions).
//!
//! This crate is I/O-free: callers hand it in-memory reference data and a
//! scenario (usually loaded by `sim_io`) and get back a `SimulationResult`.
//! Only malformed configuration escapes as an error; data-quality problems and
//! a failing district are reported through the result's diagnostics.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sim_algo::{
    allocate_dhondt, AllocError, AllocationRound, Apportionment, Coalition, ElectionMetrics,
    SeatMargin, SeatStability, TippingPoints,
};
use sim_core::{
    determinism::canonical_parties,
    diagnostics::Diagnostics,
    ids::{PartyId, RegionId},
    reference::ReferenceData,
    scenario::{Pairing, Scenario},
    variables::SwingType,
    votes::VoteDistribution,
};

pub mod aggregate;
pub mod district;
pub mod validate;

pub use validate::validate_inputs;

/// Configuration the engine refuses to run on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Empty or unusable district-pairing list.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Options outside their domain (zero seats, bad coalition knobs, ...).
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

/// Seat allocation strategy for one district.
pub trait Apportioner {
    fn apportion(
        &self,
        votes: &VoteDistribution,
        seats: u32,
        order: &[PartyId],
    ) -> Result<Apportionment, AllocError>;
}

/// Highest averages with divisors 1, 2, 3, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct DHondt;

impl Apportioner for DHondt {
    fn apportion(
        &self,
        votes: &VoteDistribution,
        seats: u32,
        order: &[PartyId],
    ) -> Result<Apportionment, AllocError> {
        allocate_dhondt(votes, seats, order)
    }
}

// ---------------------------- Result documents ----------------------------

/// One district (a pairing of two sub-units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictResult {
    /// Position in the scenario's pairing list.
    pub index: usize,
    pub name: String,
    pub units: Pairing,
    /// Region of each sub-unit, where the reference data has one.
    pub regions: (Option<RegionId>, Option<RegionId>),
    /// Projected district distribution the seats were allocated on.
    pub votes: VoteDistribution,
    pub seats: BTreeMap<PartyId, u32>,
    pub history: Vec<AllocationRound>,
    pub tipping: TippingPoints,
    pub stability: Vec<SeatStability>,
    pub closest: Option<SeatMargin>,
    /// Set when the district could not be computed; seats are then all zero.
    pub error: Option<String>,
}

impl DistrictResult {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn total_seats(&self) -> u32 {
        self.seats.values().sum()
    }
}

/// Entry of the national closest-contests list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosestContest {
    pub district: usize,
    pub name: String,
    pub winner: PartyId,
    pub runner_up: PartyId,
    pub margin: f64,
    pub relative_margin: f64,
}

/// National metrics plus the ranked coalition list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalMetrics {
    #[serde(flatten)]
    pub election: ElectionMetrics,
    pub coalitions: Vec<Coalition>,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub swing_type: SwingType,
    pub seats_per_district: u32,
    /// National input after sanitizing and renormalization.
    pub national_votes: VoteDistribution,
    pub district_results: Vec<DistrictResult>,
    pub national_seat_totals: BTreeMap<PartyId, u32>,
    pub metrics: NationalMetrics,
    pub closest_contests: Vec<ClosestContest>,
    pub diagnostics: Diagnostics,
}

// ---------------------------- Entry points ----------------------------

/// Run one simulation with D'Hondt allocation.
pub fn simulate(reference: &ReferenceData, scenario: &Scenario) -> Result<SimulationResult, PipelineError> {
    simulate_with(reference, scenario, &DHondt)
}

/// Run one simulation with a caller-chosen allocation strategy.
pub fn simulate_with(
    reference: &ReferenceData,
    scenario: &Scenario,
    apportioner: &dyn Apportioner,
) -> Result<SimulationResult, PipelineError> {
    let mut diags = Diagnostics::new();
    let national = validate::prepare(reference, scenario, &mut diags)?;
    let order = canonical_parties(&reference.parties, reference.parties.ids().chain(national.parties()));

    let ctx = district::RunContext {
        reference,
        national: &national,
        options: &scenario.options,
        order: &order,
        apportioner,
    };
    let district_results: Vec<DistrictResult> = scenario
        .pairings
        .iter()
        .enumerate()
        .map(|(i, pairing)| district::run_district(&ctx, i, pairing, &mut diags))
        .collect();

    let national_seat_totals = aggregate::seat_totals(&district_results, &order);
    let metrics = aggregate::national_metrics(reference, &national, &national_seat_totals, &order, &scenario.options);
    let closest_contests =
        aggregate::closest_contests(&district_results, scenario.options.closest_contests_limit);

    diags.sort_stably();
    for d in diags.iter() {
        tracing::warn!(code = %d.code, subject = ?d.subject, "{}", d.message);
    }
    tracing::info!(
        districts = district_results.len(),
        failed = district_results.iter().filter(|d| d.is_failed()).count(),
        seats = metrics.election.total_seats,
        coalitions = metrics.coalitions.len(),
        diagnostics = diags.len(),
        "simulation complete"
    );

    Ok(SimulationResult {
        swing_type: scenario.options.swing_type,
        seats_per_district: scenario.options.seats_per_district,
        national_votes: national,
        district_results,
        national_seat_totals,
        metrics,
        closest_contests,
        diagnostics: diags,
    })
}
