// crates/sim_algo/src/lib.rs
#![forbid(unsafe_code)]

// ----------------------------- District pipeline stages ------------------------------

pub mod combine;
pub mod swing;
pub mod tipping;
pub mod metrics;

pub use combine::{combine_votes, WeightedUnit};
pub use swing::{apply_swing, blend_regional_deltas, renormalize_with_ceilings, SwingContext};
pub use tipping::{
    closest_margin, seat_stability, tipping_points, FlipScenario, Likelihood, SeatMargin,
    SeatStability, Stability, TippingPoints,
};
pub use metrics::{compute_metrics, majority_threshold, ElectionMetrics};

// ----------------------------- Allocation (public surface) ---------------------------

pub mod allocation {
    pub mod dhondt;

    pub use dhondt::{allocate_dhondt, AllocError, AllocationRound, Apportionment, QuotientRow};
}

pub use allocation::{allocate_dhondt, AllocError, AllocationRound, Apportionment, QuotientRow};

// ----------------------------- Coalitions -------------------------------------------

pub mod coalition {
    pub mod compatibility;
    pub mod search;

    pub use compatibility::{CompatibilityScore, Scorer};
    pub use search::{find_coalitions, Coalition, CoalitionContext, CoalitionKind};
}

pub use coalition::{find_coalitions, Coalition, CoalitionContext, CoalitionKind, CompatibilityScore};
