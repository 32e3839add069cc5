//! # fpl_core - Fantasy Squad Optimization Engine
//!
//! This library selects fantasy football squads under budget, position
//! and team constraints, and plans transfers over a multi-gameweek
//! horizon.
//!
//! ## Features
//! - Exact branch-and-bound squad selection with a per-solve deadline
//! - Deterministic solves (same input + config = same squad)
//! - Formation catalog sweep, captain ranking, chip timing advice
//! - JSON API for easy integration behind a service edge

pub mod api;
pub mod captain;
pub mod error;
pub mod models;
pub mod optimizer;
pub mod planner;

// Re-export main API functions
pub use api::{
    optimize_squad_json, plan_transfers_json, search_formation_json, select_captain_json,
    ApiError, ApiResponse, API_VERSION,
};
pub use error::{OptimizerError, Result};

// Re-export the data model
pub use models::{
    Chip, ChipStrategy, ConstraintSpec, Formation, GameweekPlan, PlayerId, PlayerRecord,
    Position, SolveStatus, SquadPlayer, SquadResult, TeamId, TransferOption, TransferPlan,
};

// Re-export the solver surface
pub use captain::{select_captain, CaptainOption, CaptainRanking};
pub use optimizer::formation_search::{FormationOutcome, FormationSearchResult};
pub use optimizer::{SolverConfig, SquadOptimizer};
pub use planner::fixtures::{analyze_fixture_swings, FixtureSwingReport, TeamFixtureOutlook};
pub use planner::{PlannerConfig, TransferPlanner};

/// Library version, taken from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
