//! Exhaustive search over the formation catalog for a fixed player pool.
//!
//! The seven per-formation solves are independent, so they fan out over
//! the rayon thread pool; each solve still runs under the optimizer's
//! own per-solve deadline. A formation whose solve fails is logged and
//! skipped, never fatal to the search as a whole.

use crate::models::{ConstraintSpec, Formation, PlayerRecord, SquadResult};
use crate::optimizer::problem::{PRICE_EPS, SCORE_EPS};
use crate::optimizer::SquadOptimizer;
use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Result of one formation's solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationOutcome {
    pub formation: Formation,
    pub result: SquadResult,
}

/// Outcome of the whole catalog sweep. `best_formation` is `None` only
/// when every formation failed to solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationSearchResult {
    pub best_formation: Option<Formation>,
    pub best_result: Option<SquadResult>,
    /// Per-formation results in catalog order, failed formations absent.
    pub all_formation_results: Vec<FormationOutcome>,
}

impl SquadOptimizer {
    /// Solve once per catalog formation over the same pool and pick the
    /// best shape. Ties break on higher predicted points, then lower
    /// total cost, then catalog order.
    pub fn search_best_formation(
        &self,
        players: &[PlayerRecord],
        constraints: &ConstraintSpec,
    ) -> FormationSearchResult {
        let outcomes: Vec<Option<FormationOutcome>> = Formation::ALL
            .par_iter()
            .map(|&formation| {
                let per_formation =
                    ConstraintSpec { formation: Some(formation), ..constraints.clone() };
                match self.optimize(players, &per_formation) {
                    Ok(result) => Some(FormationOutcome { formation, result }),
                    Err(err) => {
                        warn!("formation {} skipped: {}", formation, err);
                        None
                    }
                }
            })
            .collect();

        let all_formation_results: Vec<FormationOutcome> = outcomes.into_iter().flatten().collect();

        let mut best: Option<&FormationOutcome> = None;
        for outcome in &all_formation_results {
            let improves = match best {
                None => true,
                Some(current) => {
                    let points_delta =
                        outcome.result.predicted_points - current.result.predicted_points;
                    points_delta > SCORE_EPS
                        || (points_delta.abs() <= SCORE_EPS
                            && outcome.result.total_cost + PRICE_EPS
                                < current.result.total_cost)
                }
            };
            if improves {
                best = Some(outcome);
            }
        }

        FormationSearchResult {
            best_formation: best.map(|outcome| outcome.formation),
            best_result: best.map(|outcome| outcome.result.clone()),
            all_formation_results,
        }
    }
}
