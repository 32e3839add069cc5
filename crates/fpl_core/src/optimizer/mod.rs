//! Squad optimizer: builds one integer program per invocation and
//! solves it with an injectable backend.

pub mod branch_bound;
pub mod formation_search;
pub mod heuristic;
pub mod problem;

pub use branch_bound::{BranchAndBound, SolverBackend, Solution};
pub use formation_search::{FormationOutcome, FormationSearchResult};
pub use problem::{Candidate, SquadProblem};

use crate::error::{OptimizerError, Result};
use crate::models::result::round2;
use crate::models::{
    result::round1, ConstraintSpec, PlayerRecord, SolveStatus, SquadPlayer, SquadResult,
};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Per-solve limits. Integer programming is exponential in the worst
/// case, so every solve runs against a wall-clock deadline.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    pub time_budget: Duration,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig { time_budget: Duration::from_secs(10) }
    }
}

/// Stateless squad selection engine. A single instance is safe to share
/// across threads and reuse across calls; every solve is a pure function
/// of its inputs and the solver configuration.
#[derive(Clone)]
pub struct SquadOptimizer {
    backend: Arc<dyn SolverBackend>,
    config: SolverConfig,
}

impl Default for SquadOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SquadOptimizer {
    pub fn new() -> Self {
        SquadOptimizer { backend: Arc::new(BranchAndBound), config: SolverConfig::default() }
    }

    /// Substitute a different solver backend without touching the
    /// constraint-construction logic.
    pub fn with_backend(backend: Arc<dyn SolverBackend>) -> Self {
        SquadOptimizer { backend, config: SolverConfig::default() }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Select the best squad, starting lineup and captain for one
    /// gameweek.
    ///
    /// Validation failures and proven infeasibility propagate as errors.
    /// A solver timeout falls back to the documented greedy heuristic
    /// and tags the result [`SolveStatus::Heuristic`]; the timeout is
    /// surfaced unchanged when even the fallback cannot complete a
    /// squad. Partial or silently degraded results are never returned.
    pub fn optimize(
        &self,
        players: &[PlayerRecord],
        constraints: &ConstraintSpec,
    ) -> Result<SquadResult> {
        constraints.validate()?;
        info!(
            "optimizing squad: {} players, budget {:.1}, formation {}",
            players.len(),
            constraints.budget,
            constraints.formation.map(|f| f.label()).unwrap_or("open"),
        );

        let problem = SquadProblem::build(players, constraints);
        match self.backend.solve(&problem, self.config.time_budget) {
            Ok(solution) => {
                debug!("{} solved with objective {:.3}", self.backend.name(), solution.objective);
                Ok(extract_result(players, &problem, &solution, SolveStatus::Optimal))
            }
            Err(timeout @ OptimizerError::SolverTimeout { .. }) => {
                warn!("{}; falling back to greedy heuristic", timeout);
                match heuristic::greedy_squad(&problem) {
                    Some(solution) => {
                        Ok(extract_result(players, &problem, &solution, SolveStatus::Heuristic))
                    }
                    None => Err(timeout),
                }
            }
            Err(err) => Err(err),
        }
    }
}

/// Map a candidate-space solution back onto the caller's players and
/// assemble the result rows.
fn extract_result(
    players: &[PlayerRecord],
    problem: &SquadProblem,
    solution: &Solution,
    status: SolveStatus,
) -> SquadResult {
    let captain_id = problem.candidates[solution.captain].id;
    let is_starting: Vec<bool> = {
        let mut flags = vec![false; problem.candidates.len()];
        for &idx in &solution.starting {
            flags[idx] = true;
        }
        flags
    };

    let row = |idx: usize| -> SquadPlayer {
        let candidate = &problem.candidates[idx];
        let player = &players[candidate.player];
        SquadPlayer {
            player_id: player.id,
            name: player.name.clone(),
            position: player.position,
            team_id: player.team_id,
            price: player.price,
            predicted_points: round1(player.predicted_points),
            start_probability: round2(player.start_probability),
            variance: round2(player.variance),
            is_starter: is_starting[idx],
            is_captain: candidate.id == captain_id,
        }
    };

    let squad: Vec<SquadPlayer> = solution.squad.iter().map(|&idx| row(idx)).collect();
    let starting_xi: Vec<SquadPlayer> =
        solution.squad.iter().filter(|&&idx| is_starting[idx]).map(|&idx| row(idx)).collect();
    let bench: Vec<SquadPlayer> =
        solution.squad.iter().filter(|&&idx| !is_starting[idx]).map(|&idx| row(idx)).collect();

    let total_cost: f64 =
        solution.squad.iter().map(|&idx| problem.candidates[idx].price).sum();
    let predicted_points: f64 = solution
        .starting
        .iter()
        .map(|&idx| problem.candidates[idx].captain_score)
        .sum::<f64>()
        + problem.candidates[solution.captain].captain_score;

    let mut starting_counts = [0usize; 4];
    for &idx in &solution.starting {
        starting_counts[problem.candidates[idx].position.index()] += 1;
    }
    let formation =
        format!("{}-{}-{}", starting_counts[1], starting_counts[2], starting_counts[3]);

    SquadResult {
        squad,
        starting_xi,
        bench,
        formation,
        total_cost: round1(total_cost),
        predicted_points: round1(predicted_points),
        captain_id,
        status,
        alternatives: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Formation, PlayerId, Position};
    use rustc_hash::FxHashSet;

    fn player(
        id: PlayerId,
        position: Position,
        team_id: u32,
        price: f64,
        points: f64,
        prob: f64,
    ) -> PlayerRecord {
        PlayerRecord {
            id,
            name: format!("P{}", id),
            position,
            team_id,
            price,
            predicted_points: points,
            start_probability: prob,
            variance: 0.0,
            ceiling_points: 0.0,
            floor_points: 0.0,
        }
    }

    /// 26-player pool spread over 13 teams, prices keeping a 100.0
    /// budget comfortably feasible.
    fn pool() -> Vec<PlayerRecord> {
        let mut players = Vec::new();
        let mut id = 0;
        for (pos, count) in [
            (Position::Goalkeeper, 4),
            (Position::Defender, 8),
            (Position::Midfielder, 8),
            (Position::Forward, 6),
        ] {
            for _ in 0..count {
                id += 1;
                let team_id = id % 13;
                let price = 4.0 + f64::from(id % 5) * 0.5;
                let points = 2.0 + f64::from(id % 7);
                players.push(player(id, pos, team_id, price, points, 0.9));
            }
        }
        players
    }

    #[test]
    fn scenario_a_full_squad_within_budget() {
        let result = SquadOptimizer::new().optimize(&pool(), &ConstraintSpec::default()).unwrap();
        assert_eq!(result.squad.len(), 15);
        assert_eq!(result.starting_xi.len(), 11);
        assert_eq!(result.bench.len(), 4);
        assert!(result.total_cost <= 100.0 + 1e-6);
        assert_eq!(result.status, SolveStatus::Optimal);
        assert!(result.alternatives.is_empty());

        let (gk, def, mid, fwd) = result.starting_counts();
        assert_eq!(gk, 1);
        assert!((3..=5).contains(&def));
        assert!((2..=5).contains(&mid));
        assert!((1..=3).contains(&fwd));
    }

    #[test]
    fn full_squad_position_quota_is_2_5_5_3() {
        let result = SquadOptimizer::new().optimize(&pool(), &ConstraintSpec::default()).unwrap();
        let mut counts = [0usize; 4];
        for player in &result.squad {
            counts[player.position.index()] += 1;
        }
        assert_eq!(counts, [2, 5, 5, 3]);
    }

    #[test]
    fn team_cap_is_respected() {
        let result = SquadOptimizer::new().optimize(&pool(), &ConstraintSpec::default()).unwrap();
        let mut per_team = std::collections::HashMap::new();
        for player in &result.squad {
            *per_team.entry(player.team_id).or_insert(0usize) += 1;
        }
        assert!(per_team.values().all(|&count| count <= 3));
    }

    #[test]
    fn pinned_formation_fixes_starting_counts() {
        let spec =
            ConstraintSpec { formation: Some(Formation::F442), ..ConstraintSpec::default() };
        let result = SquadOptimizer::new().optimize(&pool(), &spec).unwrap();
        assert_eq!(result.starting_counts(), (1, 4, 4, 2));
        assert_eq!(result.formation, "4-4-2");
    }

    #[test]
    fn exactly_one_captain_from_starting_lineup() {
        let result = SquadOptimizer::new().optimize(&pool(), &ConstraintSpec::default()).unwrap();
        let captains: Vec<_> = result.squad.iter().filter(|p| p.is_captain).collect();
        assert_eq!(captains.len(), 1);
        assert!(captains[0].is_starter);
        assert_eq!(captains[0].player_id, result.captain_id);
        assert!(result.starting_xi.iter().any(|p| p.player_id == result.captain_id));
    }

    #[test]
    fn scenario_b_exclusions_and_requirements() {
        let mut spec = ConstraintSpec::default();
        spec.excluded_ids = FxHashSet::from_iter([5]);
        spec.required_ids = FxHashSet::from_iter([6]);
        let result = SquadOptimizer::new().optimize(&pool(), &spec).unwrap();
        assert!(result.squad.iter().all(|p| p.player_id != 5));
        assert!(result.squad.iter().any(|p| p.player_id == 6));
    }

    #[test]
    fn unknown_ids_in_sets_are_ignored() {
        let mut spec = ConstraintSpec::default();
        spec.excluded_ids = FxHashSet::from_iter([9999]);
        spec.required_ids = FxHashSet::from_iter([8888]);
        assert!(SquadOptimizer::new().optimize(&pool(), &spec).is_ok());
    }

    #[test]
    fn scenario_c_infeasible_budget() {
        let spec = ConstraintSpec { budget: 10.0, ..ConstraintSpec::default() };
        let err = SquadOptimizer::new().optimize(&pool(), &spec).unwrap_err();
        assert!(matches!(err, OptimizerError::Infeasible(_)));
    }

    #[test]
    fn required_set_conflicting_with_quota_is_infeasible() {
        // three required goalkeepers cannot fit the two-keeper quota
        let mut spec = ConstraintSpec::default();
        spec.required_ids = FxHashSet::from_iter([1, 2, 3]);
        let err = SquadOptimizer::new().optimize(&pool(), &spec).unwrap_err();
        assert!(matches!(err, OptimizerError::Infeasible(_)));
    }

    #[test]
    fn invalid_constraints_fail_before_solving() {
        let spec = ConstraintSpec { budget: -1.0, ..ConstraintSpec::default() };
        let err = SquadOptimizer::new().optimize(&pool(), &spec).unwrap_err();
        assert!(matches!(err, OptimizerError::InvalidConstraint(_)));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let optimizer = SquadOptimizer::new();
        let first = optimizer.optimize(&pool(), &ConstraintSpec::default()).unwrap();
        let second = optimizer.optimize(&pool(), &ConstraintSpec::default()).unwrap();
        assert_eq!(first.predicted_points, second.predicted_points);
        assert_eq!(first.total_cost, second.total_cost);
        assert_eq!(first.captain_id, second.captain_id);
        let first_ids: Vec<_> = first.squad.iter().map(|p| p.player_id).collect();
        let second_ids: Vec<_> = second.squad.iter().map(|p| p.player_id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn timeout_falls_back_to_tagged_heuristic() {
        let optimizer = SquadOptimizer::new()
            .with_config(SolverConfig { time_budget: Duration::ZERO });
        let result = optimizer.optimize(&pool(), &ConstraintSpec::default()).unwrap();
        assert_eq!(result.status, SolveStatus::Heuristic);
        assert_eq!(result.squad.len(), 15);
        assert!(result.total_cost <= 100.0 + 1e-6);
    }

    #[test]
    fn timeout_with_failing_heuristic_surfaces_timeout() {
        // budget below any completable squad: the heuristic cannot help
        let spec = ConstraintSpec { budget: 10.0, ..ConstraintSpec::default() };
        let optimizer = SquadOptimizer::new()
            .with_config(SolverConfig { time_budget: Duration::ZERO });
        let err = optimizer.optimize(&pool(), &spec).unwrap_err();
        assert!(matches!(err, OptimizerError::SolverTimeout { .. }));
    }

    #[test]
    fn risk_averse_prefers_steady_player() {
        // Two otherwise identical forwards; the volatile one scores a
        // touch higher but carries a large variance.
        let mut players = pool();
        players.push(player(100, Position::Forward, 11, 5.0, 9.0, 1.0));
        players.push(PlayerRecord {
            variance: 8.0,
            ..player(101, Position::Forward, 12, 5.0, 9.2, 1.0)
        });

        let averse = ConstraintSpec { risk_tolerance: 0.0, ..ConstraintSpec::default() };
        let result = SquadOptimizer::new().optimize(&players, &averse).unwrap();
        let starter_ids: Vec<_> = result
            .starting_xi
            .iter()
            .map(|p| p.player_id)
            .collect();
        assert!(starter_ids.contains(&100));
        assert!(!starter_ids.contains(&101));

        let seeking = ConstraintSpec { risk_tolerance: 1.0, ..ConstraintSpec::default() };
        let result = SquadOptimizer::new().optimize(&players, &seeking).unwrap();
        let starter_ids: Vec<_> = result.starting_xi.iter().map(|p| p.player_id).collect();
        assert!(starter_ids.contains(&101));
    }
}
