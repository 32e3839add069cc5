//! Integer-program formulation of one squad selection.
//!
//! Three boolean decisions exist per player: squad membership, starting
//! lineup membership, and captaincy. The objective maximizes expected
//! starter points plus a captain double, adjusted by a deliberately
//! simplified linear risk utility (not a full mean-variance model):
//! variance scaled by `2 * |risk_tolerance - 0.5|` is subtracted for
//! risk-averse callers and added for risk-seeking ones.

use crate::models::{ConstraintSpec, PlayerId, PlayerRecord, Position, TeamId};

/// Tolerance for fixed-point price comparisons.
pub(crate) const PRICE_EPS: f64 = 1e-6;

/// Tolerance for objective comparisons.
pub(crate) const SCORE_EPS: f64 = 1e-9;

/// One selectable player with pre-computed objective coefficients.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Index into the caller's player slice.
    pub player: usize,
    pub id: PlayerId,
    pub position: Position,
    pub team_id: TeamId,
    pub price: f64,
    /// Raw predicted points, used by the greedy fallback ordering.
    pub predicted: f64,
    /// Objective coefficient for the starting-lineup variable:
    /// predicted * probability with the linear risk term applied.
    pub start_score: f64,
    /// Objective coefficient for the captain variable: the unadjusted
    /// predicted * probability, doubled implicitly by being added once
    /// on top of the starter term.
    pub captain_score: f64,
    /// Forced into the squad by the constraint spec.
    pub required: bool,
}

/// Fully-formed problem instance handed to a solver backend.
///
/// The instance is immutable; backends are stateless and reusable, so a
/// single problem can be solved repeatedly with identical results.
#[derive(Debug, Clone)]
pub struct SquadProblem {
    /// Candidates sorted by descending start score, id ascending on ties.
    /// The fixed order makes every backend deterministic.
    pub candidates: Vec<Candidate>,
    pub budget: f64,
    pub squad_size: usize,
    pub starting_size: usize,
    pub max_per_team: usize,
    /// Exact per-position squad quota (2/5/5/3) when building a full
    /// 15-man squad, otherwise unconstrained by position.
    pub squad_quota: Option<[usize; 4]>,
    /// Minimum starters per position (goalkeeper pinned at 1).
    pub start_min: [usize; 4],
    /// Maximum starters per position.
    pub start_max: [usize; 4],
}

impl SquadProblem {
    /// Build the formulation from a validated spec.
    ///
    /// Excluded players are dropped from the candidate set entirely
    /// (their squad variable is fixed to zero); required players are
    /// flagged so backends never branch them out. Ids in either set
    /// that match no player in the pool are ignored.
    pub fn build(players: &[PlayerRecord], spec: &ConstraintSpec) -> SquadProblem {
        let risk_scale = 2.0 * (spec.risk_tolerance - 0.5).abs();
        let risk_sign = if spec.risk_tolerance < 0.5 {
            -1.0
        } else if spec.risk_tolerance > 0.5 {
            1.0
        } else {
            0.0
        };

        let mut candidates: Vec<Candidate> = players
            .iter()
            .enumerate()
            .filter(|(_, p)| !spec.excluded_ids.contains(&p.id))
            .map(|(idx, p)| {
                let base = p.expected_points();
                Candidate {
                    player: idx,
                    id: p.id,
                    position: p.position,
                    team_id: p.team_id,
                    price: p.price,
                    predicted: p.predicted_points,
                    start_score: base + risk_sign * risk_scale * p.variance,
                    captain_score: base,
                    required: spec.required_ids.contains(&p.id),
                }
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.start_score
                .partial_cmp(&a.start_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        let bounds = spec.starting_bounds();
        SquadProblem {
            candidates,
            budget: spec.budget,
            squad_size: spec.squad_size,
            starting_size: spec.starting_size,
            max_per_team: spec.max_per_team,
            squad_quota: spec.squad_quota(),
            start_min: bounds.min_by_position(),
            start_max: bounds.max_by_position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConstraintSpec;

    fn player(id: PlayerId, position: Position, points: f64, variance: f64) -> PlayerRecord {
        PlayerRecord {
            id,
            name: format!("P{}", id),
            position,
            team_id: id,
            price: 5.0,
            predicted_points: points,
            start_probability: 1.0,
            variance,
            ceiling_points: 0.0,
            floor_points: 0.0,
        }
    }

    #[test]
    fn neutral_risk_leaves_scores_unadjusted() {
        let players = vec![player(1, Position::Forward, 6.0, 4.0)];
        let problem = SquadProblem::build(&players, &ConstraintSpec::default());
        assert!((problem.candidates[0].start_score - 6.0).abs() < SCORE_EPS);
    }

    #[test]
    fn risk_averse_penalizes_variance() {
        let players = vec![player(1, Position::Forward, 6.0, 4.0)];
        let spec = ConstraintSpec { risk_tolerance: 0.25, ..ConstraintSpec::default() };
        let problem = SquadProblem::build(&players, &spec);
        // scale = 2 * 0.25 = 0.5, so 6.0 - 4.0 * 0.5 = 4.0
        assert!((problem.candidates[0].start_score - 4.0).abs() < SCORE_EPS);
        // captain coefficient stays unadjusted
        assert!((problem.candidates[0].captain_score - 6.0).abs() < SCORE_EPS);
    }

    #[test]
    fn risk_seeking_rewards_variance() {
        let players = vec![player(1, Position::Forward, 6.0, 4.0)];
        let spec = ConstraintSpec { risk_tolerance: 1.0, ..ConstraintSpec::default() };
        let problem = SquadProblem::build(&players, &spec);
        assert!((problem.candidates[0].start_score - 10.0).abs() < SCORE_EPS);
    }

    #[test]
    fn excluded_players_are_dropped_from_candidates() {
        let players =
            vec![player(1, Position::Forward, 6.0, 0.0), player(2, Position::Forward, 5.0, 0.0)];
        let mut spec = ConstraintSpec::default();
        spec.excluded_ids.insert(1);
        let problem = SquadProblem::build(&players, &spec);
        assert_eq!(problem.candidates.len(), 1);
        assert_eq!(problem.candidates[0].id, 2);
    }

    #[test]
    fn candidates_sorted_by_score_then_id() {
        let players = vec![
            player(3, Position::Forward, 5.0, 0.0),
            player(1, Position::Forward, 5.0, 0.0),
            player(2, Position::Forward, 9.0, 0.0),
        ];
        let problem = SquadProblem::build(&players, &ConstraintSpec::default());
        let ids: Vec<PlayerId> = problem.candidates.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
