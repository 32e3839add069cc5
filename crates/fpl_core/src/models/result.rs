use crate::models::player::{PlayerId, Position, TeamId};
use serde::{Deserialize, Serialize};

/// How the returned squad was produced. Degraded outcomes are never
/// silently mixed with proven optima.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    /// The solver proved optimality within its time budget.
    Optimal,
    /// The greedy fallback produced the squad after a solver timeout.
    Heuristic,
}

/// One squad row with its lineup role flags, rounded for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadPlayer {
    pub player_id: PlayerId,
    pub name: String,
    pub position: Position,
    pub team_id: TeamId,
    pub price: f64,
    pub predicted_points: f64,
    pub start_probability: f64,
    pub variance: f64,
    pub is_starter: bool,
    pub is_captain: bool,
}

/// Complete outcome of one squad optimization call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadResult {
    /// Full squad, starters and bench together.
    pub squad: Vec<SquadPlayer>,
    pub starting_xi: Vec<SquadPlayer>,
    pub bench: Vec<SquadPlayer>,
    /// Label derived from starting defender/midfielder/forward counts.
    pub formation: String,
    pub total_cost: f64,
    /// Expected points of the starting lineup with the captain doubled.
    pub predicted_points: f64,
    pub captain_id: PlayerId,
    pub status: SolveStatus,
    /// Alternative squads. No enumeration strategy is implemented, so
    /// this is always empty; re-solve with exclusions for variety.
    pub alternatives: Vec<SquadResult>,
}

impl SquadResult {
    /// Starting position counts as (keepers, defenders, midfielders, forwards).
    pub fn starting_counts(&self) -> (usize, usize, usize, usize) {
        let mut counts = [0usize; 4];
        for player in &self.starting_xi {
            counts[player.position.index()] += 1;
        }
        (counts[0], counts[1], counts[2], counts[3])
    }
}

/// Round to one decimal place, the display convention for points and money.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places, used for probabilities and variances.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_helpers() {
        assert_eq!(round1(10.34), 10.3);
        assert_eq!(round1(10.35), 10.4);
        assert_eq!(round2(0.876), 0.88);
    }

    #[test]
    fn solve_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SolveStatus::Optimal).unwrap(), "\"optimal\"");
        assert_eq!(serde_json::to_string(&SolveStatus::Heuristic).unwrap(), "\"heuristic\"");
    }
}
