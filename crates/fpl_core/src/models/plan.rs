use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};

/// One proposed swap: `player_out_id` leaves the squad, `player_in_id`
/// joins in the same position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOption {
    pub player_out_id: PlayerId,
    pub player_in_id: PlayerId,
    /// Marginal point cost of this transfer: 0 while within the
    /// free-transfer allowance, otherwise the flat hit.
    pub cost: u32,
    pub expected_gain: f64,
    /// Price-change effects are not modeled; kept as an acknowledged
    /// zero placeholder so the field shape is stable.
    pub price_change: f64,
    pub gameweek: u32,
}

/// Planner output for a single gameweek.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameweekPlan {
    pub gameweek: u32,
    pub transfers: Vec<TransferOption>,
    pub expected_points: f64,
    pub squad_value: f64,
    /// Free transfers available entering this gameweek.
    pub free_transfers: u32,
    pub transfer_cost: u32,
    pub net_expected_gain: f64,
}

/// One-off strategic boosts, usable once per season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chip {
    Wildcard,
    BenchBoost,
    TripleCaptain,
    FreeHit,
}

/// Timing recommendation for one chip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipStrategy {
    pub chip: Chip,
    /// None when no use within the horizon is recommended or the timing
    /// is not determinable from planner data alone.
    pub recommended_gameweek: Option<u32>,
    pub expected_benefit: f64,
    pub confidence: f64,
}

/// Complete multi-gameweek planning outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPlan {
    pub gameweek_plans: Vec<GameweekPlan>,
    pub chip_recommendations: Vec<ChipStrategy>,
    /// Sum of period expected points minus all transfer costs.
    pub total_expected_gain: f64,
    pub total_transfer_costs: u32,
    pub planning_horizon: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chip_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Chip::TripleCaptain).unwrap(), "\"triple_captain\"");
        assert_eq!(serde_json::to_string(&Chip::BenchBoost).unwrap(), "\"bench_boost\"");
    }
}
