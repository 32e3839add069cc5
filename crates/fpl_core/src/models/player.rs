use serde::{Deserialize, Serialize};
use std::fmt;

/// Player identifier as supplied by the data pipeline.
pub type PlayerId = u32;

/// Club identifier used for the per-team squad cap.
pub type TeamId = u32;

/// On-pitch position. Every squad slot and formation bound is expressed
/// in terms of these four groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[serde(rename = "keeper")]
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] =
        [Position::Goalkeeper, Position::Defender, Position::Midfielder, Position::Forward];

    /// Dense index for per-position count arrays.
    pub fn index(self) -> usize {
        match self {
            Position::Goalkeeper => 0,
            Position::Defender => 1,
            Position::Midfielder => 2,
            Position::Forward => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "keeper",
            Position::Defender => "defender",
            Position::Midfielder => "midfielder",
            Position::Forward => "forward",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One player as seen by the optimizer for a single gameweek.
///
/// Predicted points, start probability and the variance/ceiling/floor
/// estimates come from the upstream prediction model and are consumed
/// as given. Records are immutable value objects; the engine never
/// mutates a `PlayerRecord` after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub team_id: TeamId,
    /// Price in millions, fixed to one decimal place by the data source.
    pub price: f64,
    pub predicted_points: f64,
    /// Probability of starting the gameweek, in [0, 1].
    pub start_probability: f64,
    #[serde(default)]
    pub variance: f64,
    #[serde(default)]
    pub ceiling_points: f64,
    #[serde(default)]
    pub floor_points: f64,
}

impl PlayerRecord {
    /// Expected points contribution if fielded: predicted points weighted
    /// by the probability of actually starting.
    pub fn expected_points(&self) -> f64 {
        self.predicted_points * self.start_probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Position::Goalkeeper).unwrap(), "\"keeper\"");
        assert_eq!(serde_json::to_string(&Position::Midfielder).unwrap(), "\"midfielder\"");
        let pos: Position = serde_json::from_str("\"defender\"").unwrap();
        assert_eq!(pos, Position::Defender);
    }

    #[test]
    fn optional_estimates_default_to_zero() {
        let raw = r#"{
            "id": 7,
            "name": "Test Player",
            "position": "forward",
            "team_id": 3,
            "price": 8.5,
            "predicted_points": 6.2,
            "start_probability": 0.9
        }"#;
        let player: PlayerRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(player.variance, 0.0);
        assert_eq!(player.ceiling_points, 0.0);
        assert!((player.expected_points() - 5.58).abs() < 1e-9);
    }
}
