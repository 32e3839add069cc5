//! Captain selection for an already-chosen squad.
//!
//! This is a secondary ranking pass, deliberately outside the integer
//! program: with the squad fixed, captaincy is a sort over doubled
//! expected points with a small variance penalty.

use crate::error::{OptimizerError, Result};
use crate::models::result::{round1, round2};
use crate::models::{PlayerId, PlayerRecord, Position};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Penalty applied per unit of variance when ranking captains.
pub const CAPTAIN_VARIANCE_PENALTY: f64 = 0.1;

/// Number of options surfaced as the shortlist.
pub const CAPTAIN_SHORTLIST: usize = 5;

/// One captain candidate with its scoring breakdown, display-rounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptainOption {
    pub player_id: PlayerId,
    pub name: String,
    pub position: Position,
    /// Doubled expected points: predicted * start probability * 2.
    pub expected_points: f64,
    pub risk_adjusted_points: f64,
    pub start_probability: f64,
    pub base_points: f64,
    pub variance: f64,
}

/// Full captain ranking for a squad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptainRanking {
    pub recommended: CaptainOption,
    pub top_options: Vec<CaptainOption>,
    pub all_options: Vec<CaptainOption>,
}

/// Rank every squad member as a captain candidate.
///
/// Fails with [`OptimizerError::EmptyCandidateSet`] when none of the
/// given ids matches a player in the pool.
pub fn select_captain(
    players: &[PlayerRecord],
    squad_ids: &FxHashSet<PlayerId>,
) -> Result<CaptainRanking> {
    let mut options: Vec<CaptainOption> = players
        .iter()
        .filter(|player| squad_ids.contains(&player.id))
        .map(|player| {
            let expected = player.expected_points() * 2.0;
            let risk_adjusted = expected - player.variance * CAPTAIN_VARIANCE_PENALTY;
            CaptainOption {
                player_id: player.id,
                name: player.name.clone(),
                position: player.position,
                expected_points: round1(expected),
                risk_adjusted_points: round1(risk_adjusted),
                start_probability: round2(player.start_probability),
                base_points: round1(player.predicted_points),
                variance: round2(player.variance),
            }
        })
        .collect();

    if options.is_empty() {
        return Err(OptimizerError::EmptyCandidateSet(
            "no player in the pool matches the squad ids".to_string(),
        ));
    }

    options.sort_by(|a, b| {
        b.risk_adjusted_points
            .partial_cmp(&a.risk_adjusted_points)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.player_id.cmp(&b.player_id))
    });

    Ok(CaptainRanking {
        recommended: options[0].clone(),
        top_options: options.iter().take(CAPTAIN_SHORTLIST).cloned().collect(),
        all_options: options,
    })
}
