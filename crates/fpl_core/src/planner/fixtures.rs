//! Fixture difficulty swings over a planning horizon.
//!
//! Lower difficulty means an easier fixture; a negative trend means the
//! run of fixtures gets easier as the horizon progresses. Teams are
//! ranked by `avg_difficulty - difficulty_trend`, so easy-and-improving
//! schedules come first.

use crate::models::result::{round1, round2};
use crate::models::{PlayerId, PlayerRecord, Position, TeamId};
use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Teams reported in each of the best/worst shortlists.
const SHORTLIST_SIZE: usize = 5;

/// Players surfaced per team.
const TOP_PLAYERS_PER_TEAM: usize = 3;

/// Thin player row attached to a team's fixture outlook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixturePlayer {
    pub player_id: PlayerId,
    pub name: String,
    pub position: Position,
    pub predicted_points: f64,
    pub price: f64,
}

/// One team's fixture outlook over the horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamFixtureOutlook {
    pub team_id: TeamId,
    pub avg_difficulty: f64,
    /// Mean of the horizon's second half minus its first half; negative
    /// means the fixtures get easier.
    pub difficulty_trend: f64,
    pub fixtures: Vec<u8>,
    pub top_players: Vec<FixturePlayer>,
}

impl TeamFixtureOutlook {
    /// Ranking key: easier fixtures and an improving trend both lower it.
    fn attractiveness(&self) -> f64 {
        self.avg_difficulty - self.difficulty_trend
    }
}

/// Ranked fixture-swing report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSwingReport {
    pub best_fixtures: Vec<TeamFixtureOutlook>,
    pub worst_fixtures: Vec<TeamFixtureOutlook>,
    pub all_teams: Vec<TeamFixtureOutlook>,
    pub gameweek_range: String,
}

/// Rank teams by how attractive their upcoming fixtures are.
///
/// Teams without a difficulty list, and difficulty lists for teams
/// without players, are both skipped.
pub fn analyze_fixture_swings(
    players: &[PlayerRecord],
    fixture_difficulties: &FxHashMap<TeamId, Vec<u8>>,
    current_gameweek: u32,
    horizon: usize,
) -> FixtureSwingReport {
    info!("analyzing fixture swings for the next {} gameweeks", horizon);

    let mut players_by_team: FxHashMap<TeamId, Vec<&PlayerRecord>> = FxHashMap::default();
    for player in players {
        players_by_team.entry(player.team_id).or_default().push(player);
    }

    let mut all_teams: Vec<TeamFixtureOutlook> = Vec::new();
    for (&team_id, team_players) in &players_by_team {
        let Some(difficulties) = fixture_difficulties.get(&team_id) else {
            continue;
        };
        let window: Vec<u8> = difficulties.iter().take(horizon).copied().collect();
        if window.is_empty() {
            continue;
        }

        let half = horizon / 2;
        let avg_difficulty = mean(&window);
        let trend = match (window.get(half..), window.get(..half)) {
            (Some(late), Some(early)) if !late.is_empty() && !early.is_empty() => {
                mean(late) - mean(early)
            }
            _ => 0.0,
        };

        let mut ranked: Vec<&PlayerRecord> = team_players.clone();
        ranked.sort_by(|a, b| {
            b.predicted_points
                .partial_cmp(&a.predicted_points)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        let top_players = ranked
            .iter()
            .take(TOP_PLAYERS_PER_TEAM)
            .map(|p| FixturePlayer {
                player_id: p.id,
                name: p.name.clone(),
                position: p.position,
                predicted_points: round1(p.predicted_points),
                price: round1(p.price),
            })
            .collect();

        all_teams.push(TeamFixtureOutlook {
            team_id,
            avg_difficulty: round2(avg_difficulty),
            difficulty_trend: round2(trend),
            fixtures: window,
            top_players,
        });
    }

    all_teams.sort_by(|a, b| {
        a.attractiveness()
            .partial_cmp(&b.attractiveness())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.team_id.cmp(&b.team_id))
    });

    let best_fixtures = all_teams.iter().take(SHORTLIST_SIZE).cloned().collect();
    let worst_fixtures = all_teams
        .iter()
        .rev()
        .take(SHORTLIST_SIZE)
        .rev()
        .cloned()
        .collect();

    FixtureSwingReport {
        best_fixtures,
        worst_fixtures,
        all_teams,
        gameweek_range: format!(
            "{}-{}",
            current_gameweek,
            current_gameweek + horizon.saturating_sub(1) as u32
        ),
    }
}

fn mean(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}
