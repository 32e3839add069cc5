//! Chip timing recommendations derived from a finished horizon plan.
//!
//! The advisor never re-plans; it reads the per-gameweek squad
//! snapshots the planner recorded and picks the period where each chip
//! would have paid the most.

use crate::models::result::round1;
use crate::models::{Chip, ChipStrategy, PlayerRecord};
use crate::planner::{PeriodRecord, PlannerConfig, TRANSFER_COST_POINTS};

/// Bench slots counted by the bench-boost estimate.
pub const BENCH_SIZE: usize = 4;

/// A horizon averaging more than this many transfers per gameweek is
/// churning hard enough that a wildcard beats paying for hits.
pub const WILDCARD_CHURN_FACTOR: usize = 2;

const TRIPLE_CAPTAIN_CONFIDENCE: f64 = 0.8;
const BENCH_BOOST_CONFIDENCE: f64 = 0.6;
const WILDCARD_CONFIDENCE_RECOMMENDED: f64 = 0.9;
const WILDCARD_CONFIDENCE_HOLD: f64 = 0.3;
const FREE_HIT_CONFIDENCE: f64 = 0.0;

/// Produce one strategy per chip, in a fixed order.
pub(crate) fn recommend(periods: &[PeriodRecord], config: &PlannerConfig) -> Vec<ChipStrategy> {
    vec![
        triple_captain(periods),
        bench_boost(periods),
        wildcard(periods, config),
        free_hit(),
    ]
}

/// Triple captain: the gameweek whose best squad scorer peaks. The
/// benefit is the extra captain multiple, which equals that scorer's
/// expected points.
fn triple_captain(periods: &[PeriodRecord]) -> ChipStrategy {
    let best = argmax_period(periods, |squad| {
        squad
            .iter()
            .map(PlayerRecord::expected_points)
            .fold(0.0_f64, f64::max)
    });
    match best {
        Some((gameweek, benefit)) => ChipStrategy {
            chip: Chip::TripleCaptain,
            recommended_gameweek: Some(gameweek),
            expected_benefit: round1(benefit),
            confidence: TRIPLE_CAPTAIN_CONFIDENCE,
        },
        None => hold(Chip::TripleCaptain, FREE_HIT_CONFIDENCE),
    }
}

/// Bench boost: the gameweek whose four weakest squad members are
/// collectively strongest, since those are the points a boost adds.
fn bench_boost(periods: &[PeriodRecord]) -> ChipStrategy {
    let best = argmax_period(periods, |squad| {
        let mut expected: Vec<f64> = squad.iter().map(PlayerRecord::expected_points).collect();
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        expected.iter().take(BENCH_SIZE).sum()
    });
    match best {
        Some((gameweek, benefit)) => ChipStrategy {
            chip: Chip::BenchBoost,
            recommended_gameweek: Some(gameweek),
            expected_benefit: round1(benefit),
            confidence: BENCH_BOOST_CONFIDENCE,
        },
        None => hold(Chip::BenchBoost, FREE_HIT_CONFIDENCE),
    }
}

/// Wildcard: recommended only when the plan churns more transfers than
/// WILDCARD_CHURN_FACTOR per gameweek on average. The benefit is the
/// point cost of making all those moves as hits, minus the one hit the
/// free allowance covers anyway.
fn wildcard(periods: &[PeriodRecord], config: &PlannerConfig) -> ChipStrategy {
    let total_transfers: usize = periods.iter().map(|p| p.plan.transfers.len()).sum();
    if !periods.is_empty() && total_transfers > WILDCARD_CHURN_FACTOR * periods.len() {
        let saved = total_transfers as u32 * TRANSFER_COST_POINTS - TRANSFER_COST_POINTS;
        ChipStrategy {
            chip: Chip::Wildcard,
            recommended_gameweek: Some(config.start_gameweek + 1),
            expected_benefit: round1(f64::from(saved)),
            confidence: WILDCARD_CONFIDENCE_RECOMMENDED,
        }
    } else {
        hold(Chip::Wildcard, WILDCARD_CONFIDENCE_HOLD)
    }
}

/// Free hit needs single-gameweek fixture context the planner does not
/// model, so it is always reported as hold-with-no-signal.
fn free_hit() -> ChipStrategy {
    hold(Chip::FreeHit, FREE_HIT_CONFIDENCE)
}

fn hold(chip: Chip, confidence: f64) -> ChipStrategy {
    ChipStrategy { chip, recommended_gameweek: None, expected_benefit: 0.0, confidence }
}

/// Earliest gameweek maximizing `score` over the squad snapshots.
fn argmax_period<F>(periods: &[PeriodRecord], score: F) -> Option<(u32, f64)>
where
    F: Fn(&[PlayerRecord]) -> f64,
{
    let mut best: Option<(u32, f64)> = None;
    for period in periods {
        let value = score(&period.squad);
        let improves = match best {
            None => true,
            Some((_, current)) => value > current,
        };
        if improves {
            best = Some((period.plan.gameweek, value));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameweekPlan, Position, TransferOption};

    fn player(id: u32, points: f64) -> PlayerRecord {
        PlayerRecord {
            id,
            name: format!("P{}", id),
            position: Position::Midfielder,
            team_id: id,
            price: 5.0,
            predicted_points: points,
            start_probability: 1.0,
            variance: 0.0,
            ceiling_points: 0.0,
            floor_points: 0.0,
        }
    }

    fn period(gameweek: u32, squad: Vec<PlayerRecord>, transfers: usize) -> PeriodRecord {
        let transfers = (0..transfers)
            .map(|i| TransferOption {
                player_out_id: i as u32,
                player_in_id: 100 + i as u32,
                cost: 0,
                expected_gain: 1.0,
                price_change: 0.0,
                gameweek,
            })
            .collect();
        PeriodRecord {
            plan: GameweekPlan {
                gameweek,
                transfers,
                expected_points: 0.0,
                squad_value: 0.0,
                free_transfers: 1,
                transfer_cost: 0,
                net_expected_gain: 0.0,
            },
            squad,
        }
    }

    #[test]
    fn triple_captain_targets_the_peak_scorer_week() {
        let periods = vec![
            period(1, vec![player(1, 6.0), player(2, 5.0)], 0),
            period(2, vec![player(1, 9.0), player(2, 5.0)], 0),
            period(3, vec![player(1, 7.0), player(2, 5.0)], 0),
        ];
        let strategy = triple_captain(&periods);
        assert_eq!(strategy.recommended_gameweek, Some(2));
        assert_eq!(strategy.expected_benefit, 9.0);
    }

    #[test]
    fn bench_boost_sums_the_weakest_four() {
        let squad: Vec<PlayerRecord> =
            (1..=15).map(|id| player(id, f64::from(id))).collect();
        let periods = vec![period(1, squad, 0)];
        let strategy = bench_boost(&periods);
        // weakest four score 1 + 2 + 3 + 4
        assert_eq!(strategy.expected_benefit, 10.0);
        assert_eq!(strategy.recommended_gameweek, Some(1));
    }

    #[test]
    fn heavy_churn_triggers_the_wildcard() {
        let squad = vec![player(1, 4.0)];
        let periods = vec![
            period(1, squad.clone(), 3),
            period(2, squad.clone(), 3),
            period(3, squad, 3),
        ];
        let config = PlannerConfig { start_gameweek: 1, ..PlannerConfig::default() };
        let strategy = wildcard(&periods, &config);
        assert_eq!(strategy.recommended_gameweek, Some(2));
        // nine transfers at four points each, less the one free hit
        assert_eq!(strategy.expected_benefit, 32.0);
        assert!(strategy.confidence > 0.5);
    }

    #[test]
    fn light_churn_holds_the_wildcard() {
        let squad = vec![player(1, 4.0)];
        let periods = vec![period(1, squad.clone(), 1), period(2, squad, 1)];
        let strategy = wildcard(&periods, &PlannerConfig::default());
        assert_eq!(strategy.recommended_gameweek, None);
        assert_eq!(strategy.expected_benefit, 0.0);
    }

    #[test]
    fn free_hit_is_always_held() {
        let strategy = free_hit();
        assert_eq!(strategy.recommended_gameweek, None);
        assert_eq!(strategy.confidence, 0.0);
    }

    #[test]
    fn ties_resolve_to_the_earliest_gameweek() {
        let squad = vec![player(1, 6.0)];
        let periods = vec![period(4, squad.clone(), 0), period(5, squad, 0)];
        let strategy = triple_captain(&periods);
        assert_eq!(strategy.recommended_gameweek, Some(4));
    }
}
