//! Multi-gameweek transfer planning.
//!
//! The planner is a sequential state machine: squad, free-transfer
//! balance and squad value roll forward one gameweek at a time over a
//! fixed horizon. State at gameweek k depends on gameweek k-1, so the
//! loop must never be reordered or parallelized.

pub mod chips;
pub mod fixtures;

use crate::error::{OptimizerError, Result};
use crate::models::result::round1;
use crate::models::{GameweekPlan, PlayerRecord, TransferOption, TransferPlan};
use log::{info, warn};
use rustc_hash::FxHashSet;

/// Point cost per transfer beyond the free allowance.
pub const TRANSFER_COST_POINTS: u32 = 4;

/// Rollover cap: an unused free transfer carries over once.
pub const MAX_FREE_TRANSFERS: u32 = 2;

/// Starting-lineup size used by the cheap scoring proxy.
const LINEUP_SIZE: usize = 11;

/// Planner knobs; every threshold is explicit rather than buried.
#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
    pub horizon: usize,
    pub max_transfers_per_week: usize,
    pub start_gameweek: u32,
    pub initial_free_transfers: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            horizon: 5,
            max_transfers_per_week: 1,
            start_gameweek: 1,
            initial_free_transfers: 1,
        }
    }
}

/// One planned gameweek together with the squad snapshot that the chip
/// advisor consumes.
#[derive(Debug, Clone)]
pub(crate) struct PeriodRecord {
    pub plan: GameweekPlan,
    pub squad: Vec<PlayerRecord>,
}

/// Sequential transfer planner over a fixed horizon.
#[derive(Debug, Clone, Default)]
pub struct TransferPlanner {
    config: PlannerConfig,
}

impl TransferPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PlannerConfig) -> Self {
        TransferPlanner { config }
    }

    /// Plan transfers gameweek by gameweek.
    ///
    /// A failure inside one gameweek's candidate generation downgrades
    /// that gameweek to zero transfers; the horizon always completes.
    pub fn plan(
        &self,
        current_squad: &[PlayerRecord],
        pool: &[PlayerRecord],
    ) -> Result<TransferPlan> {
        if current_squad.is_empty() {
            return Err(OptimizerError::EmptyCandidateSet(
                "transfer planning needs a non-empty current squad".to_string(),
            ));
        }
        info!(
            "planning transfers: horizon {}, squad {}, pool {}",
            self.config.horizon,
            current_squad.len(),
            pool.len()
        );

        let mut squad: Vec<PlayerRecord> = current_squad.to_vec();
        let mut free_transfers = self.config.initial_free_transfers;
        let mut periods: Vec<PeriodRecord> = Vec::with_capacity(self.config.horizon);

        for offset in 0..self.config.horizon {
            let gameweek = self.config.start_gameweek + offset as u32;

            let candidates = match generate_options(&squad, pool, gameweek) {
                Ok(candidates) => candidates,
                Err(err) => {
                    warn!("gameweek {}: candidate generation failed: {}", gameweek, err);
                    Vec::new()
                }
            };
            let selected =
                select_transfers(candidates, self.config.max_transfers_per_week, free_transfers);

            squad = apply_transfers(&squad, &selected, pool);

            let transfers_made = selected.len() as u32;
            let transfer_cost = transfers_made.saturating_sub(free_transfers) * TRANSFER_COST_POINTS;
            let expected_points = round1(squad_expected_points(&squad));
            let squad_value = round1(squad.iter().map(|p| p.price).sum());

            periods.push(PeriodRecord {
                plan: GameweekPlan {
                    gameweek,
                    transfers: selected,
                    expected_points,
                    squad_value,
                    free_transfers,
                    transfer_cost,
                    net_expected_gain: round1(expected_points - f64::from(transfer_cost)),
                },
                squad: squad.clone(),
            });

            // Rollover: skipping a week banks one extra free transfer,
            // capped at MAX_FREE_TRANSFERS.
            free_transfers = if transfers_made == 0 { MAX_FREE_TRANSFERS } else { 1 };
        }

        let chip_recommendations = chips::recommend(&periods, &self.config);
        let total_transfer_costs: u32 = periods.iter().map(|p| p.plan.transfer_cost).sum();
        let total_expected: f64 = periods.iter().map(|p| p.plan.expected_points).sum();
        let gameweek_plans: Vec<GameweekPlan> = periods.into_iter().map(|p| p.plan).collect();

        Ok(TransferPlan {
            gameweek_plans,
            chip_recommendations,
            total_expected_gain: round1(total_expected - f64::from(total_transfer_costs)),
            total_transfer_costs,
            planning_horizon: self.config.horizon,
        })
    }
}

/// Every same-position pool player not already in the squad is a
/// candidate replacement for every squad member of that position.
/// Price-change effects are not modeled; the zero placeholder is an
/// acknowledged simplification of the expected-gain estimate.
fn generate_options(
    squad: &[PlayerRecord],
    pool: &[PlayerRecord],
    gameweek: u32,
) -> Result<Vec<TransferOption>> {
    if squad.is_empty() {
        return Err(OptimizerError::EmptyCandidateSet(
            "cannot generate transfer candidates for an empty squad".to_string(),
        ));
    }

    let squad_ids: FxHashSet<_> = squad.iter().map(|p| p.id).collect();
    let mut options: Vec<TransferOption> = Vec::new();
    for outgoing in squad {
        for incoming in pool {
            if incoming.position != outgoing.position || squad_ids.contains(&incoming.id) {
                continue;
            }
            options.push(TransferOption {
                player_out_id: outgoing.id,
                player_in_id: incoming.id,
                cost: 0,
                expected_gain: incoming.expected_points() - outgoing.expected_points(),
                price_change: 0.0,
                gameweek,
            });
        }
    }

    options.sort_by(|a, b| {
        b.expected_gain
            .partial_cmp(&a.expected_gain)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.player_out_id.cmp(&b.player_out_id))
            .then(a.player_in_id.cmp(&b.player_in_id))
    });
    Ok(options)
}

/// Greedy selection in descending gain order. A transfer is accepted
/// only when its gain beats its marginal cost: zero within the free
/// allowance, TRANSFER_COST_POINTS beyond it.
fn select_transfers(
    options: Vec<TransferOption>,
    max_transfers: usize,
    free_transfers: u32,
) -> Vec<TransferOption> {
    let mut selected: Vec<TransferOption> = Vec::new();
    let mut used_out: FxHashSet<_> = FxHashSet::default();
    let mut used_in: FxHashSet<_> = FxHashSet::default();

    for mut option in options {
        if selected.len() >= max_transfers {
            break;
        }
        if used_out.contains(&option.player_out_id) || used_in.contains(&option.player_in_id) {
            continue;
        }
        let marginal = if (selected.len() as u32) < free_transfers {
            0
        } else {
            TRANSFER_COST_POINTS
        };
        if option.expected_gain > f64::from(marginal) {
            used_out.insert(option.player_out_id);
            used_in.insert(option.player_in_id);
            option.cost = marginal;
            selected.push(option);
        }
    }
    selected
}

/// Apply transfers to the squad: remove each outgoing player AND insert
/// the incoming player looked up from the pool. Both halves are
/// mandatory; dropping the insert would shrink the squad and break the
/// squad-size invariant for every later gameweek.
fn apply_transfers(
    squad: &[PlayerRecord],
    transfers: &[TransferOption],
    pool: &[PlayerRecord],
) -> Vec<PlayerRecord> {
    let mut next: Vec<PlayerRecord> = squad.to_vec();
    for transfer in transfers {
        match pool.iter().find(|p| p.id == transfer.player_in_id) {
            Some(incoming) => {
                next.retain(|p| p.id != transfer.player_out_id);
                next.push(incoming.clone());
            }
            None => {
                // skip the whole swap so the squad size stays intact
                warn!(
                    "incoming player {} missing from pool; transfer skipped",
                    transfer.player_in_id
                );
            }
        }
    }
    next
}

/// Cheap scoring proxy for one gameweek: the top eleven squad members
/// by expected points, plus the best scorer again as the captain bonus.
/// Intentionally cheaper than re-running the optimizer every period.
fn squad_expected_points(squad: &[PlayerRecord]) -> f64 {
    let mut expected: Vec<f64> = squad.iter().map(|p| p.expected_points()).collect();
    expected.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let lineup: f64 = expected.iter().take(LINEUP_SIZE).sum();
    lineup + expected.first().copied().unwrap_or(0.0)
}
