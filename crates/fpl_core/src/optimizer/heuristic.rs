//! Greedy fallback used when the exact backend exceeds its time budget.
//!
//! Candidates are taken in descending raw predicted-points order and
//! accepted while the position quotas, team cap and remaining budget
//! still admit a completed squad. Results produced this way are tagged
//! `SolveStatus::Heuristic`, never presented as optimal.

use crate::models::TeamId;
use crate::optimizer::branch_bound::Solution;
use crate::optimizer::problem::{SquadProblem, PRICE_EPS, SCORE_EPS};
use rustc_hash::FxHashMap;

/// Build a feasible squad greedily. Returns `None` when the greedy pass
/// cannot complete a squad; callers then surface the original failure.
pub fn greedy_squad(problem: &SquadProblem) -> Option<Solution> {
    let n = problem.candidates.len();
    if n < problem.squad_size {
        return None;
    }

    // Required players first, then everyone else by predicted points.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        let ca = &problem.candidates[a];
        let cb = &problem.candidates[b];
        cb.required
            .cmp(&ca.required)
            .then(cb.predicted.partial_cmp(&ca.predicted).unwrap_or(std::cmp::Ordering::Equal))
            .then(ca.id.cmp(&cb.id))
    });

    let mut chosen = vec![false; n];
    let mut pos_squad = [0usize; 4];
    let mut team_counts: FxHashMap<TeamId, usize> = FxHashMap::default();
    let mut cost = 0.0;
    let mut picked = 0usize;

    for &idx in &order {
        if picked == problem.squad_size {
            break;
        }
        let candidate = &problem.candidates[idx];
        let p = candidate.position.index();

        let quota_full = match problem.squad_quota {
            Some(quota) => pos_squad[p] >= quota[p],
            None => false,
        };
        let team_full =
            team_counts.get(&candidate.team_id).copied().unwrap_or(0) >= problem.max_per_team;
        let over_budget = cost + candidate.price > problem.budget + PRICE_EPS;
        if quota_full || team_full || over_budget {
            if candidate.required {
                // a required player that cannot be placed makes the
                // greedy squad illegal
                return None;
            }
            continue;
        }

        // Tentatively accept, then make sure the cheapest completion of
        // the remaining slots still fits the budget.
        chosen[idx] = true;
        pos_squad[p] += 1;
        let completion = cheapest_completion(problem, &chosen, &pos_squad, picked + 1);
        match completion {
            Some(remaining_cost)
                if cost + candidate.price + remaining_cost <= problem.budget + PRICE_EPS =>
            {
                cost += candidate.price;
                *team_counts.entry(candidate.team_id).or_insert(0) += 1;
                picked += 1;
            }
            _ => {
                chosen[idx] = false;
                pos_squad[p] -= 1;
                if candidate.required {
                    // A required player that cannot fit means the greedy
                    // pass cannot produce a legal squad.
                    return None;
                }
            }
        }
    }

    if picked != problem.squad_size {
        return None;
    }

    select_lineup(problem, &chosen)
}

/// Lower bound on the cost of filling the remaining squad slots,
/// ignoring the team cap.
fn cheapest_completion(
    problem: &SquadProblem,
    chosen: &[bool],
    pos_squad: &[usize; 4],
    picked: usize,
) -> Option<f64> {
    let mut prices: Vec<Vec<f64>> = vec![Vec::new(); 4];
    for (idx, candidate) in problem.candidates.iter().enumerate() {
        if !chosen[idx] {
            prices[candidate.position.index()].push(candidate.price);
        }
    }
    for list in prices.iter_mut() {
        list.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    }

    let mut total = 0.0;
    match problem.squad_quota {
        Some(quota) => {
            for p in 0..4 {
                let need = quota[p] - pos_squad[p];
                if prices[p].len() < need {
                    return None;
                }
                total += prices[p][..need].iter().sum::<f64>();
            }
        }
        None => {
            let need = problem.squad_size - picked;
            let mut all: Vec<f64> = prices.into_iter().flatten().collect();
            if all.len() < need {
                return None;
            }
            all.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            total = all[..need].iter().sum::<f64>();
        }
    }
    Some(total)
}

/// Pick the starting lineup from a completed squad: satisfy each
/// position minimum with the best start scores, then fill the remaining
/// slots by score within the position maxima.
fn select_lineup(problem: &SquadProblem, chosen: &[bool]) -> Option<Solution> {
    // Squad members per position, best start score first. Candidate
    // order is already score-sorted, so index order suffices.
    let mut by_position: [Vec<usize>; 4] = Default::default();
    for (idx, candidate) in problem.candidates.iter().enumerate() {
        if chosen[idx] {
            by_position[candidate.position.index()].push(idx);
        }
    }

    let mut starting: Vec<usize> = Vec::with_capacity(problem.starting_size);
    let mut pos_start = [0usize; 4];
    for p in 0..4 {
        let need = problem.start_min[p];
        if by_position[p].len() < need {
            return None;
        }
        for &idx in by_position[p].iter().take(need) {
            starting.push(idx);
        }
        pos_start[p] = need;
    }

    while starting.len() < problem.starting_size {
        let mut next: Option<usize> = None;
        for p in 0..4 {
            if pos_start[p] >= problem.start_max[p] {
                continue;
            }
            if let Some(&idx) = by_position[p].get(pos_start[p]) {
                let better = match next {
                    None => true,
                    Some(current) => {
                        problem.candidates[idx].start_score
                            > problem.candidates[current].start_score + SCORE_EPS
                    }
                };
                if better {
                    next = Some(idx);
                }
            }
        }
        let idx = next?;
        pos_start[problem.candidates[idx].position.index()] += 1;
        starting.push(idx);
    }
    starting.sort_unstable();

    let captain = *starting.iter().max_by(|&&a, &&b| {
        problem.candidates[a]
            .captain_score
            .partial_cmp(&problem.candidates[b].captain_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(problem.candidates[b].id.cmp(&problem.candidates[a].id))
    })?;

    let squad: Vec<usize> = (0..chosen.len()).filter(|&idx| chosen[idx]).collect();
    let objective = starting.iter().map(|&idx| problem.candidates[idx].start_score).sum::<f64>()
        + problem.candidates[captain].captain_score;

    Some(Solution { squad, starting, captain, objective })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConstraintSpec, PlayerRecord, Position};

    fn player(id: u32, position: Position, team_id: u32, price: f64, points: f64) -> PlayerRecord {
        PlayerRecord {
            id,
            name: format!("P{}", id),
            position,
            team_id,
            price,
            predicted_points: points,
            start_probability: 1.0,
            variance: 0.0,
            ceiling_points: 0.0,
            floor_points: 0.0,
        }
    }

    fn pool() -> Vec<PlayerRecord> {
        let mut players = Vec::new();
        let mut id = 0;
        for (pos, count) in [
            (Position::Goalkeeper, 3),
            (Position::Defender, 7),
            (Position::Midfielder, 7),
            (Position::Forward, 5),
        ] {
            for _ in 0..count {
                id += 1;
                players.push(player(id, pos, id, 5.0 + f64::from(id % 3), f64::from(id)));
            }
        }
        players
    }

    #[test]
    fn greedy_fills_full_quota() {
        let problem = SquadProblem::build(&pool(), &ConstraintSpec::default());
        let solution = greedy_squad(&problem).expect("greedy should complete");
        assert_eq!(solution.squad.len(), 15);
        assert_eq!(solution.starting.len(), 11);

        let mut pos_counts = [0usize; 4];
        for &idx in &solution.squad {
            pos_counts[problem.candidates[idx].position.index()] += 1;
        }
        assert_eq!(pos_counts, [2, 5, 5, 3]);
    }

    #[test]
    fn greedy_respects_budget() {
        // cheapest completable squad in this pool costs 84.0
        let spec = ConstraintSpec { budget: 85.0, ..ConstraintSpec::default() };
        let problem = SquadProblem::build(&pool(), &spec);
        let solution = greedy_squad(&problem).expect("greedy should complete");
        let cost: f64 = solution.squad.iter().map(|&idx| problem.candidates[idx].price).sum();
        assert!(cost <= 85.0 + PRICE_EPS);
    }

    #[test]
    fn greedy_gives_up_on_hopeless_budget() {
        let spec = ConstraintSpec { budget: 10.0, ..ConstraintSpec::default() };
        let problem = SquadProblem::build(&pool(), &spec);
        assert!(greedy_squad(&problem).is_none());
    }

    #[test]
    fn captain_is_starter_with_best_expected_points() {
        let problem = SquadProblem::build(&pool(), &ConstraintSpec::default());
        let solution = greedy_squad(&problem).expect("greedy should complete");
        assert!(solution.starting.contains(&solution.captain));
        for &idx in &solution.starting {
            assert!(
                problem.candidates[idx].captain_score
                    <= problem.candidates[solution.captain].captain_score + SCORE_EPS
            );
        }
    }
}
