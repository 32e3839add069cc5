//! Default solver backend: depth-first branch-and-bound over the
//! three-variable squad formulation.
//!
//! Candidates are visited in descending start-score order and each is
//! branched three ways (starter, bench, out). Subtrees are cut by an
//! optimistic score bound (best remaining starter scores per open
//! position slot plus the best reachable captain) and by a
//! cheapest-completion budget check. The fixed visit order and
//! strict-improvement incumbent rule make the search deterministic for
//! identical input.

use crate::error::{OptimizerError, Result};
use crate::models::TeamId;
use crate::optimizer::problem::{SquadProblem, PRICE_EPS, SCORE_EPS};
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};

/// Deadline is polled once per this many visited nodes.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Raw solver output in candidate-index space.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Candidate indices of the full squad.
    pub squad: Vec<usize>,
    /// Candidate indices of the starting lineup.
    pub starting: Vec<usize>,
    /// Candidate index of the captain.
    pub captain: usize,
    /// Objective value including risk adjustment and captain term.
    pub objective: f64,
}

/// Injectable, stateless solving strategy. Backends hold no mutable
/// state, so one instance can serve concurrent solves.
pub trait SolverBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Solve to proven optimality within `time_budget`, or fail with
    /// `SolverTimeout`. An exhausted search space fails with
    /// `Infeasible`; partial results are never returned.
    fn solve(&self, problem: &SquadProblem, time_budget: Duration) -> Result<Solution>;
}

/// The default exact backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct BranchAndBound;

impl SolverBackend for BranchAndBound {
    fn name(&self) -> &'static str {
        "branch_and_bound"
    }

    fn solve(&self, problem: &SquadProblem, time_budget: Duration) -> Result<Solution> {
        let mut search = Search::new(problem, time_budget);
        search.run()?;
        search.into_solution().ok_or_else(|| {
            OptimizerError::Infeasible(
                "no assignment satisfies budget, quota and team constraints".to_string(),
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Start,
    Bench,
    Out,
}

struct Incumbent {
    assignment: Vec<Slot>,
    captain: usize,
    objective: f64,
}

struct Search<'a> {
    problem: &'a SquadProblem,
    deadline: Instant,
    budget_ms: u64,
    nodes: u64,

    // Per-position candidate indices sorted by ascending price, and the
    // whole pool likewise, for cheapest-completion pruning.
    price_order: [Vec<usize>; 4],
    price_order_all: Vec<usize>,
    // suffix_captain_max[k] = best captain coefficient among candidates k..n.
    suffix_captain_max: Vec<f64>,

    assignment: Vec<Slot>,
    squad_count: usize,
    start_count: usize,
    pos_squad: [usize; 4],
    pos_start: [usize; 4],
    team_counts: FxHashMap<TeamId, usize>,
    cost: f64,
    score: f64,
    captain_best: f64,

    best: Option<Incumbent>,
}

impl<'a> Search<'a> {
    fn new(problem: &'a SquadProblem, time_budget: Duration) -> Self {
        let n = problem.candidates.len();

        let mut price_order: [Vec<usize>; 4] = Default::default();
        for (idx, candidate) in problem.candidates.iter().enumerate() {
            price_order[candidate.position.index()].push(idx);
        }
        let by_price = |a: &usize, b: &usize| {
            problem.candidates[*a]
                .price
                .partial_cmp(&problem.candidates[*b].price)
                .unwrap_or(std::cmp::Ordering::Equal)
        };
        for order in price_order.iter_mut() {
            order.sort_by(by_price);
        }
        let mut price_order_all: Vec<usize> = (0..n).collect();
        price_order_all.sort_by(by_price);

        let mut suffix_captain_max = vec![f64::NEG_INFINITY; n + 1];
        for k in (0..n).rev() {
            suffix_captain_max[k] =
                suffix_captain_max[k + 1].max(problem.candidates[k].captain_score);
        }

        Search {
            problem,
            deadline: Instant::now() + time_budget,
            budget_ms: time_budget.as_millis() as u64,
            nodes: 0,
            price_order,
            price_order_all,
            suffix_captain_max,
            assignment: vec![Slot::Out; n],
            squad_count: 0,
            start_count: 0,
            pos_squad: [0; 4],
            pos_start: [0; 4],
            team_counts: FxHashMap::default(),
            cost: 0.0,
            score: 0.0,
            captain_best: f64::NEG_INFINITY,
            best: None,
        }
    }

    fn run(&mut self) -> Result<()> {
        if Instant::now() >= self.deadline {
            return Err(OptimizerError::SolverTimeout { budget_ms: self.budget_ms });
        }
        self.visit(0)
    }

    fn into_solution(self) -> Option<Solution> {
        let incumbent = self.best?;
        let mut squad = Vec::with_capacity(self.problem.squad_size);
        let mut starting = Vec::with_capacity(self.problem.starting_size);
        for (idx, slot) in incumbent.assignment.iter().enumerate() {
            match slot {
                Slot::Start => {
                    squad.push(idx);
                    starting.push(idx);
                }
                Slot::Bench => squad.push(idx),
                Slot::Out => {}
            }
        }
        Some(Solution {
            squad,
            starting,
            captain: incumbent.captain,
            objective: incumbent.objective,
        })
    }

    fn visit(&mut self, k: usize) -> Result<()> {
        self.nodes += 1;
        if self.nodes % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= self.deadline {
            return Err(OptimizerError::SolverTimeout { budget_ms: self.budget_ms });
        }

        if k == self.problem.candidates.len() {
            self.try_accept();
            return Ok(());
        }
        if !self.completion_possible(k) || !self.bound_beats_incumbent(k) {
            return Ok(());
        }

        let position = self.problem.candidates[k].position.index();
        let price = self.problem.candidates[k].price;
        let team_id = self.problem.candidates[k].team_id;
        let start_score = self.problem.candidates[k].start_score;
        let captain_score = self.problem.candidates[k].captain_score;
        let required = self.problem.candidates[k].required;

        if self.can_start(k) {
            self.assignment[k] = Slot::Start;
            self.squad_count += 1;
            self.start_count += 1;
            self.pos_squad[position] += 1;
            self.pos_start[position] += 1;
            *self.team_counts.entry(team_id).or_insert(0) += 1;
            self.cost += price;
            self.score += start_score;
            let prev_captain_best = self.captain_best;
            self.captain_best = self.captain_best.max(captain_score);

            self.visit(k + 1)?;

            self.captain_best = prev_captain_best;
            self.score -= start_score;
            self.cost -= price;
            if let Some(count) = self.team_counts.get_mut(&team_id) {
                *count -= 1;
            }
            self.pos_start[position] -= 1;
            self.pos_squad[position] -= 1;
            self.start_count -= 1;
            self.squad_count -= 1;
        }

        if self.can_bench(k) {
            self.assignment[k] = Slot::Bench;
            self.squad_count += 1;
            self.pos_squad[position] += 1;
            *self.team_counts.entry(team_id).or_insert(0) += 1;
            self.cost += price;

            self.visit(k + 1)?;

            self.cost -= price;
            if let Some(count) = self.team_counts.get_mut(&team_id) {
                *count -= 1;
            }
            self.pos_squad[position] -= 1;
            self.squad_count -= 1;
        }

        if !required {
            self.assignment[k] = Slot::Out;
            self.visit(k + 1)?;
        }
        Ok(())
    }

    fn can_squad(&self, k: usize) -> bool {
        let candidate = &self.problem.candidates[k];
        if self.squad_count >= self.problem.squad_size {
            return false;
        }
        if let Some(quota) = self.problem.squad_quota {
            if self.pos_squad[candidate.position.index()] >= quota[candidate.position.index()] {
                return false;
            }
        }
        if self.team_counts.get(&candidate.team_id).copied().unwrap_or(0)
            >= self.problem.max_per_team
        {
            return false;
        }
        self.cost + candidate.price <= self.problem.budget + PRICE_EPS
    }

    fn can_start(&self, k: usize) -> bool {
        let position = self.problem.candidates[k].position.index();
        self.can_squad(k)
            && self.start_count < self.problem.starting_size
            && self.pos_start[position] < self.problem.start_max[position]
    }

    fn can_bench(&self, k: usize) -> bool {
        let bench_spots = self.problem.squad_size - self.problem.starting_size;
        self.can_squad(k) && self.squad_count - self.start_count < bench_spots
    }

    /// Can the partial assignment still be completed with candidates
    /// `k..`? Checks position availability, starter range reachability,
    /// required placements and a cheapest-completion budget bound.
    fn completion_possible(&self, k: usize) -> bool {
        let n = self.problem.candidates.len();
        let mut avail = [0usize; 4];
        let mut required_left = 0usize;
        let mut required_pos = [0usize; 4];
        for candidate in &self.problem.candidates[k..n] {
            avail[candidate.position.index()] += 1;
            if candidate.required {
                required_left += 1;
                required_pos[candidate.position.index()] += 1;
            }
        }

        let squad_slots = self.problem.squad_size - self.squad_count;
        if required_left > squad_slots || squad_slots > n - k {
            return false;
        }

        let quota_room = |p: usize| -> usize {
            match self.problem.squad_quota {
                Some(quota) => quota[p] - self.pos_squad[p],
                None => usize::MAX,
            }
        };
        if self.problem.squad_quota.is_some() {
            for p in 0..4 {
                let room = quota_room(p);
                // quota can no longer be met, or required players cannot
                // all fit their remaining position slots
                if room > avail[p] || required_pos[p] > room {
                    return false;
                }
            }
        }

        // Starter range reachability
        let start_slots = self.problem.starting_size - self.start_count;
        let mut min_needed = 0usize;
        let mut max_possible = 0usize;
        for p in 0..4 {
            let cap = avail[p]
                .min(self.problem.start_max[p] - self.pos_start[p])
                .min(quota_room(p));
            let need = self.problem.start_min[p].saturating_sub(self.pos_start[p]);
            if need > cap {
                return false;
            }
            min_needed += need;
            max_possible += cap;
        }
        if min_needed > start_slots || max_possible < start_slots {
            return false;
        }

        // Cheapest completion must fit the remaining budget. Required
        // players can only raise the true completion cost, so ignoring
        // them keeps this a valid lower bound.
        let remaining_budget = self.problem.budget - self.cost;
        let mut cheapest = 0.0;
        match self.problem.squad_quota {
            Some(quota) => {
                for p in 0..4 {
                    let mut need = quota[p] - self.pos_squad[p];
                    for &idx in &self.price_order[p] {
                        if need == 0 {
                            break;
                        }
                        if idx >= k {
                            cheapest += self.problem.candidates[idx].price;
                            need -= 1;
                        }
                    }
                }
            }
            None => {
                let mut need = squad_slots;
                for &idx in &self.price_order_all {
                    if need == 0 {
                        break;
                    }
                    if idx >= k {
                        cheapest += self.problem.candidates[idx].price;
                        need -= 1;
                    }
                }
            }
        }
        cheapest <= remaining_budget + PRICE_EPS
    }

    /// Optimistic upper bound on the objective reachable below this node.
    fn bound_beats_incumbent(&self, k: usize) -> bool {
        let incumbent = match &self.best {
            Some(best) => best.objective,
            None => return true,
        };

        let n = self.problem.candidates.len();
        let start_slots = self.problem.starting_size - self.start_count;
        let mut optimistic = self.score;

        if start_slots > 0 {
            let quota_room = |p: usize| -> usize {
                match self.problem.squad_quota {
                    Some(quota) => quota[p] - self.pos_squad[p],
                    None => usize::MAX,
                }
            };
            let mut caps = [0usize; 4];
            for (p, cap) in caps.iter_mut().enumerate() {
                *cap = (self.problem.start_max[p] - self.pos_start[p]).min(quota_room(p));
            }
            // Candidates are globally score-sorted, so a forward scan
            // yields descending scores within each position too.
            let mut taken = [0usize; 4];
            let mut pool: Vec<f64> = Vec::with_capacity(start_slots * 4);
            for candidate in &self.problem.candidates[k..n] {
                let p = candidate.position.index();
                if taken[p] < caps[p] {
                    taken[p] += 1;
                    pool.push(candidate.start_score);
                }
            }
            pool.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
            optimistic += pool.iter().take(start_slots).sum::<f64>();
            optimistic += self.captain_best.max(self.suffix_captain_max[k]);
        } else {
            optimistic += self.captain_best;
        }

        optimistic > incumbent + SCORE_EPS
    }

    fn try_accept(&mut self) {
        if self.squad_count != self.problem.squad_size
            || self.start_count != self.problem.starting_size
        {
            return;
        }
        if let Some(quota) = self.problem.squad_quota {
            if self.pos_squad != quota {
                return;
            }
        }
        for p in 0..4 {
            if self.pos_start[p] < self.problem.start_min[p] {
                return;
            }
        }

        // Captain: starter with the highest unadjusted expected points,
        // lowest id on ties.
        let mut captain: Option<usize> = None;
        for (idx, slot) in self.assignment.iter().enumerate() {
            if *slot != Slot::Start {
                continue;
            }
            let better = match captain {
                None => true,
                Some(current) => {
                    let delta = self.problem.candidates[idx].captain_score
                        - self.problem.candidates[current].captain_score;
                    delta > SCORE_EPS
                        || (delta.abs() <= SCORE_EPS
                            && self.problem.candidates[idx].id
                                < self.problem.candidates[current].id)
                }
            };
            if better {
                captain = Some(idx);
            }
        }
        let captain = match captain {
            Some(idx) => idx,
            None => return,
        };

        let objective = self.score + self.problem.candidates[captain].captain_score;
        let improves = match &self.best {
            None => true,
            Some(best) => objective > best.objective + SCORE_EPS,
        };
        if improves {
            self.best = Some(Incumbent { assignment: self.assignment.clone(), captain, objective });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConstraintSpec, PlayerRecord, Position};

    fn player(
        id: u32,
        position: Position,
        team_id: u32,
        price: f64,
        points: f64,
    ) -> PlayerRecord {
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

    /// Minimal pool: exactly one legal 15-man squad shape is affordable.
    fn tight_pool() -> Vec<PlayerRecord> {
        let mut players = Vec::new();
        let mut id = 1;
        let mut push = |pos: Position, count: usize, players: &mut Vec<PlayerRecord>| {
            for _ in 0..count {
                players.push(player(id, pos, id, 5.0, f64::from(id)));
                id += 1;
            }
        };
        push(Position::Goalkeeper, 2, &mut players);
        push(Position::Defender, 5, &mut players);
        push(Position::Midfielder, 5, &mut players);
        push(Position::Forward, 3, &mut players);
        players
    }

    #[test]
    fn solves_exact_pool() {
        let players = tight_pool();
        let spec = ConstraintSpec { max_per_team: 1, ..ConstraintSpec::default() };
        let problem = SquadProblem::build(&players, &spec);
        let solution =
            BranchAndBound.solve(&problem, Duration::from_secs(5)).expect("feasible pool");
        assert_eq!(solution.squad.len(), 15);
        assert_eq!(solution.starting.len(), 11);
        assert!(solution.starting.contains(&solution.captain));
    }

    #[test]
    fn zero_budget_times_out_immediately() {
        let players = tight_pool();
        let spec = ConstraintSpec { max_per_team: 1, ..ConstraintSpec::default() };
        let problem = SquadProblem::build(&players, &spec);
        let err = BranchAndBound.solve(&problem, Duration::ZERO).unwrap_err();
        assert!(matches!(err, OptimizerError::SolverTimeout { .. }));
    }

    #[test]
    fn infeasible_when_budget_too_small() {
        let players = tight_pool();
        let spec =
            ConstraintSpec { budget: 10.0, max_per_team: 1, ..ConstraintSpec::default() };
        let problem = SquadProblem::build(&players, &spec);
        let err = BranchAndBound.solve(&problem, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, OptimizerError::Infeasible(_)));
    }

    #[test]
    fn captain_is_best_expected_starter() {
        let players = tight_pool();
        let spec = ConstraintSpec { max_per_team: 1, ..ConstraintSpec::default() };
        let problem = SquadProblem::build(&players, &spec);
        let solution = BranchAndBound.solve(&problem, Duration::from_secs(5)).unwrap();
        let captain_score = problem.candidates[solution.captain].captain_score;
        for &idx in &solution.starting {
            assert!(problem.candidates[idx].captain_score <= captain_score + SCORE_EPS);
        }
    }
}
