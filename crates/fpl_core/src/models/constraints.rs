use crate::error::{OptimizerError, Result};
use crate::models::player::PlayerId;
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven legal starting shapes, goalkeeper always fixed at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    #[serde(rename = "3-4-3")]
    F343,
    #[serde(rename = "3-5-2")]
    F352,
    #[serde(rename = "4-3-3")]
    F433,
    #[serde(rename = "4-4-2")]
    F442,
    #[serde(rename = "4-5-1")]
    F451,
    #[serde(rename = "5-3-2")]
    F532,
    #[serde(rename = "5-4-1")]
    F541,
}

impl Formation {
    /// Catalog order; also the final tie-break order in formation search.
    pub const ALL: [Formation; 7] = [
        Formation::F343,
        Formation::F352,
        Formation::F433,
        Formation::F442,
        Formation::F451,
        Formation::F532,
        Formation::F541,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Formation::F343 => "3-4-3",
            Formation::F352 => "3-5-2",
            Formation::F433 => "4-3-3",
            Formation::F442 => "4-4-2",
            Formation::F451 => "4-5-1",
            Formation::F532 => "5-3-2",
            Formation::F541 => "5-4-1",
        }
    }

    /// (defenders, midfielders, forwards) among the ten outfield starters.
    pub fn shape(self) -> (usize, usize, usize) {
        match self {
            Formation::F343 => (3, 4, 3),
            Formation::F352 => (3, 5, 2),
            Formation::F433 => (4, 3, 3),
            Formation::F442 => (4, 4, 2),
            Formation::F451 => (4, 5, 1),
            Formation::F532 => (5, 3, 2),
            Formation::F541 => (5, 4, 1),
        }
    }

    pub fn from_label(label: &str) -> Option<Formation> {
        LABEL_LOOKUP.get(label).copied()
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static LABEL_LOOKUP: Lazy<FxHashMap<&'static str, Formation>> =
    Lazy::new(|| Formation::ALL.iter().map(|f| (f.label(), *f)).collect());

/// Per-position bounds on the starting lineup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartingBounds {
    pub goalkeepers: usize,
    pub defenders: (usize, usize),
    pub midfielders: (usize, usize),
    pub forwards: (usize, usize),
}

impl StartingBounds {
    /// Bounds applied when no formation is pinned.
    pub const GENERIC: StartingBounds = StartingBounds {
        goalkeepers: 1,
        defenders: (3, 5),
        midfielders: (2, 5),
        forwards: (1, 3),
    };

    /// Exact counts for a pinned formation.
    pub fn for_formation(formation: Formation) -> StartingBounds {
        let (def, mid, fwd) = formation.shape();
        StartingBounds {
            goalkeepers: 1,
            defenders: (def, def),
            midfielders: (mid, mid),
            forwards: (fwd, fwd),
        }
    }

    pub(crate) fn min_by_position(&self) -> [usize; 4] {
        [self.goalkeepers, self.defenders.0, self.midfielders.0, self.forwards.0]
    }

    pub(crate) fn max_by_position(&self) -> [usize; 4] {
        [self.goalkeepers, self.defenders.1, self.midfielders.1, self.forwards.1]
    }
}

/// Full-squad position quota applied when building a standard 15-man squad.
pub const FULL_SQUAD_QUOTA: [usize; 4] = [2, 5, 5, 3];

/// Squad size at which the full-squad position quota is enforced.
pub const FULL_SQUAD_SIZE: usize = 15;

/// Validated configuration for one optimization call.
///
/// Exclusion and requirement sets are owned per call; there is no shared
/// default collection that could leak ids between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintSpec {
    /// Budget in millions; must be strictly positive.
    pub budget: f64,
    pub squad_size: usize,
    pub starting_size: usize,
    pub max_per_team: usize,
    pub formation: Option<Formation>,
    pub excluded_ids: FxHashSet<PlayerId>,
    pub required_ids: FxHashSet<PlayerId>,
    /// 0.0 = risk-averse, 0.5 = neutral, 1.0 = risk-seeking.
    pub risk_tolerance: f64,
}

impl Default for ConstraintSpec {
    fn default() -> Self {
        ConstraintSpec {
            budget: 100.0,
            squad_size: FULL_SQUAD_SIZE,
            starting_size: 11,
            max_per_team: 3,
            formation: None,
            excluded_ids: FxHashSet::default(),
            required_ids: FxHashSet::default(),
            risk_tolerance: 0.5,
        }
    }
}

impl ConstraintSpec {
    /// Synchronous, side-effect-free validation. Runs before any solve.
    pub fn validate(&self) -> Result<()> {
        if !(self.budget > 0.0) {
            return Err(OptimizerError::InvalidConstraint(format!(
                "budget must be positive, got {}",
                self.budget
            )));
        }
        if self.starting_size < 11 {
            return Err(OptimizerError::InvalidConstraint(format!(
                "starting lineup needs a goalkeeper plus ten outfield players, got size {}",
                self.starting_size
            )));
        }
        if self.squad_size < self.starting_size {
            return Err(OptimizerError::InvalidConstraint(format!(
                "squad size {} is smaller than starting size {}",
                self.squad_size, self.starting_size
            )));
        }
        if self.max_per_team < 1 {
            return Err(OptimizerError::InvalidConstraint(
                "max_per_team must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.risk_tolerance) {
            return Err(OptimizerError::InvalidConstraint(format!(
                "risk_tolerance must be within [0, 1], got {}",
                self.risk_tolerance
            )));
        }
        if let Some(id) = self.excluded_ids.intersection(&self.required_ids).next() {
            return Err(OptimizerError::InvalidConstraint(format!(
                "player {} is both excluded and required",
                id
            )));
        }
        Ok(())
    }

    /// Bounds on the starting lineup, from the pinned formation or the
    /// generic catalog-wide ranges.
    pub fn starting_bounds(&self) -> StartingBounds {
        match self.formation {
            Some(formation) => StartingBounds::for_formation(formation),
            None => StartingBounds::GENERIC,
        }
    }

    /// Exact per-position squad quota, enforced only for the standard
    /// 15-man squad.
    pub fn squad_quota(&self) -> Option<[usize; 4]> {
        (self.squad_size == FULL_SQUAD_SIZE).then_some(FULL_SQUAD_QUOTA)
    }
}
