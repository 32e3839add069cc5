// Data model for the optimization engine: players, constraints, results
// and planning types. All of these are plain value objects.

pub mod constraints;
pub mod plan;
pub mod player;
pub mod result;

pub use constraints::{
    ConstraintSpec, Formation, StartingBounds, FULL_SQUAD_QUOTA, FULL_SQUAD_SIZE,
};
pub use plan::{Chip, ChipStrategy, GameweekPlan, TransferOption, TransferPlan};
pub use player::{PlayerId, PlayerRecord, Position, TeamId};
pub use result::{SolveStatus, SquadPlayer, SquadResult};
