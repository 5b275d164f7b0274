use crate::location::Location;
use thiserror::Error;

/// Errors surfaced before a search begins. Search exhaustion is not an
/// error; it is reported as an absent solution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("grid is malformed: {0}")]
    InvalidGrid(String),

    #[error("start tile {0} is missing, walled, or occupied by a monster")]
    NoStart(Location),

    #[error("end tile {0} is missing, walled, or occupied by a monster")]
    NoEnd(Location),

    #[error("tile id {id} at {pos} is not in the tile vocabulary")]
    UnknownTile { id: i16, pos: Location },

    #[error("monster tile {id} at {pos} has no entry in the monster table")]
    UndefinedMonster { id: i16, pos: Location },

    #[error("door {id} must have 1 HP, no attack, and no reward")]
    InvalidDoor { id: i16 },

    #[error("hero attributes out of bounds: {0}")]
    AttributeBounds(String),

    #[error("{kind} count {count} exceeds the state-key capacity of {max}")]
    Capacity {
        kind: &'static str,
        count: usize,
        max: usize,
    },
}
