use thiserror::Error;

use crate::core::types::FighterId;
use crate::map::coord::Topology;

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Topology mismatch: {0:?} vs {1:?}")]
    TopologyMismatch(Topology, Topology),

    #[error("Coordinate out of bounds: ({0}, {1})")]
    OutOfBounds(i32, i32),

    #[error("Position already occupied: ({0}, {1})")]
    PositionOccupied(i32, i32),

    #[error("No occupant at position: ({0}, {1})")]
    EmptyPosition(i32, i32),

    #[error("Fighter not found: {0:?}")]
    FighterNotFound(FighterId),

    #[error("Unknown equipment: {0}")]
    UnknownEquipment(String),

    #[error("No unoccupied cell left for placement")]
    GridFull,
}

pub type Result<T> = std::result::Result<T, ArenaError>;
