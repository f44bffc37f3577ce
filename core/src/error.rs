use thiserror::Error;

use crate::{CellCount, Coord, Coord2, GameState};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid difficulty: {rows}x{cols} grid with {mines} mines")]
    InvalidDifficulty {
        rows: Coord,
        cols: Coord,
        mines: CellCount,
    },
    #[error("Unknown difficulty {0:?}")]
    UnknownDifficulty(String),
    #[error("Coordinates {coords:?} are outside the {size:?} grid")]
    OutOfBounds { coords: Coord2, size: Coord2 },
    #[error("Cannot {action} while in the {state:?} state")]
    IllegalStateTransition {
        action: &'static str,
        state: GameState,
    },
}

pub type Result<T> = core::result::Result<T, SessionError>;
