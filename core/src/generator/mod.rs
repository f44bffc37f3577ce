use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

/// Produces a fresh, numbered, fully covered board for a difficulty.
pub trait BoardGenerator {
    /// `avoid` is the anticipated first click; implementations should keep mines away from it.
    fn generate(&mut self, difficulty: &DifficultyProfile, avoid: Option<Coord2>) -> Board;
}

/// Which cells around the avoided cell are kept free of mines.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeZone {
    None,
    CellOnly,
    #[default]
    Neighborhood,
}

impl SafeZone {
    pub fn contains(self, center: Coord2, coords: Coord2) -> bool {
        match self {
            Self::None => false,
            Self::CellOnly => center == coords,
            Self::Neighborhood => is_within_one(center, coords),
        }
    }

    /// Number of in-grid cells the zone covers around `center`.
    pub fn cell_count(self, center: Coord2, size: Coord2) -> CellCount {
        match self {
            Self::None => 0,
            Self::CellOnly => 1,
            Self::Neighborhood => 1 + NeighborIter::new(center, size).count() as CellCount,
        }
    }

    /// The next smaller zone.
    const fn shrink(self) -> Self {
        match self {
            Self::Neighborhood => Self::CellOnly,
            Self::CellOnly | Self::None => Self::None,
        }
    }
}
