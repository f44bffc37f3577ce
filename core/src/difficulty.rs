use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

/// Largest grid a custom profile may ask for.
pub const MAX_CELLS: CellCount = 1 << 16;

/// Grid shape and mine count for one game.
///
/// Always satisfies `rows > 0`, `cols > 0` and `0 < mines < rows * cols`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProfileFields")]
pub struct DifficultyProfile {
    rows: Coord,
    cols: Coord,
    mines: CellCount,
}

#[derive(Deserialize)]
struct ProfileFields {
    rows: Coord,
    cols: Coord,
    mines: CellCount,
}

impl TryFrom<ProfileFields> for DifficultyProfile {
    type Error = SessionError;

    fn try_from(fields: ProfileFields) -> Result<Self> {
        Self::custom(fields.rows, fields.cols, fields.mines)
    }
}

impl DifficultyProfile {
    pub const BEGINNER: Self = Self::new_unchecked(9, 9, 10);
    pub const INTERMEDIATE: Self = Self::new_unchecked(14, 14, 30);
    pub const EXPERT: Self = Self::new_unchecked(18, 18, 69);

    pub const PRESETS: [(&'static str, Self); 3] = [
        ("beginner", Self::BEGINNER),
        ("intermediate", Self::INTERMEDIATE),
        ("expert", Self::EXPERT),
    ];

    const fn new_unchecked(rows: Coord, cols: Coord, mines: CellCount) -> Self {
        Self { rows, cols, mines }
    }

    pub fn custom(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        let total = rows.checked_mul(cols);
        let valid = match total {
            Some(total) => rows > 0 && cols > 0 && total <= MAX_CELLS && mines > 0 && mines < total,
            None => false,
        };
        if valid {
            Ok(Self::new_unchecked(rows, cols, mines))
        } else {
            Err(SessionError::InvalidDifficulty { rows, cols, mines })
        }
    }

    /// Looks up a preset by name, ignoring case.
    pub fn preset(name: &str) -> Result<Self> {
        Self::PRESETS
            .iter()
            .find(|(preset, _)| preset.eq_ignore_ascii_case(name.trim()))
            .map(|&(_, profile)| profile)
            .ok_or_else(|| SessionError::UnknownDifficulty(name.to_owned()))
    }

    pub fn preset_name(&self) -> Option<&'static str> {
        Self::PRESETS
            .iter()
            .find(|(_, profile)| profile == self)
            .map(|&(name, _)| name)
    }

    /// The preset after this one, wrapping around; custom profiles step to the first preset.
    pub fn next_preset(&self) -> Self {
        let position = Self::PRESETS.iter().position(|(_, profile)| profile == self);
        match position {
            Some(index) => Self::PRESETS[(index + 1) % Self::PRESETS.len()].1,
            None => Self::PRESETS[0].1,
        }
    }

    pub const fn rows(&self) -> Coord {
        self.rows
    }

    pub const fn cols(&self) -> Coord {
        self.cols
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.rows && coords.1 < self.cols {
            Ok(coords)
        } else {
            Err(SessionError::OutOfBounds {
                coords,
                size: self.size(),
            })
        }
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::BEGINNER
    }
}

impl FromStr for DifficultyProfile {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::preset(s)
    }
}

impl fmt::Display for DifficultyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.preset_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "custom {}x{} ({} mines)", self.rows, self.cols, self.mines),
        }
    }
}
