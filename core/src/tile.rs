use serde::{Deserialize, Serialize};

/// State of a single grid cell.
///
/// A flagged tile is always covered; `adjacent_count` is only meaningful for non-mine tiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Tile {
    mine: bool,
    adjacent_count: u8,
    covered: bool,
    flagged: bool,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            mine: false,
            adjacent_count: 0,
            covered: true,
            flagged: false,
        }
    }
}

impl Tile {
    pub const fn is_mine(&self) -> bool {
        self.mine
    }

    pub const fn adjacent_count(&self) -> u8 {
        self.adjacent_count
    }

    pub const fn is_covered(&self) -> bool {
        self.covered
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// What a player is allowed to see of this tile.
    pub const fn view(&self) -> TileView {
        match (self.covered, self.flagged, self.mine) {
            (true, true, _) => TileView::Flagged,
            (true, false, _) => TileView::Covered,
            (false, _, true) => TileView::Mine,
            (false, _, false) => TileView::Revealed(self.adjacent_count),
        }
    }

    pub(crate) fn set_mine(&mut self, mine: bool) {
        self.mine = mine;
    }

    pub(crate) fn set_adjacent_count(&mut self, count: u8) {
        self.adjacent_count = count;
    }

    /// Uncovers a covered, unflagged tile. Returns whether anything changed.
    pub(crate) fn uncover(&mut self) -> bool {
        if !self.covered || self.flagged {
            return false;
        }
        self.covered = false;
        true
    }

    /// Sets the flag on a covered tile. Returns whether it applied.
    pub(crate) fn set_flagged(&mut self, flagged: bool) -> bool {
        if !self.covered {
            return false;
        }
        self.flagged = flagged;
        true
    }
}

/// Player-visible state of a tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileView {
    #[default]
    Covered,
    Flagged,
    Mine,
    Revealed(u8),
}

impl TileView {
    pub const fn is_covered(self) -> bool {
        matches!(self, Self::Covered | Self::Flagged)
    }
}
