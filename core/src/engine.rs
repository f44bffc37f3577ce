//! Reveal, flood fill and flag rules applied directly to a [`Board`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::*;

/// Overall result of the board after an uncover.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardStatus {
    InProgress,
    Won,
    Lost,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    /// Target was already uncovered or is flagged.
    Unchanged,
    InProgress,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Result of a reveal, including every cell it uncovered in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reveal {
    pub outcome: RevealOutcome,
    pub uncovered: Vec<Coord2>,
}

impl Reveal {
    fn unchanged() -> Self {
        Self {
            outcome: RevealOutcome::Unchanged,
            uncovered: Vec::new(),
        }
    }
}

impl Board {
    /// Lost if any mine is uncovered, won if every safe tile is, else in progress.
    pub fn status(&self) -> BoardStatus {
        if self.has_uncovered_mine() {
            BoardStatus::Lost
        } else if self.uncovered_safe_count() == self.safe_cell_count() {
            BoardStatus::Won
        } else {
            BoardStatus::InProgress
        }
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<Reveal> {
        let coords = self.validate_coords(coords)?;

        if !self.uncover(coords) {
            return Ok(Reveal::unchanged());
        }
        let mut uncovered = vec![coords];
        let tile = self[coords];
        log::debug!(
            "Uncovered tile at {:?}, mine: {}, count: {}",
            coords,
            tile.is_mine(),
            tile.adjacent_count()
        );

        if !tile.is_mine() && tile.adjacent_count() == 0 {
            self.flood_fill(coords, &mut uncovered);
        }

        let outcome = match self.status() {
            BoardStatus::Lost => RevealOutcome::HitMine,
            BoardStatus::Won => RevealOutcome::Won,
            BoardStatus::InProgress => RevealOutcome::InProgress,
        };
        Ok(Reveal { outcome, uncovered })
    }

    /// Uncovers the zero-count region around `start` plus its numbered border.
    fn flood_fill(&mut self, start: Coord2, uncovered: &mut Vec<Coord2>) {
        let mut to_visit: VecDeque<_> = self.covered_neighbors(start).collect();
        log::trace!(
            "Starting flood-fill from {:?}, initial neighbors: {:?}",
            start,
            to_visit
        );

        while let Some(visit_coords) = to_visit.pop_front() {
            // queued more than once, or flagged
            if !self.uncover(visit_coords) {
                continue;
            }
            uncovered.push(visit_coords);

            let visit_count = self[visit_coords].adjacent_count();
            log::trace!(
                "Flood uncovered tile at {:?}, mine count: {}",
                visit_coords,
                visit_count
            );

            if visit_count == 0 {
                to_visit.extend(self.covered_neighbors(visit_coords));
            }
        }
    }

    fn covered_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + '_ {
        self.iter_neighbors(coords).filter(move |&pos| {
            let tile = self[pos];
            tile.is_covered() && !tile.is_flagged()
        })
    }

    /// Sets the flag on a covered tile; uncovered tiles are left alone and report `false`.
    pub fn toggle_flag(&mut self, coords: Coord2, desired: bool) -> Result<bool> {
        let coords = self.validate_coords(coords)?;
        Ok(self.tile_mut(coords).set_flagged(desired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        Board::from_mine_coords(size, mines).unwrap()
    }

    fn covered(board: &Board) -> Vec<Coord2> {
        let (rows, cols) = board.size();
        let mut result = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                if board[(row, col)].is_covered() {
                    result.push((row, col));
                }
            }
        }
        result
    }

    #[test]
    fn flood_fill_opens_zero_region_and_border() {
        let mut board = board((3, 3), &[(2, 2)]);

        let reveal = board.reveal((0, 0)).unwrap();

        assert_eq!(reveal.outcome, RevealOutcome::Won);
        assert_eq!(reveal.uncovered.len(), 8);
        assert_eq!(reveal.uncovered[0], (0, 0));
        assert_eq!(covered(&board), vec![(2, 2)]);
        assert_eq!(board[(1, 1)].view(), TileView::Revealed(1));
    }

    #[test]
    fn flood_fill_stops_at_numbered_cells() {
        // Mine column splits the board; the right side must stay covered.
        let mut board = board((3, 5), &[(0, 2), (1, 2), (2, 2)]);

        let reveal = board.reveal((1, 0)).unwrap();

        assert_eq!(reveal.outcome, RevealOutcome::InProgress);
        let mut opened = reveal.uncovered.clone();
        opened.sort();
        assert_eq!(opened, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
        assert!(board[(1, 4)].is_covered());
        assert!(board[(1, 3)].is_covered());
    }

    #[test]
    fn flood_fill_skips_flagged_cells() {
        let mut board = board((3, 3), &[(2, 2)]);
        assert!(board.toggle_flag((0, 2), true).unwrap());

        let reveal = board.reveal((0, 0)).unwrap();

        assert_eq!(reveal.outcome, RevealOutcome::InProgress);
        assert!(board[(0, 2)].is_covered());
        assert!(board[(0, 2)].is_flagged());
        assert!(!reveal.uncovered.contains(&(0, 2)));
        assert_eq!(reveal.uncovered.len(), 7);
    }

    #[test]
    fn flood_fill_visits_each_cell_once() {
        let mut board = board((6, 6), &[(5, 5)]);

        let reveal = board.reveal((0, 0)).unwrap();

        let mut deduped = reveal.uncovered.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), reveal.uncovered.len());
        assert_eq!(reveal.uncovered.len(), 35);
    }

    #[test]
    fn numbered_cell_reveals_alone() {
        let mut board = board((3, 3), &[(2, 2)]);

        let reveal = board.reveal((1, 1)).unwrap();

        assert_eq!(reveal.outcome, RevealOutcome::InProgress);
        assert_eq!(reveal.uncovered, vec![(1, 1)]);
        assert_eq!(covered(&board).len(), 8);
    }

    #[test]
    fn revealing_mine_loses() {
        let mut board = board((2, 2), &[(0, 0)]);

        let reveal = board.reveal((0, 0)).unwrap();

        assert_eq!(reveal.outcome, RevealOutcome::HitMine);
        assert_eq!(board.status(), BoardStatus::Lost);
        assert_eq!(board[(0, 0)].view(), TileView::Mine);
    }

    #[test]
    fn revealing_uncovered_tile_is_unchanged() {
        let mut board = board((3, 3), &[(2, 2)]);
        board.reveal((1, 1)).unwrap();
        let before = board.clone();

        let reveal = board.reveal((1, 1)).unwrap();

        assert_eq!(reveal.outcome, RevealOutcome::Unchanged);
        assert!(!reveal.outcome.has_update());
        assert!(reveal.uncovered.is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn revealing_flagged_tile_is_unchanged() {
        let mut board = board((2, 2), &[(0, 0)]);
        board.toggle_flag((0, 0), true).unwrap();

        let reveal = board.reveal((0, 0)).unwrap();

        assert_eq!(reveal.outcome, RevealOutcome::Unchanged);
        assert_eq!(board.status(), BoardStatus::InProgress);
    }

    #[test]
    fn win_ignores_flags() {
        let mut board = board((2, 1), &[(0, 0)]);

        assert_eq!(board.reveal((1, 0)).unwrap().outcome, RevealOutcome::Won);
        assert_eq!(board.flagged_count(), 0);
    }

    #[test]
    fn reveal_rejects_out_of_bounds() {
        let mut board = board((2, 2), &[(0, 0)]);
        assert_eq!(
            board.reveal((0, 2)),
            Err(SessionError::OutOfBounds {
                coords: (0, 2),
                size: (2, 2)
            })
        );
    }

    #[test]
    fn toggle_flag_only_applies_to_covered_tiles() {
        let mut board = board((3, 3), &[(2, 2)]);
        board.reveal((1, 1)).unwrap();

        assert!(!board.toggle_flag((1, 1), true).unwrap());
        assert!(!board[(1, 1)].is_flagged());

        assert!(board.toggle_flag((2, 2), true).unwrap());
        assert!(board.toggle_flag((2, 2), true).unwrap());
        assert!(board[(2, 2)].is_flagged());
        assert!(board.toggle_flag((2, 2), false).unwrap());
        assert!(!board[(2, 2)].is_flagged());
        assert_eq!(board.status(), BoardStatus::InProgress);
    }
}
