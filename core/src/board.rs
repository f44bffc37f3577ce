use core::ops::Index;
use ndarray::Array2;
use serde::Serialize;

use crate::*;

/// Row-major grid of tiles for one game.
///
/// Tracks how many safe and mined tiles are uncovered so win/lose checks stay constant-time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Board {
    tiles: Array2<Tile>,
    mine_count: CellCount,
    uncovered_safe: CellCount,
    uncovered_mines: CellCount,
}

impl Board {
    /// An all-covered, numbered board from a row-major mine mask.
    pub(crate) fn from_mine_mask(size: Coord2, mine_mask: &[bool]) -> Self {
        let mut tiles: Array2<Tile> = Array2::default(size.to_nd_index());
        let mut mine_count = 0;
        for (tile, &mine) in tiles.iter_mut().zip(mine_mask) {
            tile.set_mine(mine);
            if mine {
                mine_count += 1;
            }
        }

        let mut board = Self {
            tiles,
            mine_count,
            uncovered_safe: 0,
            uncovered_mines: 0,
        };
        board.fill_adjacent_counts();
        board
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let (rows, cols) = size;
        let mut mine_mask = vec![false; mult(rows, cols) as usize];

        for &coords in mine_coords {
            if coords.0 >= rows || coords.1 >= cols {
                return Err(SessionError::OutOfBounds { coords, size });
            }
            mine_mask[(coords.0 * cols + coords.1) as usize] = true;
        }

        Ok(Self::from_mine_mask(size, &mine_mask))
    }

    fn fill_adjacent_counts(&mut self) {
        let (rows, cols) = self.size();
        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                if self[coords].is_mine() {
                    continue;
                }
                let count = self.adjacent_mine_count(coords);
                self.tiles[coords.to_nd_index()].set_adjacent_count(count);
            }
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.tiles.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        self.tiles.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn uncovered_safe_count(&self) -> CellCount {
        self.uncovered_safe
    }

    pub fn flagged_count(&self) -> CellCount {
        self.tiles.iter().filter(|tile| tile.is_flagged()).count() as CellCount
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(SessionError::OutOfBounds { coords, size })
        }
    }

    pub fn tile(&self, coords: Coord2) -> Result<&Tile> {
        let coords = self.validate_coords(coords)?;
        Ok(&self[coords])
    }

    /// Row-major index of `coords`, `row * cols + col`.
    pub fn linear_index(&self, (row, col): Coord2) -> usize {
        (row * self.cols() + col) as usize
    }

    pub fn coords_of(&self, index: usize) -> Coord2 {
        let cols = self.cols() as usize;
        ((index / cols) as Coord, (index % cols) as Coord)
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self[pos].is_mine())
            .count() as u8
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.tiles
            .indexed_iter()
            .filter(|(_, tile)| tile.is_mine())
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }

    pub fn views(&self) -> Array2<TileView> {
        self.tiles.map(Tile::view)
    }

    pub(crate) fn tile_mut(&mut self, coords: Coord2) -> &mut Tile {
        &mut self.tiles[coords.to_nd_index()]
    }

    /// Uncovers a single tile and updates counters. Returns whether it changed.
    pub(crate) fn uncover(&mut self, coords: Coord2) -> bool {
        let tile = &mut self.tiles[coords.to_nd_index()];
        if !tile.uncover() {
            return false;
        }
        if tile.is_mine() {
            self.uncovered_mines += 1;
        } else {
            self.uncovered_safe += 1;
        }
        true
    }

    pub(crate) fn has_uncovered_mine(&self) -> bool {
        self.uncovered_mines > 0
    }

    /// Flags every mine that is still unflagged.
    pub(crate) fn flag_all_mines(&mut self) -> CellCount {
        let mut flagged = 0;
        for tile in self.tiles.iter_mut() {
            if tile.is_mine() && tile.is_covered() && !tile.is_flagged() {
                tile.set_flagged(true);
                flagged += 1;
            }
        }
        flagged
    }
}

impl Index<Coord2> for Board {
    type Output = Tile;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.tiles[coords.to_nd_index()]
    }
}
