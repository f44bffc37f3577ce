use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Uniform rejection-sampling generator: draws random cells until enough distinct mines land
/// outside the safe zone.
#[derive(Clone, Debug)]
pub struct RandomBoardGenerator {
    seed: u64,
    safe_zone: SafeZone,
    rng: SmallRng,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            safe_zone: SafeZone::default(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        let seed = rand::random();
        log::debug!("Board generator seeded with {}", seed);
        Self::new(seed)
    }

    pub fn with_safe_zone(mut self, safe_zone: SafeZone) -> Self {
        self.safe_zone = safe_zone;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn safe_zone(&self) -> SafeZone {
        self.safe_zone
    }

    /// Shrinks the configured zone until the requested mines fit around it.
    fn effective_zone(&self, difficulty: &DifficultyProfile, center: Coord2) -> SafeZone {
        let total_cells = difficulty.total_cells();
        let mut zone = self.safe_zone;
        while zone != SafeZone::None
            && difficulty.mines() + zone.cell_count(center, difficulty.size()) > total_cells
        {
            let smaller = zone.shrink();
            log::warn!(
                "Cannot fit {} mines around {:?} with {:?}, fallback to {:?}",
                difficulty.mines(),
                center,
                zone,
                smaller
            );
            zone = smaller;
        }
        zone
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(&mut self, difficulty: &DifficultyProfile, avoid: Option<Coord2>) -> Board {
        let total_cells = difficulty.total_cells();
        let cols = difficulty.cols();
        let zone = avoid.map(|center| (center, self.effective_zone(difficulty, center)));

        let mut mine_mask = vec![false; total_cells as usize];
        let mut mines_placed = 0;
        while mines_placed < difficulty.mines() {
            let index: CellCount = self.rng.random_range(0..total_cells);
            let coords = (index / cols, index % cols);

            if let Some((center, zone)) = zone {
                if zone.contains(center, coords) {
                    continue;
                }
            }

            let cell = &mut mine_mask[index as usize];
            if *cell {
                continue;
            }
            *cell = true;
            mines_placed += 1;
        }

        let board = Board::from_mine_mask(difficulty.size(), &mine_mask);
        log::debug!(
            "Generated {:?} board with {} mines, avoiding {:?}",
            board.size(),
            board.mine_count(),
            avoid
        );
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_numbering(board: &Board) {
        let (rows, cols) = board.size();
        for row in 0..rows {
            for col in 0..cols {
                let tile = board[(row, col)];
                if !tile.is_mine() {
                    assert_eq!(tile.adjacent_count(), board.adjacent_mine_count((row, col)));
                }
            }
        }
    }

    #[test]
    fn places_exact_mine_count() {
        let mut generator = RandomBoardGenerator::new(7);
        for difficulty in DifficultyProfile::PRESETS.map(|(_, profile)| profile) {
            let board = generator.generate(&difficulty, None);
            assert_eq!(board.mine_count(), difficulty.mines());
            assert_eq!(board.iter_mines().count() as CellCount, difficulty.mines());
            assert_eq!(board.size(), difficulty.size());
            assert_numbering(&board);
        }
    }

    #[test]
    fn new_board_is_covered_and_unflagged() {
        let mut generator = RandomBoardGenerator::new(1);
        let board = generator.generate(&DifficultyProfile::BEGINNER, Some((4, 4)));
        assert!(board.views().iter().all(|&view| view == TileView::Covered));
    }

    #[test]
    fn avoided_neighborhood_has_no_mines() {
        let mut generator = RandomBoardGenerator::new(42);
        let difficulty = DifficultyProfile::EXPERT;
        for seed_round in 0..50 {
            let avoid = (seed_round % 18, (seed_round * 7) % 18);
            let board = generator.generate(&difficulty, Some(avoid));
            assert!(!board[avoid].is_mine());
            assert_eq!(board[avoid].adjacent_count(), 0);
            for neighbor in board.iter_neighbors(avoid) {
                assert!(!board[neighbor].is_mine());
            }
        }
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let difficulty = DifficultyProfile::INTERMEDIATE;
        let first = RandomBoardGenerator::new(99).generate(&difficulty, Some((3, 3)));
        let second = RandomBoardGenerator::new(99).generate(&difficulty, Some((3, 3)));
        assert_eq!(first, second);
    }

    #[test]
    fn reports_configuration() {
        let generator = RandomBoardGenerator::new(1234).with_safe_zone(SafeZone::CellOnly);
        assert_eq!(generator.seed(), 1234);
        assert_eq!(generator.safe_zone(), SafeZone::CellOnly);
        assert_eq!(RandomBoardGenerator::new(0).safe_zone(), SafeZone::Neighborhood);
    }

    #[test]
    fn consecutive_boards_differ() {
        let mut generator = RandomBoardGenerator::new(5);
        let difficulty = DifficultyProfile::EXPERT;
        let first = generator.generate(&difficulty, Some((0, 0)));
        let second = generator.generate(&difficulty, Some((0, 0)));
        assert_ne!(first, second);
    }

    #[test]
    fn corner_zone_only_counts_in_grid_cells() {
        // 3x3 with a corner click leaves exactly 5 cells outside the zone.
        let difficulty = DifficultyProfile::custom(3, 3, 5).unwrap();
        let board = RandomBoardGenerator::new(3).generate(&difficulty, Some((0, 0)));
        let mut mines: Vec<_> = board.iter_mines().collect();
        mines.sort();
        assert_eq!(mines, vec![(0, 2), (1, 2), (2, 0), (2, 1), (2, 2)]);
    }

    #[test]
    fn dense_board_falls_back_to_safe_cell() {
        let difficulty = DifficultyProfile::custom(3, 3, 8).unwrap();
        let board = RandomBoardGenerator::new(11).generate(&difficulty, Some((1, 1)));
        assert_eq!(board.mine_count(), 8);
        assert!(!board[(1, 1)].is_mine());
        assert_eq!(board[(1, 1)].adjacent_count(), 8);
    }

    #[test]
    fn zone_none_allows_mines_anywhere() {
        let difficulty = DifficultyProfile::custom(2, 2, 3).unwrap();
        let generator = RandomBoardGenerator::new(0).with_safe_zone(SafeZone::None);
        assert_eq!(generator.effective_zone(&difficulty, (0, 0)), SafeZone::None);
        let board = generator.clone().generate(&difficulty, Some((0, 0)));
        assert_eq!(board.mine_count(), 3);
    }

    #[test]
    fn safe_zone_cell_counts() {
        assert_eq!(SafeZone::Neighborhood.cell_count((0, 0), (9, 9)), 4);
        assert_eq!(SafeZone::Neighborhood.cell_count((0, 4), (9, 9)), 6);
        assert_eq!(SafeZone::Neighborhood.cell_count((4, 4), (9, 9)), 9);
        assert_eq!(SafeZone::CellOnly.cell_count((4, 4), (9, 9)), 1);
        assert_eq!(SafeZone::None.cell_count((4, 4), (9, 9)), 0);
    }
}
