use core::fmt;
use core::mem;
use core::time::Duration;
use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Upper bound on board regenerations while resolving a single first click.
pub const MAX_REGENERATIONS: u32 = 10;

/// Valid transitions:
/// - Title -> Playing
/// - Playing -> Won
/// - Playing -> Lost
/// - Won -> Title
/// - Lost -> Title
///
/// `reset` returns to Title from any state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Initial state, no difficulty chosen
    #[default]
    Title,
    /// Difficulty chosen, moves accepted
    Playing,
    /// Game ended and player won
    Won,
    /// Game ended and player lost
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Notable things that happened during an operation, for the presentation layer to react to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    DifficultySelected(DifficultyProfile),
    /// A board was laid out; `regeneration` is 0 for the initial layout.
    BoardGenerated { regeneration: u32 },
    TimerStarted,
    TilesUncovered(Vec<Coord2>),
    FlagChanged { coords: Coord2, flagged: bool },
    GameEnded(GameSummary),
    ReturnedToTitle,
}

/// End-of-game report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub won: bool,
    pub elapsed: Option<Duration>,
    pub flags: CellCount,
    pub mines: CellCount,
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", if self.won { "You Win!" } else { "You Lose" })?;
        match self.elapsed {
            Some(elapsed) => {
                let secs = elapsed.as_secs();
                writeln!(f, "Time: {:02}:{:02}", secs / 60, secs % 60)?;
            }
            None => writeln!(f, "Time: --:--")?,
        }
        write!(f, "Flags placed: {}/{}", self.flags, self.mines)
    }
}

/// One play surface's game, from title screen through the end of each round.
#[derive(Debug)]
pub struct GameSession<G = RandomBoardGenerator, C = SystemClock> {
    state: GameState,
    difficulty: Option<DifficultyProfile>,
    board: Option<Board>,
    /// Flags placed before the first reveal, carried onto every generated layout.
    pending_flags: BTreeSet<Coord2>,
    first_click_pending: bool,
    regeneration_count: u32,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    summary: Option<GameSummary>,
    /// Grows until drained with [`GameSession::take_events`]; cleared on returning to title.
    events: Vec<SessionEvent>,
    generator: G,
    clock: C,
}

pub fn new_session() -> GameSession {
    GameSession::new()
}

impl GameSession {
    pub fn new() -> Self {
        Self::with_parts(RandomBoardGenerator::from_entropy(), SystemClock)
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: BoardGenerator, C: Clock> GameSession<G, C> {
    pub fn with_parts(generator: G, clock: C) -> Self {
        Self {
            state: GameState::Title,
            difficulty: None,
            board: None,
            pending_flags: BTreeSet::new(),
            first_click_pending: false,
            regeneration_count: 0,
            start_time: None,
            end_time: None,
            summary: None,
            events: Vec::new(),
            generator,
            clock,
        }
    }

    pub fn select_difficulty(&mut self, profile: DifficultyProfile) -> Result<()> {
        if self.state != GameState::Title {
            return Err(self.illegal("select a difficulty"));
        }

        log::debug!("Selected difficulty {}", profile);
        self.difficulty = Some(profile);
        self.board = None;
        self.pending_flags.clear();
        self.first_click_pending = true;
        self.regeneration_count = 0;
        self.start_time = None;
        self.end_time = None;
        self.summary = None;
        self.state = GameState::Playing;
        self.events.push(SessionEvent::DifficultySelected(profile));
        Ok(())
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let difficulty = self.active_difficulty("reveal a tile")?;
        let coords = difficulty.validate_coords(coords)?;

        if self.board.is_none() {
            if self.pending_flags.contains(&coords) {
                return Ok(RevealOutcome::Unchanged);
            }
            let board = self.lay_out(&difficulty, coords);
            self.events.push(SessionEvent::BoardGenerated { regeneration: 0 });
            self.board = Some(board);
        }

        let mut reveal = self.board_mut("reveal a tile")?.reveal(coords)?;
        if self.first_click_pending {
            reveal = self.resolve_first_click(&difficulty, coords, reveal)?;
        }

        let Reveal { outcome, uncovered } = reveal;
        if !uncovered.is_empty() {
            self.events.push(SessionEvent::TilesUncovered(uncovered));
        }

        match outcome {
            RevealOutcome::HitMine => self.finish(false),
            RevealOutcome::Won => self.finish(true),
            RevealOutcome::InProgress | RevealOutcome::Unchanged => {}
        }
        Ok(outcome)
    }

    /// Regenerates the board while the first click lands on a mine or a numbered tile.
    fn resolve_first_click(
        &mut self,
        difficulty: &DifficultyProfile,
        coords: Coord2,
        mut reveal: Reveal,
    ) -> Result<Reveal> {
        loop {
            let numbered = self.board_mut("reveal a tile")?[coords].adjacent_count() > 0;
            let unfavorable = reveal.outcome == RevealOutcome::HitMine || numbered;
            if !unfavorable || self.regeneration_count >= MAX_REGENERATIONS {
                break;
            }

            self.regeneration_count += 1;
            log::debug!(
                "First click at {:?} was {:?}, regenerating board ({}/{})",
                coords,
                reveal.outcome,
                self.regeneration_count,
                MAX_REGENERATIONS
            );
            let board = self.lay_out(difficulty, coords);
            self.events.push(SessionEvent::BoardGenerated {
                regeneration: self.regeneration_count,
            });
            reveal = self.board.insert(board).reveal(coords)?;
        }

        let now = self.clock.now();
        log::debug!("Timer started after {} regenerations", self.regeneration_count);
        self.first_click_pending = false;
        self.pending_flags.clear();
        self.start_time = Some(now);
        self.events.push(SessionEvent::TimerStarted);
        Ok(reveal)
    }

    /// Generates a layout around `avoid` and puts back the flags placed before it existed.
    fn lay_out(&mut self, difficulty: &DifficultyProfile, avoid: Coord2) -> Board {
        let mut board = self.generator.generate(difficulty, Some(avoid));
        for &coords in &self.pending_flags {
            if let Err(err) = board.toggle_flag(coords, true) {
                log::warn!("Dropping flag at {:?}: {}", coords, err);
            }
        }
        board
    }

    pub fn toggle_flag(&mut self, coords: Coord2, desired: bool) -> Result<bool> {
        let difficulty = self.active_difficulty("toggle a flag")?;
        let coords = difficulty.validate_coords(coords)?;

        // every tile is still covered until the first reveal lays out the board
        let applied = match self.board.as_mut() {
            Some(board) => board.toggle_flag(coords, desired)?,
            None => {
                if desired {
                    self.pending_flags.insert(coords);
                } else {
                    self.pending_flags.remove(&coords);
                }
                true
            }
        };
        if applied {
            self.events.push(SessionEvent::FlagChanged {
                coords,
                flagged: desired,
            });
        }
        Ok(applied)
    }

    pub fn acknowledge_end(&mut self) -> Result<()> {
        if !self.state.is_finished() {
            return Err(self.illegal("acknowledge the end of a game"));
        }
        self.return_to_title();
        Ok(())
    }

    /// Abandons whatever is in progress and goes back to the title screen.
    pub fn reset(&mut self) {
        if self.state != GameState::Title {
            self.return_to_title();
        }
    }

    fn return_to_title(&mut self) {
        log::debug!("Returning to title from {:?}", self.state);
        self.state = GameState::Title;
        self.difficulty = None;
        self.board = None;
        self.pending_flags.clear();
        self.first_click_pending = false;
        self.regeneration_count = 0;
        self.start_time = None;
        self.end_time = None;
        self.summary = None;
        // anything the caller never drained belongs to the game being left
        self.events.clear();
        self.events.push(SessionEvent::ReturnedToTitle);
    }

    fn finish(&mut self, won: bool) {
        let now = self.clock.now();
        let Some(board) = self.board.as_mut() else {
            return;
        };

        let mines = board.mine_count();
        let flags = if won {
            board.flag_all_mines();
            mines
        } else {
            board.flagged_count()
        };

        self.end_time = Some(now);
        self.state = if won { GameState::Won } else { GameState::Lost };
        let summary = GameSummary {
            won,
            elapsed: self.start_time.map(|start| now.duration_since(start)),
            flags,
            mines,
        };
        log::debug!("Game ended: {:?}", summary);
        self.summary = Some(summary);
        self.events.push(SessionEvent::GameEnded(summary));
    }

    fn illegal(&self, action: &'static str) -> SessionError {
        SessionError::IllegalStateTransition {
            action,
            state: self.state,
        }
    }

    fn active_difficulty(&self, action: &'static str) -> Result<DifficultyProfile> {
        match (self.state, self.difficulty) {
            (GameState::Playing, Some(difficulty)) => Ok(difficulty),
            _ => Err(self.illegal(action)),
        }
    }

    fn board_mut(&mut self, action: &'static str) -> Result<&mut Board> {
        let state = self.state;
        self.board
            .as_mut()
            .ok_or(SessionError::IllegalStateTransition { action, state })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn difficulty(&self) -> Option<DifficultyProfile> {
        self.difficulty
    }

    pub fn size(&self) -> Option<Coord2> {
        self.difficulty.map(|difficulty| difficulty.size())
    }

    /// The board, once the first reveal has laid it out.
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn tile_view(&self, coords: Coord2) -> Result<TileView> {
        let Some(difficulty) = self.difficulty else {
            return Err(self.illegal("view a tile"));
        };
        let coords = difficulty.validate_coords(coords)?;
        Ok(match &self.board {
            Some(board) => board[coords].view(),
            None => self.pending_view(coords),
        })
    }

    /// Player-visible grid, `None` on the title screen.
    ///
    /// Before the first reveal every tile is covered, apart from any flags already placed.
    pub fn snapshot(&self) -> Option<Array2<TileView>> {
        let difficulty = self.difficulty?;
        Some(match &self.board {
            Some(board) => board.views(),
            None => Array2::from_shape_fn(difficulty.size().to_nd_index(), |(row, col)| {
                self.pending_view((row as Coord, col as Coord))
            }),
        })
    }

    fn pending_view(&self, coords: Coord2) -> TileView {
        if self.pending_flags.contains(&coords) {
            TileView::Flagged
        } else {
            TileView::Covered
        }
    }

    /// Time since the first click resolved, frozen once the game ends.
    pub fn elapsed(&self) -> Option<Duration> {
        let start = self.start_time?;
        let end = self.end_time.unwrap_or_else(|| self.clock.now());
        Some(end.duration_since(start))
    }

    pub fn mine_count(&self) -> Option<CellCount> {
        self.difficulty.map(|difficulty| difficulty.mines())
    }

    pub fn flag_count(&self) -> CellCount {
        match &self.board {
            Some(board) => board.flagged_count(),
            None => self.pending_flags.len() as CellCount,
        }
    }

    /// How many mines have not been flagged yet, negative when over-flagged.
    pub fn mines_left(&self) -> Option<i64> {
        self.mine_count()
            .map(|mines| i64::from(mines) - i64::from(self.flag_count()))
    }

    pub fn regeneration_count(&self) -> u32 {
        self.regeneration_count
    }

    pub fn is_first_click_pending(&self) -> bool {
        self.first_click_pending
    }

    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    /// Drains the events queued since the last call.
    ///
    /// The queue is only emptied here and on returning to the title screen, so a long-running
    /// caller should drain it after each move.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }
}
