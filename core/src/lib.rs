//! Rule engine for a grid-based mine-clearing puzzle.
//!
//! [`GameSession`] is the entry point: pick a [`DifficultyProfile`], reveal and flag tiles, and
//! read back [`TileView`]s and [`SessionEvent`]s to drive a presentation layer.

pub use board::*;
pub use clock::*;
pub use difficulty::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod board;
mod clock;
mod difficulty;
mod engine;
mod error;
mod generator;
mod session;
mod tile;
mod types;
