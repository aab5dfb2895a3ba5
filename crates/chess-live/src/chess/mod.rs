//! Chess rules.
//!
//! - `board` - 8×8 piece container and placement notation
//! - `moves` - pseudo-legal move generation per piece type
//! - `engine` - legality filtering, move application, check/mate/stalemate

pub mod board;
pub mod engine;
pub mod moves;

pub use board::{Board, PlacementError};
pub use engine::{AppliedMove, ChessError, GameState, Verdict};
