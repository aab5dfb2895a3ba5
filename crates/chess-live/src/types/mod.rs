//! Type definitions shared across the crate.
//!
//! ## Modules
//!
//! - `chess` - Chess values (Color, PieceType, Piece, Position, ChessMove)
//! - `game` - Game-related types (GameId, GameSnapshot, Role)
//! - `player` - Player identity (Username)

pub mod chess;
pub mod game;
pub mod player;

pub use chess::{ChessMove, Color, Piece, PieceType, Position, BOARD_MAX, BOARD_MIN};
pub use game::{GameId, GameSnapshot, Role};
pub use player::Username;
