//! Game rules on top of the board and the move generator.
//!
//! This module provides:
//! - Legal move filtering (pseudo-legal moves that keep the mover's king safe)
//! - Move application with turn tracking
//! - Check, checkmate and stalemate detection
//! - The Active → Over lifecycle of a game

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::Board;
use super::moves::{attacks, piece_moves};
use crate::types::chess::{ChessMove, Color, Piece, PieceType, Position};

/// Errors returned by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    /// No piece on the move's start square.
    #[error("no piece at {0}")]
    NoPiece(Position),

    /// The move is not among the piece's legal moves.
    #[error("illegal move {0}")]
    IllegalMove(ChessMove),

    /// The moving piece does not belong to the side to move.
    #[error("not {0}'s turn")]
    NotYourTurn(Color),

    /// The game has ended.
    #[error("game is already over")]
    GameOver,

    /// The board violates a structural invariant.
    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

/// Follow-up status of a side after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// In check with no legal moves.
    Checkmate,
    /// Not in check, but no legal moves.
    Stalemate,
    /// In check with at least one legal move.
    Check,
}

/// A move the engine accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub chess_move: ChessMove,
    /// The piece as it stood on the start square.
    pub piece: Piece,
    pub captured: Option<Piece>,
}

/// Board, side to move and whether the game has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameState")]
pub struct GameState {
    board: Board,
    turn: Color,
    over: bool,
}

/// Persisted form, checked through [`GameState::from_board`] on the way in.
#[derive(Deserialize)]
struct RawGameState {
    board: Board,
    turn: Color,
    over: bool,
}

impl TryFrom<RawGameState> for GameState {
    type Error = ChessError;

    fn try_from(raw: RawGameState) -> Result<Self, Self::Error> {
        let mut game = Self::from_board(raw.board, raw.turn)?;
        game.over = raw.over;
        Ok(game)
    }
}

impl GameState {
    /// Standard starting position, white to move.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::standard(),
            turn: Color::White,
            over: false,
        }
    }

    /// An active game from an arbitrary board.
    ///
    /// Fails if either color has more than one king.
    pub fn from_board(board: Board, turn: Color) -> Result<Self, ChessError> {
        for color in [Color::White, Color::Black] {
            let kings = board.count(Piece::new(color, PieceType::King));
            if kings > 1 {
                return Err(ChessError::InvalidPosition(format!(
                    "{color} has {kings} kings"
                )));
            }
        }
        Ok(Self {
            board,
            turn,
            over: false,
        })
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move.
    #[must_use]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Legal moves for the piece on `pos`; empty if the square is empty.
    ///
    /// Each pseudo-legal candidate is tried on a scratch copy of the board
    /// and kept only if the mover's king is not in check afterwards.
    #[must_use]
    pub fn valid_moves(&self, pos: Position) -> HashSet<ChessMove> {
        let Some(piece) = self.board.get(pos) else {
            return HashSet::new();
        };
        piece_moves(&self.board, pos)
            .into_iter()
            .filter(|m| {
                let mut scratch = self.board.clone();
                apply(&mut scratch, m, piece);
                !in_check(&scratch, piece.color)
            })
            .collect()
    }

    /// Validate and apply a move, then hand the turn to the other side.
    ///
    /// A rejected move leaves the game untouched.
    pub fn make_move(&mut self, chess_move: ChessMove) -> Result<AppliedMove, ChessError> {
        if self.over {
            return Err(ChessError::GameOver);
        }
        let piece = self
            .board
            .get(chess_move.start_position)
            .ok_or(ChessError::NoPiece(chess_move.start_position))?;
        if piece.color != self.turn {
            return Err(ChessError::NotYourTurn(piece.color));
        }
        if !self.valid_moves(chess_move.start_position).contains(&chess_move) {
            return Err(ChessError::IllegalMove(chess_move));
        }

        let captured = apply(&mut self.board, &chess_move, piece);
        self.turn = self.turn.opposite();
        Ok(AppliedMove {
            chess_move,
            piece,
            captured,
        })
    }

    /// True iff some opposing piece attacks `color`'s king.
    ///
    /// A side without a king is never in check.
    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        in_check(&self.board, color)
    }

    #[must_use]
    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_valid_moves(color)
    }

    #[must_use]
    pub fn is_in_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_valid_moves(color)
    }

    /// Checkmate, stalemate or check for `color`, in that order of precedence.
    #[must_use]
    pub fn verdict(&self, color: Color) -> Option<Verdict> {
        let check = self.is_in_check(color);
        let stuck = !self.has_valid_moves(color);
        match (check, stuck) {
            (true, true) => Some(Verdict::Checkmate),
            (false, true) => Some(Verdict::Stalemate),
            (true, false) => Some(Verdict::Check),
            (false, false) => None,
        }
    }

    /// Evaluate the side to move and end the game on checkmate or stalemate.
    pub fn settle(&mut self) -> Option<Verdict> {
        let verdict = self.verdict(self.turn);
        if matches!(verdict, Some(Verdict::Checkmate | Verdict::Stalemate)) {
            self.over = true;
        }
        verdict
    }

    /// End the game by resignation.
    pub fn resign(&mut self) -> Result<(), ChessError> {
        if self.over {
            return Err(ChessError::GameOver);
        }
        self.over = true;
        Ok(())
    }

    fn has_valid_moves(&self, color: Color) -> bool {
        self.board
            .pieces()
            .filter(|(_, p)| p.color == color)
            .any(|(pos, _)| !self.valid_moves(pos).is_empty())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Move `piece` per `chess_move`, returning whatever stood on the target.
fn apply(board: &mut Board, chess_move: &ChessMove, piece: Piece) -> Option<Piece> {
    let placed = chess_move
        .promotion
        .map_or(piece, |promotion| Piece::new(piece.color, promotion));
    board.set(chess_move.start_position, None);
    board.set(chess_move.end_position, Some(placed))
}

fn in_check(board: &Board, color: Color) -> bool {
    let Some(king) = board.king_position(color) else {
        return false;
    };
    board
        .pieces()
        .filter(|(_, p)| p.color != color)
        .any(|(pos, _)| attacks(board, pos, king))
}
