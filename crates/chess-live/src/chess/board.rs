//! The 8×8 board: a container of optional pieces with no rules knowledge.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::chess::{Color, Piece, PieceType, Position, BOARD_MAX};

/// Errors from parsing piece-placement notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// Not exactly eight `/`-separated ranks.
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    /// A rank does not describe exactly eight squares.
    #[error("rank {rank} describes {squares} squares")]
    RankWidth { rank: u8, squares: usize },
    /// Unknown piece letter.
    #[error("unknown piece letter '{0}'")]
    UnknownPiece(char),
}

/// Board squares indexed `[row - 1][col - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

impl Board {
    /// A board with no pieces.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    /// The standard starting setup.
    #[must_use]
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for (i, piece_type) in BACK_RANK.into_iter().enumerate() {
            board.squares[0][i] = Some(Piece::new(Color::White, piece_type));
            board.squares[1][i] = Some(Piece::new(Color::White, PieceType::Pawn));
            board.squares[6][i] = Some(Piece::new(Color::Black, PieceType::Pawn));
            board.squares[7][i] = Some(Piece::new(Color::Black, piece_type));
        }
        board
    }

    #[must_use]
    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.squares[usize::from(pos.row() - 1)][usize::from(pos.col() - 1)]
    }

    /// Place `piece` on `pos`, or clear the square with `None`.
    /// Returns the previous occupant.
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) -> Option<Piece> {
        std::mem::replace(
            &mut self.squares[usize::from(pos.row() - 1)][usize::from(pos.col() - 1)],
            piece,
        )
    }

    /// Every occupied square.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(|pos| self.get(pos).map(|piece| (pos, piece)))
    }

    /// First king of `color` found scanning from `(1, 1)`.
    #[must_use]
    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.pieces()
            .find(|(_, p)| p.color == color && p.piece_type == PieceType::King)
            .map(|(pos, _)| pos)
    }

    #[must_use]
    pub fn count(&self, piece: Piece) -> usize {
        self.pieces().filter(|(_, p)| *p == piece).count()
    }

    /// Parse the piece-placement field of FEN, e.g.
    /// `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`. Rank 8 comes first.
    pub fn from_placement(placement: &str) -> Result<Self, PlacementError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != usize::from(BOARD_MAX) {
            return Err(PlacementError::RankCount(ranks.len()));
        }

        let mut board = Self::empty();
        for (i, rank_str) in ranks.iter().enumerate() {
            let row = BOARD_MAX - i as u8;
            let mut col = 0usize;
            for c in rank_str.chars() {
                if let Some(gap) = c.to_digit(10) {
                    col += gap as usize;
                    continue;
                }
                let piece = Piece::from_letter(c).ok_or(PlacementError::UnknownPiece(c))?;
                if col < 8 {
                    board.squares[usize::from(row - 1)][col] = Some(piece);
                }
                col += 1;
            }
            if col != 8 {
                return Err(PlacementError::RankWidth { rank: row, squares: col });
            }
        }
        Ok(board)
    }

    /// Render as piece-placement notation; inverse of [`from_placement`](Self::from_placement).
    #[must_use]
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for row in (0..8).rev() {
            let mut gap = 0;
            for square in &self.squares[row] {
                match square {
                    Some(piece) => {
                        if gap > 0 {
                            out.push_str(&gap.to_string());
                            gap = 0;
                        }
                        out.push(piece.letter());
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                out.push_str(&gap.to_string());
            }
            if row > 0 {
                out.push('/');
            }
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.placement())
    }
}
