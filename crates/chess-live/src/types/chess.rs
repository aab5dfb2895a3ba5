//! Core chess value types.
//!
//! These are plain serializable values shared by the board, the move
//! generator, the engine and the wire protocol.

use serde::{Deserialize, Serialize};

/// Lowest row/column index on the board.
pub const BOARD_MIN: u8 = 1;
/// Highest row/column index on the board.
pub const BOARD_MAX: u8 = 8;

/// Chess piece color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    /// White pieces.
    White,
    /// Black pieces.
    Black,
}

impl Color {
    /// Get the opposite color.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Row a pawn of this color starts on.
    #[must_use]
    pub const fn pawn_start_row(self) -> u8 {
        match self {
            Self::White => 2,
            Self::Black => 7,
        }
    }

    /// Row a pawn of this color promotes on.
    #[must_use]
    pub const fn promotion_row(self) -> u8 {
        match self {
            Self::White => BOARD_MAX,
            Self::Black => BOARD_MIN,
        }
    }

    /// Direction a pawn of this color advances in (+1 or -1 rows).
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

/// Chess piece type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PieceType {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceType {
    /// Piece types a pawn may promote to.
    pub const PROMOTIONS: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    /// Lowercase placement-notation letter (`k`, `q`, `r`, `b`, `n`, `p`).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::King => 'k',
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
            Self::Pawn => 'p',
        }
    }

    /// Inverse of [`letter`](Self::letter), case-insensitive.
    #[must_use]
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'k' => Some(Self::King),
            'q' => Some(Self::Queen),
            'r' => Some(Self::Rook),
            'b' => Some(Self::Bishop),
            'n' => Some(Self::Knight),
            'p' => Some(Self::Pawn),
            _ => None,
        }
    }
}

impl std::fmt::Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::King => write!(f, "king"),
            Self::Queen => write!(f, "queen"),
            Self::Rook => write!(f, "rook"),
            Self::Bishop => write!(f, "bishop"),
            Self::Knight => write!(f, "knight"),
            Self::Pawn => write!(f, "pawn"),
        }
    }
}

/// A chess piece with color and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    /// Piece color.
    pub color: Color,
    /// Piece type.
    pub piece_type: PieceType,
}

impl Piece {
    #[must_use]
    pub const fn new(color: Color, piece_type: PieceType) -> Self {
        Self { color, piece_type }
    }

    /// Placement-notation letter: uppercase for white, lowercase for black.
    #[must_use]
    pub fn letter(self) -> char {
        let c = self.piece_type.letter();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parse a placement-notation letter.
    #[must_use]
    pub fn from_letter(c: char) -> Option<Self> {
        let piece_type = PieceType::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self::new(color, piece_type))
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.color, self.piece_type)
    }
}

/// A square on the board, `row` and `col` both in `1..=8`.
///
/// Row 1 is white's back rank; column 1 is the a-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    row: u8,
    col: u8,
}

#[derive(Deserialize)]
struct RawPosition {
    row: i64,
    col: i64,
}

impl TryFrom<RawPosition> for Position {
    type Error = String;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        u8::try_from(raw.row)
            .ok()
            .zip(u8::try_from(raw.col).ok())
            .and_then(|(row, col)| Self::new(row, col))
            .ok_or_else(|| format!("position ({}, {}) is off the board", raw.row, raw.col))
    }
}

impl Position {
    /// Create a position, or `None` if either coordinate is outside `1..=8`.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row >= BOARD_MIN && row <= BOARD_MAX && col >= BOARD_MIN && col <= BOARD_MAX {
            Some(Self { row, col })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn row(self) -> u8 {
        self.row
    }

    #[must_use]
    pub const fn col(self) -> u8 {
        self.col
    }

    /// The position `(dr, dc)` away, if it is still on the board.
    #[must_use]
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if row < 0 || col < 0 {
            return None;
        }
        Self::new(row as u8, col as u8)
    }

    /// All 64 positions, row-major from `(1, 1)`.
    pub fn all() -> impl Iterator<Item = Self> {
        (BOARD_MIN..=BOARD_MAX)
            .flat_map(|row| (BOARD_MIN..=BOARD_MAX).map(move |col| Self { row, col }))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = (b'a' + self.col - 1) as char;
        write!(f, "{file}{}", self.row)
    }
}

impl std::str::FromStr for Position {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err("square must be 2 characters");
        };
        if !('a'..='h').contains(&file) {
            return Err("file must be a-h");
        }
        if !('1'..='8').contains(&rank) {
            return Err("rank must be 1-8");
        }
        Self::new(rank as u8 - b'0', file as u8 - b'a' + 1).ok_or("invalid square")
    }
}

/// A move from one square to another, with an optional promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessMove {
    pub start_position: Position,
    pub end_position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceType>,
}

impl ChessMove {
    #[must_use]
    pub const fn new(start: Position, end: Position, promotion: Option<PieceType>) -> Self {
        Self {
            start_position: start,
            end_position: end,
            promotion,
        }
    }
}

/// Coordinate notation, e.g. `e2e4` or `e7e8q`.
impl std::fmt::Display for ChessMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.start_position, self.end_position)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.letter())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_wire_shape() {
        let json = r#"{"startPosition":{"row":7,"col":1},"endPosition":{"row":8,"col":1},"promotion":"QUEEN"}"#;
        let m: ChessMove = serde_json::from_str(json).unwrap();
        assert_eq!(m.promotion, Some(PieceType::Queen));
        assert_eq!(m.to_string(), "a7a8q");

        let plain: ChessMove =
            serde_json::from_str(r#"{"startPosition":{"row":2,"col":5},"endPosition":{"row":4,"col":5}}"#)
                .unwrap();
        assert_eq!(plain.promotion, None);
        assert_eq!(plain.to_string(), "e2e4");
    }

    #[test]
    fn test_color_opposite() {
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::Black.opposite(), Color::White);
    }

    #[test]
    fn test_position_bounds() {
        assert!(Position::new(1, 1).is_some());
        assert!(Position::new(8, 8).is_some());
        assert!(Position::new(0, 3).is_none());
        assert!(Position::new(3, 9).is_none());
    }

    #[test]
    fn test_position_algebraic() {
        let e2 = Position::new(2, 5).unwrap();
        assert_eq!(e2.to_string(), "e2");
        assert_eq!("e2".parse::<Position>().unwrap(), e2);
        assert!("i2".parse::<Position>().is_err());
        assert!("e9".parse::<Position>().is_err());
        assert!("e22".parse::<Position>().is_err());
    }

    #[test]
    fn test_position_offset_stays_on_board() {
        let a1 = Position::new(1, 1).unwrap();
        assert_eq!(a1.offset(1, 1), Position::new(2, 2));
        assert!(a1.offset(-1, 0).is_none());
        assert!(Position::new(8, 8).unwrap().offset(1, 0).is_none());
    }

    #[test]
    fn test_position_json_rejects_off_board() {
        let ok: Position = serde_json::from_str(r#"{"row":2,"col":5}"#).unwrap();
        assert_eq!(ok, Position::new(2, 5).unwrap());
        assert!(serde_json::from_str::<Position>(r#"{"row":0,"col":5}"#).is_err());
        assert!(serde_json::from_str::<Position>(r#"{"row":-3,"col":5}"#).is_err());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Color::White).unwrap(), r#""WHITE""#);
        assert_eq!(serde_json::to_string(&PieceType::Knight).unwrap(), r#""KNIGHT""#);
        let piece = Piece::new(Color::Black, PieceType::Queen);
        assert_eq!(
            serde_json::to_string(&piece).unwrap(),
            r#"{"color":"BLACK","pieceType":"QUEEN"}"#
        );
    }

    #[test]
    fn test_piece_letters() {
        assert_eq!(Piece::new(Color::White, PieceType::Knight).letter(), 'N');
        assert_eq!(Piece::from_letter('q'), Some(Piece::new(Color::Black, PieceType::Queen)));
        assert_eq!(Piece::from_letter('x'), None);
    }
}
