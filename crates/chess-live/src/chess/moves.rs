//! Pseudo-legal move generation.
//!
//! Moves produced here follow each piece's movement pattern but ignore
//! whether they leave the mover's own king in check; the engine filters
//! for that.

use std::collections::HashSet;

use super::board::Board;
use crate::types::chess::{ChessMove, Color, Piece, PieceType, Position};

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-1, -2),
    (-2, -1),
    (1, -2),
    (2, -1),
];

/// Pseudo-legal moves for whatever piece stands on `from`.
///
/// Empty if the square is empty.
#[must_use]
pub fn piece_moves(board: &Board, from: Position) -> HashSet<ChessMove> {
    let mut moves = HashSet::new();
    let Some(piece) = board.get(from) else {
        return moves;
    };

    match piece.piece_type {
        PieceType::Bishop => slide(board, from, piece, &DIAGONALS, &mut moves),
        PieceType::Rook => slide(board, from, piece, &ORTHOGONALS, &mut moves),
        PieceType::Queen => slide(board, from, piece, &ALL_DIRECTIONS, &mut moves),
        PieceType::King => jump(board, from, piece, &ALL_DIRECTIONS, &mut moves),
        PieceType::Knight => jump(board, from, piece, &KNIGHT_JUMPS, &mut moves),
        PieceType::Pawn => pawn(board, from, piece.color, &mut moves),
    }
    moves
}

/// True if the piece on `from` could move onto `target` by its pattern.
#[must_use]
pub fn attacks(board: &Board, from: Position, target: Position) -> bool {
    piece_moves(board, from)
        .iter()
        .any(|m| m.end_position == target)
}

fn slide(
    board: &Board,
    from: Position,
    piece: Piece,
    directions: &[(i8, i8)],
    moves: &mut HashSet<ChessMove>,
) {
    for &(dr, dc) in directions {
        let mut cursor = from.offset(dr, dc);
        while let Some(target) = cursor {
            match board.get(target) {
                None => {
                    moves.insert(ChessMove::new(from, target, None));
                }
                Some(occupant) => {
                    if occupant.color != piece.color {
                        moves.insert(ChessMove::new(from, target, None));
                    }
                    break;
                }
            }
            cursor = target.offset(dr, dc);
        }
    }
}

fn jump(
    board: &Board,
    from: Position,
    piece: Piece,
    offsets: &[(i8, i8)],
    moves: &mut HashSet<ChessMove>,
) {
    for target in offsets
        .iter()
        .filter_map(|&(dr, dc)| from.offset(dr, dc))
    {
        let capturable = board.get(target).map_or(true, |p| p.color != piece.color);
        if capturable {
            moves.insert(ChessMove::new(from, target, None));
        }
    }
}

fn pawn(board: &Board, from: Position, color: Color, moves: &mut HashSet<ChessMove>) {
    let forward = color.forward();
    let Some(one_step) = from.offset(forward, 0) else {
        return;
    };

    if board.get(one_step).is_none() {
        push_pawn_move(from, one_step, color, moves);

        if from.row() == color.pawn_start_row() {
            if let Some(two_step) = one_step.offset(forward, 0) {
                if board.get(two_step).is_none() {
                    push_pawn_move(from, two_step, color, moves);
                }
            }
        }
    }

    for target in [-1, 1].into_iter().filter_map(|dc| from.offset(forward, dc)) {
        if board.get(target).is_some_and(|p| p.color != color) {
            push_pawn_move(from, target, color, moves);
        }
    }
}

/// A pawn landing on its promotion row yields one move per promotion piece.
fn push_pawn_move(from: Position, to: Position, color: Color, moves: &mut HashSet<ChessMove>) {
    if to.row() == color.promotion_row() {
        for promotion in PieceType::PROMOTIONS {
            moves.insert(ChessMove::new(from, to, Some(promotion)));
        }
    } else {
        moves.insert(ChessMove::new(from, to, None));
    }
}
