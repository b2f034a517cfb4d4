//! Per-piece move generation.
//!
//! These functions compute the geometrically reachable squares for a piece of
//! the given color, ignoring whether the mover's own king would be left in
//! check. Castling and en passant depend on transient game state and are
//! handled by [`Game`][`crate::chess::Game`] instead.

use crate::chess::{Board, Color, Move, Position, Role};

const PROMOTIONS: [Role; 4] = [Role::Queen, Role::Rook, Role::Bishop, Role::Knight];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

/// Moves a pawn of the given color can make from `pos`: a single forward
/// step, a double step from the starting rank, and diagonal captures. Any
/// move landing on the farthest rank is expanded into one move per
/// promotion role.
pub fn pawn_moves(board: &Board, pos: Position, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    let dir = color.direction();

    if let Some(target) = pos.offset(dir, 0) {
        if board.color_on(target).is_none() {
            moves.push(Move(pos, target, None));

            if pos.rank() == color.pawn_rank() {
                if let Some(target) = pos.offset(2 * dir, 0) {
                    if board.color_on(target).is_none() {
                        moves.push(Move(pos, target, None));
                    }
                }
            }
        }
    }

    for dc in [-1, 1] {
        if let Some(target) = pos.offset(dir, dc) {
            if board.color_on(target).is_some_and(|c| c != color) {
                moves.push(Move(pos, target, None));
            }
        }
    }

    if moves.iter().any(|m| m.end().rank() == color.promotion_rank()) {
        moves
            .iter()
            .flat_map(|m| PROMOTIONS.map(|r| Move(m.start(), m.end(), Some(r))))
            .collect()
    } else {
        moves
    }
}

/// Moves a knight of the given color can make from `pos`.
pub fn knight_moves(board: &Board, pos: Position, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for (dr, dc) in KNIGHT_OFFSETS {
        jump(board, pos, color, dr, dc, &mut moves);
    }
    moves
}

/// Moves a king of the given color can make from `pos`, one step in any
/// direction; castling is not considered here.
pub fn king_moves(board: &Board, pos: Position, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for (dr, dc) in KING_OFFSETS {
        jump(board, pos, color, dr, dc, &mut moves);
    }
    moves
}

/// Moves a rook of the given color can make from `pos`.
pub fn rook_moves(board: &Board, pos: Position, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for (dr, dc) in [(1, 0), (0, 1), (-1, 0), (0, -1)] {
        slide(board, pos, color, dr, dc, &mut moves);
    }
    moves
}

/// Moves a bishop of the given color can make from `pos`.
pub fn bishop_moves(board: &Board, pos: Position, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for (dr, dc) in [(1, 1), (-1, 1), (-1, -1), (1, -1)] {
        slide(board, pos, color, dr, dc, &mut moves);
    }
    moves
}

/// Moves a queen of the given color can make from `pos`.
pub fn queen_moves(board: &Board, pos: Position, color: Color) -> Vec<Move> {
    let mut moves = bishop_moves(board, pos, color);
    moves.append(&mut rook_moves(board, pos, color));
    moves
}

/// A single step to a fixed offset, unless off the board or occupied by a
/// same-colored piece.
fn jump(board: &Board, pos: Position, color: Color, dr: i8, dc: i8, moves: &mut Vec<Move>) {
    let Some(target) = pos.offset(dr, dc) else {
        return;
    };

    if board.color_on(target) != Some(color) {
        moves.push(Move(pos, target, None));
    }
}

/// Casts a ray in the given direction, stopping before any same-colored
/// piece and including the first opponent piece hit.
fn slide(board: &Board, pos: Position, color: Color, dr: i8, dc: i8, moves: &mut Vec<Move>) {
    let mut target = pos.offset(dr, dc);
    while let Some(t) = target {
        match board.color_on(t) {
            Some(c) if c == color => break,
            Some(_) => {
                moves.push(Move(pos, t, None));
                break;
            }
            None => moves.push(Move(pos, t, None)),
        }

        target = t.offset(dr, dc);
    }
}
