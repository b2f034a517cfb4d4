use crate::chess::{moves, Board, Color, Move, Position, Role};
use derive_more::{Constructor, Display, Error};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};
use std::str::FromStr;

/// A chess piece, an immutable pair of [`Color`] and [`Role`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Constructor, Serialize, Deserialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Piece {
    color: Color,
    role: Role,
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.color {
            Color::White => write!(f, "{}", self.role.to_string().to_uppercase()),
            Color::Black => write!(f, "{}", self.role),
        }
    }
}

impl Piece {
    /// This piece's [`Color`].
    #[inline(always)]
    pub fn color(&self) -> Color {
        self.color
    }

    /// This piece's [`Role`].
    #[inline(always)]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The geometrically reachable [`Move`]s for this piece from the given
    /// position, ignoring whether they leave its own king in check.
    pub fn moves(&self, board: &Board, pos: Position) -> Vec<Move> {
        match self.role {
            Role::Pawn => moves::pawn_moves(board, pos, self.color),
            Role::Knight => moves::knight_moves(board, pos, self.color),
            Role::Bishop => moves::bishop_moves(board, pos, self.color),
            Role::Rook => moves::rook_moves(board, pos, self.color),
            Role::Queen => moves::queen_moves(board, pos, self.color),
            Role::King => moves::king_moves(board, pos, self.color),
        }
    }
}

/// The reason why parsing the piece failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("failed to parse piece")]
pub struct ParsePieceError;

impl FromStr for Piece {
    type Err = ParsePieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role = s.to_lowercase().parse().map_err(|_| ParsePieceError)?;
        let color = if s.chars().all(char::is_uppercase) {
            Color::White
        } else {
            Color::Black
        };

        Ok(Piece::new(color, role))
    }
}
