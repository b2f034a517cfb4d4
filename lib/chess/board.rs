use crate::chess::{Color, File, Piece, Position, Rank, Role};
use arrayvec::ArrayString;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter, Write};
use std::{ops::Index, str::FromStr};

/// The chess board, an 8×8 grid of optional [`Piece`]s.
///
/// [`Clone`] produces a fully independent deep copy, which is what the rules
/// engine relies on when it simulates candidate moves.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    /// A board with no pieces on it.
    #[inline(always)]
    pub fn empty() -> Self {
        Board {
            squares: Default::default(),
        }
    }

    /// Places a piece on a square, or clears it.
    #[inline(always)]
    pub fn place(&mut self, pos: Position, piece: Option<Piece>) {
        self.squares[pos.row() as usize - 1][pos.column() as usize - 1] = piece;
    }

    /// The [`Piece`] on the given square, if any.
    #[inline(always)]
    pub fn piece_on(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.row() as usize - 1][pos.column() as usize - 1]
    }

    /// The [`Color`] of the piece on the given square, if any.
    #[inline(always)]
    pub fn color_on(&self, pos: Position) -> Option<Color> {
        self.piece_on(pos).map(|p| p.color())
    }

    /// The [`Role`] of the piece on the given square, if any.
    #[inline(always)]
    pub fn role_on(&self, pos: Position) -> Option<Role> {
        self.piece_on(pos).map(|p| p.role())
    }

    /// The square occupied by the king of a [`Color`].
    #[inline(always)]
    pub fn king(&self, side: Color) -> Option<Position> {
        let king = Piece::new(side, Role::King);
        Position::iter().find(|&pos| self.piece_on(pos) == Some(king))
    }

    /// An iterator over all pieces on the board.
    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = (Piece, Position)> + '_ {
        Position::iter().filter_map(|pos| self.piece_on(pos).map(|p| (p, pos)))
    }

    /// Restores the standard starting position.
    pub fn reset(&mut self) {
        *self = Board::default();
    }
}

/// The standard starting position.
impl Default for Board {
    fn default() -> Self {
        let mut board = Board::empty();

        let ranks = [
            Role::Rook,
            Role::Knight,
            Role::Bishop,
            Role::Queen,
            Role::King,
            Role::Bishop,
            Role::Knight,
            Role::Rook,
        ];

        for side in Color::iter() {
            for (file, role) in File::iter().zip(ranks) {
                let home = Position::new(file, side.home_rank());
                let pawn = Position::new(file, side.pawn_rank());
                board.place(home, Some(Piece::new(side, role)));
                board.place(pawn, Some(Piece::new(side, Role::Pawn)));
            }
        }

        board
    }
}

/// Retrieves the [`Piece`] at a given [`Position`], if any.
impl Index<Position> for Board {
    type Output = Option<Piece>;

    #[inline(always)]
    fn index(&self, pos: Position) -> &Self::Output {
        &self.squares[pos.row() as usize - 1][pos.column() as usize - 1]
    }
}

/// The board rendered as the piece placement field of a [FEN] string.
///
/// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
impl fmt::Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            let mut skip = 0;
            for file in File::iter() {
                let mut buffer = ArrayString::<2>::new();

                match self[Position::new(file, rank)] {
                    None => skip += 1,
                    Some(p) => write!(buffer, "{}", p)?,
                }

                if !buffer.is_empty() && skip > 0 {
                    write!(f, "{}", skip)?;
                    skip = 0;
                }

                f.write_str(&buffer)?;
            }

            if skip > 0 {
                write!(f, "{}", skip)?;
            }

            if rank != Rank::First {
                f.write_char('/')?;
            }
        }

        Ok(())
    }
}

/// The reason why parsing the piece placement string failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("failed to parse piece placement")]
pub struct ParsePlacementError;

impl FromStr for Board {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ranks: Vec<_> = s.split('/').rev().collect();
        if ranks.len() != 8 {
            return Err(ParsePlacementError);
        }

        let mut board = Board::empty();
        for (row, segment) in ranks.iter().enumerate() {
            let mut col = 0i8;
            for c in segment.chars() {
                let mut buffer = [0; 4];

                if col >= 8 {
                    return Err(ParsePlacementError);
                } else if let Some(skip) = c.to_digit(10) {
                    col += skip as i8;
                } else if let Ok(p) = Piece::from_str(c.encode_utf8(&mut buffer)) {
                    let pos = Position::try_new(row as i8 + 1, col + 1)
                        .ok_or(ParsePlacementError)?;
                    board.place(pos, Some(p));
                    col += 1;
                } else {
                    return Err(ParsePlacementError);
                }
            }

            if col != 8 {
                return Err(ParsePlacementError);
            }
        }

        Ok(board)
    }
}
