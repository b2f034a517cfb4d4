use crate::chess::Rank;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::Not;

/// The color of a chess [`Piece`][`crate::chess::Piece`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    #[display("white")]
    White,
    #[display("black")]
    Black,
}

impl Color {
    /// An iterator over both [`Color`]s.
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        [Color::White, Color::Black].into_iter()
    }

    /// The direction this color's pawns advance in, `+1` or `-1` ranks.
    #[inline(always)]
    pub fn direction(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// The [`Rank`] this color's king and rooks start on.
    #[inline(always)]
    pub fn home_rank(&self) -> Rank {
        match self {
            Color::White => Rank::First,
            Color::Black => Rank::Eighth,
        }
    }

    /// The [`Rank`] this color's pawns start on.
    #[inline(always)]
    pub fn pawn_rank(&self) -> Rank {
        match self {
            Color::White => Rank::Second,
            Color::Black => Rank::Seventh,
        }
    }

    /// The [`Rank`] this color's pawns promote on.
    #[inline(always)]
    pub fn promotion_rank(&self) -> Rank {
        match self {
            Color::White => Rank::Eighth,
            Color::Black => Rank::First,
        }
    }
}

impl Not for Color {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}
