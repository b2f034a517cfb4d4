use crate::chess::{File, ParseFileError, ParseRankError, Rank};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A square on the chess board, addressed by row and column in `(1..=8)`.
#[derive(
    Debug, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[display("{file}{rank}")]
pub struct Position {
    file: File,
    rank: Rank,
}

impl Position {
    /// Constructs [`Position`] from a pair of [`File`] and [`Rank`].
    #[inline(always)]
    pub fn new(file: File, rank: Rank) -> Self {
        Position { file, rank }
    }

    /// Constructs [`Position`] from 1-based row and column indices,
    /// or `None` if either falls off the board.
    #[inline(always)]
    pub fn try_new(row: i8, col: i8) -> Option<Self> {
        Some(Position {
            file: File::from_index(col)?,
            rank: Rank::from_index(row)?,
        })
    }

    /// This position's [`File`].
    #[inline(always)]
    pub fn file(&self) -> File {
        self.file
    }

    /// This position's [`Rank`].
    #[inline(always)]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// This position's row index in the range `(1..=8)`.
    #[inline(always)]
    pub fn row(&self) -> i8 {
        self.rank.index()
    }

    /// This position's column index in the range `(1..=8)`.
    #[inline(always)]
    pub fn column(&self) -> i8 {
        self.file.index()
    }

    /// The position displaced by the given row and column deltas,
    /// or `None` if it falls off the board.
    #[inline(always)]
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Self> {
        Position::try_new(self.row() + dr, self.column() + dc)
    }

    /// An iterator over all positions on the board.
    #[inline(always)]
    pub fn iter() -> impl Iterator<Item = Self> {
        Rank::iter().flat_map(|r| File::iter().map(move |f| Position::new(f, r)))
    }
}

/// The reason why parsing [`Position`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParsePositionError {
    #[display("failed to parse position")]
    InvalidFile(ParseFileError),
    #[display("failed to parse position")]
    InvalidRank(ParseRankError),
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let i = s.char_indices().nth(1).map_or_else(|| s.len(), |(i, _)| i);
        Ok(Position::new(s[..i].parse()?, s[i..].parse()?))
    }
}
