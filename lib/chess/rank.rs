use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A row on the chess board.
#[derive(
    Debug, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[repr(i8)]
pub enum Rank {
    #[display("1")]
    First = 1,
    #[display("2")]
    Second,
    #[display("3")]
    Third,
    #[display("4")]
    Fourth,
    #[display("5")]
    Fifth,
    #[display("6")]
    Sixth,
    #[display("7")]
    Seventh,
    #[display("8")]
    Eighth,
}

impl Rank {
    /// Constructs [`Rank`] from a 1-based row index.
    #[inline(always)]
    pub fn from_index(i: i8) -> Option<Self> {
        match i {
            1 => Some(Rank::First),
            2 => Some(Rank::Second),
            3 => Some(Rank::Third),
            4 => Some(Rank::Fourth),
            5 => Some(Rank::Fifth),
            6 => Some(Rank::Sixth),
            7 => Some(Rank::Seventh),
            8 => Some(Rank::Eighth),
            _ => None,
        }
    }

    /// This rank's row index in the range `(1..=8)`.
    #[inline(always)]
    pub fn index(&self) -> i8 {
        *self as i8
    }

    /// An iterator over [`Rank`]s ordered by [index][`Rank::index`].
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        [
            Rank::First,
            Rank::Second,
            Rank::Third,
            Rank::Fourth,
            Rank::Fifth,
            Rank::Sixth,
            Rank::Seventh,
            Rank::Eighth,
        ]
        .into_iter()
    }
}

/// The reason why parsing [`Rank`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("failed to parse rank")]
pub struct ParseRankError;

impl FromStr for Rank {
    type Err = ParseRankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i8>() {
            Ok(i) => Rank::from_index(i).ok_or(ParseRankError),
            Err(_) => Err(ParseRankError),
        }
    }
}
