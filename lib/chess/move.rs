use crate::chess::{ParsePositionError, Position, Role};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};
use std::str::FromStr;

/// A chess move in [pure coordinate notation].
///
/// The promotion [`Role`] is set iff a pawn move ends on the farthest rank.
///
/// [pure coordinate notation]: https://www.chessprogramming.org/Algebraic_Chess_Notation#Pure_coordinate_notation
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Move(pub Position, pub Position, pub Option<Role>);

impl Move {
    /// The source [`Position`].
    #[inline(always)]
    pub fn start(&self) -> Position {
        self.0
    }

    /// The destination [`Position`].
    #[inline(always)]
    pub fn end(&self) -> Position {
        self.1
    }

    /// The promotion [`Role`], if any.
    #[inline(always)]
    pub fn promotion(&self) -> Option<Role> {
        self.2
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start(), self.end())?;

        if let Some(role) = self.promotion() {
            write!(f, "{}", role)?;
        }

        Ok(())
    }
}

/// The reason why parsing [`Move`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("failed to parse move")]
pub struct ParseMoveError;

impl From<ParsePositionError> for ParseMoveError {
    fn from(_: ParsePositionError) -> Self {
        ParseMoveError
    }
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() || s.len() < 4 {
            return Err(ParseMoveError);
        }

        let start = s[..2].parse()?;
        let end = s[2..4].parse()?;
        let promotion = match &s[4..] {
            "" => None,
            r => Some(r.parse().map_err(|_| ParseMoveError)?),
        };

        Ok(Move(start, end, promotion))
    }
}
