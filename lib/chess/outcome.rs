use crate::chess::Color;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// One of the possible outcomes of a chess game.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Outcome {
    #[display("checkmate by the {_0} player")]
    Checkmate(Color),

    #[display("{_0} player resigned")]
    Resignation(Color),

    #[display("stalemate")]
    Stalemate,
}

impl Outcome {
    /// Whether the outcome is decisive and one of the sides has won.
    pub fn is_decisive(&self) -> bool {
        matches!(self, Outcome::Checkmate(_) | Outcome::Resignation(_))
    }

    /// The winning side, if the outcome is [decisive](`Self::is_decisive`).
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::Checkmate(c) => Some(c),
            Outcome::Resignation(c) => Some(!c),
            Outcome::Stalemate => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn one_side_wins_iff_decisive(o: Outcome) {
        assert_eq!(o.winner().is_some(), o.is_decisive());
    }

    #[proptest]
    fn side_that_checkmates_wins(c: Color) {
        assert_eq!(Outcome::Checkmate(c).winner(), Some(c));
    }

    #[proptest]
    fn side_that_resigns_loses(c: Color) {
        assert_eq!(Outcome::Resignation(c).winner(), Some(!c));
    }
}
