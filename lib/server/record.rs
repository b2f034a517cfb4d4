use crate::chess::{Color, Game, Outcome};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A game's unique identifier in storage.
pub type GameId = u32;

/// The role a user plays in a game they are connected to.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Seat {
    #[display("white")]
    White,
    #[display("black")]
    Black,
    #[display("an observer")]
    Observer,
}

impl Seat {
    /// The [`Color`] this seat plays, if it is a player seat.
    pub fn color(&self) -> Option<Color> {
        match self {
            Seat::White => Some(Color::White),
            Seat::Black => Some(Color::Black),
            Seat::Observer => None,
        }
    }
}

/// The stored state of one game: the embedded rules engine plus the player
/// seats and the resignation marker, which cannot be derived from the board.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub name: String,
    pub white: Option<String>,
    pub black: Option<String>,
    pub game: Game,
    pub resigned: Option<Color>,
}

impl GameRecord {
    /// A fresh record at the starting position with both seats open.
    pub fn new(id: GameId, name: &str) -> Self {
        GameRecord {
            id,
            name: name.to_string(),
            white: None,
            black: None,
            game: Game::new(),
            resigned: None,
        }
    }

    /// The [`Seat`] the given user holds in this game.
    pub fn seat_of(&self, username: &str) -> Seat {
        if self.white.as_deref() == Some(username) {
            Seat::White
        } else if self.black.as_deref() == Some(username) {
            Seat::Black
        } else {
            Seat::Observer
        }
    }

    /// Clears the seat the given user holds, if any.
    pub fn vacate(&mut self, username: &str) -> bool {
        match self.seat_of(username) {
            Seat::White => self.white = None,
            Seat::Black => self.black = None,
            Seat::Observer => return false,
        }

        true
    }

    /// The terminal state of this game, if it is over.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.resigned {
            Some(c) => Some(Outcome::Resignation(c)),
            None => self.game.outcome(),
        }
    }

    /// Whether the game is over by resignation, checkmate, or stalemate.
    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }
}
