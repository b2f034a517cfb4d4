use crate::chess::{Color, File, Position};
use derive_more::Debug;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter, Write};

/// The castling rights still available in a [`Game`][`crate::chess::Game`].
///
/// Rights are only ever revoked; whether a castle is actually legal on a
/// given ply is computed on demand by the rules engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[debug("Castles({self})")]
pub struct Castles {
    white_short: bool,
    white_long: bool,
    black_short: bool,
    black_long: bool,
}

impl Castles {
    /// No castling rights.
    #[inline(always)]
    pub fn none() -> Self {
        Castles {
            white_short: false,
            white_long: false,
            black_short: false,
            black_long: false,
        }
    }

    /// All castling rights.
    #[inline(always)]
    pub fn all() -> Self {
        Castles {
            white_short: true,
            white_long: true,
            black_short: true,
            black_long: true,
        }
    }

    /// Whether the given side still has kingside castling rights.
    #[inline(always)]
    pub fn has_short(&self, side: Color) -> bool {
        match side {
            Color::White => self.white_short,
            Color::Black => self.black_short,
        }
    }

    /// Whether the given side still has queenside castling rights.
    #[inline(always)]
    pub fn has_long(&self, side: Color) -> bool {
        match side {
            Color::White => self.white_long,
            Color::Black => self.black_long,
        }
    }

    /// Revokes whatever rights depend on the piece that starts a move on
    /// the given square, i.e. a king or rook leaving its original square.
    pub fn discard(&mut self, pos: Position) {
        for side in Color::iter() {
            if pos.rank() != side.home_rank() {
                continue;
            }

            let (short, long) = match side {
                Color::White => (&mut self.white_short, &mut self.white_long),
                Color::Black => (&mut self.black_short, &mut self.black_long),
            };

            match pos.file() {
                File::E => {
                    *short = false;
                    *long = false;
                }
                File::H => *short = false,
                File::A => *long = false,
                _ => {}
            }
        }
    }
}

impl Default for Castles {
    #[inline(always)]
    fn default() -> Self {
        Castles::all()
    }
}

impl fmt::Display for Castles {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if *self == Castles::none() {
            return f.write_char('-');
        }

        for (right, c) in [
            (self.white_short, 'K'),
            (self.white_long, 'Q'),
            (self.black_short, 'k'),
            (self.black_long, 'q'),
        ] {
            if right {
                f.write_char(c)?;
            }
        }

        Ok(())
    }
}
