mod board;
mod castles;
mod color;
mod file;
mod game;
mod r#move;
mod moves;
mod outcome;
mod piece;
mod position;
mod rank;
mod role;

pub use board::*;
pub use castles::*;
pub use color::*;
pub use file::*;
pub use game::*;
pub use moves::*;
pub use outcome::*;
pub use piece::*;
pub use position::*;
pub use r#move::*;
pub use rank::*;
pub use role::*;
