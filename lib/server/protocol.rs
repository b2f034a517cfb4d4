use crate::chess::{Game, Move, Position, Role};
use crate::server::GameId;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// A move as it crosses the wire, addressed by raw row and column indices.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct WireMove {
    pub start_row: i8,
    pub start_col: i8,
    pub end_row: i8,
    pub end_col: i8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<Role>,
}

/// The reason why a wire move does not describe a square on the board.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Error)]
#[display("malformed move")]
pub struct MalformedMove;

impl TryFrom<WireMove> for Move {
    type Error = MalformedMove;

    fn try_from(m: WireMove) -> Result<Self, Self::Error> {
        let start = Position::try_new(m.start_row, m.start_col).ok_or(MalformedMove)?;
        let end = Position::try_new(m.end_row, m.end_col).ok_or(MalformedMove)?;
        Ok(Move(start, end, m.promotion))
    }
}

impl From<Move> for WireMove {
    fn from(m: Move) -> Self {
        WireMove {
            start_row: m.start().row(),
            start_col: m.start().column(),
            end_row: m.end().row(),
            end_col: m.end().column(),
            promotion: m.promotion(),
        }
    }
}

/// An inbound command, one JSON object per transport frame, discriminated
/// by its `commandType` field.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandType")]
pub enum Command {
    #[serde(rename = "CONNECT")]
    Connect {
        token: String,
        #[serde(rename = "gameId")]
        game_id: GameId,
    },

    #[serde(rename = "MAKE_MOVE")]
    MakeMove {
        token: String,
        #[serde(rename = "gameId")]
        game_id: GameId,
        #[serde(rename = "move")]
        mv: WireMove,
    },

    #[serde(rename = "RESIGN")]
    Resign {
        token: String,
        #[serde(rename = "gameId")]
        game_id: GameId,
    },

    #[serde(rename = "LEAVE")]
    Leave {
        token: String,
        #[serde(rename = "gameId")]
        game_id: GameId,
    },
}

impl Command {
    /// The session token this command carries.
    pub fn token(&self) -> &str {
        match self {
            Command::Connect { token, .. }
            | Command::MakeMove { token, .. }
            | Command::Resign { token, .. }
            | Command::Leave { token, .. } => token,
        }
    }

    /// The game this command targets.
    pub fn game_id(&self) -> GameId {
        match self {
            Command::Connect { game_id, .. }
            | Command::MakeMove { game_id, .. }
            | Command::Resign { game_id, .. }
            | Command::Leave { game_id, .. } => *game_id,
        }
    }
}

/// An outbound message, discriminated by its `serverMessageType` field.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "serverMessageType")]
pub enum ServerMessage {
    /// The authoritative game snapshot every client renders from.
    #[serde(rename = "LOAD_GAME")]
    LoadGame { game: Game },

    #[serde(rename = "NOTIFICATION")]
    Notification { text: String },

    #[serde(rename = "ERROR")]
    Error { text: String },
}
