use crate::chess::Move;
use crate::server::{Auth, Command, Connection, GameId, GameRecord};
use crate::server::{ServerMessage, SessionRegistry, Storage, WireMove};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{instrument, warn};

fn error(text: impl Into<String>) -> ServerMessage {
    ServerMessage::Error { text: text.into() }
}

fn notification(text: impl Into<String>) -> ServerMessage {
    ServerMessage::Notification { text: text.into() }
}

/// Sends a message to the requester only, swallowing transport failures.
fn reply(tx: &UnboundedSender<ServerMessage>, msg: ServerMessage) {
    if tx.send(msg).is_err() {
        warn!("dropping reply for closed connection");
    }
}

/// Executes live-play commands against the rules engine and storage, and
/// fans the results out through the [`SessionRegistry`].
///
/// Commands targeting the same game are serialized behind a per-game lock,
/// so that one command's read-modify-persist-broadcast completes before the
/// next begins; commands for different games proceed in parallel.
pub struct GameSessionHandler {
    auth: Arc<dyn Auth>,
    storage: Arc<dyn Storage>,
    registry: Arc<SessionRegistry>,
    locks: Mutex<HashMap<GameId, Arc<tokio::sync::Mutex<()>>>>,
}

impl GameSessionHandler {
    pub fn new(auth: Arc<dyn Auth>, storage: Arc<dyn Storage>, registry: Arc<SessionRegistry>) -> Self {
        GameSessionHandler {
            auth,
            storage,
            registry,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, game_id: GameId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(game_id).or_default().clone()
    }

    /// Executes one command on behalf of the connection draining to `tx`.
    ///
    /// The session token and the game id are resolved independently, and
    /// each failure is reported to the requester before the command aborts.
    #[instrument(level = "debug", skip(self, tx))]
    pub async fn handle(&self, cmd: Command, tx: &UnboundedSender<ServerMessage>) {
        let game_id = cmd.game_id();
        let lock = self.lock_for(game_id);
        let _guard = lock.lock().await;

        let identity = self.auth.resolve(cmd.token()).await;
        let record = self.storage.load(game_id).await;

        if let Err(e) = &identity {
            reply(tx, error(e.to_string()));
        }

        if let Err(e) = &record {
            reply(tx, error(e.to_string()));
        }

        let (Ok(username), Ok(record)) = (identity, record) else {
            return;
        };

        match cmd {
            Command::Connect { token, .. } => self.connect(&token, &username, record, tx),
            Command::MakeMove { mv, .. } => self.make_move(&username, record, mv, tx).await,
            Command::Resign { .. } => self.resign(&username, record, tx).await,
            Command::Leave { token, .. } => self.leave(&token, &username, record, tx).await,
        }
    }

    fn connect(
        &self,
        token: &str,
        username: &str,
        record: GameRecord,
        tx: &UnboundedSender<ServerMessage>,
    ) {
        self.registry
            .add(record.id, Connection::new(token, username, tx.clone()));

        let seat = record.seat_of(username);
        self.registry.broadcast(
            record.id,
            Some(token),
            &notification(format!("{username} has joined the game as {seat}")),
        );

        reply(tx, ServerMessage::LoadGame { game: record.game });
    }

    async fn make_move(
        &self,
        username: &str,
        mut record: GameRecord,
        mv: WireMove,
        tx: &UnboundedSender<ServerMessage>,
    ) {
        let Some(color) = record.seat_of(username).color() else {
            reply(tx, error("only players can move pieces"));
            return;
        };

        if record.resigned.is_some() {
            reply(tx, error("the game is already over"));
            return;
        }

        if record.game.turn() != color {
            reply(tx, error("it is not your turn"));
            return;
        }

        let m = match Move::try_from(mv) {
            Ok(m) => m,
            Err(e) => {
                reply(tx, error(e.to_string()));
                return;
            }
        };

        if let Err(e) = record.game.make_move(m) {
            reply(tx, error(e.to_string()));
            return;
        }

        if let Err(e) = self.storage.store(record.clone()).await {
            reply(tx, error(e.to_string()));
            return;
        }

        self.registry.broadcast(
            record.id,
            None,
            &ServerMessage::LoadGame {
                game: record.game.clone(),
            },
        );

        self.registry.broadcast(
            record.id,
            None,
            &notification(format!("{username} moved {} to {}", m.start(), m.end())),
        );

        let next = record.game.turn();
        if record.game.is_in_checkmate(next) {
            self.registry
                .broadcast(record.id, None, &notification(format!("{next} is in checkmate")));
        } else if record.game.is_in_stalemate(next) {
            self.registry
                .broadcast(record.id, None, &notification("the game is in stalemate"));
        } else if record.game.is_in_check(next) {
            self.registry
                .broadcast(record.id, None, &notification(format!("{next} is in check")));
        }
    }

    async fn resign(
        &self,
        username: &str,
        mut record: GameRecord,
        tx: &UnboundedSender<ServerMessage>,
    ) {
        let Some(color) = record.seat_of(username).color() else {
            reply(tx, error("only players can resign"));
            return;
        };

        if record.is_over() {
            reply(tx, error("the game is already over"));
            return;
        }

        record.resigned = Some(color);
        let game_id = record.id;

        if let Err(e) = self.storage.store(record).await {
            reply(tx, error(e.to_string()));
            return;
        }

        self.registry
            .broadcast(game_id, None, &notification(format!("{username} resigned")));
    }

    async fn leave(
        &self,
        token: &str,
        username: &str,
        mut record: GameRecord,
        tx: &UnboundedSender<ServerMessage>,
    ) {
        self.registry.remove(record.id, token);
        self.registry.broadcast(
            record.id,
            None,
            &notification(format!("{username} left the game")),
        );

        if record.vacate(username) {
            if let Err(e) = self.storage.store(record).await {
                reply(tx, error(e.to_string()));
            }
        }
    }
}
