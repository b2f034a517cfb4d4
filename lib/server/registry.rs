use crate::server::{GameId, ServerMessage};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// One participant's end of a live game: the session token and username it
/// was opened with, and the channel the transport drains to their socket.
#[derive(Debug, Clone)]
pub struct Connection {
    token: String,
    username: String,
    tx: UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(token: &str, username: &str, tx: UnboundedSender<ServerMessage>) -> Self {
        Connection {
            token: token.to_string(),
            username: username.to_string(),
            tx,
        }
    }

    /// The session token this connection was opened with.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The username this connection belongs to.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Queues a message for delivery, reporting whether the transport end
    /// is still alive. Delivery failures are logged and swallowed.
    pub fn send(&self, msg: ServerMessage) -> bool {
        match self.tx.send(msg) {
            Ok(()) => true,
            Err(_) => {
                warn!(username = self.username, "dropping message for closed connection");
                false
            }
        }
    }
}

/// The set of live connections per game.
///
/// This is the only place allowed to broadcast; one recipient's closed or
/// slow connection never delays or fails delivery to the others.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<GameId, Vec<Connection>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    /// Registers a connection under a game, replacing any previous
    /// connection opened with the same token.
    pub fn add(&self, game_id: GameId, conn: Connection) {
        let mut sessions = self.sessions.lock().unwrap();
        let conns = sessions.entry(game_id).or_default();
        conns.retain(|c| c.token() != conn.token());
        conns.push(conn);
    }

    /// Removes the connection opened with the given token from a game.
    pub fn remove(&self, game_id: GameId, token: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(conns) = sessions.get_mut(&game_id) {
            conns.retain(|c| c.token() != token);
            if conns.is_empty() {
                sessions.remove(&game_id);
            }
        }
    }

    /// Removes the connection opened with the given token from every game,
    /// used when its transport closes without a LEAVE.
    pub fn remove_token(&self, token: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        for conns in sessions.values_mut() {
            conns.retain(|c| c.token() != token);
        }
        sessions.retain(|_, conns| !conns.is_empty());
    }

    /// The number of live connections on a game.
    pub fn count(&self, game_id: GameId) -> usize {
        self.sessions
            .lock()
            .unwrap()
            .get(&game_id)
            .map_or(0, Vec::len)
    }

    /// Sends a message to every connection on a game, except the one opened
    /// with the excluded token. Dead connections are pruned as they are
    /// discovered; they never abort delivery to the rest.
    pub fn broadcast(&self, game_id: GameId, exclude: Option<&str>, msg: &ServerMessage) {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(conns) = sessions.get_mut(&game_id) {
            conns.retain(|c| Some(c.token()) == exclude || c.send(msg.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn notification(text: &str) -> ServerMessage {
        ServerMessage::Notification {
            text: text.to_string(),
        }
    }

    fn connect(
        registry: &SessionRegistry,
        game_id: GameId,
        token: &str,
    ) -> UnboundedReceiver<ServerMessage> {
        let (tx, rx) = unbounded_channel();
        registry.add(game_id, Connection::new(token, token, tx));
        rx
    }

    #[test]
    fn broadcast_reaches_every_connection_on_the_game() {
        let registry = SessionRegistry::new();
        let mut a = connect(&registry, 1, "a");
        let mut b = connect(&registry, 1, "b");
        let mut other = connect(&registry, 2, "c");

        registry.broadcast(1, None, &notification("hello"));

        assert_eq!(a.try_recv().ok(), Some(notification("hello")));
        assert_eq!(b.try_recv().ok(), Some(notification("hello")));
        assert_eq!(other.try_recv().ok(), None);
    }

    #[test]
    fn broadcast_skips_the_excluded_token() {
        let registry = SessionRegistry::new();
        let mut a = connect(&registry, 1, "a");
        let mut b = connect(&registry, 1, "b");

        registry.broadcast(1, Some("a"), &notification("hello"));

        assert_eq!(a.try_recv().ok(), None);
        assert_eq!(b.try_recv().ok(), Some(notification("hello")));
    }

    #[test]
    fn a_dead_connection_does_not_stop_delivery_to_the_rest() {
        let registry = SessionRegistry::new();
        let a = connect(&registry, 1, "a");
        let mut b = connect(&registry, 1, "b");

        drop(a);
        registry.broadcast(1, None, &notification("hello"));

        assert_eq!(b.try_recv().ok(), Some(notification("hello")));
        assert_eq!(registry.count(1), 1);
    }

    #[test]
    fn adding_the_same_token_twice_replaces_the_connection() {
        let registry = SessionRegistry::new();
        let mut stale = connect(&registry, 1, "a");
        let mut fresh = connect(&registry, 1, "a");

        registry.broadcast(1, None, &notification("hello"));

        assert_eq!(stale.try_recv().ok(), None);
        assert_eq!(fresh.try_recv().ok(), Some(notification("hello")));
        assert_eq!(registry.count(1), 1);
    }

    #[test]
    fn removed_connections_no_longer_receive_broadcasts() {
        let registry = SessionRegistry::new();
        let mut a = connect(&registry, 1, "a");
        let mut b = connect(&registry, 1, "b");

        registry.remove(1, "a");
        registry.broadcast(1, None, &notification("hello"));

        assert_eq!(a.try_recv().ok(), None);
        assert_eq!(b.try_recv().ok(), Some(notification("hello")));
    }

    #[test]
    fn remove_token_deregisters_from_every_game() {
        let registry = SessionRegistry::new();
        let _a1 = connect(&registry, 1, "a");
        let _a2 = connect(&registry, 2, "a");
        let _b = connect(&registry, 1, "b");

        registry.remove_token("a");

        assert_eq!(registry.count(1), 1);
        assert_eq!(registry.count(2), 0);
    }
}
