use anyhow::Error as Anyhow;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{routing::any, Router};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use lib::server::{Command, GameSessionHandler, MemoryAuth, MemoryStorage};
use lib::server::{ServerMessage, SessionRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{error, info, instrument, warn};

fn parse_session(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(t, u)| (t.to_string(), u.to_string()))
        .ok_or_else(|| format!("expected `token=username`, got `{s}`"))
}

/// A live chess server over WebSockets.
#[derive(Debug, Parser)]
pub struct Serve {
    /// The address to listen on.
    #[clap(short, long, default_value = "127.0.0.1:8080")]
    address: SocketAddr,

    /// A pre-authorized session, as a `token=username` pair.
    #[clap(short, long = "session", value_parser = parse_session)]
    sessions: Vec<(String, String)>,

    /// The name of a game to create at startup.
    #[clap(short, long = "game")]
    games: Vec<String>,
}

impl Serve {
    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self) -> Result<(), Anyhow> {
        let auth = Arc::new(MemoryAuth::new());
        for (token, username) in &self.sessions {
            auth.insert(token, username).await;
        }

        let storage = Arc::new(MemoryStorage::new());
        for name in &self.games {
            let id = storage.create(name).await;
            info!(id, name, "created game");
        }

        let registry = Arc::new(SessionRegistry::new());
        let handler = Arc::new(GameSessionHandler::new(auth, storage, registry.clone()));

        let app = Router::new()
            .route("/ws", any(upgrade))
            .with_state((handler, registry));

        let listener = TcpListener::bind(self.address).await?;
        info!(address = %self.address, "listening");
        axum::serve(listener, app).await?;

        Ok(())
    }
}

type AppState = (Arc<GameSessionHandler>, Arc<SessionRegistry>);

async fn upgrade(State((handler, registry)): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| session(socket, handler, registry))
}

/// Serves one client connection until its socket closes.
///
/// Outbound messages are drained from an unbounded channel by a dedicated
/// writer task, so that a slow socket never blocks a broadcast.
async fn session(socket: WebSocket, handler: Arc<GameSessionHandler>, registry: Arc<SessionRegistry>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = unbounded_channel::<ServerMessage>();

    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("failed to encode message: {e}");
                    continue;
                }
            };

            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // the last token seen, so a connection abandoned without a LEAVE can
    // still be deregistered when the transport closes
    let mut token = None;
    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<Command>(&text) {
                Ok(cmd) => {
                    token = Some(cmd.token().to_string());
                    handler.handle(cmd, &tx).await;
                }

                Err(e) => {
                    warn!("discarding malformed command: {e}");

                    let unsupported = ServerMessage::Error {
                        text: "unsupported command".to_string(),
                    };

                    if tx.send(unsupported).is_err() {
                        break;
                    }
                }
            },

            Message::Close(_) => break,
            _ => {}
        }
    }

    if let Some(token) = token {
        registry.remove_token(&token);
    }

    drop(tx);

    if let Err(e) = writer.await {
        error!("writer task failed: {e}");
    }
}
