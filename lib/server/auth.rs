use async_trait::async_trait;
use derive_more::{Display, Error};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// The reason why a session token could not be resolved.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
#[display("invalid session token")]
pub struct InvalidToken;

/// Resolves opaque session tokens to usernames.
///
/// Registration, login, and token issuance live outside this crate; the
/// session layer only ever asks who a token belongs to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Auth: Send + Sync {
    /// The username the token identifies, or [`InvalidToken`].
    async fn resolve(&self, token: &str) -> Result<String, InvalidToken>;
}

/// An in-memory token table.
#[derive(Debug, Default)]
pub struct MemoryAuth {
    tokens: RwLock<HashMap<String, String>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        MemoryAuth::default()
    }

    /// Registers a token for a username.
    pub async fn insert(&self, token: &str, username: &str) {
        self.tokens
            .write()
            .await
            .insert(token.to_string(), username.to_string());
    }

    /// Invalidates a token.
    pub async fn revoke(&self, token: &str) {
        self.tokens.write().await.remove(token);
    }
}

#[async_trait]
impl Auth for MemoryAuth {
    async fn resolve(&self, token: &str) -> Result<String, InvalidToken> {
        self.tokens
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(InvalidToken)
    }
}
