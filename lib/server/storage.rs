use crate::server::{GameId, GameRecord};
use async_trait::async_trait;
use derive_more::{Display, Error};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// The reason why a storage operation failed.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum StorageError {
    /// No game with the requested id exists.
    #[display("game not found")]
    NotFound,
    /// The record being stored no longer has a counterpart in storage.
    #[display("conflicting game update")]
    Conflict,
}

/// Loads and stores [`GameRecord`]s by id.
///
/// Creating and listing games is the concern of an outer CRUD surface; the
/// session layer only reads a record, mutates it, and writes it back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// The record with the given id, or [`StorageError::NotFound`].
    async fn load(&self, id: GameId) -> Result<GameRecord, StorageError>;

    /// Replaces the stored record with the same id, or
    /// [`StorageError::Conflict`] if that id no longer exists.
    async fn store(&self, record: GameRecord) -> Result<(), StorageError>;
}

/// An in-memory game table.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    games: RwLock<HashMap<GameId, GameRecord>>,
    next_id: RwLock<GameId>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    /// Creates a fresh game and returns its id.
    pub async fn create(&self, name: &str) -> GameId {
        let mut next_id = self.next_id.write().await;
        *next_id += 1;

        let id = *next_id;
        self.games.write().await.insert(id, GameRecord::new(id, name));
        id
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load(&self, id: GameId) -> Result<GameRecord, StorageError> {
        self.games
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn store(&self, record: GameRecord) -> Result<(), StorageError> {
        match self.games.write().await.get_mut(&record.id) {
            Some(stored) => {
                *stored = record;
                Ok(())
            }
            None => Err(StorageError::Conflict),
        }
    }
}
