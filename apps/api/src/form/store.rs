//! Form State Store: persists the single in-progress form draft under one key.
//!
//! `AppState` holds an `Arc<dyn FormStore>`: `RedisFormStore` when `REDIS_URL` is set,
//! `MemoryFormStore` otherwise. The draft is stored as the JSON object the form uses
//! (camelCase field ids), so a draft written by one backend reads back in the other.

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::form::models::FormInput;

/// Key under which the draft is persisted.
pub const FORM_STATE_KEY: &str = "interviewFormData";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait FormStore: Send + Sync {
    /// Returns the saved draft, or `None` when nothing usable is stored.
    /// Corrupt stored data is logged and treated as absent.
    async fn load(&self) -> Result<Option<FormInput>, StoreError>;

    /// Overwrites the saved draft.
    async fn save(&self, input: &FormInput) -> Result<(), StoreError>;

    /// Removes the saved draft. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Parses a stored draft, dropping it if it no longer deserializes.
fn decode_draft(raw: &str) -> Option<FormInput> {
    match serde_json::from_str::<FormInput>(raw) {
        Ok(input) => Some(input),
        Err(e) => {
            warn!("Ignoring unreadable form draft: {e}");
            None
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Redis backend
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisFormStore {
    client: redis::Client,
}

impl RedisFormStore {
    pub fn open(url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: redis::Client::open(url)?,
        })
    }
}

#[async_trait]
impl FormStore for RedisFormStore {
    async fn load(&self) -> Result<Option<FormInput>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(FORM_STATE_KEY).await?;
        debug!(found = raw.is_some(), "Loaded form draft from redis");
        Ok(raw.as_deref().and_then(decode_draft))
    }

    async fn save(&self, input: &FormInput) -> Result<(), StoreError> {
        let raw = serde_json::to_string(input)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(FORM_STATE_KEY, raw).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(FORM_STATE_KEY).await?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-process backend
// ────────────────────────────────────────────────────────────────────────────

/// Keeps the serialized draft in memory. Used when no Redis URL is configured, and in tests.
#[derive(Default)]
pub struct MemoryFormStore {
    slot: RwLock<Option<String>>,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn put_raw(&self, raw: &str) {
        *self.slot.write().await = Some(raw.to_string());
    }
}

#[async_trait]
impl FormStore for MemoryFormStore {
    async fn load(&self) -> Result<Option<FormInput>, StoreError> {
        Ok(self.slot.read().await.as_deref().and_then(decode_draft))
    }

    async fn save(&self, input: &FormInput) -> Result<(), StoreError> {
        let raw = serde_json::to_string(input)?;
        *self.slot.write().await = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write().await = None;
        Ok(())
    }
}
