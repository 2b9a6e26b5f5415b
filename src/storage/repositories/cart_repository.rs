use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

use crate::models::cart::Cart;
use crate::storage::LocalStorage;

pub const DEFAULT_CART_KEY: &str = "restaurant-cart";

#[derive(Error, Debug)]
pub enum CartRepositoryError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed cart payload: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable mirror of the cart under a single storage key.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<Cart>, CartRepositoryError>;
    async fn save(&self, cart: &Cart) -> Result<(), CartRepositoryError>;
    async fn remove(&self) -> Result<(), CartRepositoryError>;
}

/// Cart repository backed by [`LocalStorage`].
pub struct LocalStorageCartRepository {
    storage: LocalStorage,
    key: String,
}

impl LocalStorageCartRepository {
    pub fn new(storage: LocalStorage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }
}

#[async_trait]
impl CartRepository for LocalStorageCartRepository {
    async fn load(&self) -> Result<Option<Cart>, CartRepositoryError> {
        let Some(payload) = self.storage.get_item(&self.key).await? else {
            return Ok(None);
        };
        let cart = serde_json::from_str(&payload)?;
        Ok(Some(cart))
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartRepositoryError> {
        let payload = serde_json::to_string(cart)?;
        self.storage.set_item(&self.key, &payload).await?;
        Ok(())
    }

    async fn remove(&self) -> Result<(), CartRepositoryError> {
        self.storage.remove_item(&self.key).await?;
        Ok(())
    }
}

/// Holds the serialized payload in memory; same encoding as the file store.
#[derive(Default)]
pub struct InMemoryCartRepository {
    payload: Mutex<Option<String>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw payload, as if another session had written it.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
        }
    }

    pub fn payload(&self) -> Option<String> {
        self.payload
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn load(&self) -> Result<Option<Cart>, CartRepositoryError> {
        let payload = self
            .payload
            .lock()
            .map_err(|_| CartRepositoryError::Unavailable("lock poisoned".to_string()))?
            .clone();
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartRepositoryError> {
        let payload = serde_json::to_string(cart)?;
        *self
            .payload
            .lock()
            .map_err(|_| CartRepositoryError::Unavailable("lock poisoned".to_string()))? =
            Some(payload);
        Ok(())
    }

    async fn remove(&self) -> Result<(), CartRepositoryError> {
        *self
            .payload
            .lock()
            .map_err(|_| CartRepositoryError::Unavailable("lock poisoned".to_string()))? = None;
        Ok(())
    }
}
