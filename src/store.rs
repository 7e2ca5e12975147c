//! Token persistence for the WeChat Open Platform SDK.
//!
//! The component access token must be shared across every process that talks
//! to the API for the same component, so persistence is delegated to a
//! caller-supplied [`TokenStore`] (file, database, Redis...). The store is the
//! single source of truth for "is there a cached token"; the core never
//! second-guesses it and never tracks expiry locally.
//!
//! The default [`MemoryTokenStore`] is a single in-process slot and is unsafe
//! for cluster or multi-machine deployments.

use crate::auth::ComponentAccessToken;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

/// Persistence hooks for the component access token.
///
/// Implementations may talk to any backend. Failures surface to the caller as
/// [`WeChatError::Store`](crate::error::WeChatError::Store) without
/// modification; the core has no way to recover storage failures. The only
/// consistency expected is "last save wins, load returns the latest save".
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Loads the current token, or `None` if nothing has been saved yet.
    async fn load(&self) -> Result<Option<ComponentAccessToken>>;

    /// Saves a freshly acquired token, replacing any previous value.
    async fn save(&self, token: &ComponentAccessToken) -> Result<()>;
}

/// Default single-slot in-memory store.
///
/// Suitable for single-process use only. When the same component identity is
/// served by multiple processes or machines, supply a shared [`TokenStore`]
/// instead, otherwise each process mints its own token and they invalidate
/// each other.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<ComponentAccessToken>>,
}

impl MemoryTokenStore {
    /// Creates an empty in-memory store, logging an advisory warning about
    /// its single-process limitation.
    pub fn new() -> Self {
        warn!("in-memory token store is unsafe for cluster or multi-machine deployments");
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<ComponentAccessToken>> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, token: &ComponentAccessToken) -> Result<()> {
        *self.slot.write().await = Some(token.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeChatError;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().await.unwrap().is_none());

        let token = ComponentAccessToken {
            component_access_token: "TOKEN_A".to_string(),
            expires_in: 7200,
        };
        store.save(&token).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.component_access_token, "TOKEN_A");
        assert_eq!(loaded.expires_in, 7200);
    }

    #[tokio::test]
    async fn test_memory_store_last_save_wins() {
        let store = MemoryTokenStore::new();

        let first = ComponentAccessToken {
            component_access_token: "TOKEN_A".to_string(),
            expires_in: 7200,
        };
        let second = ComponentAccessToken {
            component_access_token: "TOKEN_B".to_string(),
            expires_in: 7200,
        };

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.component_access_token, "TOKEN_B");
    }

    /// File-backed store exercising a caller-supplied implementation, the way
    /// multi-process deployments would persist the token.
    struct FileTokenStore {
        path: PathBuf,
    }

    #[async_trait]
    impl TokenStore for FileTokenStore {
        async fn load(&self) -> Result<Option<ComponentAccessToken>> {
            match std::fs::read_to_string(&self.path) {
                Ok(text) => {
                    let token = serde_json::from_str(&text).map_err(WeChatError::store_error)?;
                    Ok(Some(token))
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(WeChatError::store_error(e)),
            }
        }

        async fn save(&self, token: &ComponentAccessToken) -> Result<()> {
            let text = serde_json::to_string(token).map_err(WeChatError::store_error)?;
            std::fs::write(&self.path, text).map_err(WeChatError::store_error)
        }
    }

    #[tokio::test]
    async fn test_custom_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore {
            path: dir.path().join("component_access_token.json"),
        };

        // Missing file reads as "no token", not an error
        assert!(store.load().await.unwrap().is_none());

        let token = ComponentAccessToken {
            component_access_token: "PERSISTED".to_string(),
            expires_in: 7200,
        };
        store.save(&token).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.component_access_token, "PERSISTED");
    }

    #[tokio::test]
    async fn test_file_store_surfaces_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("component_access_token.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore { path };
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, WeChatError::Store(_)));
    }
}
