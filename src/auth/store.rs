//! Token stores
//!
//! Keep bearer tokens between runs so that a traversal does not have to
//! negotiate new credentials every time it starts.

use super::types::CachedToken;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Storage for a single cached token
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the cached token, if any
    async fn get(&self) -> Result<Option<CachedToken>>;

    /// Replace the cached token
    async fn put(&self, token: CachedToken) -> Result<()>;
}

/// Token store that lives for the lifetime of the process
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: RwLock<Option<CachedToken>>,
}

impl InMemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self) -> Result<Option<CachedToken>> {
        Ok(self.token.read().await.clone())
    }

    async fn put(&self, token: CachedToken) -> Result<()> {
        *self.token.write().await = Some(token);
        Ok(())
    }
}

/// Token store persisted as pretty-printed JSON on disk
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by the given file
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> Result<Option<CachedToken>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::token_store(format!("Failed to read token file: {e}")))?;

        let token = serde_json::from_str(&contents)
            .map_err(|e| Error::token_store(format!("Failed to parse token file: {e}")))?;

        Ok(Some(token))
    }

    async fn put(&self, token: CachedToken) -> Result<()> {
        let contents = serde_json::to_string_pretty(&token)
            .map_err(|e| Error::token_store(format!("Failed to serialize token: {e}")))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::token_store(format!("Failed to write token file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::token_store(format!("Failed to rename token file: {e}")))?;

        Ok(())
    }
}
