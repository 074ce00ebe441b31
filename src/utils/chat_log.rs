//! Chat conversations kept on disk between CLI runs
//!
//! One JSON document maps each persona to its messages. Like the session
//! file, a missing log means nothing has been said yet.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::chat::{ChatMessage, ChatRole, HistoryStore};
use crate::types::{AppError, Result};

type Conversations = HashMap<ChatRole, Vec<ChatMessage>>;

#[derive(Debug, Clone)]
pub struct ChatLog {
    path: PathBuf,
}

impl ChatLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Conversations> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(Conversations::new());
        }
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::Config(format!("Failed to read chat log {:?}: {}", self.path, e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Logout forgets every conversation.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| {
                AppError::Config(format!("Failed to remove chat log {:?}: {}", self.path, e))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for ChatLog {
    async fn fetch(&self, role: ChatRole) -> Result<Vec<ChatMessage>> {
        Ok(self.read_all().await?.remove(&role).unwrap_or_default())
    }

    async fn save(&self, role: ChatRole, messages: &[ChatMessage]) -> Result<()> {
        let mut all = self.read_all().await?;
        all.insert(role, messages.to_vec());
        let content = serde_json::to_string_pretty(&all)?;
        tokio::fs::write(&self.path, content).await.map_err(|e| {
            AppError::Config(format!("Failed to write chat log {:?}: {}", self.path, e))
        })?;
        debug!(%role, messages = messages.len(), "Chat log saved to {:?}", self.path);
        Ok(())
    }
}
