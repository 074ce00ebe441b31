//! Token persistence between CLI runs
//!
//! The session file is a small JSON document next to the config. It stands
//! in for the browser's stored login.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::types::{AppError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            email: Some(email.into()),
        }
    }

    /// Missing file means logged out.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read session {:?}: {}", path, e)))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| AppError::Config(format!("Failed to write session {:?}: {}", path, e)))?;
        debug!("Session saved to {:?}", path);
        Ok(())
    }

    pub fn clear(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .map_err(|e| AppError::Config(format!("Failed to remove session {:?}: {}", path, e)))?;
        }
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }
}
