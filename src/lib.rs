//! # NeoNest - baby-care tracking client core
//!
//! The reusable UI-state and client layer of the NeoNest baby-care
//! application: parents log sleep schedules, browse resources and FAQs,
//! and chat with an AI assistant.
//!
//! ## Overview
//!
//! NeoNest can be used in two ways:
//!
//! 1. **As a command-line client** - Run the `neonest` binary
//! 2. **As a library** - Drive the forms, filters and resources from your own UI
//!
//! ### Validating a form
//!
//! ```rust,ignore
//! use neonest::forms::auth::{login_form, login_request};
//! use neonest::i18n::Translator;
//!
//! let t = Translator::default();
//! let mut form = login_form(&t);
//! form.set_value("email", "parent@example.com")?;
//! form.set_value("password", "secret1")?;
//! let request = form.submit(login_request)?;
//! ```
//!
//! ### Keeping a remote collection in sync
//!
//! ```rust,ignore
//! use neonest::api::{ApiClient, RemoteResource};
//! use neonest::sleep::{SleepEntry, SLEEP_PATH};
//!
//! let client = ApiClient::new("http://localhost:3000")?.with_token(token);
//! let sleep: RemoteResource<SleepEntry> = RemoteResource::http(client, SLEEP_PATH);
//! sleep.list().await?;
//! ```
//!
//! ## Modules
//!
//! - [`forms`] - Field validators and form state
//! - [`filter`] - Search and category filtering of lists
//! - [`api`] - HTTP client and remote resources with a local mirror
//! - [`i18n`] - Translation lookup
//! - [`sleep`] - Sleep log records, forms and views
//! - [`content`] - Resource articles and FAQs
//! - [`chat`] - AI assistant chat history and auto tasks
//! - [`types`] - Common types and error handling

#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP client and remote resources.
pub mod api;
/// AI assistant chat.
pub mod chat;
/// Command-line front end.
pub mod cli;
/// Resource articles and FAQ entries.
pub mod content;
/// List filtering.
pub mod filter;
/// Form validation and form state.
pub mod forms;
/// Translation lookup.
pub mod i18n;
/// Sleep log.
pub mod sleep;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration and session utilities.
pub mod utils;

// Re-export commonly used types
pub use api::{ApiClient, RemoteResource};
pub use chat::ChatHistory;
pub use filter::{filter, FilterCriteria, Filterable};
pub use forms::{FieldSpec, FormState, ValidationMode};
pub use i18n::{TextContent, Translator};
pub use types::{AppError, ErrorKind, Result};
pub use utils::toml_config::{ConfigManager, NeonestConfig};

use std::path::PathBuf;
use std::sync::Arc;

use crate::sleep::{SleepEntry, SLEEP_PATH};
use crate::utils::{ChatLog, Session};

/// Everything a screen needs, built once per session
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration, reloadable from disk
    pub config_manager: Arc<ConfigManager>,
    /// Translator for the active language
    pub translator: Arc<Translator>,
    /// Backend client carrying the session token
    pub client: ApiClient,
    /// Where the session token is stored
    pub session_file: PathBuf,
    /// Stored chat conversations
    pub chat_log: ChatLog,
}

impl AppState {
    /// Build from a loaded config.
    ///
    /// The token comes from the session file, else from the environment
    /// variable named by `api.token_env`. `locale` overrides the configured
    /// language.
    pub fn new(config_manager: ConfigManager, locale: Option<&str>) -> Result<Self> {
        let config = config_manager.config();

        let mut translator = Translator::load_dir(
            &config.i18n.locales_dir,
            &config.i18n.locale,
            &config.i18n.fallback_locale,
        )?;
        if let Some(locale) = locale {
            translator.set_locale(locale)?;
        }

        let session_file = config.session.file.clone();
        let token = Session::load(&session_file)?.token.or_else(|| config.token());
        let mut client = ApiClient::from_config(&config.api)?;
        client.set_token(token);

        Ok(Self {
            config_manager: Arc::new(config_manager),
            translator: Arc::new(translator),
            client,
            session_file,
            chat_log: ChatLog::new(&config.session.chat_file),
        })
    }

    pub fn config(&self) -> Arc<NeonestConfig> {
        self.config_manager.config()
    }

    /// The sleep log collection for the current session
    pub fn sleep_log(&self) -> RemoteResource<SleepEntry> {
        RemoteResource::http(self.client.clone(), SLEEP_PATH)
    }
}
