pub mod chat_log;
pub mod session;
pub mod toml_config;

pub use chat_log::ChatLog;
pub use session::Session;
pub use toml_config::{ConfigError, ConfigManager, NeonestConfig};
