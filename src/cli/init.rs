//! Init command implementation
//!
//! Scaffolds `neonest.toml`, `.env.example` and the English locale table.

use super::output::Output;
use crate::utils::toml_config::{NeonestConfig, CONFIG_FILE};
use std::fs;
use std::path::{Path, PathBuf};

/// English table shipped with the crate
pub const ENGLISH_TABLE: &str = include_str!("../../locales/en/common.json");

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (neonest.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Backend base URL
    pub base_url: String,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing NeoNest");

    let base_path = &config.path;

    let config_path = base_path.join(CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let toml_content = match generate_neonest_toml(&config) {
        Ok(content) => content,
        Err(e) => {
            output.error(&e);
            return InitResult::Error(e);
        }
    };

    let locale_dir = base_path.join("locales").join("en");
    if let Err(e) = fs::create_dir_all(&locale_dir) {
        output.error(&format!("Failed to create locales/en: {}", e));
        return InitResult::Error(e.to_string());
    }

    let files = [
        (config_path, "config", CONFIG_FILE, toml_content.as_str()),
        (
            base_path.join(".env.example"),
            "env",
            ".env.example",
            ENV_EXAMPLE,
        ),
        (
            locale_dir.join("common.json"),
            "locale",
            "locales/en/common.json",
            ENGLISH_TABLE,
        ),
    ];

    for (path, file_type, label, content) in &files {
        match write_file(path, content, config.force) {
            Ok(true) => output.created(file_type, label),
            Ok(false) => output.skipped(label, "already exists"),
            Err(e) => {
                output.error(&format!("Failed to create {}: {}", label, e));
                return InitResult::Error(e.to_string());
            }
        }
    }

    output.success("NeoNest initialized");
    output.header("Next Steps");
    output.info("Log in to store a session token:");
    output.command("neonest login -e you@example.com");
    output.info("Then log today's sleep:");
    output.command("neonest sleep add --time 13:00 --duration '1 hr'");
    output.hint(&format!("Backend: {}", config.base_url));

    InitResult::Success
}

/// Write unless the file exists and `force` is off; true when written.
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn generate_neonest_toml(config: &InitConfig) -> Result<String, String> {
    let mut neonest = NeonestConfig::default();
    neonest.api.base_url = config.base_url.trim_end_matches('/').to_string();
    neonest.validate().map_err(|e| e.to_string())?;

    let body = neonest.to_toml().map_err(|e| e.to_string())?;
    Ok(format!(
        "# NeoNest client configuration\n# The auth token is read from the variable named by api.token_env.\n\n{}",
        body
    ))
}

const ENV_EXAMPLE: &str = "# Session token; `neonest login` stores one in .neonest-session instead\n\
NEONEST_TOKEN=\n\
# Used by login/signup when --password is omitted\n\
NEONEST_PASSWORD=\n\
RUST_LOG=info\n";
