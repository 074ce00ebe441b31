//! CLI module for NeoNest
//!
//! Provides command-line interface parsing and handling for the neonest binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod commands;
pub mod init;
pub mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// NeoNest - baby-care tracking from the terminal
///
/// Log sleep, browse parenting resources and FAQs, and ask the AI assistant,
/// against a NeoNest backend.
#[derive(Parser, Debug)]
#[command(
    name = "neonest",
    version,
    about = "NeoNest - baby-care tracking from the terminal",
    long_about = "Log sleep schedules, browse parenting resources and FAQs, and chat with the\n\
                  NeoNest AI assistant. Use 'init' to scaffold a config and English locale table.",
    after_help = "EXAMPLES:\n    \
                  neonest init                          # Scaffold neonest.toml and locales/\n    \
                  neonest login -e me@example.com       # Log in and remember the token\n    \
                  neonest sleep add --time 13:00 --duration '1 hr' --mood happy\n    \
                  neonest resources --search sleep      # Search the resource library\n    \
                  neonest chat --role mother 'Is this normal?'"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "neonest.toml", global = true)]
    pub config: PathBuf,

    /// Override the display language (en, hi, ta, te, kn, ml, bn, mr, gu)
    #[arg(short = 'L', long, global = true)]
    pub lang: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create neonest.toml and the English locale table
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Backend base URL written into the config
        #[arg(long, default_value = "http://localhost:3000")]
        base_url: String,
    },

    /// Show configuration information
    Config {
        /// Print the effective configuration as TOML
        #[arg(short = 'f', long)]
        full: bool,

        /// Only validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "NEONEST_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and store the session token
    Signup {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "NEONEST_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session token
    Logout,

    /// Manage sleep log entries
    #[command(subcommand)]
    Sleep(SleepCommands),

    /// Search and filter parenting resources
    Resources {
        #[command(flatten)]
        filter: FilterArgs,

        /// Resource format: article, video, audio, podcast, journal or all
        #[arg(short = 't', long = "type", default_value = "all")]
        kind: String,
    },

    /// Search and filter frequently asked questions
    Faq {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Send one message to the AI assistant
    Chat {
        /// Message text, or a quick question key with --quick
        message: String,

        /// Persona: pediatrician, baby or mother
        #[arg(short, long, default_value = "pediatrician")]
        role: String,

        /// Treat MESSAGE as a quick question key
        #[arg(short, long)]
        quick: bool,

        /// Start this persona's conversation over
        #[arg(long)]
        new: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Case-insensitive search term
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Category: feeding, sleep, development, health or all
    #[arg(short = 'C', long, default_value = "all")]
    pub category: String,
}

/// Sleep log subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SleepCommands {
    /// List every entry, optionally filtered
    List {
        #[arg(short, long, default_value = "")]
        search: String,

        /// nap, night or all
        #[arg(short = 't', long = "type", default_value = "all")]
        kind: String,

        /// happy, sleepy, cranky, playful or all
        #[arg(short, long, default_value = "all")]
        mood: String,
    },

    /// Show today's entries and earlier ones
    Today,

    /// Add an entry for today
    Add {
        #[command(flatten)]
        entry: EntryArgs,
    },

    /// Change fields of an existing entry
    Update {
        id: String,

        #[command(flatten)]
        entry: EntryArgs,
    },

    /// Delete an entry
    Delete { id: String },
}

/// Entry fields; omitted flags keep their current (or default) value
#[derive(Args, Debug, Clone, Default)]
pub struct EntryArgs {
    /// Start time, HH:MM
    #[arg(long)]
    pub time: Option<String>,

    /// Free-form duration, e.g. "1 hr 20 mins"
    #[arg(short, long)]
    pub duration: Option<String>,

    /// nap or night
    #[arg(short = 't', long = "type")]
    pub kind: Option<String>,

    /// happy, sleepy, cranky or playful; empty clears it
    #[arg(short, long)]
    pub mood: Option<String>,

    #[arg(short, long)]
    pub notes: Option<String>,
}

impl EntryArgs {
    /// Field name and value pairs for the flags that were given
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("time", &self.time),
            ("duration", &self.duration),
            ("type", &self.kind),
            ("mood", &self.mood),
            ("notes", &self.notes),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
