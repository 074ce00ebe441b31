//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the NeoNest CLI.

use owo_colors::OwoColorize;

use crate::chat::{ChatMessage, MessageRole};
use crate::content::{Article, FaqSection};
use crate::sleep::SleepEntry;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the NeoNest banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "NeoNest".bright_magenta().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed(),
                "Baby-care tracking from the terminal".bright_white(),
            );
        } else {
            println!(
                "\n   NeoNest v{}\n   Baby-care tracking from the terminal\n",
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Inline error under a form field
    pub fn field_error(&self, field: &str, message: &str) {
        if self.colored {
            eprintln!("    {} {}", format!("{}:", field).red().bold(), message.red());
        } else {
            eprintln!("    [{}] {}", field, message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    /// Print a file skipped message
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a subheader
    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.magenta().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// One sleep log line: time, type, duration, mood, notes
    pub fn sleep_entry(&self, entry: &SleepEntry, show_date: bool) {
        let when = if show_date {
            format!("{} {}", entry.day(), entry.time)
        } else {
            entry.time.clone()
        };
        let mood = entry.mood.map(|m| m.emoji()).unwrap_or(" ");

        if self.colored {
            println!(
                "    {} {:<16} {:<6} {:<12} {} {}",
                mood,
                when.bright_white(),
                entry.kind.as_str().magenta(),
                entry.duration,
                entry.notes.dimmed(),
                format!("[{}]", entry.id).dimmed()
            );
        } else {
            println!(
                "    {} {:<16} {:<6} {:<12} {} [{}]",
                mood,
                when,
                entry.kind.as_str(),
                entry.duration,
                entry.notes,
                entry.id
            );
        }
    }

    pub fn article(&self, article: &Article) {
        let meta = [
            article.category.as_deref(),
            article.kind.as_deref(),
            article.read_time.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" · ");

        if self.colored {
            println!("    {} {}", "•".magenta(), article.title.bright_white().bold());
            println!("      {}", meta.dimmed());
        } else {
            println!("    - {}", article.title);
            println!("      {}", meta);
        }
        if let Some(description) = &article.description {
            println!("      {}", description);
        }
    }

    pub fn faq_section(&self, section: &FaqSection) {
        self.subheader(&section.title);
        for entry in &section.entries {
            if self.colored {
                println!("    {} {}", "Q".magenta().bold(), entry.q.bright_white());
            } else {
                println!("    Q: {}", entry.q);
            }
            println!("      {}", entry.a);
        }
    }

    pub fn chat_message(&self, message: &ChatMessage) {
        let time = message.created_at.format("%H:%M").to_string();
        let (who, colored_who) = match message.role {
            MessageRole::User => ("you", "you".bright_white().bold().to_string()),
            MessageRole::Assistant => ("ai", "ai".magenta().bold().to_string()),
            MessageRole::System => ("system", "system".yellow().bold().to_string()),
        };

        if self.colored {
            println!("    {} {} {}", time.dimmed(), colored_who, message.content);
        } else {
            println!("    {} {}: {}", time, who, message.content);
        }
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sleep::{Mood, SleepType};

    fn entry() -> SleepEntry {
        SleepEntry {
            id: "66a1".to_string(),
            date: "2025-03-01".to_string(),
            time: "13:30".to_string(),
            kind: SleepType::Nap,
            duration: "45 mins".to_string(),
            mood: Some(Mood::Happy),
            notes: "slept in the car".to_string(),
            baby_name: "YourBaby".to_string(),
        }
    }

    #[test]
    fn test_output_new() {
        assert!(Output::new().colored);
        assert!(!Output::no_color().colored);
        assert!(Output::default().colored);
    }

    #[test]
    fn test_output_methods_no_panic() {
        for output in [Output::no_color(), Output::new()] {
            output.banner();
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.error("test error");
            output.field_error("email", "Please enter your email");
            output.created("file", "neonest.toml");
            output.skipped("locales/en", "already exists");
            output.header("Test Header");
            output.subheader("Test Subheader");
            output.kv("key", "value");
            output.hint("hint message");
            output.command("neonest sleep today");
            output.newline();
        }
    }

    #[test]
    fn test_domain_renderers_no_panic() {
        let article = Article {
            id: None,
            title: "Newborn Sleep Patterns".to_string(),
            description: None,
            category: Some("sleep".to_string()),
            kind: None,
            tags: None,
            author: None,
            read_time: Some("5 min read".to_string()),
            publish_date: None,
            url: None,
            thumbnail: None,
        };

        for output in [Output::no_color(), Output::new()] {
            output.sleep_entry(&entry(), true);
            output.sleep_entry(&entry(), false);
            output.article(&article);
            output.chat_message(&ChatMessage::system("Oops"));
        }
    }
}
