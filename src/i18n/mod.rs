//! Translation lookup
//!
//! Every user-facing string goes through [`Translator::t`]. Tables are plain
//! JSON documents, one per language, laid out as
//! `<locales_dir>/<lang>/common.json`. A key is a dotted path into the table
//! (`"login.errorEmptyEmail"`).
//!
//! Keys do not always resolve to a string: list-shaped content (FAQ answers,
//! resource articles) resolves to arrays or objects. [`Translator::content`]
//! returns a [`TextContent`] so callers branch on the shape explicitly.
//!
//! Lookup order is the active locale, then the fallback locale. A key found
//! in neither resolves to the key itself.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{AppError, Result};

/// Languages the application ships tables for
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "hi", "ta", "te", "kn", "ml", "bn", "mr", "gu"];

/// Fallback when detection fails or a key is missing
pub const DEFAULT_LANGUAGE: &str = "en";

/// Single namespace used by every screen
pub const DEFAULT_NAMESPACE: &str = "common";

/// Shape of a resolved translation entry
#[derive(Debug, Clone, PartialEq)]
pub enum TextContent {
    Plain(String),
    List(Vec<String>),
    /// Objects, or lists containing non-string entries
    Structured(Value),
}

impl TextContent {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => TextContent::Plain(s.clone()),
            Value::Array(items) if items.iter().all(Value::is_string) => TextContent::List(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            ),
            Value::Number(n) => TextContent::Plain(n.to_string()),
            Value::Bool(b) => TextContent::Plain(b.to_string()),
            other => TextContent::Structured(other.clone()),
        }
    }

    pub fn as_plain(&self) -> Option<&str> {
        match self {
            TextContent::Plain(s) => Some(s),
            _ => None,
        }
    }

    /// Items of a list; a plain string counts as a one-item list.
    pub fn into_list(self) -> Vec<String> {
        match self {
            TextContent::Plain(s) => vec![s],
            TextContent::List(items) => items,
            TextContent::Structured(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Translator {
    locale: String,
    fallback: String,
    tables: HashMap<String, Value>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl Translator {
    /// An empty translator: every key resolves to itself until tables are added.
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            fallback: DEFAULT_LANGUAGE.to_string(),
            tables: HashMap::new(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn with_table(mut self, lang: impl Into<String>, table: Value) -> Self {
        self.add_table(lang, table);
        self
    }

    pub fn add_table(&mut self, lang: impl Into<String>, table: Value) {
        self.tables.insert(lang.into(), table);
    }

    /// Load `<dir>/<lang>/common.json` for every supported language present.
    ///
    /// Missing languages are skipped; an unreadable or malformed table is an error.
    pub fn load_dir(dir: &Path, locale: &str, fallback: &str) -> Result<Self> {
        let mut translator = Self::new(locale).with_fallback(fallback);

        for lang in SUPPORTED_LANGUAGES {
            let path = dir.join(lang).join(format!("{}.json", DEFAULT_NAMESPACE));
            if !path.exists() {
                continue;
            }
            let raw = fs::read_to_string(&path).map_err(|e| {
                AppError::Config(format!("Failed to read locale table {:?}: {}", path, e))
            })?;
            let table: Value = serde_json::from_str(&raw).map_err(|e| {
                AppError::Config(format!("Malformed locale table {:?}: {}", path, e))
            })?;
            debug!(lang, "Loaded locale table");
            translator.add_table(*lang, table);
        }

        if !translator.tables.contains_key(fallback) {
            warn!(fallback, dir = ?dir, "No table for fallback locale; keys will resolve to themselves");
        }

        Ok(translator)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Switch the active language. Only supported languages are accepted.
    pub fn set_locale(&mut self, locale: &str) -> Result<()> {
        if !SUPPORTED_LANGUAGES.contains(&locale) {
            return Err(AppError::InvalidInput(format!(
                "Unsupported language '{}' (supported: {})",
                locale,
                SUPPORTED_LANGUAGES.join(", ")
            )));
        }
        self.locale = locale.to_string();
        Ok(())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Resolve a key to its raw shape, without interpolation.
    pub fn content(&self, key: &str) -> Option<TextContent> {
        self.lookup(key).map(TextContent::from_value)
    }

    /// Resolve a key to a display string.
    ///
    /// `{{name}}` placeholders are replaced from `params`. A `count` param
    /// selects `<key>_one` / `<key>_other` when those exist. List content is
    /// joined with newlines; structured content and missing keys yield the key.
    pub fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        let resolved = self
            .plural_key(key, params)
            .and_then(|plural| self.content(&plural))
            .or_else(|| self.content(key));

        let text = match resolved {
            Some(TextContent::Plain(s)) => s,
            Some(TextContent::List(items)) => items.join("\n"),
            Some(TextContent::Structured(_)) | None => key.to_string(),
        };

        interpolate(&text, params)
    }

    /// Decode list-shaped content into typed records.
    ///
    /// A key that is missing or not an array yields an empty list.
    pub fn objects<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.lookup(key) {
            Some(value) if value.is_array() => Ok(serde_json::from_value(value.clone())?),
            _ => Ok(Vec::new()),
        }
    }

    /// Decode any content into a typed value, if the key exists.
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.lookup(key)
            .map(|value| serde_json::from_value(value.clone()).map_err(AppError::from))
            .transpose()
    }

    fn plural_key(&self, key: &str, params: &[(&str, &str)]) -> Option<String> {
        let count = params.iter().find(|(name, _)| *name == "count")?.1;
        let suffix = if count.trim() == "1" { "one" } else { "other" };
        Some(format!("{}_{}", key, suffix))
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        [self.locale.as_str(), self.fallback.as_str()]
            .into_iter()
            .filter_map(|lang| self.tables.get(lang))
            .find_map(|table| walk(table, key))
    }
}

fn walk<'a>(table: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(table, |node, part| node.get(part))
}

fn interpolate(text: &str, params: &[(&str, &str)]) -> String {
    let mut out = text.to_string();
    for (name, value) in params {
        out = out
            .replace(&format!("{{{{{}}}}}", name), value)
            .replace(&format!("{{{{ {} }}}}", name), value);
    }
    out
}
