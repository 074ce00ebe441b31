//! Resource articles and FAQ entries
//!
//! Both catalogues ship inside the translation tables (`resources.articles`,
//! `faq.questions`) so they follow the active language.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::{FilterCriteria, Filterable, Selection};
use crate::i18n::Translator;
use crate::types::Result;

/// Topic categories shared by resources and FAQs (besides `all`)
pub const CATEGORIES: &[&str] = &["feeding", "sleep", "development", "health"];

/// Resource formats (besides `all`)
pub const FORMATS: &[&str] = &["article", "video", "audio", "podcast", "journal"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleId::Number(n) => write!(f, "{}", n),
            ArticleId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub id: Option<ArticleId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Format: article, video, audio, podcast or journal
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub read_time: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl Filterable for Article {
    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub q: String,
    pub a: String,
}

impl FaqEntry {
    fn matches(&self, needle: &str) -> bool {
        self.q.to_lowercase().contains(needle) || self.a.to_lowercase().contains(needle)
    }
}

/// One category block of the FAQ page after filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqSection {
    pub category: String,
    pub title: String,
    pub entries: Vec<FaqEntry>,
}

/// Articles for the active language; an absent or non-list key gives none.
pub fn articles(t: &Translator) -> Result<Vec<Article>> {
    t.objects("resources.articles")
}

/// FAQ entries grouped by category id
pub fn faq_questions(t: &Translator) -> Result<HashMap<String, Vec<FaqEntry>>> {
    Ok(t.decode("faq.questions")?.unwrap_or_default())
}

/// `(id, label)` pairs for a category dropdown, `all` first
pub fn category_options(t: &Translator, prefix: &str, ids: &[&str]) -> Vec<(String, String)> {
    std::iter::once(Selection::ALL)
        .chain(ids.iter().copied())
        .map(|id| (id.to_string(), t.t(&format!("{}.{}", prefix, id), &[])))
        .collect()
}

/// Filter the FAQ page.
///
/// A category is kept when it is selected (or the selection is `all`) and,
/// with a search term, at least one of its entries matches on question or
/// answer. Kept sections list only their matching entries.
pub fn filter_faqs(
    t: &Translator,
    questions: &HashMap<String, Vec<FaqEntry>>,
    criteria: &FilterCriteria,
) -> Vec<FaqSection> {
    let needle = criteria.search_term.to_lowercase();

    CATEGORIES
        .iter()
        .filter(|id| criteria.category.admits(Some(**id)))
        .filter_map(|id| {
            let entries: Vec<FaqEntry> = questions
                .get(*id)
                .map(|all| {
                    all.iter()
                        .filter(|entry| needle.is_empty() || entry.matches(&needle))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            if !needle.is_empty() && entries.is_empty() {
                return None;
            }

            Some(FaqSection {
                category: id.to_string(),
                title: t.t(&format!("faq.categories.{}", id), &[]),
                entries,
            })
        })
        .collect()
}
