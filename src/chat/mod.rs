//! AI assistant chat
//!
//! Chat history is an explicit [`ChatHistory`] value owned by the session.
//! Every update returns a new history; nothing is shared behind a global.
//! [`send`] runs one user turn against `POST /api/chat` and always hands
//! back a usable history, with a system message in place of the reply when
//! the call fails.
//!
//! Stored conversations come from a [`HistoryStore`]. [`load_history`] pulls
//! a persona's messages in once; a failed fetch starts it empty.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::i18n::Translator;
use crate::types::{AppError, Result};

pub const CHAT_PATH: &str = "/api/chat";

/// Keys under `neochatbot.` offered as one-tap questions
pub const QUICK_QUESTIONS: [&str; 4] = [
    "when_should_baby_crawl",
    "how_to_introduce_solid_foods",
    "good_sleep_schedule_6_months",
    "is_babys_crying_normal",
];

/// Persona the assistant answers as
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    #[default]
    Pediatrician,
    Baby,
    Mother,
}

impl ChatRole {
    pub const ALL: [ChatRole; 3] = [ChatRole::Pediatrician, ChatRole::Baby, ChatRole::Mother];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::Pediatrician => "pediatrician",
            ChatRole::Baby => "baby",
            ChatRole::Mother => "mother",
        }
    }

    pub fn label(&self, t: &Translator) -> String {
        t.t(&format!("neochatbot.{}", self.as_str()), &[])
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        ChatRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown chat role '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

/// The backend has sent both numeric and string ids.
fn id_from_any<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => new_message_id(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default = "new_message_id", deserialize_with = "id_from_any")]
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }
}

/// Messages per persona, plus which personas had their history loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatHistory {
    messages: HashMap<ChatRole, Vec<ChatMessage>>,
    loaded: HashSet<ChatRole>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self, role: ChatRole) -> &[ChatMessage] {
        self.messages.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn history_loaded(&self, role: ChatRole) -> bool {
        self.loaded.contains(&role)
    }

    /// Replace a persona's messages and mark its history loaded.
    pub fn with_messages(&self, role: ChatRole, messages: Vec<ChatMessage>) -> Self {
        let mut next = self.clone();
        next.messages.insert(role, messages);
        next.loaded.insert(role);
        next
    }

    pub fn with_appended(&self, role: ChatRole, message: ChatMessage) -> Self {
        let mut messages = self.messages(role).to_vec();
        messages.push(message);
        self.with_messages(role, messages)
    }

    /// Switching persona starts it from an empty conversation.
    pub fn reset_role(&self, role: ChatRole) -> Self {
        let mut next = self.clone();
        next.messages.remove(&role);
        next.loaded.remove(&role);
        next
    }

    /// Logout drops everything.
    pub fn cleared(&self) -> Self {
        Self::default()
    }

    pub fn total_messages(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }
}

// ============= History Storage =============

/// Where conversations live between sessions
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn fetch(&self, role: ChatRole) -> Result<Vec<ChatMessage>>;
    async fn save(&self, role: ChatRole, messages: &[ChatMessage]) -> Result<()>;
}

/// Load `role`'s stored messages unless they are already loaded.
pub async fn load_history<S: HistoryStore + ?Sized>(
    store: &S,
    history: &ChatHistory,
    role: ChatRole,
) -> ChatHistory {
    if history.history_loaded(role) {
        return history.clone();
    }
    match store.fetch(role).await {
        Ok(messages) => {
            debug!(%role, messages = messages.len(), "Chat history loaded");
            history.with_messages(role, messages)
        }
        Err(e) => {
            warn!(%role, "Failed to load chat history: {}", e);
            history.with_messages(role, Vec::new())
        }
    }
}

// ============= Sending =============

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
    role: ChatRole,
}

/// Result of one user turn
#[derive(Debug)]
pub struct ChatTurn {
    pub history: ChatHistory,
    pub reply: Option<ChatMessage>,
    pub error: Option<AppError>,
}

/// Send `input` as the next user message under `role`.
///
/// Blank input leaves the history untouched and sends nothing.
pub async fn send(
    client: &ApiClient,
    t: &Translator,
    history: &ChatHistory,
    role: ChatRole,
    input: &str,
) -> ChatTurn {
    if input.trim().is_empty() {
        return ChatTurn {
            history: history.clone(),
            reply: None,
            error: None,
        };
    }

    let pending = history.with_appended(role, ChatMessage::user(input));
    let request = ChatRequest {
        messages: pending.messages(role),
        role,
    };
    debug!(%role, messages = request.messages.len(), "Sending chat turn");

    match client.post_json::<_, ChatMessage>(CHAT_PATH, &request).await {
        Ok(reply) => ChatTurn {
            history: pending.with_appended(role, reply.clone()),
            reply: Some(reply),
            error: None,
        },
        Err(e) => {
            warn!(%role, kind = %e.kind(), "Chat request failed: {}", e);
            let notice = ChatMessage::system(t.t("neochatbot.oops_something_wrong", &[]));
            ChatTurn {
                history: pending.with_appended(role, notice),
                reply: None,
                error: Some(e),
            }
        }
    }
}

/// Translated text of a quick question, as it is sent to the assistant
pub fn quick_question(t: &Translator, key: &str) -> String {
    t.t(&format!("neochatbot.{}", key), &[])
}

pub fn role_switched_notice(t: &Translator, role: ChatRole) -> String {
    let label = role.label(t);
    t.t("neochatbot.switched_to_role", &[("role", label.as_str())])
}

// ============= Auto Tasks =============

/// Shortest message the auto-task box will send
pub const MIN_TASK_MESSAGE_CHARS: usize = 9;

/// A free-text instruction for the auto-task assistant ("log a 2h nap").
/// Only the length guard lives here; the transport is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub message: String,
}

impl TaskRequest {
    pub fn new(message: impl Into<String>) -> Result<Self> {
        let message = message.into();
        if message.chars().count() < MIN_TASK_MESSAGE_CHARS {
            return Err(AppError::InvalidInput(format!(
                "Task message must be at least {} characters",
                MIN_TASK_MESSAGE_CHARS
            )));
        }
        Ok(Self { message })
    }
}

/// One action the assistant attempted on the user's behalf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default)]
    pub action_name: String,
    #[serde(default)]
    pub is_action: bool,
    #[serde(default)]
    pub request: Option<String>,
}

impl TaskUpdate {
    pub fn accepted(&self) -> bool {
        self.request.as_deref() == Some("accepted")
    }

    pub fn emoji(&self) -> &'static str {
        action_emoji(&self.action_name)
    }

    pub fn describe(&self, t: &Translator) -> String {
        if self.is_action {
            t.t(
                "autotaskmanager.taskSuccess",
                &[("emoji", self.emoji()), ("task", self.action_name.as_str())],
            )
        } else {
            t.t("autotaskmanager.taskFailed", &[("task", self.action_name.as_str())])
        }
    }
}

pub fn action_emoji(action: &str) -> &'static str {
    match action.to_lowercase().as_str() {
        "growth" => "📊",
        "vaccination" => "💉",
        "doctor_contact" => "📞",
        "feeding" => "🍼",
        "essentials" => "📦",
        "memory" => "🖼",
        "sleep" => "😴",
        "notification" => "🔴",
        _ => "❓",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn translator() -> Translator {
        Translator::new("en").with_table(
            "en",
            json!({
                "neochatbot": {
                    "baby": "Baby",
                    "switched_to_role": "Switched to {{role}} mode",
                    "when_should_baby_crawl": "When should my baby crawl?"
                },
                "autotaskmanager": {
                    "taskSuccess": "{{emoji}} {{task}} done",
                    "taskFailed": "{{task}} failed"
                }
            }),
        )
    }

    #[test]
    fn test_history_updates_return_new_values() {
        let empty = ChatHistory::new();
        let one = empty.with_appended(ChatRole::Baby, ChatMessage::user("hi"));

        assert!(empty.messages(ChatRole::Baby).is_empty());
        assert!(!empty.history_loaded(ChatRole::Baby));
        assert_eq!(one.messages(ChatRole::Baby).len(), 1);
        assert!(one.history_loaded(ChatRole::Baby));
        assert!(one.messages(ChatRole::Mother).is_empty());
    }

    #[test]
    fn test_reset_role_only_touches_that_role() {
        let history = ChatHistory::new()
            .with_appended(ChatRole::Baby, ChatMessage::user("a"))
            .with_appended(ChatRole::Mother, ChatMessage::user("b"));

        let reset = history.reset_role(ChatRole::Baby);
        assert!(reset.messages(ChatRole::Baby).is_empty());
        assert!(!reset.history_loaded(ChatRole::Baby));
        assert_eq!(reset.messages(ChatRole::Mother).len(), 1);
        assert_eq!(reset.cleared().total_messages(), 0);
    }

    #[test]
    fn test_message_wire_format() {
        let msg: ChatMessage = serde_json::from_value(json!({
            "id": 1717000000000u64,
            "role": "assistant",
            "content": "Try a bedtime routine.",
            "createdAt": "2025-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(msg.id, "1717000000000");
        assert_eq!(msg.role, MessageRole::Assistant);

        let body = serde_json::to_value(ChatMessage::user("hello")).unwrap();
        assert_eq!(body["role"], "user");
        assert!(body.get("createdAt").is_some());
    }

    #[test]
    fn test_role_parsing_and_labels() {
        let t = translator();
        assert_eq!("mother".parse::<ChatRole>().unwrap(), ChatRole::Mother);
        assert!("nanny".parse::<ChatRole>().is_err());
        assert_eq!(role_switched_notice(&t, ChatRole::Baby), "Switched to Baby mode");
        assert_eq!(quick_question(&t, QUICK_QUESTIONS[0]), "When should my baby crawl?");
    }

    // ============= History Storage Tests =============

    #[derive(Default)]
    struct MemoryStore {
        saved: parking_lot::Mutex<HashMap<ChatRole, Vec<ChatMessage>>>,
        fetches: std::sync::atomic::AtomicUsize,
        broken: bool,
    }

    #[async_trait]
    impl HistoryStore for MemoryStore {
        async fn fetch(&self, role: ChatRole) -> Result<Vec<ChatMessage>> {
            self.fetches.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if self.broken {
                return Err(AppError::Network("offline".to_string()));
            }
            Ok(self.saved.lock().get(&role).cloned().unwrap_or_default())
        }

        async fn save(&self, role: ChatRole, messages: &[ChatMessage]) -> Result<()> {
            self.saved.lock().insert(role, messages.to_vec());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_load_history_fetches_once() {
        let store = MemoryStore::default();
        store
            .save(ChatRole::Baby, &[ChatMessage::user("goo")])
            .await
            .unwrap();

        let history = load_history(&store, &ChatHistory::new(), ChatRole::Baby).await;
        assert!(history.history_loaded(ChatRole::Baby));
        assert_eq!(history.messages(ChatRole::Baby)[0].content, "goo");
        assert!(!history.history_loaded(ChatRole::Mother));

        let again = load_history(&store, &history, ChatRole::Baby).await;
        assert_eq!(again, history);
        assert_eq!(store.fetches.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_starts_empty() {
        let store = MemoryStore {
            broken: true,
            ..Default::default()
        };

        let history = load_history(&store, &ChatHistory::new(), ChatRole::Mother).await;
        assert!(history.history_loaded(ChatRole::Mother));
        assert!(history.messages(ChatRole::Mother).is_empty());
    }

    #[test]
    fn test_task_request_length_guard() {
        assert!(TaskRequest::new("feed 2h").is_err());
        assert_eq!(TaskRequest::new("log a nap").unwrap().message, "log a nap");
        // counted in chars, not bytes
        assert!(TaskRequest::new("ñaps 2h!").is_err());
    }

    #[test]
    fn test_task_update_rendering() {
        let t = translator();
        let done = TaskUpdate {
            action_name: "Sleep".to_string(),
            is_action: true,
            request: Some("accepted".to_string()),
        };
        assert!(done.accepted());
        assert_eq!(done.describe(&t), "😴 Sleep done");

        let failed = TaskUpdate {
            action_name: "laundry".to_string(),
            is_action: false,
            request: None,
        };
        assert_eq!(failed.emoji(), "❓");
        assert_eq!(failed.describe(&t), "laundry failed");
    }
}
