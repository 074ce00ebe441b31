//! Field validators
//!
//! A validator maps one raw input value to a [`ValidationResult`]. Validators
//! never fail or panic: every input produces a result value, and the failure
//! kind is always one of [`ValidationKind`].
//!
//! # Rules
//!
//! | Validator | Empty / whitespace | Other failure |
//! |-----------|--------------------|---------------|
//! | [`required`] | `Empty` | - |
//! | [`name`] | `Empty` | - |
//! | [`email`] | `Empty` | `Malformed` unless `local@domain.tld` |
//! | [`password`] | `Empty` | `TooShort` under 6 characters |

use regex::Regex;
use std::sync::LazyLock;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.\S+$").expect("email pattern is a valid regex")
});

/// Why a value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    Empty,
    Malformed,
    TooShort,
}

/// Outcome of validating a single value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub kind: Option<ValidationKind>,
    /// Empty when valid
    pub message: String,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            kind: None,
            message: String::new(),
        }
    }

    pub fn fail(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            kind: Some(kind),
            message: message.into(),
        }
    }
}

/// Messages attached to each failure kind.
///
/// Forms built from translated screens put resolved `t(...)` strings here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessages {
    pub empty: String,
    pub malformed: String,
    pub too_short: String,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self {
            empty: "This field is required".to_string(),
            malformed: "Please enter a valid value".to_string(),
            too_short: format!("Must be at least {} characters", MIN_PASSWORD_LEN),
        }
    }
}

impl ValidationMessages {
    pub fn message(&self, kind: ValidationKind) -> &str {
        match kind {
            ValidationKind::Empty => &self.empty,
            ValidationKind::Malformed => &self.malformed,
            ValidationKind::TooShort => &self.too_short,
        }
    }

    fn result(&self, kind: ValidationKind) -> ValidationResult {
        ValidationResult::fail(kind, self.message(kind))
    }
}

/// Anything that can judge a single field value.
pub trait FieldValidator: Send + Sync {
    fn validate(&self, value: &str) -> ValidationResult;
}

impl<F> FieldValidator for F
where
    F: Fn(&str) -> ValidationResult + Send + Sync,
{
    fn validate(&self, value: &str) -> ValidationResult {
        self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Required,
    Email,
    Password { min_len: usize },
}

/// One of the built-in rules together with its messages.
#[derive(Debug, Clone)]
pub struct RuleValidator {
    rule: Rule,
    messages: ValidationMessages,
}

impl RuleValidator {
    /// Replace the messages reported for each failure kind
    pub fn with_messages(mut self, messages: ValidationMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Replace the message for a single failure kind
    pub fn with_message(mut self, kind: ValidationKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ValidationKind::Empty => self.messages.empty = message,
            ValidationKind::Malformed => self.messages.malformed = message,
            ValidationKind::TooShort => self.messages.too_short = message,
        }
        self
    }
}

impl FieldValidator for RuleValidator {
    fn validate(&self, value: &str) -> ValidationResult {
        if value.trim().is_empty() {
            return self.messages.result(ValidationKind::Empty);
        }

        match self.rule {
            Rule::Required => ValidationResult::ok(),
            Rule::Email if !EMAIL_PATTERN.is_match(value) => {
                self.messages.result(ValidationKind::Malformed)
            }
            Rule::Email => ValidationResult::ok(),
            Rule::Password { min_len } if value.chars().count() < min_len => {
                self.messages.result(ValidationKind::TooShort)
            }
            Rule::Password { .. } => ValidationResult::ok(),
        }
    }
}

/// Non-empty after trimming
pub fn required() -> RuleValidator {
    RuleValidator {
        rule: Rule::Required,
        messages: ValidationMessages::default(),
    }
}

/// Display name: non-empty only
pub fn name() -> RuleValidator {
    required().with_message(ValidationKind::Empty, "Please enter your name")
}

/// `local@domain.tld` with no whitespace and a single `@` before the dot
pub fn email() -> RuleValidator {
    RuleValidator {
        rule: Rule::Email,
        messages: ValidationMessages::default(),
    }
    .with_message(ValidationKind::Empty, "Please enter your email")
    .with_message(ValidationKind::Malformed, "Please enter a valid email address")
}

/// At least [`MIN_PASSWORD_LEN`] characters
pub fn password() -> RuleValidator {
    password_with_min(MIN_PASSWORD_LEN)
}

pub fn password_with_min(min_len: usize) -> RuleValidator {
    RuleValidator {
        rule: Rule::Password { min_len },
        messages: ValidationMessages::default(),
    }
    .with_message(ValidationKind::Empty, "Please enter your password")
    .with_message(
        ValidationKind::TooShort,
        format!("Password must be at least {} characters", min_len),
    )
}
