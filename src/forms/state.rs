//! Form state: values, touched flags and derived validity
//!
//! A [`FormState`] answers two separate questions:
//!
//! - **What should be shown?** [`FormState::error`] / [`FormState::visible_errors`]
//!   only report fields the user has touched, so errors do not flash before
//!   the first blur.
//! - **May the form be submitted?** [`FormState::is_valid`] runs every
//!   validator against the current value regardless of touched state.
//!
//! The two can disagree: an untouched empty field blocks submission without
//! showing anything. That mismatch is deliberate and left to the view.
//!
//! # Example
//!
//! ```ignore
//! use neonest::forms::{validator, FieldSpec, FormState};
//!
//! let mut form = FormState::new(vec![
//!     FieldSpec::new("email", validator::email()),
//!     FieldSpec::new("password", validator::password()),
//! ]);
//!
//! form.set_value("email", "mom@example.com")?;
//! form.set_touched("email")?;
//! let request = form.submit(|values| LoginRequest {
//!     email: values["email"].clone(),
//!     password: values["password"].clone(),
//! })?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::validator::{FieldValidator, ValidationResult};
use crate::types::{AppError, Result};

/// Submitted field values keyed by field name
pub type FormValues = HashMap<String, String>;

/// Static description of one form field
#[derive(Clone)]
pub struct FieldSpec {
    name: String,
    validator: Arc<dyn FieldValidator>,
    required: bool,
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

impl FieldSpec {
    /// A required field checked by `validator`
    pub fn new(name: impl Into<String>, validator: impl FieldValidator + 'static) -> Self {
        Self {
            name: name.into(),
            validator: Arc::new(validator),
            required: true,
        }
    }

    /// Accept an empty value; non-empty values still go through the validator.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn validate(&self, value: &str) -> ValidationResult {
        if !self.required && value.trim().is_empty() {
            return ValidationResult::ok();
        }
        self.validator.validate(value)
    }
}

/// Per-field mutable state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    pub value: String,
    pub touched: bool,
    /// Last message produced for this field; empty when it passed
    pub error: String,
}

/// When a value change triggers validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Re-validate on change only once the field has been touched
    #[default]
    OnBlur,
    /// Touch and re-validate on every change
    Eager,
}

#[derive(Debug, Clone)]
pub struct FormState {
    specs: Vec<FieldSpec>,
    fields: HashMap<String, FieldState>,
    mode: ValidationMode,
    is_valid: bool,
}

impl FormState {
    pub fn new(specs: Vec<FieldSpec>) -> Self {
        let fields = specs
            .iter()
            .map(|spec| (spec.name.clone(), FieldState::default()))
            .collect();

        let mut form = Self {
            specs,
            fields,
            mode: ValidationMode::default(),
            is_valid: false,
        };
        form.is_valid = form.compute_is_valid();
        form
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Prefill values without touching the fields (edit forms).
    ///
    /// Names that are not part of the form are ignored.
    pub fn with_values<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in values {
            if let Some(state) = self.fields.get_mut(name.as_ref()) {
                state.value = value.into();
            }
        }
        self.is_valid = self.compute_is_valid();
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    /// Update a value, re-validating if the field is already touched.
    ///
    /// In [`ValidationMode::Eager`] a change counts as a touch, so the error
    /// shows while the user types.
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        let spec = self.spec(field)?.clone();
        let mode = self.mode;
        let state = self.state_mut(field)?;

        state.value = value.into();
        if mode == ValidationMode::Eager {
            state.touched = true;
        }
        if state.touched {
            state.error = spec.validate(&state.value).message;
        }

        self.is_valid = self.compute_is_valid();
        Ok(())
    }

    /// Mark a field as touched and validate it once (the blur case).
    pub fn set_touched(&mut self, field: &str) -> Result<()> {
        let spec = self.spec(field)?.clone();
        let state = self.state_mut(field)?;

        state.touched = true;
        state.error = spec.validate(&state.value).message;

        self.is_valid = self.compute_is_valid();
        Ok(())
    }

    /// Show a backend rejection on a field. The next value change replaces it.
    pub fn set_server_error(&mut self, field: &str, message: impl Into<String>) -> Result<()> {
        let state = self.state_mut(field)?;
        state.touched = true;
        state.error = message.into();
        Ok(())
    }

    pub fn field(&self, field: &str) -> Option<&FieldState> {
        self.fields.get(field)
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(|state| state.value.as_str())
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|state| state.touched)
    }

    /// Error to display for a field: only touched fields report one.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .filter(|state| state.touched && !state.error.is_empty())
            .map(|state| state.error.as_str())
    }

    /// Displayed errors in field declaration order
    pub fn visible_errors(&self) -> Vec<(&str, &str)> {
        self.specs
            .iter()
            .filter_map(|spec| self.error(&spec.name).map(|err| (spec.name.as_str(), err)))
            .collect()
    }

    /// Submission gate, kept in sync on every mutation.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Run every validator against its current value, ignoring touched flags.
    pub fn compute_is_valid(&self) -> bool {
        self.failing_fields().is_empty()
    }

    /// Names of fields whose current value fails validation
    pub fn failing_fields(&self) -> Vec<String> {
        self.specs
            .iter()
            .filter(|spec| {
                let value = self.value(&spec.name).unwrap_or_default();
                !spec.validate(value).valid
            })
            .map(|spec| spec.name.clone())
            .collect()
    }

    pub fn values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|(name, state)| (name.clone(), state.value.clone()))
            .collect()
    }

    /// Touch every field and validate. Hands the values to `on_submit` when
    /// all pass; otherwise returns [`AppError::FormInvalid`] without calling it.
    pub fn submit<F, R>(&mut self, on_submit: F) -> Result<R>
    where
        F: FnOnce(FormValues) -> R,
    {
        for spec in &self.specs {
            if let Some(state) = self.fields.get_mut(&spec.name) {
                state.touched = true;
                state.error = spec.validate(&state.value).message;
            }
        }

        let failing = self.failing_fields();
        self.is_valid = failing.is_empty();

        if !failing.is_empty() {
            debug!(fields = ?failing, "Form submission blocked");
            return Err(AppError::FormInvalid(failing));
        }

        debug!(fields = self.specs.len(), "Form submitted");
        Ok(on_submit(self.values()))
    }

    /// Back to empty, untouched fields.
    pub fn reset(&mut self) {
        for state in self.fields.values_mut() {
            *state = FieldState::default();
        }
        self.is_valid = self.compute_is_valid();
    }

    fn spec(&self, field: &str) -> Result<&FieldSpec> {
        self.specs
            .iter()
            .find(|spec| spec.name == field)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown form field '{}'", field)))
    }

    fn state_mut(&mut self, field: &str) -> Result<&mut FieldState> {
        self.fields
            .get_mut(field)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown form field '{}'", field)))
    }
}
