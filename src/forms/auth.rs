//! Login and signup forms
//!
//! Builds the two auth forms with translated messages and turns backend
//! rejections into a toast message plus, where it applies, an inline field
//! error.

use tracing::warn;

use super::state::{FieldSpec, FormState, FormValues, ValidationMode};
use super::validator::{self, ValidationKind};
use crate::i18n::Translator;
use crate::types::{AppError, ErrorKind, LoginRequest, SignupRequest};

const NO_SUCH_USER: &str = "no such user exists! signup instead";
const WRONG_PASSWORD: &str = "wrong password";
const MISSING_DETAILS: &str = "Please provide all details";

/// Email + password, validated after first blur
pub fn login_form(t: &Translator) -> FormState {
    FormState::new(vec![
        FieldSpec::new(
            "email",
            validator::email()
                .with_message(ValidationKind::Empty, t.t("login.errorEmptyEmail", &[]))
                .with_message(ValidationKind::Malformed, t.t("login.errorInvalidEmail", &[])),
        ),
        FieldSpec::new(
            "password",
            validator::password()
                .with_message(ValidationKind::Empty, t.t("login.errorEmptyPassword", &[]))
                .with_message(ValidationKind::TooShort, t.t("login.errorShortPassword", &[])),
        ),
    ])
}

/// Name + email + password, validated on every change
pub fn signup_form(t: &Translator) -> FormState {
    FormState::new(vec![
        FieldSpec::new(
            "name",
            validator::name().with_message(ValidationKind::Empty, t.t("signup.errorEmptyName", &[])),
        ),
        FieldSpec::new(
            "email",
            validator::email()
                .with_message(ValidationKind::Empty, t.t("signup.errorEmptyEmail", &[]))
                .with_message(ValidationKind::Malformed, t.t("signup.errorInvalidEmail", &[])),
        ),
        FieldSpec::new(
            "password",
            validator::password()
                .with_message(ValidationKind::Empty, t.t("signup.errorEmptyPassword", &[]))
                .with_message(ValidationKind::TooShort, t.t("signup.errorShortPassword", &[])),
        ),
    ])
    .with_mode(ValidationMode::Eager)
}

pub fn login_request(values: FormValues) -> LoginRequest {
    let mut values = values;
    LoginRequest {
        email: values.remove("email").unwrap_or_default(),
        password: values.remove("password").unwrap_or_default(),
    }
}

pub fn signup_request(values: FormValues) -> SignupRequest {
    let mut values = values;
    SignupRequest {
        name: values.remove("name").unwrap_or_default(),
        email: values.remove("email").unwrap_or_default(),
        password: values.remove("password").unwrap_or_default(),
    }
}

/// How a rejected login should be presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFailure {
    /// Translation key of the toast message, when one applies
    pub message_key: Option<&'static str>,
    /// Resolved toast text
    pub message: String,
    /// Field that should show the message inline
    pub field: Option<&'static str>,
    /// Offer the signup screen instead
    pub suggest_signup: bool,
}

/// Classify a login error the way the login screen reports it.
pub fn classify_login_error(t: &Translator, err: &AppError) -> LoginFailure {
    let keyed = |key: &'static str| LoginFailure {
        message_key: Some(key),
        message: t.t(key, &[]),
        field: None,
        suggest_signup: false,
    };

    if matches!(err, AppError::FormInvalid(_)) {
        return keyed("login.errorFormInvalid");
    }
    if err.kind() == ErrorKind::Network {
        return keyed("login.errorNetwork");
    }

    match err.backend_message() {
        Some(NO_SUCH_USER) => LoginFailure {
            suggest_signup: true,
            ..keyed("login.errorNoUser")
        },
        Some(WRONG_PASSWORD) => LoginFailure {
            field: Some("password"),
            ..keyed("login.errorWrongPassword")
        },
        Some(MISSING_DETAILS) => keyed("login.errorMissingDetails"),
        Some(other) if !other.is_empty() => LoginFailure {
            message_key: None,
            message: other.to_string(),
            field: None,
            suggest_signup: false,
        },
        _ => keyed("login.errorUnknown"),
    }
}

/// Apply a login rejection to the form; returns the toast text.
pub fn apply_login_error(form: &mut FormState, t: &Translator, err: &AppError) -> String {
    let failure = classify_login_error(t, err);
    if let Some(field) = failure.field {
        if let Err(e) = form.set_server_error(field, failure.message.clone()) {
            warn!(field, "Login error has no field to land on: {}", e);
        }
    }
    failure.message
}

/// Apply a signup rejection to the form; returns the toast text.
///
/// A duplicate email is also shown inline on the email field.
pub fn apply_signup_error(form: &mut FormState, t: &Translator, err: &AppError) -> String {
    match err.kind() {
        ErrorKind::FormInvalid => t.t("signup.errorFormInvalid", &[]),
        ErrorKind::Network => t.t("signup.errorNetwork", &[]),
        ErrorKind::ServerConflict => {
            if let Err(e) = form.set_server_error("email", t.t("signup.errorEmailExists", &[])) {
                warn!("Signup conflict has no email field to land on: {}", e);
            }
            err.backend_message()
                .map(str::to_string)
                .unwrap_or_else(|| t.t("signup.errorEmailExists", &[]))
        }
        _ => err
            .backend_message()
            .filter(|msg| !msg.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| t.t("signup.errorUnknown", &[])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn translator() -> Translator {
        Translator::default().with_table(
            "en",
            json!({
                "login": {
                    "errorEmptyEmail": "Email is required",
                    "errorInvalidEmail": "Enter a valid email",
                    "errorWrongPassword": "Incorrect password",
                    "errorNoUser": "No account found, sign up instead",
                    "errorUnknown": "Something went wrong",
                    "errorNetwork": "Check your connection"
                },
                "signup": { "errorEmailExists": "Email already registered" }
            }),
        )
    }

    #[test]
    fn test_login_form_uses_translated_messages() {
        let t = translator();
        let mut form = login_form(&t);
        form.set_touched("email").unwrap();
        assert_eq!(form.error("email"), Some("Email is required"));
        form.set_value("email", "nope").unwrap();
        assert_eq!(form.error("email"), Some("Enter a valid email"));
    }

    #[test]
    fn test_signup_form_is_eager() {
        let form = signup_form(&translator());
        assert_eq!(form.mode(), ValidationMode::Eager);
        assert_eq!(form.specs().len(), 3);
    }

    #[test]
    fn test_wrong_password_lands_on_field() {
        let t = translator();
        let mut form = login_form(&t);
        let err = AppError::from_status(400, Some("wrong password".to_string()));

        let toast = apply_login_error(&mut form, &t, &err);

        assert_eq!(toast, "Incorrect password");
        assert_eq!(form.error("password"), Some("Incorrect password"));
    }

    #[test]
    fn test_field_error_without_matching_field_still_toasts() {
        let t = translator();
        let mut form = FormState::new(vec![FieldSpec::new("email", validator::email())]);
        let err = AppError::from_status(400, Some("wrong password".to_string()));

        let toast = apply_login_error(&mut form, &t, &err);

        assert_eq!(toast, "Incorrect password");
        assert!(form.visible_errors().is_empty());
    }

    #[test]
    fn test_unknown_user_suggests_signup() {
        let t = translator();
        let err = AppError::from_status(404, Some(NO_SUCH_USER.to_string()));
        let failure = classify_login_error(&t, &err);
        assert!(failure.suggest_signup);
        assert_eq!(failure.message_key, Some("login.errorNoUser"));
    }

    #[test]
    fn test_network_and_unknown() {
        let t = translator();
        let net = classify_login_error(&t, &AppError::Network("refused".into()));
        assert_eq!(net.message, "Check your connection");

        let other = classify_login_error(&t, &AppError::from_status(500, None));
        // the status text stands in for a backend message
        assert_eq!(other.message, "Request failed with status 500");
    }

    #[test]
    fn test_duplicate_email_on_signup() {
        let t = translator();
        let mut form = signup_form(&t);
        let err = AppError::from_status(400, Some("Email already exists".to_string()));

        let toast = apply_signup_error(&mut form, &t, &err);

        assert_eq!(toast, "Email already exists");
        assert_eq!(form.error("email"), Some("Email already registered"));
    }

    #[test]
    fn test_requests_from_values() {
        let values: FormValues = [
            ("name".to_string(), "Asha".to_string()),
            ("email".to_string(), "asha@example.com".to_string()),
            ("password".to_string(), "secret1".to_string()),
        ]
        .into_iter()
        .collect();

        let signup = signup_request(values.clone());
        assert_eq!(signup.name, "Asha");
        let login = login_request(values);
        assert_eq!(login.email, "asha@example.com");
    }
}
