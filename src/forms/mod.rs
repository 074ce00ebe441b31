//! Form validation and form state
//!
//! - [`validator`] - per-field rules (`required`, `name`, `email`, `password`)
//! - [`state`] - [`FormState`]: values, touched flags, displayed errors and
//!   the submission gate
//! - [`auth`] - the login and signup forms and how backend rejections land
//!   on them

pub mod auth;
pub mod state;
pub mod validator;

pub use state::{FieldSpec, FieldState, FormState, FormValues, ValidationMode};
pub use validator::{FieldValidator, ValidationKind, ValidationMessages, ValidationResult};
