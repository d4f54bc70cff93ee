//! Validated form inputs, one struct per mutating handler
//!
//! Every field deserializes with a default so extraction never rejects a
//! request; `validate()` decides what is acceptable and the handler
//! re-renders the form with the returned messages on failure.

use serde::Deserialize;

/// A validation failure tied to a single form field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// POST /signup
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.username.trim().is_empty() {
            errors.push(FieldError::new("username", "Username is required"));
        }
        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !plausible_email(&self.email) {
            errors.push(FieldError::new("email", "Email does not look valid"));
        }
        if self.password.chars().count() < 8 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 8 characters",
            ));
        }

        errors
    }
}

/// POST /login
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.username.trim().is_empty() {
            errors.push(FieldError::new("username", "Username is required"));
        }
        if self.password.chars().count() < 6 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters",
            ));
        }

        errors
    }
}

/// POST /users/profile
///
/// The password field carries the user's current password for re-checking,
/// not a new one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl ProfileForm {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.username.trim().is_empty() {
            errors.push(FieldError::new("username", "Username is required"));
        }
        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !plausible_email(&self.email) {
            errors.push(FieldError::new("email", "Email does not look valid"));
        }
        if self.password.chars().count() < 8 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 8 characters",
            ));
        }

        errors
    }
}

/// Loose shape check: one '@' with something on both sides. Deliverability
/// is the mail server's problem.
fn plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.trim().is_empty() && !domain.trim().is_empty(),
        None => false,
    }
}
