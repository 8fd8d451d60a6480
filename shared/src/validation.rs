//! Caller-side input checks.
//!
//! The request bodies derive [`validator::Validate`]; every rule is a
//! `custom` function here because lengths are counted on trimmed input.
//! Failures are collected into [`ValidationErrors`], keyed by wire field name.

use std::{borrow::Cow, collections::BTreeMap, fmt};

use validator::{Validate, ValidateEmail, ValidationError};

use crate::{comment::NewComment, resources::ContactSubmission};

/// Longest accepted comment or reply, in characters.
pub const COMMENT_CONTENT_MAX_CHARS: usize = 1000;
/// Shortest accepted comment author name.
pub const AUTHOR_NAME_MIN_CHARS: usize = 2;
/// Longest accepted comment author name.
pub const AUTHOR_NAME_MAX_CHARS: usize = 50;
/// Shortest accepted contact form name.
pub const CONTACT_NAME_MIN_CHARS: usize = 2;
/// Longest accepted contact form name.
pub const CONTACT_NAME_MAX_CHARS: usize = 100;
/// Longest accepted contact form subject.
pub const CONTACT_SUBJECT_MAX_CHARS: usize = 200;
/// Shortest accepted contact form message.
pub const CONTACT_MESSAGE_MIN_CHARS: usize = 10;
/// Longest accepted contact form message.
pub const CONTACT_MESSAGE_MAX_CHARS: usize = 5000;
const EMAIL_MAX_CHARS: usize = 254;

/// Per-field validation messages, keyed by wire field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`; the first message per field is kept.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `(field, message)` pairs ordered by field name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// `Ok(())` when empty, the errors otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<BTreeMap<String, String>> for ValidationErrors {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut mapped = Self::new();
        for (field, failures) in errors.field_errors() {
            let message = failures
                .first()
                .and_then(|failure| failure.message.as_ref())
                .map(|message| message.to_string())
                .unwrap_or_else(|| "Invalid value".to_string());
            mapped.add(wire_name(&field), message);
        }
        mapped
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// `author_name` -> `authorName`. Names without underscores pass through.
fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            name.extend(ch.to_uppercase());
            upper = false;
        } else {
            name.push(ch);
        }
    }
    name
}

fn failure(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

fn trimmed_length(value: &str, label: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let count = value.trim().chars().count();
    if count == 0 {
        Err(failure("required", format!("{label} is required")))
    } else if count < min {
        Err(failure("length", format!("{label} must be at least {min} characters")))
    } else if count > max {
        Err(failure("length", format!("{label} must be at most {max} characters")))
    } else {
        Ok(())
    }
}

pub(crate) fn comment_content(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, "Comment", 1, COMMENT_CONTENT_MAX_CHARS)
}

pub(crate) fn comment_author_name(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, "Name", AUTHOR_NAME_MIN_CHARS, AUTHOR_NAME_MAX_CHARS)
}

pub(crate) fn contact_name(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, "Name", CONTACT_NAME_MIN_CHARS, CONTACT_NAME_MAX_CHARS)
}

pub(crate) fn contact_subject(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, "Subject", 1, CONTACT_SUBJECT_MAX_CHARS)
}

pub(crate) fn contact_message(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, "Message", CONTACT_MESSAGE_MIN_CHARS, CONTACT_MESSAGE_MAX_CHARS)
}

pub(crate) fn email_address(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(failure("required", "Email is required".to_string()))
    } else if trimmed.chars().count() > EMAIL_MAX_CHARS || !trimmed.validate_email() {
        Err(failure("email", "Please enter a valid email address".to_string()))
    } else {
        Ok(())
    }
}

pub(crate) fn phone_number(value: &str) -> Result<(), ValidationError> {
    let allowed = |ch: char| ch.is_ascii_digit() || " +-()".contains(ch);
    if value.trim().chars().all(allowed) {
        Ok(())
    } else {
        Err(failure(
            "phone",
            "Phone number may only contain digits, spaces and + - ( )".to_string(),
        ))
    }
}

/// Caller-side checks run before a comment or reply is submitted.
pub fn validate_new_comment(comment: &NewComment) -> Result<(), ValidationErrors> {
    comment.validate().map_err(ValidationErrors::from)
}

/// Caller-side checks for the public contact form.
pub fn validate_contact_submission(
    submission: &ContactSubmission,
) -> Result<(), ValidationErrors> {
    submission.validate().map_err(ValidationErrors::from)
}
