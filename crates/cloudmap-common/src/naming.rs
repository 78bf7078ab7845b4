//! HTTP namespace name validation
//!
//! Cloud Map accepts 1 to 1024 characters drawn from letters, digits,
//! `.`, `_` and `-` for HTTP namespace names.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Maximum length of an HTTP namespace name
pub const MAX_NAME_LEN: usize = 1024;

static NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z._-]+$").expect("static regex is valid"));

/// Namespace name validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Name is the empty string
    #[error("name cannot be empty")]
    Empty,

    /// Name exceeds [`MAX_NAME_LEN`]
    #[error("name must be at most {MAX_NAME_LEN} characters, got {0}")]
    TooLong(usize),

    /// Name contains characters outside `[0-9A-Za-z._-]`
    #[error("{0:?} is an invalid HTTP namespace name: only letters, digits, '.', '_' and '-' are allowed")]
    InvalidCharacters(String),
}

/// Validate an HTTP namespace name before it is sent to AWS.
pub fn validate_namespace_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong(len));
    }

    if !NAME_CHARS.is_match(name) {
        return Err(NameError::InvalidCharacters(name.to_string()));
    }

    Ok(())
}
