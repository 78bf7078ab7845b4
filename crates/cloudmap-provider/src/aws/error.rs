//! AWS error classification and handling
//!
//! Every SDK error returned by the Cloud Map client is mapped into the closed
//! [`AwsError`] set using the `.code()` reported through
//! `ProvideErrorMetadata`, so callers pattern-match on variants instead of
//! matching strings.

use aws_sdk_servicediscovery::error::{DisplayErrorContext, ProvideErrorMetadata};
use thiserror::Error;

/// Which kind of entity an AWS "not found" error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    Namespace,
    Operation,
    /// Any other ARN-addressed resource (e.g. on tag calls)
    Resource,
}

impl NotFoundKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotFoundKind::Namespace => "namespace",
            NotFoundKind::Operation => "operation",
            NotFoundKind::Resource => "resource",
        }
    }
}

/// AWS error categories returned by the Cloud Map client
#[derive(Debug, Clone, Error)]
pub enum AwsError {
    /// Entity does not exist
    #[error("{} not found: {message}", kind.as_str())]
    NotFound { kind: NotFoundKind, message: String },

    /// Entity with the same name, or request with the same creator ID, exists
    #[error("Resource already exists: {message}")]
    AlreadyExists { message: String },

    /// Rate limit exceeded (retryable with backoff)
    #[error("Rate limit exceeded")]
    Throttled,

    /// Namespace still has services or another operation in flight
    #[error("Resource in use: {message}")]
    ResourceInUse { message: String },

    /// Request rejected by parameter validation
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error of any kind
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, AwsError::Throttled | AwsError::ResourceInUse { .. })
    }

    /// The AWS error code behind this error, when one is known
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::Sdk { code, .. } => code.as_deref(),
            AwsError::Throttled => Some("ThrottlingException"),
            _ => None,
        }
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            AwsError::AlreadyExists { .. } => suggestion_for_code("NamespaceAlreadyExists"),
            AwsError::ResourceInUse { .. } => suggestion_for_code("ResourceInUse"),
            AwsError::Throttled => suggestion_for_code("ThrottlingException"),
            AwsError::Sdk { code: Some(c), .. } => suggestion_for_code(c),
            _ => None,
        }
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[(&str, NotFoundKind)] = &[
    ("NamespaceNotFound", NotFoundKind::Namespace),
    ("OperationNotFound", NotFoundKind::Operation),
    ("ResourceNotFoundException", NotFoundKind::Resource),
    ("ServiceNotFound", NotFoundKind::Resource),
];

/// Known AWS error codes for "already exists" conditions
const ALREADY_EXISTS_CODES: &[&str] = &["NamespaceAlreadyExists", "DuplicateRequest"];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

const RESOURCE_IN_USE_CODES: &[&str] = &["ResourceInUse"];

const INVALID_INPUT_CODES: &[&str] = &["InvalidInput"];

/// Classify an AWS error from its code and message.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) => {
            if let Some((_, kind)) = NOT_FOUND_CODES.iter().find(|(nf, _)| *nf == c) {
                return AwsError::NotFound {
                    kind: *kind,
                    message,
                };
            }
            if ALREADY_EXISTS_CODES.contains(&c) {
                AwsError::AlreadyExists { message }
            } else if THROTTLING_CODES.contains(&c) {
                AwsError::Throttled
            } else if RESOURCE_IN_USE_CODES.contains(&c) {
                AwsError::ResourceInUse { message }
            } else if INVALID_INPUT_CODES.contains(&c) {
                AwsError::InvalidInput { message }
            } else {
                AwsError::Sdk {
                    code: Some(c.to_string()),
                    message,
                }
            }
        }
        None => AwsError::Sdk {
            code: None,
            message,
        },
    }
}

/// Classify an SDK error using its error metadata.
///
/// Errors without a service message (transport failures, timeouts) keep the
/// full cause chain as their message.
pub fn classify_sdk_error<E>(err: &E) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let message = match err.message() {
        Some(m) => m.to_string(),
        None => DisplayErrorContext(err).to_string(),
    };
    classify_aws_error(err.code(), Some(&message))
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "NamespaceAlreadyExists",
        "A namespace with this name already exists. Track it with `cloudmap import` instead.",
    ),
    (
        "ResourceInUse",
        "Deregister and delete the namespace's services before deleting it.",
    ),
    (
        "ResourceLimitExceeded",
        "Request a Cloud Map namespace quota increase via the Service Quotas console.",
    ),
    (
        "TooManyTagsException",
        "Cloud Map allows at most 50 tags per resource.",
    ),
    (
        "ThrottlingException",
        "AWS API rate limit hit. Retry the command after a short pause.",
    ),
    (
        "RequestLimitExceeded",
        "AWS API rate limit hit. Retry the command after a short pause.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<String> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| (*s).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes() {
        for (code, kind) in NOT_FOUND_CODES {
            let err = classify_aws_error(Some(code), Some("some message"));
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
            assert!(
                matches!(err, AwsError::NotFound { kind: k, .. } if k == *kind),
                "Wrong kind for code: {code}"
            );
        }
    }

    #[test]
    fn namespace_not_found_is_distinct_from_other_not_found() {
        let err = classify_aws_error(Some("NamespaceNotFound"), Some("ns-1"));
        assert!(matches!(
            err,
            AwsError::NotFound {
                kind: NotFoundKind::Namespace,
                ..
            }
        ));

        let err = classify_aws_error(Some("ResourceNotFoundException"), Some("arn"));
        assert!(!matches!(
            err,
            AwsError::NotFound {
                kind: NotFoundKind::Namespace,
                ..
            }
        ));
    }

    #[test]
    fn already_exists_codes() {
        for code in ALREADY_EXISTS_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(
                matches!(err, AwsError::AlreadyExists { .. }),
                "Expected AlreadyExists for code: {code}"
            );
        }
    }

    #[test]
    fn throttling_codes() {
        for code in THROTTLING_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(err.is_retryable(), "Expected retryable for code: {code}");
            assert!(matches!(err, AwsError::Throttled));
        }
    }

    #[test]
    fn resource_in_use_and_invalid_input() {
        let err = classify_aws_error(Some("ResourceInUse"), Some("has services"));
        assert!(matches!(err, AwsError::ResourceInUse { .. }));
        assert!(err.is_retryable());

        let err = classify_aws_error(Some("InvalidInput"), Some("bad name"));
        assert!(matches!(err, AwsError::InvalidInput { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_aws_error(Some("SomeNewError"), Some("details"));
        assert!(matches!(err, AwsError::Sdk { .. }));
        assert_eq!(err.code(), Some("SomeNewError"));

        let err2 = classify_aws_error(None, Some("something failed"));
        assert!(matches!(err2, AwsError::Sdk { code: None, .. }));

        let err3 = classify_aws_error(None, None);
        assert_eq!(err3.to_string(), "AWS error: Unknown error");
    }

    #[test]
    fn suggestions_for_known_codes() {
        for (code, _) in SUGGESTIONS {
            assert!(
                suggestion_for_code(code).is_some(),
                "No suggestion for code: {code}"
            );
        }
        assert!(suggestion_for_code("SomeUnknownCode").is_none());

        let err = classify_aws_error(Some("TooManyTagsException"), Some("51 tags"));
        assert!(err.suggestion().is_some());
        assert!(AwsError::Throttled.suggestion().is_some());
    }

    #[test]
    fn display_includes_kind() {
        let err = classify_aws_error(Some("NamespaceNotFound"), Some("ns-9 gone"));
        assert_eq!(err.to_string(), "namespace not found: ns-9 gone");
    }
}
