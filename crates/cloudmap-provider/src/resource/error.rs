//! Errors from the namespace lifecycle controller
//!
//! Each variant carries the identity of the resource it concerns (name, ID or
//! ARN) and its cause. [`NamespaceError::kind`] collapses them into the
//! coarse [`ErrorKind`] taxonomy callers branch on.

use crate::aws::error::AwsError;
use crate::aws::operation::OperationWaitError;
use cloudmap_common::NameError;
use thiserror::Error;

/// Lifecycle step an error arose in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Create,
    Read,
    Delete,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Create => f.write_str("create"),
            Stage::Read => f.write_str("read"),
            Stage::Delete => f.write_str("delete"),
        }
    }
}

/// Coarse classification of a [`NamespaceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before any remote call
    Validation,
    /// API or transport failure
    Remote,
    /// The API answered without a field the lifecycle depends on
    MalformedResponse,
    /// An asynchronous operation failed, timed out or was cancelled
    OperationFailed,
}

#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("Invalid namespace name {name:?}")]
    InvalidName {
        name: String,
        #[source]
        source: NameError,
    },

    #[error("Failed to create HTTP namespace {name}")]
    Create {
        name: String,
        #[source]
        source: AwsError,
    },

    #[error("Malformed {stage} response for namespace {resource}: {detail}")]
    MalformedResponse {
        stage: Stage,
        resource: String,
        detail: String,
    },

    #[error("Namespace {resource} {stage} operation did not succeed")]
    OperationFailed {
        resource: String,
        stage: Stage,
        #[source]
        source: OperationWaitError,
    },

    #[error("Failed to read namespace {id}")]
    Read {
        id: String,
        #[source]
        source: AwsError,
    },

    #[error("Failed to list tags for {arn}")]
    ListTags {
        arn: String,
        #[source]
        source: AwsError,
    },

    #[error("Failed to update tags on namespace {id}")]
    UpdateTags {
        id: String,
        #[source]
        source: AwsError,
    },

    #[error("Failed to delete namespace {id}")]
    Delete {
        id: String,
        #[source]
        source: AwsError,
    },
}

impl NamespaceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NamespaceError::InvalidName { .. } => ErrorKind::Validation,
            NamespaceError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            NamespaceError::OperationFailed { .. } => ErrorKind::OperationFailed,
            NamespaceError::Create { .. }
            | NamespaceError::Read { .. }
            | NamespaceError::ListTags { .. }
            | NamespaceError::UpdateTags { .. }
            | NamespaceError::Delete { .. } => ErrorKind::Remote,
        }
    }

    /// The classified AWS error behind a remote failure
    pub fn aws_error(&self) -> Option<&AwsError> {
        match self {
            NamespaceError::Create { source, .. }
            | NamespaceError::Read { source, .. }
            | NamespaceError::ListTags { source, .. }
            | NamespaceError::UpdateTags { source, .. }
            | NamespaceError::Delete { source, .. } => Some(source),
            NamespaceError::OperationFailed {
                source: OperationWaitError::Describe { source, .. },
                ..
            } => Some(source),
            _ => None,
        }
    }

    /// Whether re-running the same command may succeed
    pub fn is_retryable(&self) -> bool {
        self.aws_error().is_some_and(AwsError::is_retryable)
    }
}
