//! Cloud Map request and response types
//!
//! SDK-independent views of the data the lifecycle controller needs, so the
//! controller and its test fakes never touch `aws_sdk_servicediscovery` types.

use cloudmap_common::KeyValueTags;
use std::collections::HashMap;

/// Parameters for `CreateHttpNamespace`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateHttpNamespaceRequest {
    pub name: String,
    pub description: Option<String>,
    pub tags: KeyValueTags,
    /// Idempotency token; a retried request with the same token does not
    /// create a second namespace
    pub creator_request_id: String,
}

impl CreateHttpNamespaceRequest {
    /// Create a new request with required fields
    pub fn new(name: impl Into<String>, creator_request_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tags: KeyValueTags::new(),
            creator_request_id: creator_request_id.into(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_tags(mut self, tags: KeyValueTags) -> Self {
        self.tags = tags;
        self
    }
}

/// A namespace as reported by `GetNamespace`.
///
/// `name` and `arn` are `None` when the response leaves them out or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDescription {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub arn: Option<String>,
}

/// Status of an asynchronous Cloud Map operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Submitted,
    Pending,
    Success,
    Fail,
    /// A status this client does not know about
    Other(String),
}

impl OperationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OperationStatus::Submitted => "SUBMITTED",
            OperationStatus::Pending => "PENDING",
            OperationStatus::Success => "SUCCESS",
            OperationStatus::Fail => "FAIL",
            OperationStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity an operation acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationTargetType {
    Namespace,
    Service,
    Instance,
}

/// An asynchronous operation as reported by `GetOperation`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub id: String,
    pub status: OperationStatus,
    /// IDs of the entities the operation touched, by target type
    pub targets: HashMap<OperationTargetType, String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl Operation {
    /// ID of the entity of the given type this operation acted on
    pub fn target(&self, target_type: OperationTargetType) -> Option<&str> {
        self.targets.get(&target_type).map(String::as_str)
    }
}
