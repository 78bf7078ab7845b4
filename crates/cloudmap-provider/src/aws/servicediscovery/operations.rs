//! Cloud Map operations trait for testing

use super::ServiceDiscoveryClient;
use super::types::{CreateHttpNamespaceRequest, NamespaceDescription, Operation};
use crate::aws::error::AwsError;
use cloudmap_common::KeyValueTags;
use std::future::Future;

/// Trait for the Cloud Map calls the namespace lifecycle needs.
///
/// The lifecycle controller is generic over this trait so its logic can be
/// unit tested against an in-memory fake without hitting real AWS.
///
/// Tests use a stateful fake rather than `mockall::automock`: namespace
/// lifecycles span several calls (an operation stays `PENDING` across polls,
/// a creator request ID returns the same operation on retry), which
/// per-call expectations model poorly. The methods also return
/// `impl Future + Send`, so the trait is implemented by hand.
pub trait ServiceDiscoveryOperations: Send + Sync {
    /// Start creating an HTTP namespace; returns the operation ID
    fn create_http_namespace(
        &self,
        request: CreateHttpNamespaceRequest,
    ) -> impl Future<Output = Result<Option<String>, AwsError>> + Send;

    /// Describe a namespace by ID
    fn get_namespace(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<NamespaceDescription>, AwsError>> + Send;

    /// Start deleting a namespace; returns the operation ID, if any
    fn delete_namespace(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<String>, AwsError>> + Send;

    /// Describe an asynchronous operation
    fn get_operation(
        &self,
        operation_id: &str,
    ) -> impl Future<Output = Result<Option<Operation>, AwsError>> + Send;

    /// List all tags on a resource
    fn list_tags_for_resource(
        &self,
        arn: &str,
    ) -> impl Future<Output = Result<KeyValueTags, AwsError>> + Send;

    /// Add or overwrite tags on a resource
    fn tag_resource(
        &self,
        arn: &str,
        tags: KeyValueTags,
    ) -> impl Future<Output = Result<(), AwsError>> + Send;

    /// Remove tags from a resource by key
    fn untag_resource(
        &self,
        arn: &str,
        keys: Vec<String>,
    ) -> impl Future<Output = Result<(), AwsError>> + Send;
}

impl ServiceDiscoveryOperations for ServiceDiscoveryClient {
    async fn create_http_namespace(
        &self,
        request: CreateHttpNamespaceRequest,
    ) -> Result<Option<String>, AwsError> {
        ServiceDiscoveryClient::create_http_namespace(self, request).await
    }

    async fn get_namespace(&self, id: &str) -> Result<Option<NamespaceDescription>, AwsError> {
        ServiceDiscoveryClient::get_namespace(self, id).await
    }

    async fn delete_namespace(&self, id: &str) -> Result<Option<String>, AwsError> {
        ServiceDiscoveryClient::delete_namespace(self, id).await
    }

    async fn get_operation(&self, operation_id: &str) -> Result<Option<Operation>, AwsError> {
        ServiceDiscoveryClient::get_operation(self, operation_id).await
    }

    async fn list_tags_for_resource(&self, arn: &str) -> Result<KeyValueTags, AwsError> {
        ServiceDiscoveryClient::list_tags_for_resource(self, arn).await
    }

    async fn tag_resource(&self, arn: &str, tags: KeyValueTags) -> Result<(), AwsError> {
        ServiceDiscoveryClient::tag_resource(self, arn, tags).await
    }

    async fn untag_resource(&self, arn: &str, keys: Vec<String>) -> Result<(), AwsError> {
        ServiceDiscoveryClient::untag_resource(self, arn, keys).await
    }
}
