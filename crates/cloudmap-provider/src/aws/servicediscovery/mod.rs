//! Cloud Map (AWS Service Discovery) namespace management

mod operations;
mod types;

pub use operations::ServiceDiscoveryOperations;
pub use types::{
    CreateHttpNamespaceRequest, NamespaceDescription, Operation, OperationStatus,
    OperationTargetType,
};

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{AwsError, classify_sdk_error};
use crate::aws::tags::to_sdk_tags;
use aws_sdk_servicediscovery::Client;
use aws_sdk_servicediscovery::types as sdk;
use cloudmap_common::KeyValueTags;
use std::collections::HashMap;
use tracing::{debug, info};

/// Cloud Map client for managing HTTP namespaces
pub struct ServiceDiscoveryClient {
    pub(crate) client: Client,
}

impl FromAwsContext for ServiceDiscoveryClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.servicediscovery_client(),
        }
    }
}

impl ServiceDiscoveryClient {
    /// Start creating an HTTP namespace; returns the operation ID
    pub async fn create_http_namespace(
        &self,
        request: CreateHttpNamespaceRequest,
    ) -> Result<Option<String>, AwsError> {
        info!(name = %request.name, "Creating HTTP namespace");

        let tags = to_sdk_tags(&request.tags)?;
        let output = self
            .client
            .create_http_namespace()
            .name(&request.name)
            .set_description(request.description)
            .creator_request_id(&request.creator_request_id)
            .set_tags((!tags.is_empty()).then_some(tags))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        debug!(operation_id = ?output.operation_id(), "CreateHttpNamespace accepted");
        Ok(output.operation_id().map(str::to_string))
    }

    /// Describe a namespace by ID
    pub async fn get_namespace(&self, id: &str) -> Result<Option<NamespaceDescription>, AwsError> {
        let output = self
            .client
            .get_namespace()
            .id(id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output.namespace().map(|ns| NamespaceDescription {
            id: ns.id().unwrap_or(id).to_string(),
            name: ns.name().filter(|s| !s.is_empty()).map(str::to_string),
            description: ns.description().map(str::to_string),
            arn: ns.arn().filter(|s| !s.is_empty()).map(str::to_string),
        }))
    }

    /// Start deleting a namespace; returns the operation ID, if any
    pub async fn delete_namespace(&self, id: &str) -> Result<Option<String>, AwsError> {
        info!(namespace_id = %id, "Deleting namespace");

        let output = self
            .client
            .delete_namespace()
            .id(id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output.operation_id().map(str::to_string))
    }

    /// Describe an asynchronous operation
    pub async fn get_operation(&self, operation_id: &str) -> Result<Option<Operation>, AwsError> {
        let output = self
            .client
            .get_operation()
            .operation_id(operation_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output.operation().map(|op| Operation {
            id: op.id().unwrap_or(operation_id).to_string(),
            status: op
                .status()
                .map(convert_status)
                .unwrap_or_else(|| OperationStatus::Other("UNKNOWN".to_string())),
            targets: op.targets().map(convert_targets).unwrap_or_default(),
            error_code: op.error_code().map(str::to_string),
            error_message: op.error_message().map(str::to_string),
        }))
    }

    /// List all tags on a resource
    pub async fn list_tags_for_resource(&self, arn: &str) -> Result<KeyValueTags, AwsError> {
        let output = self
            .client
            .list_tags_for_resource()
            .resource_arn(arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output
            .tags()
            .iter()
            .map(|t| (t.key(), t.value()))
            .collect())
    }

    /// Add or overwrite tags on a resource
    pub async fn tag_resource(&self, arn: &str, tags: KeyValueTags) -> Result<(), AwsError> {
        debug!(arn = %arn, count = tags.len(), "Tagging resource");

        self.client
            .tag_resource()
            .resource_arn(arn)
            .set_tags(Some(to_sdk_tags(&tags)?))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(())
    }

    /// Remove tags from a resource by key
    pub async fn untag_resource(&self, arn: &str, keys: Vec<String>) -> Result<(), AwsError> {
        debug!(arn = %arn, count = keys.len(), "Untagging resource");

        self.client
            .untag_resource()
            .resource_arn(arn)
            .set_tag_keys(Some(keys))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(())
    }
}

fn convert_status(status: &sdk::OperationStatus) -> OperationStatus {
    match status {
        sdk::OperationStatus::Submitted => OperationStatus::Submitted,
        sdk::OperationStatus::Pending => OperationStatus::Pending,
        sdk::OperationStatus::Success => OperationStatus::Success,
        sdk::OperationStatus::Fail => OperationStatus::Fail,
        other => OperationStatus::Other(other.as_str().to_string()),
    }
}

fn convert_targets(
    targets: &HashMap<sdk::OperationTargetType, String>,
) -> HashMap<OperationTargetType, String> {
    targets
        .iter()
        .filter_map(|(kind, id)| {
            let kind = match kind {
                sdk::OperationTargetType::Namespace => OperationTargetType::Namespace,
                sdk::OperationTargetType::Service => OperationTargetType::Service,
                sdk::OperationTargetType::Instance => OperationTargetType::Instance,
                _ => return None,
            };
            Some((kind, id.clone()))
        })
        .collect()
}
