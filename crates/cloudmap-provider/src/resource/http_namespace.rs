//! Lifecycle controller for Cloud Map HTTP namespaces
//!
//! Drives one namespace through Create, Read, Update, Delete and Import.
//! Every operation is strictly sequential: remote call, wait for the
//! asynchronous operation if there is one, then the dependent call. The
//! controller keeps no state between calls; the caller owns the
//! [`ResourceState`] and persists it.

use crate::aws::error::{AwsError, NotFoundKind};
use crate::aws::operation::{OperationWaitError, wait_for_operation};
use crate::aws::servicediscovery::{
    CreateHttpNamespaceRequest, Operation, OperationTargetType, ServiceDiscoveryOperations,
};
use crate::aws::tags::{list_tags, update_tags};
use crate::resource::error::{NamespaceError, Stage};
use crate::resource::lifecycle::{NamespaceConfig, NamespaceRecord, ResourceState};
use crate::wait::WaitConfig;
use cloudmap_common::{IgnoreTagsConfig, KeyValueTags, validate_namespace_name};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Controller for a single HTTP namespace.
///
/// # Example
/// ```ignore
/// let client = ServiceDiscoveryClient::from_context(&aws);
/// let ns = HttpNamespaceResource::new(&client).with_ignore_tags(ignore);
/// let state = ns.create(&NamespaceConfig::new("my-ns")).await?;
/// ```
pub struct HttpNamespaceResource<'a, C> {
    client: &'a C,
    ignore_tags: IgnoreTagsConfig,
    wait: WaitConfig,
    cancel: Option<CancellationToken>,
}

impl<'a, C: ServiceDiscoveryOperations> HttpNamespaceResource<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            ignore_tags: IgnoreTagsConfig::default(),
            wait: WaitConfig::default(),
            cancel: None,
        }
    }

    /// Tags hidden from records produced by Read
    pub fn with_ignore_tags(mut self, ignore_tags: IgnoreTagsConfig) -> Self {
        self.ignore_tags = ignore_tags;
        self
    }

    pub fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Abort operation waits when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Create the namespace and read it back.
    pub async fn create(&self, config: &NamespaceConfig) -> Result<ResourceState, NamespaceError> {
        let id = self.provision(config).await?;
        self.import(&id).await
    }

    /// Create the namespace and return its ID without reading it.
    ///
    /// The name is validated before any remote call. A fresh idempotency
    /// token is generated per call, so a retried command never reuses one.
    pub async fn provision(&self, config: &NamespaceConfig) -> Result<String, NamespaceError> {
        let name = config.name.as_str();
        validate_namespace_name(name).map_err(|source| NamespaceError::InvalidName {
            name: name.to_string(),
            source,
        })?;

        let request = CreateHttpNamespaceRequest::new(name, Uuid::new_v4().to_string())
            .with_description(config.normalized_description().map(str::to_string))
            .with_tags(config.tags.clone().ignore_aws());

        let operation_id = self
            .client
            .create_http_namespace(request)
            .await
            .map_err(|source| NamespaceError::Create {
                name: name.to_string(),
                source,
            })?
            .ok_or_else(|| NamespaceError::MalformedResponse {
                stage: Stage::Create,
                resource: name.to_string(),
                detail: "creation response missing operation ID".to_string(),
            })?;

        let operation = self.wait_operation(&operation_id, name, Stage::Create).await?;

        let id = operation
            .target(OperationTargetType::Namespace)
            .ok_or_else(|| NamespaceError::MalformedResponse {
                stage: Stage::Create,
                resource: name.to_string(),
                detail: format!("operation {operation_id} response missing namespace ID"),
            })?
            .to_string();

        info!(namespace_id = %id, name = %name, "HTTP namespace created");
        Ok(id)
    }

    /// Read the namespace's current attributes and tags.
    ///
    /// A namespace that no longer exists is reported as [`ResourceState::Absent`].
    pub async fn read(&self, id: &str) -> Result<ResourceState, NamespaceError> {
        let namespace = match self.client.get_namespace(id).await {
            Ok(ns) => ns,
            Err(AwsError::NotFound {
                kind: NotFoundKind::Namespace,
                ..
            }) => {
                warn!(namespace_id = %id, "Namespace not found, removing from state");
                return Ok(ResourceState::Absent);
            }
            Err(source) => {
                return Err(NamespaceError::Read {
                    id: id.to_string(),
                    source,
                });
            }
        };

        let namespace = namespace.ok_or_else(|| NamespaceError::MalformedResponse {
            stage: Stage::Read,
            resource: id.to_string(),
            detail: "response missing namespace".to_string(),
        })?;

        let malformed = |detail: &str| NamespaceError::MalformedResponse {
            stage: Stage::Read,
            resource: id.to_string(),
            detail: detail.to_string(),
        };
        let arn = namespace
            .arn
            .ok_or_else(|| malformed("response missing namespace ARN"))?;
        let name = namespace
            .name
            .ok_or_else(|| malformed("response missing namespace name"))?;

        let tags = list_tags(self.client, &arn)
            .await
            .map_err(|source| NamespaceError::ListTags {
                arn: arn.clone(),
                source,
            })?
            .ignore_aws()
            .ignore_config(&self.ignore_tags);

        debug!(namespace_id = %id, tags = %tags, "Read namespace");

        Ok(ResourceState::Synced(NamespaceRecord {
            id: id.to_string(),
            name,
            description: namespace.description,
            arn,
            tags,
        }))
    }

    /// Bring the namespace's tags to `tags`, then read it back.
    ///
    /// Only tags are mutable in place. Nothing is sent when the tag set is
    /// unchanged. A failure between removing and adding tags is surfaced
    /// as is; the removals are not rolled back.
    pub async fn update(
        &self,
        prior: &NamespaceRecord,
        tags: &KeyValueTags,
    ) -> Result<ResourceState, NamespaceError> {
        let desired = tags.clone().ignore_aws();

        if prior.tags.diff(&desired).is_empty() {
            debug!(namespace_id = %prior.id, "Tags unchanged");
        } else {
            let diff = update_tags(self.client, &prior.arn, &prior.tags, &desired)
                .await
                .map_err(|source| NamespaceError::UpdateTags {
                    id: prior.id.clone(),
                    source,
                })?;
            info!(
                namespace_id = %prior.id,
                upserted = diff.upsert.len(),
                removed = diff.remove.len(),
                "Namespace tags updated"
            );
        }

        self.read(&prior.id).await
    }

    /// Delete the namespace.
    ///
    /// Deleting a namespace that is already gone succeeds, so repeated
    /// deletes are harmless.
    pub async fn delete(&self, id: &str) -> Result<(), NamespaceError> {
        let operation_id = match self.client.delete_namespace(id).await {
            Ok(op) => op,
            Err(AwsError::NotFound {
                kind: NotFoundKind::Namespace,
                ..
            }) => {
                info!(namespace_id = %id, "Namespace already deleted");
                return Ok(());
            }
            Err(source) => {
                return Err(NamespaceError::Delete {
                    id: id.to_string(),
                    source,
                });
            }
        };

        if let Some(operation_id) = operation_id {
            self.wait_operation(&operation_id, id, Stage::Delete).await?;
        }

        info!(namespace_id = %id, "HTTP namespace deleted");
        Ok(())
    }

    /// Adopt an existing namespace by ID.
    pub async fn import(&self, id: &str) -> Result<ResourceState, NamespaceError> {
        let state = ResourceState::Unsynced { id: id.to_string() };
        self.refresh(&state).await
    }

    /// Re-read whatever namespace `state` refers to.
    pub async fn refresh(&self, state: &ResourceState) -> Result<ResourceState, NamespaceError> {
        match state.id() {
            Some(id) => self.read(id).await,
            None => Ok(ResourceState::Absent),
        }
    }

    async fn wait_operation(
        &self,
        operation_id: &str,
        resource: &str,
        stage: Stage,
    ) -> Result<Operation, NamespaceError> {
        wait_for_operation(
            self.client,
            operation_id,
            self.wait.clone(),
            self.cancel.as_ref(),
        )
        .await
        .map_err(|source| match source {
            OperationWaitError::Missing { operation_id } => NamespaceError::MalformedResponse {
                stage,
                resource: resource.to_string(),
                detail: format!("operation {operation_id} response missing operation information"),
            },
            source => NamespaceError::OperationFailed {
                resource: resource.to_string(),
                stage,
                source,
            },
        })
    }
}
