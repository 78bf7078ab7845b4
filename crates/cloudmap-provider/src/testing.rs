//! Test fixtures shared by the provider's unit tests.
//!
//! [`FakeServiceDiscovery`] is an in-memory Cloud Map that implements
//! [`ServiceDiscoveryOperations`]. Namespaces are created synchronously, and
//! operations report `PENDING` for a configurable number of polls before
//! settling on their final status.

use crate::aws::error::{AwsError, NotFoundKind};
use crate::aws::servicediscovery::{
    CreateHttpNamespaceRequest, NamespaceDescription, Operation, OperationStatus,
    OperationTargetType, ServiceDiscoveryOperations,
};
use crate::wait::WaitConfig;
use cloudmap_common::KeyValueTags;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

/// Build a tag map from literal pairs
pub fn test_tags(pairs: &[(&str, &str)]) -> KeyValueTags {
    pairs.iter().copied().collect()
}

/// Wait settings that keep paused-time tests short
pub fn fast_wait() -> WaitConfig {
    WaitConfig {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(100),
        timeout: Duration::from_secs(60),
        jitter: false,
    }
}

pub fn fake_arn(id: &str) -> String {
    format!("arn:aws:servicediscovery:us-east-1:123456789012:namespace/{id}")
}

#[derive(Debug, Clone)]
struct FakeNamespace {
    name: String,
    description: Option<String>,
    arn: String,
    tags: KeyValueTags,
}

#[derive(Debug, Clone)]
struct FakeOperation {
    final_status: OperationStatus,
    namespace_id: Option<String>,
    error_code: Option<String>,
    error_message: Option<String>,
    pending_polls: u32,
}

#[derive(Debug, Default)]
struct FakeState {
    namespaces: BTreeMap<String, FakeNamespace>,
    operations: HashMap<String, FakeOperation>,
    creator_requests: HashMap<String, String>,
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, AwsError>,
    next_namespace_id: Option<String>,
    id_counter: u32,
    pending_polls: u32,
    create_failure: Option<(String, String)>,
    create_without_operation_id: bool,
    operation_without_namespace_target: bool,
    delete_without_operation_id: bool,
    namespace_body_missing: bool,
    namespace_arn_missing: bool,
    delete_failure: Option<(String, String)>,
    last_create_request: Option<CreateHttpNamespaceRequest>,
}

impl FakeState {
    fn record(&mut self, call: &'static str) -> Result<(), AwsError> {
        *self.calls.entry(call).or_default() += 1;
        match self.failures.remove(call) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.id_counter += 1;
        format!("{prefix}-{:04}", self.id_counter)
    }

    fn add_operation(&mut self, op: FakeOperation) -> String {
        let id = self.next_id("op");
        self.operations.insert(id.clone(), op);
        id
    }

    fn namespace_by_arn(&mut self, arn: &str) -> Result<&mut FakeNamespace, AwsError> {
        self.namespaces
            .values_mut()
            .find(|ns| ns.arn == arn)
            .ok_or_else(|| AwsError::NotFound {
                kind: NotFoundKind::Resource,
                message: format!("Resource {arn} not found"),
            })
    }
}

/// In-memory stand-in for the Cloud Map API
#[derive(Debug, Default)]
pub struct FakeServiceDiscovery {
    state: Mutex<FakeState>,
}

impl FakeServiceDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Operations report `PENDING` this many times before their final status
    pub fn with_pending_polls(self, polls: u32) -> Self {
        self.state().pending_polls = polls;
        self
    }

    /// ID assigned to the next created namespace
    pub fn with_next_namespace_id(self, id: &str) -> Self {
        self.state().next_namespace_id = Some(id.to_string());
        self
    }

    /// Create operations end in `FAIL` with this code and message
    pub fn with_create_failure(self, code: &str, message: &str) -> Self {
        self.state().create_failure = Some((code.to_string(), message.to_string()));
        self
    }

    pub fn with_create_without_operation_id(self) -> Self {
        self.state().create_without_operation_id = true;
        self
    }

    pub fn with_operation_without_namespace_target(self) -> Self {
        self.state().operation_without_namespace_target = true;
        self
    }

    pub fn with_delete_without_operation_id(self) -> Self {
        self.state().delete_without_operation_id = true;
        self
    }

    /// `GetNamespace` succeeds but carries no namespace body
    pub fn with_namespace_body_missing(self) -> Self {
        self.state().namespace_body_missing = true;
        self
    }

    /// `GetNamespace` returns a namespace without an ARN
    pub fn with_namespace_arn_missing(self) -> Self {
        self.state().namespace_arn_missing = true;
        self
    }

    /// Delete operations end in `FAIL` with this code and message
    pub fn with_delete_failure(self, code: &str, message: &str) -> Self {
        self.state().delete_failure = Some((code.to_string(), message.to_string()));
        self
    }

    /// Make the next call to `call` fail with `err`
    pub fn fail_next(&self, call: &'static str, err: AwsError) {
        self.state().failures.insert(call, err);
    }

    /// Number of times `call` was made
    pub fn calls(&self, call: &str) -> usize {
        self.state().calls.get(call).copied().unwrap_or(0)
    }

    /// Total number of API calls made
    pub fn total_calls(&self) -> usize {
        self.state().calls.values().sum()
    }

    pub fn last_create_request(&self) -> Option<CreateHttpNamespaceRequest> {
        self.state().last_create_request.clone()
    }

    pub fn namespace_count(&self) -> usize {
        self.state().namespaces.len()
    }

    pub fn has_namespace(&self, id: &str) -> bool {
        self.state().namespaces.contains_key(id)
    }

    /// Insert a namespace directly; returns its ARN
    pub fn seed_namespace(&self, id: &str, name: &str, tags: KeyValueTags) -> String {
        let arn = fake_arn(id);
        self.state().namespaces.insert(
            id.to_string(),
            FakeNamespace {
                name: name.to_string(),
                description: None,
                arn: arn.clone(),
                tags,
            },
        );
        arn
    }

    /// Remove a namespace behind the controller's back
    pub fn delete_out_of_band(&self, id: &str) {
        self.state().namespaces.remove(id);
    }

    /// Insert an operation with the given final status; returns its ID
    pub fn seed_operation(&self, final_status: OperationStatus, namespace_id: Option<&str>) -> String {
        let mut state = self.state();
        let pending_polls = state.pending_polls;
        state.add_operation(FakeOperation {
            final_status,
            namespace_id: namespace_id.map(str::to_string),
            error_code: None,
            error_message: None,
            pending_polls,
        })
    }

    /// Insert an operation that ends in `FAIL`; returns its ID
    pub fn seed_failed_operation(&self, code: &str, message: &str) -> String {
        let mut state = self.state();
        let pending_polls = state.pending_polls;
        state.add_operation(FakeOperation {
            final_status: OperationStatus::Fail,
            namespace_id: None,
            error_code: Some(code.to_string()),
            error_message: Some(message.to_string()),
            pending_polls,
        })
    }
}

impl ServiceDiscoveryOperations for FakeServiceDiscovery {
    async fn create_http_namespace(
        &self,
        request: CreateHttpNamespaceRequest,
    ) -> Result<Option<String>, AwsError> {
        let mut state = self.state();
        state.record("create_http_namespace")?;
        state.last_create_request = Some(request.clone());

        if let Some(op_id) = state.creator_requests.get(&request.creator_request_id) {
            return Ok(Some(op_id.clone()));
        }
        if state.namespaces.values().any(|ns| ns.name == request.name) {
            return Err(AwsError::AlreadyExists {
                message: format!("Namespace {} already exists", request.name),
            });
        }

        let pending_polls = state.pending_polls;
        let op = match state.create_failure.clone() {
            Some((code, message)) => FakeOperation {
                final_status: OperationStatus::Fail,
                namespace_id: None,
                error_code: Some(code),
                error_message: Some(message),
                pending_polls,
            },
            None => {
                let id = match state.next_namespace_id.take() {
                    Some(id) => id,
                    None => state.next_id("ns"),
                };
                state.namespaces.insert(
                    id.clone(),
                    FakeNamespace {
                        name: request.name.clone(),
                        description: request.description.clone(),
                        arn: fake_arn(&id),
                        tags: request.tags.clone(),
                    },
                );
                FakeOperation {
                    final_status: OperationStatus::Success,
                    namespace_id: (!state.operation_without_namespace_target).then_some(id),
                    error_code: None,
                    error_message: None,
                    pending_polls,
                }
            }
        };

        let op_id = state.add_operation(op);
        state
            .creator_requests
            .insert(request.creator_request_id, op_id.clone());

        if state.create_without_operation_id {
            return Ok(None);
        }
        Ok(Some(op_id))
    }

    async fn get_namespace(&self, id: &str) -> Result<Option<NamespaceDescription>, AwsError> {
        let mut state = self.state();
        state.record("get_namespace")?;

        let ns = state.namespaces.get(id).ok_or_else(|| AwsError::NotFound {
            kind: NotFoundKind::Namespace,
            message: format!("Namespace {id} not found"),
        })?;

        if state.namespace_body_missing {
            return Ok(None);
        }
        Ok(Some(NamespaceDescription {
            id: id.to_string(),
            name: Some(ns.name.clone()),
            description: ns.description.clone(),
            arn: (!state.namespace_arn_missing).then(|| ns.arn.clone()),
        }))
    }

    async fn delete_namespace(&self, id: &str) -> Result<Option<String>, AwsError> {
        let mut state = self.state();
        state.record("delete_namespace")?;

        if !state.namespaces.contains_key(id) {
            return Err(AwsError::NotFound {
                kind: NotFoundKind::Namespace,
                message: format!("Namespace {id} not found"),
            });
        }

        let pending_polls = state.pending_polls;
        let op = match state.delete_failure.clone() {
            Some((code, message)) => FakeOperation {
                final_status: OperationStatus::Fail,
                namespace_id: Some(id.to_string()),
                error_code: Some(code),
                error_message: Some(message),
                pending_polls,
            },
            None => {
                state.namespaces.remove(id);
                FakeOperation {
                    final_status: OperationStatus::Success,
                    namespace_id: Some(id.to_string()),
                    error_code: None,
                    error_message: None,
                    pending_polls,
                }
            }
        };
        if state.delete_without_operation_id {
            return Ok(None);
        }
        Ok(Some(state.add_operation(op)))
    }

    async fn get_operation(&self, operation_id: &str) -> Result<Option<Operation>, AwsError> {
        let mut state = self.state();
        state.record("get_operation")?;

        let Some(op) = state.operations.get_mut(operation_id) else {
            return Ok(None);
        };

        let status = if op.pending_polls > 0 {
            op.pending_polls -= 1;
            OperationStatus::Pending
        } else {
            op.final_status.clone()
        };
        let settled = status == op.final_status;

        let mut targets = HashMap::new();
        if let Some(ns) = op.namespace_id.as_ref().filter(|_| settled) {
            targets.insert(OperationTargetType::Namespace, ns.clone());
        }

        Ok(Some(Operation {
            id: operation_id.to_string(),
            status,
            targets,
            error_code: op.error_code.clone().filter(|_| settled),
            error_message: op.error_message.clone().filter(|_| settled),
        }))
    }

    async fn list_tags_for_resource(&self, arn: &str) -> Result<KeyValueTags, AwsError> {
        let mut state = self.state();
        state.record("list_tags_for_resource")?;
        Ok(state.namespace_by_arn(arn)?.tags.clone())
    }

    async fn tag_resource(&self, arn: &str, tags: KeyValueTags) -> Result<(), AwsError> {
        let mut state = self.state();
        state.record("tag_resource")?;
        let ns = state.namespace_by_arn(arn)?;
        for (k, v) in tags {
            ns.tags.insert(k, v);
        }
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: Vec<String>) -> Result<(), AwsError> {
        let mut state = self.state();
        state.record("untag_resource")?;
        let ns = state.namespace_by_arn(arn)?;
        ns.tags = ns
            .tags
            .iter()
            .filter(|(k, _)| !keys.iter().any(|key| key == k))
            .collect();
        Ok(())
    }
}
