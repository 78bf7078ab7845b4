//! Waiting on asynchronous Cloud Map operations
//!
//! Namespace create and delete calls return an operation ID instead of a
//! result. [`wait_for_operation`] polls `GetOperation` until the operation
//! reaches a terminal status.

use crate::aws::error::AwsError;
use crate::aws::servicediscovery::{Operation, OperationStatus, ServiceDiscoveryOperations};
use crate::wait::{WaitConfig, WaitError, wait_for};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Why an operation did not reach `SUCCESS`
#[derive(Debug, Error)]
pub enum OperationWaitError {
    #[error("Operation {operation_id} failed ({code}): {message}")]
    Failed {
        operation_id: String,
        code: String,
        message: String,
    },

    #[error("Operation {operation_id} reported unexpected status {status}")]
    UnexpectedStatus {
        operation_id: String,
        status: String,
    },

    #[error("Operation {operation_id} returned no operation record")]
    Missing { operation_id: String },

    #[error("Failed to describe operation {operation_id}")]
    Describe {
        operation_id: String,
        #[source]
        source: AwsError,
    },

    #[error("Timed out after {timeout:?} waiting for operation {operation_id} ({attempts} polls)")]
    Timeout {
        operation_id: String,
        timeout: Duration,
        attempts: u32,
    },

    #[error("Wait for operation {operation_id} cancelled")]
    Cancelled { operation_id: String },
}

impl OperationWaitError {
    pub fn operation_id(&self) -> &str {
        match self {
            OperationWaitError::Failed { operation_id, .. }
            | OperationWaitError::UnexpectedStatus { operation_id, .. }
            | OperationWaitError::Missing { operation_id }
            | OperationWaitError::Describe { operation_id, .. }
            | OperationWaitError::Timeout { operation_id, .. }
            | OperationWaitError::Cancelled { operation_id } => operation_id,
        }
    }

    /// Whether the operation's record was missing entirely
    pub fn is_missing(&self) -> bool {
        matches!(self, OperationWaitError::Missing { .. })
    }
}

/// Poll an operation until it succeeds.
///
/// `SUBMITTED` and `PENDING` keep polling. `SUCCESS` returns the operation,
/// `FAIL` returns its error code and message, and any other status is
/// rejected as unexpected.
pub async fn wait_for_operation<C: ServiceDiscoveryOperations>(
    client: &C,
    operation_id: &str,
    config: WaitConfig,
    cancel: Option<&CancellationToken>,
) -> Result<Operation, OperationWaitError> {
    info!(operation_id = %operation_id, timeout = ?config.timeout, "Waiting for operation");

    let result = wait_for(
        config,
        cancel,
        move || async move { check_operation(client, operation_id).await },
        operation_id,
    )
    .await;

    match result {
        Ok(op) => {
            info!(operation_id = %operation_id, "Operation succeeded");
            Ok(op)
        }
        Err(WaitError::Check { error, .. }) => Err(error),
        Err(WaitError::Timeout {
            timeout, attempts, ..
        }) => Err(OperationWaitError::Timeout {
            operation_id: operation_id.to_string(),
            timeout,
            attempts,
        }),
        Err(WaitError::Cancelled { .. }) => Err(OperationWaitError::Cancelled {
            operation_id: operation_id.to_string(),
        }),
    }
}

async fn check_operation<C: ServiceDiscoveryOperations>(
    client: &C,
    operation_id: &str,
) -> Result<Option<Operation>, OperationWaitError> {
    let op = client
        .get_operation(operation_id)
        .await
        .map_err(|source| OperationWaitError::Describe {
            operation_id: operation_id.to_string(),
            source,
        })?
        .ok_or_else(|| OperationWaitError::Missing {
            operation_id: operation_id.to_string(),
        })?;

    debug!(operation_id = %operation_id, status = %op.status, "Operation status");

    match &op.status {
        OperationStatus::Submitted | OperationStatus::Pending => Ok(None),
        OperationStatus::Success => Ok(Some(op)),
        OperationStatus::Fail => Err(OperationWaitError::Failed {
            operation_id: operation_id.to_string(),
            code: op.error_code.clone().unwrap_or_default(),
            message: op.error_message.clone().unwrap_or_default(),
        }),
        OperationStatus::Other(status) => Err(OperationWaitError::UnexpectedStatus {
            operation_id: operation_id.to_string(),
            status: status.clone(),
        }),
    }
}
