//! AWS client modules for the provider
//!
//! This module provides:
//! - context: shared SDK configuration
//! - servicediscovery: Cloud Map namespace, operation and tag calls
//! - operation: waiting on asynchronous Cloud Map operations
//! - tags: tag synchronization against an ARN

pub mod context;
pub mod error;
pub mod operation;
pub mod servicediscovery;
pub mod tags;

pub use context::{AwsContext, FromAwsContext};
pub use servicediscovery::{ServiceDiscoveryClient, ServiceDiscoveryOperations};

// Error handling
pub use error::{AwsError, NotFoundKind, classify_aws_error, classify_sdk_error};

pub use operation::{OperationWaitError, wait_for_operation};
