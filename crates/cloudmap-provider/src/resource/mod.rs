//! The Cloud Map HTTP namespace resource
//!
//! - [`lifecycle`]: desired configuration, local record and resource state
//! - [`http_namespace`]: the Create/Read/Update/Delete/Import controller
//! - [`schema`]: attribute table, validation and the change planner
//! - [`error`]: typed lifecycle errors

pub mod error;
pub mod http_namespace;
pub mod lifecycle;
pub mod schema;

pub use error::{ErrorKind, NamespaceError, Stage};
pub use http_namespace::HttpNamespaceResource;
pub use lifecycle::{NamespaceConfig, NamespaceRecord, ResourceState};
pub use schema::{Plan, plan, validate};
