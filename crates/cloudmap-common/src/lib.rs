//! cloudmap-common - Shared types and utilities
//!
//! This crate holds the pieces of the Cloud Map namespace provider that do
//! not need the AWS SDK, so they can be tested and reused in isolation.
//!
//! ## Modules
//!
//! - [`defaults`]: Default configuration values
//! - [`naming`]: HTTP namespace name validation
//! - [`tags`]: Key/value tag maps, ignore rules and tag diffs

pub mod defaults;
pub mod naming;
pub mod tags;

// Re-export commonly used types
pub use naming::{NameError, validate_namespace_name};
pub use tags::{IgnoreTagsConfig, KeyValueTags, TagDiff, TagParseError};
