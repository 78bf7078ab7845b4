//! Configuration types for the provider

use crate::wait::WaitConfig;
use cloudmap_common::IgnoreTagsConfig;
use cloudmap_common::defaults::{DEFAULT_OPERATION_TIMEOUT_SECS, DEFAULT_REGION};
use std::path::PathBuf;
use std::time::Duration;

/// AWS connection settings
#[derive(Debug, Clone)]
pub struct AwsConfig {
    /// AWS region
    pub region: String,
    /// AWS profile name (overrides default credential resolution)
    pub profile: Option<String>,
    /// Endpoint override, e.g. a local emulator
    pub endpoint_url: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            profile: None,
            endpoint_url: None,
        }
    }
}

/// Provider-wide settings shared by every lifecycle operation
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub aws: AwsConfig,
    /// Tags hidden from the local record
    pub ignore_tags: IgnoreTagsConfig,
    /// How long to wait for an asynchronous operation
    pub operation_timeout: Duration,
    /// State database path; the platform data directory when unset
    pub state_path: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            aws: AwsConfig::default(),
            ignore_tags: IgnoreTagsConfig::default(),
            operation_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
            state_path: None,
        }
    }
}

impl ProviderConfig {
    pub fn region(&self) -> &str {
        &self.aws.region
    }

    /// Operation waiter settings derived from the configured timeout
    pub fn wait_config(&self) -> WaitConfig {
        WaitConfig::with_timeout(self.operation_timeout)
    }
}
