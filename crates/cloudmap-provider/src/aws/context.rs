//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once and
//! creating service clients from the same config.

use crate::config::AwsConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;

/// Shared AWS configuration context for creating service clients.
///
/// # Example
/// ```ignore
/// let aws = AwsContext::new("us-east-1").await;
/// let sd = ServiceDiscoveryClient::from_context(&aws);
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
}

/// Construct a client wrapper from a loaded [`AwsContext`].
pub trait FromAwsContext: Sized {
    fn from_context(ctx: &AwsContext) -> Self;
}

impl AwsContext {
    /// Load AWS configuration for the specified region.
    ///
    /// Credentials come from the default provider chain: environment,
    /// shared config files, SSO, and instance/task roles.
    pub async fn new(region: &str) -> Self {
        Self::load(&AwsConfig {
            region: region.to_string(),
            profile: None,
            endpoint_url: None,
        })
        .await
    }

    /// Load AWS configuration with optional profile and endpoint overrides.
    ///
    /// An endpoint override points every client at a local emulator.
    pub async fn load(aws: &AwsConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(aws.region.clone()));

        if let Some(profile) = &aws.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(url) = &aws.endpoint_url {
            loader = loader.endpoint_url(url);
        }

        Self {
            config: Arc::new(loader.load().await),
            region: aws.region.clone(),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Create a Cloud Map (Service Discovery) client from this context.
    pub fn servicediscovery_client(&self) -> aws_sdk_servicediscovery::Client {
        aws_sdk_servicediscovery::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
