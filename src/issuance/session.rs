use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use log::debug;
use tokio::runtime::Runtime;

/// Builds the runtime every SDK client in this process shares. Issuance is
/// strictly sequential, so a current-thread runtime is enough.
pub fn shared_runtime() -> Result<Arc<Runtime>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;
    Ok(Arc::new(runtime))
}

/// SDK configuration for one AWS profile plus the runtime used to drive it.
#[derive(Clone)]
pub struct AwsSession {
    runtime: Arc<Runtime>,
    config: SdkConfig,
    profile: String,
}

impl AwsSession {
    /// Resolves credentials lazily: an unknown profile surfaces on the first API call.
    pub fn load(runtime: Arc<Runtime>, profile: &str, region: &str) -> Self {
        debug!("[aws] Loading profile '{}' in {}", profile, region);
        let config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .profile_name(profile)
                .region(Region::new(region.to_string()))
                .load(),
        );
        Self {
            runtime,
            config,
            profile: profile.to_string(),
        }
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
