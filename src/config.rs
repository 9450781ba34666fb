use std::time::Duration;

use log::warn;

use crate::issuance::flow::{
    DEFAULT_CHALLENGE_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_VALIDATION_TIMEOUT, WaitPolicy,
};

pub const PROFILE_ENV: &str = "ACM_FACTORY_PROFILE";
pub const DNS_PROFILE_ENV: &str = "ACM_FACTORY_DNS_PROFILE";
pub const REGION_ENV: &str = "ACM_FACTORY_REGION";
pub const POLL_INTERVAL_ENV: &str = "ACM_FACTORY_POLL_INTERVAL_SECS";
pub const TIMEOUT_ENV: &str = "ACM_FACTORY_TIMEOUT_SECS";
pub const CHALLENGE_TIMEOUT_ENV: &str = "ACM_FACTORY_CHALLENGE_TIMEOUT_SECS";

const DEFAULT_PROFILE: &str = "default";
const DEFAULT_REGION: &str = "us-east-1";

/// Process-level settings: which AWS profiles to use and how long to wait.
///
/// The certificate and the hosted zone may live in different accounts, so
/// each gets its own profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceSettings {
    pub profile: String,
    pub dns_profile: String,
    pub region: String,
    pub wait: WaitPolicy,
}

impl Default for IssuanceSettings {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE.to_string(),
            dns_profile: DEFAULT_PROFILE.to_string(),
            region: DEFAULT_REGION.to_string(),
            wait: WaitPolicy::default(),
        }
    }
}

impl IssuanceSettings {
    pub fn from_env() -> Self {
        Self {
            profile: resolve_string(PROFILE_ENV, DEFAULT_PROFILE),
            dns_profile: resolve_string(DNS_PROFILE_ENV, DEFAULT_PROFILE),
            region: resolve_string(REGION_ENV, DEFAULT_REGION),
            wait: WaitPolicy {
                wait_for_validation: true,
                poll_interval: resolve_secs(POLL_INTERVAL_ENV, DEFAULT_POLL_INTERVAL),
                validation_timeout: resolve_secs(TIMEOUT_ENV, DEFAULT_VALIDATION_TIMEOUT),
                challenge_timeout: resolve_secs(CHALLENGE_TIMEOUT_ENV, DEFAULT_CHALLENGE_TIMEOUT),
            },
        }
    }
}

fn resolve_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn resolve_secs(key: &str, default: Duration) -> Duration {
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => {
            warn!("[config] invalid {key} value '{raw}'; using {}s", default.as_secs());
            default
        }
        Ok(secs) => Duration::from_secs(secs),
    }
}
