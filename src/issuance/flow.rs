use std::time::Duration;

use log::{debug, info, warn};

use crate::core::types::{
    CertificateHandle, CertificateRequest, IssuanceOutcome, ValidationChallenge, ValidationState,
};
use crate::domain::normalize_domain;

use super::authority::{CertificateAuthority, request_certificate, validation_challenges};
use super::dns_providers::{DnsProvider, publish};
use super::error::IssuanceError;
use super::records::plan_records;
use super::waiter::{Sleeper, ThreadSleeper, ValidationWaiter};
use super::zone::resolve_zone;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(600);
pub const DEFAULT_CHALLENGE_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a run waits on the authority, and whether it waits for validation at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub wait_for_validation: bool,
    pub poll_interval: Duration,
    pub validation_timeout: Duration,
    /// Upper bound on waiting for the authority to publish validation records.
    pub challenge_timeout: Duration,
}

impl WaitPolicy {
    /// Replaces a zero poll interval, which would stall both wait loops, with the default.
    pub fn sanitized(self) -> Self {
        if !self.poll_interval.is_zero() {
            return self;
        }
        warn!(
            "[issuance] Zero poll interval, using {}s",
            DEFAULT_POLL_INTERVAL.as_secs()
        );
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            ..self
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            wait_for_validation: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
            challenge_timeout: DEFAULT_CHALLENGE_TIMEOUT,
        }
    }
}

/// Requests a DNS-validated certificate and publishes its validation records
/// in the hosted zone of the primary domain.
///
/// Every step aborts the run on failure. Records already published are left
/// in place; they are plain UPSERTs and safe to submit again.
pub struct IssuanceFlow {
    authority: Box<dyn CertificateAuthority>,
    dns: Box<dyn DnsProvider>,
    sleeper: Box<dyn Sleeper>,
    policy: WaitPolicy,
}

impl IssuanceFlow {
    pub fn new(
        authority: Box<dyn CertificateAuthority>,
        dns: Box<dyn DnsProvider>,
        policy: WaitPolicy,
    ) -> Self {
        Self {
            authority,
            dns,
            sleeper: Box::new(ThreadSleeper),
            policy: policy.sanitized(),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn run(&self, request: &CertificateRequest) -> Result<IssuanceOutcome, IssuanceError> {
        let request = normalize_request(request)?;
        info!(
            "[issuance] Starting issuance for {} ({} alternative name(s))",
            request.domain,
            request.alternative_names.len()
        );

        let handle = request_certificate(self.authority.as_ref(), &request)?;
        let challenges = self.await_challenges(&handle)?;
        let zone = resolve_zone(self.dns.as_ref(), &request.domain)?;
        let records = plan_records(&challenges);
        publish(self.dns.as_ref(), &zone, &records)?;

        let state = if self.policy.wait_for_validation {
            ValidationWaiter::new(
                self.authority.as_ref(),
                self.sleeper.as_ref(),
                self.policy.poll_interval,
                self.policy.validation_timeout,
            )
            .wait_for_validation(&handle)?
        } else {
            info!("[issuance] Not waiting for validation of {}", handle);
            ValidationState::Pending
        };

        Ok(IssuanceOutcome {
            certificate_arn: handle,
            zone,
            records,
            state,
        })
    }

    /// The authority attaches validation records a few seconds after the
    /// request. Re-describe until every covered name has one, or until the
    /// challenge window closes; then go on with whatever is available.
    fn await_challenges(
        &self,
        handle: &CertificateHandle,
    ) -> Result<Vec<ValidationChallenge>, IssuanceError> {
        let mut elapsed = Duration::ZERO;
        loop {
            let challenges = validation_challenges(self.authority.as_ref(), handle)?;
            let ready = challenges.iter().filter(|c| c.is_ready()).count();

            if !challenges.is_empty() && ready == challenges.len() {
                debug!(
                    "[issuance] {} validation record(s) ready for {}",
                    ready, handle
                );
                return Ok(challenges);
            }

            if elapsed >= self.policy.challenge_timeout {
                if ready == 0 {
                    return Err(IssuanceError::ChallengesUnavailable {
                        handle: handle.to_string(),
                        timeout: self.policy.challenge_timeout,
                    });
                }
                warn!(
                    "[issuance] Only {} of {} validation record(s) available for {}",
                    ready,
                    challenges.len(),
                    handle
                );
                return Ok(challenges);
            }

            debug!(
                "[issuance] Waiting {}s for validation records of {} ({} of {} ready)",
                self.policy.poll_interval.as_secs(),
                handle,
                ready,
                challenges.len()
            );
            self.sleeper.sleep(self.policy.poll_interval);
            elapsed += self.policy.poll_interval;
        }
    }
}

fn normalize_request(request: &CertificateRequest) -> Result<CertificateRequest, IssuanceError> {
    let normalize = |name: &str| {
        normalize_domain(name).map_err(|err| IssuanceError::InvalidDomain {
            domain: name.to_string(),
            reason: err.to_string(),
        })
    };
    let domain = normalize(&request.domain)?;
    let alternative_names = request
        .alternative_names
        .iter()
        .map(|name| normalize(name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CertificateRequest::new(domain, alternative_names))
}
