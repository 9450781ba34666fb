use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::core::types::{CertificateHandle, ValidationState};

use super::authority::{CertificateAuthority, certificate_status};
use super::error::IssuanceError;
use super::flow::DEFAULT_POLL_INTERVAL;

/// Blocks the calling thread between polls. Injected so tests can run the
/// poll loops without real delay.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

enum Phase {
    Query,
    Sleep,
    Finished(ValidationState),
}

/// Polls a certificate at a fixed interval until the authority reports a
/// terminal status or the timeout elapses.
///
/// Elapsed time is the sum of nominal sleeps, not a wall clock, so a run can
/// overshoot `timeout` by up to one interval plus provider latency.
pub struct ValidationWaiter<'a> {
    authority: &'a dyn CertificateAuthority,
    sleeper: &'a dyn Sleeper,
    poll_interval: Duration,
    timeout: Duration,
}

impl<'a> ValidationWaiter<'a> {
    pub fn new(
        authority: &'a dyn CertificateAuthority,
        sleeper: &'a dyn Sleeper,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        // A zero interval would never advance `elapsed`.
        let poll_interval = if poll_interval.is_zero() {
            warn!(
                "[validation] Zero poll interval, using {}s",
                DEFAULT_POLL_INTERVAL.as_secs()
            );
            DEFAULT_POLL_INTERVAL
        } else {
            poll_interval
        };
        Self {
            authority,
            sleeper,
            poll_interval,
            timeout,
        }
    }

    /// Returns `Validated` or `Failed`. Running out of time while still
    /// pending is an error, not a state the caller has to inspect.
    pub fn wait_for_validation(
        &self,
        handle: &CertificateHandle,
    ) -> Result<ValidationState, IssuanceError> {
        let mut elapsed = Duration::ZERO;
        let mut attempt = 0u32;
        let mut phase = Phase::Query;

        loop {
            phase = match phase {
                Phase::Query => {
                    attempt += 1;
                    let status = certificate_status(self.authority, handle)?;
                    debug!(
                        "[validation] {} status {} (attempt {})",
                        handle,
                        status.as_str(),
                        attempt
                    );
                    let state = status.validation_state();
                    if state.is_terminal() {
                        Phase::Finished(state)
                    } else {
                        Phase::Sleep
                    }
                }
                Phase::Sleep => {
                    info!(
                        "[validation] {}: Waiting {}s for validation, {}s elapsed...",
                        handle,
                        self.poll_interval.as_secs(),
                        elapsed.as_secs()
                    );
                    self.sleeper.sleep(self.poll_interval);
                    elapsed += self.poll_interval;
                    if elapsed >= self.timeout {
                        Phase::Finished(ValidationState::TimedOut)
                    } else {
                        Phase::Query
                    }
                }
                Phase::Finished(ValidationState::TimedOut) => {
                    warn!(
                        "[validation] {} still pending after {}s (attempt {})",
                        handle,
                        elapsed.as_secs(),
                        attempt
                    );
                    return Err(IssuanceError::ValidationTimeout {
                        handle: handle.to_string(),
                        timeout: self.timeout,
                    });
                }
                Phase::Finished(state) => {
                    info!(
                        "[validation] {} finished as {} after {}s (attempt {})",
                        handle,
                        state,
                        elapsed.as_secs(),
                        attempt
                    );
                    return Ok(state);
                }
            };
        }
    }
}
