pub mod config;
pub mod core;
pub mod domain;
pub mod issuance;

use anyhow::{Context, Result};

use crate::config::IssuanceSettings;
use crate::core::types::{CertificateRequest, IssuanceOutcome};
use crate::issuance::IssuanceFlow;
use crate::issuance::authority::AcmCertificateAuthority;
use crate::issuance::dns_providers::Route53DnsProvider;
use crate::issuance::session::{AwsSession, shared_runtime};

/// Builds ACM and Route 53 clients from `settings` and runs one issuance.
pub fn run(settings: &IssuanceSettings, request: &CertificateRequest) -> Result<IssuanceOutcome> {
    let runtime = shared_runtime()?;
    let acm_session = AwsSession::load(runtime.clone(), &settings.profile, &settings.region);
    let dns_session = AwsSession::load(runtime, &settings.dns_profile, &settings.region);

    let flow = IssuanceFlow::new(
        Box::new(AcmCertificateAuthority::new(acm_session)),
        Box::new(Route53DnsProvider::new(dns_session)),
        settings.wait,
    );
    flow.run(request)
        .with_context(|| format!("Certificate issuance for {} failed", request.domain))
}
