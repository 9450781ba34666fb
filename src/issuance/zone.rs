use log::{info, warn};

use crate::core::types::DnsZone;
use crate::domain::{fully_qualified, registrable_root};

use super::dns_providers::DnsProvider;
use super::error::IssuanceError;

/// Resolves the hosted zone that owns `domain`.
///
/// The zone must be named exactly after the registrable root of `domain`
/// (`www.example.com` needs `example.com.`); zones for other suffixes or
/// parent suffixes never match. When the provider lists several zones with
/// that name, the first one listed is used.
pub fn resolve_zone(provider: &dyn DnsProvider, domain: &str) -> Result<DnsZone, IssuanceError> {
    let root = registrable_root(domain).map_err(|err| IssuanceError::InvalidDomain {
        domain: domain.to_string(),
        reason: err.to_string(),
    })?;
    let wanted = fully_qualified(&root);

    let zones = provider
        .list_zones()
        .map_err(|err| IssuanceError::ProviderCall {
            operation: "ListHostedZones",
            target: domain.to_string(),
            detail: err.message,
        })?;

    let mut matches = zones
        .into_iter()
        .filter(|zone| fully_qualified(&zone.name) == wanted);

    let zone = matches.next().ok_or_else(|| IssuanceError::ZoneNotFound {
        domain: domain.to_string(),
        zone_name: wanted.clone(),
    })?;

    let extra = matches.count();
    if extra > 0 {
        warn!(
            "[zone] {} additional zone(s) named {}; using the first listed ({})",
            extra, wanted, zone.id
        );
    }

    info!("[zone] Hosted zone for {}: {} ({})", domain, zone.name, zone.id);
    Ok(zone)
}
