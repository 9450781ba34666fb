use log::{info, warn};

use crate::core::types::{DnsZone, RecordMutation};

use super::error::{IssuanceError, ProviderError};

mod route53;

pub use route53::Route53DnsProvider;

/// DNS provider operations used by the issuance flow.
pub trait DnsProvider: Send + Sync {
    /// Lists every hosted zone visible to the account, in provider order.
    /// Zone names are returned fully qualified (with the trailing dot).
    fn list_zones(&self) -> Result<Vec<DnsZone>, ProviderError>;

    /// Applies all changes as one atomic batch: either every change lands or none does.
    fn change_record_sets(
        &self,
        zone_id: &str,
        changes: &[RecordMutation],
    ) -> Result<(), ProviderError>;
}

/// Submits the planned mutations to `zone` in a single change batch.
pub fn publish(
    provider: &dyn DnsProvider,
    zone: &DnsZone,
    mutations: &[RecordMutation],
) -> Result<(), IssuanceError> {
    if mutations.is_empty() {
        warn!("[publish] Nothing to publish in zone {}", zone.name);
        return Ok(());
    }

    for mutation in mutations {
        info!(
            "[publish] {} {} record for {}",
            mutation.action.as_str(),
            mutation.record_type,
            mutation.name
        );
    }

    provider
        .change_record_sets(&zone.id, mutations)
        .map_err(|err| IssuanceError::PublishRejected {
            zone_id: zone.id.clone(),
            zone_name: zone.name.clone(),
            detail: err.message,
        })?;

    info!(
        "[publish] Submitted {} change(s) to zone {} ({})",
        mutations.len(),
        zone.name,
        zone.id
    );
    Ok(())
}
