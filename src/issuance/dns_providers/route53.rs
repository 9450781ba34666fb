use aws_sdk_route53::Client;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction as Route53ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet,
    RrType,
};
use log::debug;

use super::DnsProvider;
use crate::core::types::{ChangeAction, DnsZone, RecordMutation};
use crate::domain::fully_qualified;
use crate::issuance::error::ProviderError;
use crate::issuance::session::AwsSession;

const CHANGE_COMMENT: &str = "acm-factory certificate validation";

pub struct Route53DnsProvider {
    session: AwsSession,
    client: Client,
}

impl Route53DnsProvider {
    pub fn new(session: AwsSession) -> Self {
        let client = Client::new(session.config());
        Self { session, client }
    }

    /// Route 53 reports ids as `/hostedzone/Z123`; the bare id is what we carry around.
    fn bare_zone_id(id: &str) -> &str {
        id.rsplit('/').next().unwrap_or(id)
    }

    /// Route 53 stores TXT values as quoted character strings.
    fn format_record_value(record_type: &str, value: &str) -> String {
        if !record_type.eq_ignore_ascii_case("TXT") {
            return value.to_string();
        }
        let trimmed = value.trim();
        if trimmed.starts_with('"') && trimmed.ends_with('"') {
            trimmed.to_string()
        } else {
            format!("\"{}\"", trimmed.trim_matches('"'))
        }
    }

    fn build_change(mutation: &RecordMutation) -> Result<Change, ProviderError> {
        let action = match mutation.action {
            ChangeAction::Upsert => Route53ChangeAction::Upsert,
        };
        let value = Self::format_record_value(&mutation.record_type, &mutation.value);

        let record = ResourceRecord::builder()
            .value(value)
            .build()
            .map_err(|e| ProviderError::new(format!("Failed to build ResourceRecord: {e}")))?;

        let record_set = ResourceRecordSet::builder()
            .name(&mutation.name)
            .r#type(RrType::from(mutation.record_type.as_str()))
            .ttl(mutation.ttl)
            .resource_records(record)
            .build()
            .map_err(|e| ProviderError::new(format!("Failed to build ResourceRecordSet: {e}")))?;

        Change::builder()
            .action(action)
            .resource_record_set(record_set)
            .build()
            .map_err(|e| ProviderError::new(format!("Failed to build Change: {e}")))
    }
}

impl DnsProvider for Route53DnsProvider {
    fn list_zones(&self) -> Result<Vec<DnsZone>, ProviderError> {
        self.session.block_on(async {
            let mut zones = Vec::new();
            let mut paginator = self
                .client
                .list_hosted_zones()
                .into_paginator()
                .page_size(100)
                .send();

            while let Some(page) = paginator.next().await {
                let page =
                    page.map_err(|err| ProviderError::new(DisplayErrorContext(&err).to_string()))?;
                for zone in page.hosted_zones() {
                    zones.push(DnsZone {
                        id: Self::bare_zone_id(zone.id()).to_string(),
                        name: fully_qualified(zone.name()),
                    });
                }
            }

            debug!(
                "[route53] Listed {} hosted zone(s) with profile {}",
                zones.len(),
                self.session.profile()
            );
            Ok::<_, ProviderError>(zones)
        })
    }

    fn change_record_sets(
        &self,
        zone_id: &str,
        changes: &[RecordMutation],
    ) -> Result<(), ProviderError> {
        let changes = changes
            .iter()
            .map(Self::build_change)
            .collect::<Result<Vec<_>, _>>()?;

        let change_batch = ChangeBatch::builder()
            .comment(CHANGE_COMMENT)
            .set_changes(Some(changes))
            .build()
            .map_err(|e| ProviderError::new(format!("Failed to build ChangeBatch: {e}")))?;

        self.session
            .block_on(
                self.client
                    .change_resource_record_sets()
                    .hosted_zone_id(zone_id)
                    .change_batch(change_batch)
                    .send(),
            )
            .map_err(|err| ProviderError::new(DisplayErrorContext(&err).to_string()))?;

        debug!("[route53] Change batch accepted for zone {}", zone_id);
        Ok(())
    }
}
