use std::collections::HashSet;

use log::{debug, info};

use crate::core::types::{ChangeAction, RecordMutation, VALIDATION_RECORD_TTL, ValidationChallenge};

/// Turns validation challenges into UPSERT mutations, one per record name.
///
/// Challenges are processed in order and the first challenge seen for a
/// name wins; the change batch is order-sensitive, so the output order is
/// the input order. Challenges whose record is not populated yet are skipped.
pub fn plan_records(challenges: &[ValidationChallenge]) -> Vec<RecordMutation> {
    let mut names = HashSet::new();
    let mut changes = Vec::new();

    for challenge in challenges {
        let (Some(record_type), Some(name), Some(value)) = (
            challenge.record_type.as_deref(),
            challenge.record_name.as_deref(),
            challenge.record_value.as_deref(),
        ) else {
            debug!(
                "[records] Validation record for {} not available yet",
                challenge.domain
            );
            continue;
        };

        if !names.insert(name.to_string()) {
            debug!(
                "[records] {} already planned, skipping duplicate from {}",
                name, challenge.domain
            );
            continue;
        }

        info!("[records] Creating {} record for {}", record_type, name);
        changes.push(RecordMutation {
            action: ChangeAction::Upsert,
            name: name.to_string(),
            record_type: record_type.to_string(),
            value: value.to_string(),
            ttl: VALIDATION_RECORD_TTL,
        });
    }

    changes
}
