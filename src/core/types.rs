use std::fmt;

use serde::{Deserialize, Serialize};

/// TTL applied to every validation record we publish.
pub const VALIDATION_RECORD_TTL: i64 = 300;

/// A single issuance attempt: the primary domain plus its alternative names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateRequest {
    /// Primary domain the certificate is issued for (e.g. "app.example.com")
    pub domain: String,
    /// Subject alternative names, in the order the caller supplied them.
    /// An empty list means the authority request carries no SAN field at all.
    pub alternative_names: Vec<String>,
}

impl CertificateRequest {
    pub fn new(domain: impl Into<String>, alternative_names: Vec<String>) -> Self {
        Self {
            domain: domain.into(),
            alternative_names,
        }
    }
}

/// Opaque certificate identifier (an ACM certificate ARN).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CertificateHandle(String);

impl CertificateHandle {
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertificateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Certificate status as reported by the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateStatus {
    PendingValidation,
    Issued,
    Inactive,
    Expired,
    ValidationTimedOut,
    Revoked,
    Failed,
    Unknown(String),
}

impl CertificateStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "PENDING_VALIDATION" => CertificateStatus::PendingValidation,
            "ISSUED" => CertificateStatus::Issued,
            "INACTIVE" => CertificateStatus::Inactive,
            "EXPIRED" => CertificateStatus::Expired,
            "VALIDATION_TIMED_OUT" => CertificateStatus::ValidationTimedOut,
            "REVOKED" => CertificateStatus::Revoked,
            "FAILED" => CertificateStatus::Failed,
            other => CertificateStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CertificateStatus::PendingValidation => "PENDING_VALIDATION",
            CertificateStatus::Issued => "ISSUED",
            CertificateStatus::Inactive => "INACTIVE",
            CertificateStatus::Expired => "EXPIRED",
            CertificateStatus::ValidationTimedOut => "VALIDATION_TIMED_OUT",
            CertificateStatus::Revoked => "REVOKED",
            CertificateStatus::Failed => "FAILED",
            CertificateStatus::Unknown(code) => code,
        }
    }

    /// Collapses the authority's status into our validation lifecycle.
    pub fn validation_state(&self) -> ValidationState {
        match self {
            CertificateStatus::PendingValidation => ValidationState::Pending,
            CertificateStatus::Issued => ValidationState::Validated,
            _ => ValidationState::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationState {
    Pending,
    Validated,
    Failed,
    TimedOut,
}

impl ValidationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ValidationState::Pending)
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValidationState::Pending => "PENDING",
            ValidationState::Validated => "VALIDATED",
            ValidationState::Failed => "FAILED",
            ValidationState::TimedOut => "TIMED_OUT",
        };
        f.write_str(label)
    }
}

/// A DNS record the authority wants published for one covered domain name.
/// Any field may still be missing while the authority is generating records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationChallenge {
    /// Domain name this challenge proves control of
    pub domain: String,
    pub record_type: Option<String>,
    pub record_name: Option<String>,
    pub record_value: Option<String>,
}

impl ValidationChallenge {
    pub fn is_ready(&self) -> bool {
        self.record_type.is_some() && self.record_name.is_some() && self.record_value.is_some()
    }
}

/// A hosted zone as listed by the DNS provider. `name` is fully qualified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DnsZone {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeAction {
    Upsert,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

/// One record-set change inside a DNS change batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordMutation {
    pub action: ChangeAction,
    pub name: String,
    pub record_type: String,
    pub value: String,
    pub ttl: i64,
}

/// What a completed run produced. Published records stay in place whatever the state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceOutcome {
    pub certificate_arn: CertificateHandle,
    pub zone: DnsZone,
    pub records: Vec<RecordMutation>,
    /// `Pending` when the run was asked not to wait for validation
    pub state: ValidationState,
}
