use log::info;

use crate::core::types::{
    CertificateHandle, CertificateRequest, CertificateStatus, ValidationChallenge,
};

use super::error::{IssuanceError, ProviderError};

mod acm;

pub use acm::AcmCertificateAuthority;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMethod {
    Dns,
}

/// Parameters of a single certificate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCertificateParams {
    pub domain_name: String,
    /// `None` omits the field from the call entirely, which the authority
    /// treats differently from an explicit empty list.
    pub subject_alternative_names: Option<Vec<String>>,
    pub validation_method: ValidationMethod,
}

#[derive(Debug, Clone, Default)]
pub struct RequestCertificateResponse {
    pub certificate_arn: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub name: Option<String>,
    pub record_type: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DomainValidationOption {
    pub domain_name: String,
    pub resource_record: Option<ResourceRecord>,
}

/// Raw describe payload. Required fields are checked by the callers below,
/// never by the adapter.
#[derive(Debug, Clone, Default)]
pub struct DescribeCertificateResponse {
    pub status: Option<String>,
    pub domain_validation_options: Vec<DomainValidationOption>,
}

/// Certificate authority operations used by the issuance flow.
pub trait CertificateAuthority: Send + Sync {
    fn request_certificate(
        &self,
        params: &RequestCertificateParams,
    ) -> Result<RequestCertificateResponse, ProviderError>;

    fn describe_certificate(
        &self,
        certificate_arn: &str,
    ) -> Result<DescribeCertificateResponse, ProviderError>;
}

/// Requests a DNS-validated certificate and returns its handle.
pub fn request_certificate(
    authority: &dyn CertificateAuthority,
    request: &CertificateRequest,
) -> Result<CertificateHandle, IssuanceError> {
    let subject_alternative_names = if request.alternative_names.is_empty() {
        None
    } else {
        Some(request.alternative_names.clone())
    };
    let params = RequestCertificateParams {
        domain_name: request.domain.clone(),
        subject_alternative_names,
        validation_method: ValidationMethod::Dns,
    };

    let response =
        authority
            .request_certificate(&params)
            .map_err(|err| IssuanceError::RequestRejected {
                domain: request.domain.clone(),
                detail: err.message,
            })?;

    let arn = response
        .certificate_arn
        .filter(|arn| !arn.trim().is_empty())
        .ok_or_else(|| IssuanceError::MalformedResponse {
            operation: "RequestCertificate",
            target: request.domain.clone(),
            detail: "response carried no certificate ARN".to_string(),
        })?;

    info!("[acm] Requested certificate {} for {}", arn, request.domain);
    Ok(CertificateHandle::new(arn))
}

fn describe(
    authority: &dyn CertificateAuthority,
    handle: &CertificateHandle,
) -> Result<DescribeCertificateResponse, IssuanceError> {
    authority
        .describe_certificate(handle.as_str())
        .map_err(|err| IssuanceError::ProviderCall {
            operation: "DescribeCertificate",
            target: handle.to_string(),
            detail: err.message,
        })
}

/// Queries the current status of a certificate.
pub fn certificate_status(
    authority: &dyn CertificateAuthority,
    handle: &CertificateHandle,
) -> Result<CertificateStatus, IssuanceError> {
    let response = describe(authority, handle)?;
    response
        .status
        .as_deref()
        .map(CertificateStatus::from_code)
        .ok_or_else(|| IssuanceError::MalformedResponse {
            operation: "DescribeCertificate",
            target: handle.to_string(),
            detail: "certificate status is missing".to_string(),
        })
}

/// Fetches the validation challenges currently attached to a certificate,
/// one per covered domain name, in the order the authority lists them.
pub fn validation_challenges(
    authority: &dyn CertificateAuthority,
    handle: &CertificateHandle,
) -> Result<Vec<ValidationChallenge>, IssuanceError> {
    let response = describe(authority, handle)?;
    // A payload without status carries no certificate at all, not an empty
    // option list that will fill in later.
    if response.status.is_none() {
        return Err(IssuanceError::MalformedResponse {
            operation: "DescribeCertificate",
            target: handle.to_string(),
            detail: "certificate details are missing".to_string(),
        });
    }
    Ok(response
        .domain_validation_options
        .into_iter()
        .map(|option| {
            let record = option.resource_record;
            ValidationChallenge {
                domain: option.domain_name,
                record_type: record.as_ref().and_then(|r| r.record_type.clone()),
                record_name: record.as_ref().and_then(|r| r.name.clone()),
                record_value: record.and_then(|r| r.value),
            }
        })
        .collect())
}
