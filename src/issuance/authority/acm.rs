use aws_sdk_acm::Client;
use aws_sdk_acm::error::DisplayErrorContext;
use aws_sdk_acm::types::ValidationMethod as AcmValidationMethod;
use log::debug;

use super::{
    CertificateAuthority, DescribeCertificateResponse, DomainValidationOption,
    RequestCertificateParams, RequestCertificateResponse, ResourceRecord, ValidationMethod,
};
use crate::issuance::error::ProviderError;
use crate::issuance::session::AwsSession;

/// AWS Certificate Manager client bound to one profile and region.
pub struct AcmCertificateAuthority {
    session: AwsSession,
    client: Client,
}

impl AcmCertificateAuthority {
    pub fn new(session: AwsSession) -> Self {
        let client = Client::new(session.config());
        Self { session, client }
    }
}

impl CertificateAuthority for AcmCertificateAuthority {
    fn request_certificate(
        &self,
        params: &RequestCertificateParams,
    ) -> Result<RequestCertificateResponse, ProviderError> {
        let method = match params.validation_method {
            ValidationMethod::Dns => AcmValidationMethod::Dns,
        };
        debug!(
            "[acm] RequestCertificate domain={} sans={:?} profile={}",
            params.domain_name,
            params.subject_alternative_names,
            self.session.profile()
        );

        let output = self
            .session
            .block_on(
                self.client
                    .request_certificate()
                    .domain_name(&params.domain_name)
                    .validation_method(method)
                    .set_subject_alternative_names(params.subject_alternative_names.clone())
                    .send(),
            )
            .map_err(|err| ProviderError::new(DisplayErrorContext(&err).to_string()))?;

        Ok(RequestCertificateResponse {
            certificate_arn: output.certificate_arn().map(str::to_string),
        })
    }

    fn describe_certificate(
        &self,
        certificate_arn: &str,
    ) -> Result<DescribeCertificateResponse, ProviderError> {
        let output = self
            .session
            .block_on(
                self.client
                    .describe_certificate()
                    .certificate_arn(certificate_arn)
                    .send(),
            )
            .map_err(|err| ProviderError::new(DisplayErrorContext(&err).to_string()))?;

        let Some(certificate) = output.certificate() else {
            return Ok(DescribeCertificateResponse::default());
        };

        let domain_validation_options = certificate
            .domain_validation_options()
            .iter()
            .map(|option| DomainValidationOption {
                domain_name: option.domain_name().to_string(),
                resource_record: option.resource_record().map(|record| ResourceRecord {
                    name: Some(record.name().to_string()),
                    record_type: Some(record.r#type().as_str().to_string()),
                    value: Some(record.value().to_string()),
                }),
            })
            .collect();

        Ok(DescribeCertificateResponse {
            status: certificate.status().map(|status| status.as_str().to_string()),
            domain_validation_options,
        })
    }
}
