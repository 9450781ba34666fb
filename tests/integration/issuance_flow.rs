use std::time::Duration;

use acm_factory::core::types::{CertificateRequest, ChangeAction, ValidationState};
use acm_factory::issuance::authority::DescribeCertificateResponse;
use acm_factory::issuance::{IssuanceError, IssuanceFlow, WaitPolicy};

use super::fakes::{
    CERT_ARN, FakeAuthority, FakeDns, RecordingSleeper, cname_option, describe, pending_option,
};

fn policy(wait: bool) -> WaitPolicy {
    WaitPolicy {
        wait_for_validation: wait,
        poll_interval: Duration::from_secs(5),
        validation_timeout: Duration::from_secs(12),
        challenge_timeout: Duration::from_secs(10),
    }
}

fn flow(
    authority: &FakeAuthority,
    dns: &FakeDns,
    sleeper: &RecordingSleeper,
    wait: bool,
) -> IssuanceFlow {
    flow_with_policy(authority, dns, sleeper, policy(wait))
}

fn flow_with_policy(
    authority: &FakeAuthority,
    dns: &FakeDns,
    sleeper: &RecordingSleeper,
    policy: WaitPolicy,
) -> IssuanceFlow {
    IssuanceFlow::new(Box::new(authority.clone()), Box::new(dns.clone()), policy)
        .with_sleeper(Box::new(sleeper.clone()))
}

#[test]
fn shared_validation_name_publishes_one_upsert() {
    let options = vec![
        cname_option("app.example.com", "_val.app.example.com.", "_v.acm-validations.aws."),
        cname_option("app.example.com", "_val.app.example.com.", "_v.acm-validations.aws."),
    ];
    let authority = FakeAuthority::with_describes(vec![
        describe("PENDING_VALIDATION", options.clone()),
        describe("ISSUED", options),
    ]);
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let outcome = flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new("app.example.com", vec![]))
        .unwrap();

    assert_eq!(outcome.certificate_arn.as_str(), CERT_ARN);
    assert_eq!(outcome.zone.id, "Z1");
    assert_eq!(outcome.state, ValidationState::Validated);

    let batches = dns.batches();
    assert_eq!(batches.len(), 1);
    let (zone_id, changes) = &batches[0];
    assert_eq!(zone_id, "Z1");
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].action, ChangeAction::Upsert);
    assert_eq!(changes[0].name, "_val.app.example.com.");
    assert_eq!(changes[0].ttl, 300);
}

#[test]
fn request_without_alternative_names_omits_the_field() {
    let authority = FakeAuthority::with_describes(vec![describe(
        "ISSUED",
        vec![cname_option("example.com", "_a.example.com.", "_b.acm-validations.aws.")],
    )]);
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new("example.com", vec![]))
        .unwrap();

    let requests = authority.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].domain_name, "example.com");
    assert!(requests[0].subject_alternative_names.is_none());
}

#[test]
fn alternative_names_are_sent_and_all_records_published() {
    let authority = FakeAuthority::with_describes(vec![describe(
        "ISSUED",
        vec![
            cname_option("example.com", "_a.example.com.", "_x.acm-validations.aws."),
            cname_option("www.example.com", "_b.www.example.com.", "_y.acm-validations.aws."),
            cname_option("*.example.com", "_a.example.com.", "_x.acm-validations.aws."),
        ],
    )]);
    let dns = FakeDns::with_zones(&[("Z0", "otherexample.com."), ("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let outcome = flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new(
            "example.com",
            vec!["www.example.com".to_string(), "*.example.com".to_string()],
        ))
        .unwrap();

    let requests = authority.requests.lock().unwrap();
    assert_eq!(
        requests[0].subject_alternative_names,
        Some(vec!["www.example.com".to_string(), "*.example.com".to_string()])
    );
    let names: Vec<_> = outcome.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["_a.example.com.", "_b.www.example.com."]);
    assert_eq!(dns.records.lock().unwrap().len(), 2);
}

#[test]
fn pending_forever_times_out_after_three_polls() {
    let options = vec![cname_option("example.com", "_a.example.com.", "_x.acm-validations.aws.")];
    let authority = FakeAuthority::with_describes(vec![describe("PENDING_VALIDATION", options)]);
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let err = flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new("example.com", vec![]))
        .unwrap_err();

    match err {
        IssuanceError::ValidationTimeout { handle, timeout } => {
            assert_eq!(handle, CERT_ARN);
            assert_eq!(timeout, Duration::from_secs(12));
        }
        other => panic!("expected ValidationTimeout, got {other:?}"),
    }
    // One describe for the challenges, then polls at t=0, 5 and 10.
    assert_eq!(authority.describe_calls(), 4);
    // Records stay published after the failure.
    assert_eq!(dns.records.lock().unwrap().len(), 1);
}

#[test]
fn no_wait_returns_pending_after_publishing() {
    let authority = FakeAuthority::with_describes(vec![describe(
        "PENDING_VALIDATION",
        vec![cname_option("example.com", "_a.example.com.", "_x.acm-validations.aws.")],
    )]);
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let outcome = flow(&authority, &dns, &sleeper, false)
        .run(&CertificateRequest::new("example.com", vec![]))
        .unwrap();

    assert_eq!(outcome.state, ValidationState::Pending);
    assert_eq!(authority.describe_calls(), 1);
    assert_eq!(dns.batches().len(), 1);
    assert_eq!(sleeper.total(), Duration::ZERO);
}

#[test]
fn waits_for_late_validation_records() {
    let authority = FakeAuthority::with_describes(vec![
        describe("PENDING_VALIDATION", vec![]),
        describe("PENDING_VALIDATION", vec![pending_option("example.com")]),
        describe(
            "PENDING_VALIDATION",
            vec![cname_option("example.com", "_a.example.com.", "_x.acm-validations.aws.")],
        ),
        describe(
            "ISSUED",
            vec![cname_option("example.com", "_a.example.com.", "_x.acm-validations.aws.")],
        ),
    ]);
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let outcome = flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new("example.com", vec![]))
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.state, ValidationState::Validated);
    assert_eq!(sleeper.total(), Duration::from_secs(10));
}

#[test]
fn records_that_never_appear_abort_before_publishing() {
    let authority = FakeAuthority::with_describes(vec![describe(
        "PENDING_VALIDATION",
        vec![pending_option("example.com")],
    )]);
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let err = flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new("example.com", vec![]))
        .unwrap_err();

    assert!(matches!(err, IssuanceError::ChallengesUnavailable { .. }));
    assert!(dns.batches().is_empty());
    // Polls at t=0, 5 and 10 of the 10s window.
    assert_eq!(authority.describe_calls(), 3);
}

#[test]
fn partially_ready_records_are_published_after_the_window() {
    let authority = FakeAuthority::with_describes(vec![
        describe(
            "PENDING_VALIDATION",
            vec![
                cname_option("example.com", "_a.example.com.", "_x.acm-validations.aws."),
                pending_option("www.example.com"),
            ],
        ),
    ]);
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let outcome = flow(&authority, &dns, &sleeper, false)
        .run(&CertificateRequest::new(
            "example.com",
            vec!["www.example.com".to_string()],
        ))
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].name, "_a.example.com.");
}

#[test]
fn describe_without_certificate_details_is_malformed() {
    let authority = FakeAuthority::with_describes(vec![DescribeCertificateResponse::default()]);
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let err = flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new("example.com", vec![]))
        .unwrap_err();

    match err {
        IssuanceError::MalformedResponse {
            operation, target, ..
        } => {
            assert_eq!(operation, "DescribeCertificate");
            assert_eq!(target, CERT_ARN);
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
    assert_eq!(authority.describe_calls(), 1);
    assert_eq!(sleeper.total(), Duration::ZERO);
    assert!(dns.batches().is_empty());
}

#[test]
fn zero_poll_interval_still_reaches_the_timeout() {
    let options = vec![cname_option("example.com", "_a.example.com.", "_x.acm-validations.aws.")];
    let authority = FakeAuthority::with_describes(vec![describe("PENDING_VALIDATION", options)]);
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();
    let policy = WaitPolicy {
        poll_interval: Duration::ZERO,
        ..policy(true)
    };

    let err = flow_with_policy(&authority, &dns, &sleeper, policy)
        .run(&CertificateRequest::new("example.com", vec![]))
        .unwrap_err();

    assert!(matches!(err, IssuanceError::ValidationTimeout { .. }));
    // Falls back to the 5s default: polls at t=0, 5 and 10 of the 12s timeout.
    assert_eq!(authority.describe_calls(), 4);
    assert_eq!(sleeper.total(), Duration::from_secs(15));
}

#[test]
fn missing_zone_aborts_before_publishing() {
    let authority = FakeAuthority::with_describes(vec![describe(
        "PENDING_VALIDATION",
        vec![cname_option("app.example.com", "_a.app.example.com.", "_x.acm-validations.aws.")],
    )]);
    let dns = FakeDns::with_zones(&[("Z0", "com."), ("Z1", "myexample.com.")]);
    let sleeper = RecordingSleeper::default();

    let err = flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new("app.example.com", vec![]))
        .unwrap_err();

    match err {
        IssuanceError::ZoneNotFound { domain, zone_name } => {
            assert_eq!(domain, "app.example.com");
            assert_eq!(zone_name, "example.com.");
        }
        other => panic!("expected ZoneNotFound, got {other:?}"),
    }
    assert!(dns.batches().is_empty());
}

#[test]
fn rejected_request_stops_the_run() {
    let authority = FakeAuthority {
        reject_with: Some("InvalidDomainValidationOptionsException".to_string()),
        ..Default::default()
    };
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let err = flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new("example.com", vec![]))
        .unwrap_err();

    assert!(matches!(err, IssuanceError::RequestRejected { .. }));
    assert_eq!(authority.describe_calls(), 0);
}

#[test]
fn response_without_arn_is_malformed() {
    let authority = FakeAuthority {
        omit_arn: true,
        ..Default::default()
    };
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let err = flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new("example.com", vec![]))
        .unwrap_err();

    assert!(matches!(err, IssuanceError::MalformedResponse { .. }));
}

#[test]
fn provider_rejection_surfaces_as_publish_rejected() {
    let authority = FakeAuthority::with_describes(vec![describe(
        "PENDING_VALIDATION",
        vec![cname_option("example.com", "_a.example.com.", "_x.acm-validations.aws.")],
    )]);
    let dns = FakeDns {
        reject_with: Some("InvalidChangeBatch: conflicting record types".to_string()),
        ..FakeDns::with_zones(&[("Z1", "example.com.")])
    };
    let sleeper = RecordingSleeper::default();

    let err = flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new("example.com", vec![]))
        .unwrap_err();

    match err {
        IssuanceError::PublishRejected { zone_name, detail, .. } => {
            assert_eq!(zone_name, "example.com.");
            assert!(detail.contains("InvalidChangeBatch"));
        }
        other => panic!("expected PublishRejected, got {other:?}"),
    }
}

#[test]
fn explicit_validation_failure_is_returned_as_state() {
    let options = vec![cname_option("example.com", "_a.example.com.", "_x.acm-validations.aws.")];
    let authority = FakeAuthority::with_describes(vec![
        describe("PENDING_VALIDATION", options.clone()),
        describe("PENDING_VALIDATION", options.clone()),
        describe("FAILED", options),
    ]);
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let outcome = flow(&authority, &dns, &sleeper, true)
        .run(&CertificateRequest::new("example.com", vec![]))
        .unwrap();

    assert_eq!(outcome.state, ValidationState::Failed);
}

#[test]
fn rerunning_publication_is_idempotent() {
    let options = vec![cname_option("example.com", "_a.example.com.", "_x.acm-validations.aws.")];
    let authority = FakeAuthority::with_describes(vec![describe("ISSUED", options)]);
    let dns = FakeDns::with_zones(&[("Z1", "example.com.")]);
    let sleeper = RecordingSleeper::default();

    let request = CertificateRequest::new("example.com", vec![]);
    flow(&authority, &dns, &sleeper, true).run(&request).unwrap();
    let first = dns.records.lock().unwrap().clone();
    flow(&authority, &dns, &sleeper, true).run(&request).unwrap();
    let second = dns.records.lock().unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(dns.batches().len(), 2);
}
