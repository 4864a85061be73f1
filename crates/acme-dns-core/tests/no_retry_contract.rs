//! Architectural Contract Test: No Hidden Retries
//!
//! The reconciler performs every provider call at most once per operation.
//! Retrying is the caller's decision: the certificate-management control
//! plane re-invokes Present or CleanUp as a whole.
//!
//! Constraints verified:
//! - A failing provider is called exactly once, then the error surfaces
//! - Transient failures are classified so callers can decide to retry
//! - A retried call after a transient failure converges normally
//! - Independent reconcilers can run concurrently against one provider

mod common;

use acme_dns_core::memory::Operation;
use acme_dns_core::{ChallengeDescriptor, ChallengeOutcome, ChallengeReconciler, Error};
use common::*;
use std::sync::atomic::Ordering;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn failing_provider_is_called_once() {
    let provider = FailingProvider::new();
    let call_count = std::sync::Arc::clone(&provider.call_count);
    let reconciler = ChallengeReconciler::with_defaults(Box::new(provider));

    let err = assert_err!(reconciler.present(&challenge("abc123")).await);

    assert!(matches!(err, Error::Http(_)));
    assert_eq!(
        call_count.load(Ordering::SeqCst),
        1,
        "Reconciler must not retry: expected exactly 1 provider call"
    );
}

#[tokio::test]
async fn cleanup_failure_is_not_retried() {
    let provider = FailingProvider::new();
    let call_count = std::sync::Arc::clone(&provider.call_count);
    let reconciler = ChallengeReconciler::with_defaults(Box::new(provider));

    assert_err!(reconciler.cleanup(&challenge("abc123")).await);
    assert_eq!(call_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transient_errors_are_classified() {
    let (memory, _) = provider_with_zone().await;
    memory.fail_next(Operation::ListRecords, "HTTP 503").await;
    let reconciler = reconciler_for(&memory);

    let err = assert_err!(reconciler.present(&challenge("abc123")).await);

    assert!(err.is_transient(), "provider 5xx should be transient: {}", err);
    assert!(!Error::domain_not_found("example.com").is_transient());
    assert!(!Error::auth("bad signature").is_transient());
}

#[tokio::test]
async fn caller_retry_converges_after_transient_failure() {
    let (memory, domain_id) = provider_with_zone().await;
    memory.fail_next(Operation::CreateRecords, "HTTP 503").await;
    let reconciler = reconciler_for(&memory);

    assert_err!(reconciler.present(&challenge("abc123")).await);
    assert!(memory.records(domain_id).await.is_empty());

    let outcome = assert_ok!(reconciler.present(&challenge("abc123")).await);
    assert_eq!(outcome, ChallengeOutcome::Created);
    assert_eq!(txt_records(&memory, domain_id, HOST).await.len(), 1);
}

#[tokio::test]
async fn concurrent_reconcilers_for_different_hosts() {
    let (memory, domain_id) = provider_with_zone().await;

    let apex = {
        let reconciler = reconciler_for(&memory);
        tokio::spawn(async move {
            let challenge =
                ChallengeDescriptor::new(ZONE, "_acme-challenge.example.com.", "apex-key");
            reconciler.present(&challenge).await
        })
    };
    let www = {
        let reconciler = reconciler_for(&memory);
        tokio::spawn(async move {
            let challenge = ChallengeDescriptor::new(ZONE, "www.example.com.", "www-key");
            reconciler.present(&challenge).await
        })
    };

    assert_ok!(apex.await.unwrap());
    assert_ok!(www.await.unwrap());

    let records = memory.records(domain_id).await;
    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|r| r.host == HOST && r.content == "\"apex-key\""));
    assert!(records.iter().any(|r| r.host == "www" && r.content == "\"www-key\""));
    assert_eq!(memory.pending_changes(domain_id).await, 0);
}
