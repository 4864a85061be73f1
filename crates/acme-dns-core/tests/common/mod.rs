//! Test doubles and common utilities for reconciler contract tests
//!
//! The in-memory provider supplies realistic provider state (pending change
//! sets, quoted TXT content). The wrappers here add call counting and
//! always-failing behavior on top of it.

#![allow(dead_code)]

use acme_dns_core::error::{Error, Result};
use acme_dns_core::memory::MemoryProvider;
use acme_dns_core::traits::{
    DnsProvider, DnsRecord, Domain, DomainId, NewRecord, Page, PageRequest, RecordId, RecordType,
};
use acme_dns_core::{ChallengeDescriptor, ChallengeReconciler};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Zone used throughout the contract tests
pub const ZONE: &str = "example.com.";

/// FQDN used throughout the contract tests
pub const FQDN: &str = "_acme-challenge.example.com.";

/// Host derived from [`FQDN`]
pub const HOST: &str = "_acme-challenge";

/// A DnsProvider that counts calls per operation and delegates to a
/// shared MemoryProvider
pub struct CountingProvider {
    inner: MemoryProvider,
    list_call_count: Arc<AtomicUsize>,
    create_call_count: Arc<AtomicUsize>,
    delete_call_count: Arc<AtomicUsize>,
    apply_call_count: Arc<AtomicUsize>,
}

impl CountingProvider {
    pub fn new(inner: MemoryProvider) -> Self {
        Self {
            inner,
            list_call_count: Arc::new(AtomicUsize::new(0)),
            create_call_count: Arc::new(AtomicUsize::new(0)),
            delete_call_count: Arc::new(AtomicUsize::new(0)),
            apply_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a new CountingProvider that shares counters and state with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            inner: other.inner.clone(),
            list_call_count: Arc::clone(&other.list_call_count),
            create_call_count: Arc::clone(&other.create_call_count),
            delete_call_count: Arc::clone(&other.delete_call_count),
            apply_call_count: Arc::clone(&other.apply_call_count),
        }
    }

    /// Number of list_domains() plus list_records() calls
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Number of create_records() calls
    pub fn create_call_count(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    /// Number of delete_records() calls
    pub fn delete_call_count(&self) -> usize {
        self.delete_call_count.load(Ordering::SeqCst)
    }

    /// Number of apply_changes() calls
    pub fn apply_call_count(&self) -> usize {
        self.apply_call_count.load(Ordering::SeqCst)
    }

    /// The backing provider state
    pub fn memory(&self) -> &MemoryProvider {
        &self.inner
    }
}

#[async_trait::async_trait]
impl DnsProvider for CountingProvider {
    async fn list_domains(&self, name: &str, page: PageRequest) -> Result<Page<Domain>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.list_domains(name, page).await
    }

    async fn list_records(
        &self,
        domain_id: DomainId,
        record_type: RecordType,
        page: PageRequest,
    ) -> Result<Page<DnsRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.list_records(domain_id, record_type, page).await
    }

    async fn create_records(&self, domain_id: DomainId, records: &[NewRecord]) -> Result<()> {
        self.create_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.create_records(domain_id, records).await
    }

    async fn delete_records(&self, domain_id: DomainId, record_ids: &[RecordId]) -> Result<()> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_records(domain_id, record_ids).await
    }

    async fn apply_changes(&self, domain_id: DomainId) -> Result<()> {
        self.apply_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.apply_changes(domain_id).await
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }
}

/// A provider whose every call fails, counting attempts
pub struct FailingProvider {
    pub call_count: Arc<AtomicUsize>,
}

impl FailingProvider {
    pub fn new() -> Self {
        Self {
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Err(Error::http("Provider unavailable"))
    }
}

#[async_trait::async_trait]
impl DnsProvider for FailingProvider {
    async fn list_domains(&self, _name: &str, _page: PageRequest) -> Result<Page<Domain>> {
        self.fail()
    }

    async fn list_records(
        &self,
        _domain_id: DomainId,
        _record_type: RecordType,
        _page: PageRequest,
    ) -> Result<Page<DnsRecord>> {
        self.fail()
    }

    async fn create_records(&self, _domain_id: DomainId, _records: &[NewRecord]) -> Result<()> {
        self.fail()
    }

    async fn delete_records(&self, _domain_id: DomainId, _record_ids: &[RecordId]) -> Result<()> {
        self.fail()
    }

    async fn apply_changes(&self, _domain_id: DomainId) -> Result<()> {
        self.fail()
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

/// The standard challenge with the given key
pub fn challenge(key: &str) -> ChallengeDescriptor {
    ChallengeDescriptor::new(ZONE, FQDN, key)
}

/// A memory provider holding the test zone, plus its domain id
pub async fn provider_with_zone() -> (MemoryProvider, DomainId) {
    let provider = MemoryProvider::new();
    let domain_id = provider.add_domain("example.com").await;
    (provider, domain_id)
}

/// A reconciler with default settings sharing state with `provider`
pub fn reconciler_for(provider: &MemoryProvider) -> ChallengeReconciler {
    ChallengeReconciler::with_defaults(Box::new(provider.clone()))
}

/// Committed TXT records for `host` under `domain_id`
pub async fn txt_records(provider: &MemoryProvider, domain_id: DomainId, host: &str) -> Vec<DnsRecord> {
    provider
        .records(domain_id)
        .await
        .into_iter()
        .filter(|r| r.record_type == RecordType::Txt && r.host == host)
        .collect()
}
