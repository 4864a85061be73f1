// # Memory Provider
//
// In-process implementation of DnsProvider.
//
// ## Purpose
//
// Models a remote DNS provider without a network: domains, committed
// records, and a per-domain pending change set that only becomes visible
// to listings after `apply_changes`. Useful for local dry runs and as the
// backing store of the reconciler test suites.
//
// ## Provider Behavior Modelled
//
// - TXT content is stored wrapped in double quotes, like the remote API
// - Creates and deletes are staged per domain until committed
// - Deleting an unknown record id fails
// - Listings are paged with a reported page count
//
// ## Test Support
//
// - Every trait call is appended to an operation log (`calls()`)
// - `fail_next()` makes the next call of one operation fail once

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::traits::{
    DnsProvider, DnsProviderFactory, DnsRecord, Domain, DomainId, NewRecord, Page, PageRequest,
    RecordId, RecordType,
};
use crate::Error;

/// Provider operations, used to target failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `list_domains`
    ListDomains,
    /// `list_records`
    ListRecords,
    /// `create_records`
    CreateRecords,
    /// `delete_records`
    DeleteRecords,
    /// `apply_changes`
    ApplyChanges,
}

/// One recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// Domain listing
    ListDomains { name: String, page: u32 },
    /// Record listing
    ListRecords {
        domain_id: DomainId,
        record_type: RecordType,
        page: u32,
    },
    /// Staged creation
    CreateRecords {
        domain_id: DomainId,
        records: Vec<NewRecord>,
    },
    /// Staged deletion
    DeleteRecords {
        domain_id: DomainId,
        record_ids: Vec<RecordId>,
    },
    /// Commit
    ApplyChanges { domain_id: DomainId },
}

#[derive(Debug, Clone)]
enum PendingChange {
    Create(DnsRecord),
    Delete(RecordId),
}

#[derive(Debug, Default)]
struct Inner {
    domains: Vec<Domain>,
    records: Vec<DnsRecord>,
    pending: HashMap<DomainId, Vec<PendingChange>>,
    calls: Vec<ProviderCall>,
    failures: HashMap<Operation, String>,
    last_domain_id: i64,
    last_record_id: i64,
}

impl Inner {
    fn has_domain(&self, domain_id: DomainId) -> bool {
        self.domains.iter().any(|d| d.id == domain_id)
    }

    fn take_failure(&mut self, operation: Operation) -> Result<(), Error> {
        match self.failures.remove(&operation) {
            Some(message) => Err(Error::provider("memory", message)),
            None => Ok(()),
        }
    }

    fn next_record_id(&mut self) -> RecordId {
        self.last_record_id += 1;
        RecordId(self.last_record_id)
    }
}

/// Slice one page out of `items`
fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let size = request.size.max(1) as usize;
    let total_pages = items.len().div_ceil(size) as u32;
    let content = items
        .iter()
        .skip(request.page as usize * size)
        .take(size)
        .cloned()
        .collect();

    Page {
        content,
        total_pages,
    }
}

/// In-memory DNS provider
///
/// Cloning is cheap and clones share state, so a test can keep a handle
/// while the reconciler owns another.
///
/// # Example
///
/// ```rust,no_run
/// use acme_dns_core::memory::MemoryProvider;
/// use acme_dns_core::traits::{DnsProvider, PageRequest};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = MemoryProvider::new();
///     let domain_id = provider.add_domain("example.com").await;
///
///     let page = provider
///         .list_domains("example.com", PageRequest::first(10))
///         .await?;
///     assert_eq!(page.content[0].id, domain_id);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryProvider {
    /// Create a new provider with no domains
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding the given domains, with ids from 1 in order
    pub fn with_domains<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inner = Inner::default();
        for name in names {
            inner.last_domain_id += 1;
            inner.domains.push(Domain {
                id: DomainId(inner.last_domain_id),
                name: name.into(),
            });
        }

        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Register a domain and return its id
    ///
    /// Registering the same name twice yields two domains.
    pub async fn add_domain(&self, name: impl Into<String>) -> DomainId {
        let mut guard = self.inner.write().await;
        guard.last_domain_id += 1;
        let id = DomainId(guard.last_domain_id);
        guard.domains.push(Domain {
            id,
            name: name.into(),
        });
        id
    }

    /// Insert an already-committed TXT record, bypassing the change set
    pub async fn seed_txt_record(
        &self,
        domain_id: DomainId,
        host: impl Into<String>,
        value: &str,
        ttl: u32,
    ) -> RecordId {
        let mut guard = self.inner.write().await;
        let id = guard.next_record_id();
        guard.records.push(DnsRecord {
            id,
            domain_id,
            record_type: RecordType::Txt,
            host: host.into(),
            content: RecordType::Txt.stored_content(value),
            ttl,
        });
        id
    }

    /// Committed records under a domain
    pub async fn records(&self, domain_id: DomainId) -> Vec<DnsRecord> {
        let guard = self.inner.read().await;
        guard
            .records
            .iter()
            .filter(|r| r.domain_id == domain_id)
            .cloned()
            .collect()
    }

    /// Number of staged, uncommitted changes for a domain
    pub async fn pending_changes(&self, domain_id: DomainId) -> usize {
        let guard = self.inner.read().await;
        guard.pending.get(&domain_id).map_or(0, Vec::len)
    }

    /// All calls received so far, in order
    pub async fn calls(&self) -> Vec<ProviderCall> {
        self.inner.read().await.calls.clone()
    }

    /// Make the next call of `operation` fail with a provider error
    pub async fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        let mut guard = self.inner.write().await;
        guard.failures.insert(operation, message.into());
    }
}

#[async_trait]
impl DnsProvider for MemoryProvider {
    async fn list_domains(&self, name: &str, page: PageRequest) -> Result<Page<Domain>, Error> {
        let mut guard = self.inner.write().await;
        guard.calls.push(ProviderCall::ListDomains {
            name: name.to_string(),
            page: page.page,
        });
        guard.take_failure(Operation::ListDomains)?;

        let matching: Vec<Domain> = guard
            .domains
            .iter()
            .filter(|d| d.name.eq_ignore_ascii_case(name))
            .cloned()
            .collect();

        Ok(paginate(&matching, page))
    }

    async fn list_records(
        &self,
        domain_id: DomainId,
        record_type: RecordType,
        page: PageRequest,
    ) -> Result<Page<DnsRecord>, Error> {
        let mut guard = self.inner.write().await;
        guard.calls.push(ProviderCall::ListRecords {
            domain_id,
            record_type,
            page: page.page,
        });
        guard.take_failure(Operation::ListRecords)?;

        if !guard.has_domain(domain_id) {
            return Err(Error::not_found(format!("Domain not found: {}", domain_id)));
        }

        let matching: Vec<DnsRecord> = guard
            .records
            .iter()
            .filter(|r| r.domain_id == domain_id && r.record_type == record_type)
            .cloned()
            .collect();

        Ok(paginate(&matching, page))
    }

    async fn create_records(&self, domain_id: DomainId, records: &[NewRecord]) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.calls.push(ProviderCall::CreateRecords {
            domain_id,
            records: records.to_vec(),
        });
        guard.take_failure(Operation::CreateRecords)?;

        if !guard.has_domain(domain_id) {
            return Err(Error::not_found(format!("Domain not found: {}", domain_id)));
        }

        let mut staged = Vec::with_capacity(records.len());
        for record in records {
            let id = guard.next_record_id();
            staged.push(PendingChange::Create(DnsRecord {
                id,
                domain_id,
                record_type: record.record_type,
                host: record.host.clone(),
                content: record.record_type.stored_content(&record.content),
                ttl: record.ttl,
            }));
        }

        guard.pending.entry(domain_id).or_default().extend(staged);
        Ok(())
    }

    async fn delete_records(&self, domain_id: DomainId, record_ids: &[RecordId]) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.calls.push(ProviderCall::DeleteRecords {
            domain_id,
            record_ids: record_ids.to_vec(),
        });
        guard.take_failure(Operation::DeleteRecords)?;

        for record_id in record_ids {
            let exists = guard
                .records
                .iter()
                .any(|r| r.domain_id == domain_id && r.id == *record_id);
            if !exists {
                return Err(Error::not_found(format!(
                    "Record {} not found in domain {}",
                    record_id, domain_id
                )));
            }
        }

        guard
            .pending
            .entry(domain_id)
            .or_default()
            .extend(record_ids.iter().copied().map(PendingChange::Delete));
        Ok(())
    }

    async fn apply_changes(&self, domain_id: DomainId) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.calls.push(ProviderCall::ApplyChanges { domain_id });
        guard.take_failure(Operation::ApplyChanges)?;

        if !guard.has_domain(domain_id) {
            return Err(Error::not_found(format!("Domain not found: {}", domain_id)));
        }

        let changes = guard.pending.remove(&domain_id).unwrap_or_default();
        for change in changes {
            match change {
                PendingChange::Create(record) => guard.records.push(record),
                PendingChange::Delete(record_id) => guard.records.retain(|r| r.id != record_id),
            }
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for the in-memory provider
pub struct MemoryProviderFactory;

impl DnsProviderFactory for MemoryProviderFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>, Error> {
        match config {
            ProviderConfig::Memory { domains } => {
                tracing::warn!("Using in-memory DNS provider - no remote records will be changed");
                Ok(Box::new(MemoryProvider::with_domains(domains.iter().cloned())))
            }
            _ => Err(Error::config("Invalid config for memory provider")),
        }
    }
}
