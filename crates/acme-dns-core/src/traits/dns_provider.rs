// # DNS Provider Trait
//
// Defines the interface to a remote authoritative DNS provider API, as
// seen by the challenge reconciler.
//
// ## Implementations
//
// - NCLOUD Global DNS: `acme-dns-provider-ncloud` crate
// - In-process: `acme_dns_core::memory::MemoryProvider`
//
// ## Usage
//
// ```rust,ignore
// use acme_dns_core::traits::{DnsProvider, PageRequest};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let page = provider
//         .list_domains("example.com", PageRequest::first(10))
//         .await?;
//
//     for domain in page.content {
//         println!("{} -> {}", domain.name, domain.id);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;

/// Provider-assigned domain identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(pub i64);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Provider-assigned record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// DNS record type
///
/// Only TXT records are ever created or deleted by the reconciler. The other
/// variants exist so that provider listings can be represented faithfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
    /// CNAME record
    Cname,
    /// MX record
    Mx,
    /// NS record
    Ns,
    /// TXT record
    Txt,
}

impl RecordType {
    /// Wire name of the record type, as providers spell it
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Txt => "TXT",
        }
    }

    /// Parse a wire name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Some(RecordType::A),
            "AAAA" => Some(RecordType::Aaaa),
            "CNAME" => Some(RecordType::Cname),
            "MX" => Some(RecordType::Mx),
            "NS" => Some(RecordType::Ns),
            "TXT" => Some(RecordType::Txt),
            _ => None,
        }
    }

    /// How providers render a raw value of this type in listings
    ///
    /// TXT values come back wrapped in literal double quotes; other types
    /// are returned as written.
    pub fn stored_content(&self, value: &str) -> String {
        match self {
            RecordType::Txt => format!("\"{}\"", value),
            _ => value.to_string(),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A domain (zone) registered at the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    /// Provider-assigned id
    pub id: DomainId,
    /// Domain name without trailing dot
    pub name: String,
}

/// A committed DNS record as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Provider-assigned id
    pub id: RecordId,
    /// Owning domain
    pub domain_id: DomainId,
    /// Record type
    pub record_type: RecordType,
    /// Host within the domain (leftmost label of the FQDN)
    pub host: String,
    /// Provider's stored representation of the value.
    /// TXT values are wrapped in literal double quotes.
    pub content: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

/// Attributes of a record to create; the provider assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Host within the domain
    pub host: String,
    /// Record type
    pub record_type: RecordType,
    /// Raw value, unquoted
    pub content: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

/// A zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page index, starting at 0
    pub page: u32,
    /// Maximum number of entries per page
    pub size: u32,
}

impl PageRequest {
    /// The first page with the given size
    pub fn first(size: u32) -> Self {
        Self { page: 0, size }
    }

    /// The page following this one
    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            size: self.size,
        }
    }
}

/// One page of a provider listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Entries on this page, in provider order
    pub content: Vec<T>,
    /// Total number of pages the provider reports for the query
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// A page with no entries and no further pages
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
        }
    }

    /// Whether the provider has more pages after `request`
    pub fn has_next(&self, request: &PageRequest) -> bool {
        request.page + 1 < self.total_pages
    }
}

/// Trait for DNS provider implementations
///
/// Each method maps onto exactly one provider API call. Implementations
/// must not retry, cache, or decide whether a mutation is needed; those
/// decisions belong to the [`ChallengeReconciler`](crate::ChallengeReconciler).
///
/// # Pending changes
///
/// `create_records` and `delete_records` only stage changes. They become
/// visible to `list_records` (and to DNS resolvers) after
/// `apply_changes` for the same domain.
///
/// # Thread Safety
///
/// Implementations must be usable across async tasks. Concurrent
/// reconciliations are expected to hold separate provider instances.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List domains matching `name`
    ///
    /// A provider "not found" answer should be reported as
    /// [`Error::NotFound`](crate::Error::NotFound) or an empty page.
    async fn list_domains(
        &self,
        name: &str,
        page: PageRequest,
    ) -> Result<Page<Domain>, crate::Error>;

    /// List committed records of `record_type` under `domain_id`
    async fn list_records(
        &self,
        domain_id: DomainId,
        record_type: RecordType,
        page: PageRequest,
    ) -> Result<Page<DnsRecord>, crate::Error>;

    /// Stage creation of `records` under `domain_id`
    ///
    /// Not idempotent: staging the same record twice yields two records.
    async fn create_records(
        &self,
        domain_id: DomainId,
        records: &[NewRecord],
    ) -> Result<(), crate::Error>;

    /// Stage deletion of `record_ids` under `domain_id`
    ///
    /// Unknown ids are an error, not a no-op.
    async fn delete_records(
        &self,
        domain_id: DomainId,
        record_ids: &[RecordId],
    ) -> Result<(), crate::Error>;

    /// Commit all staged changes for `domain_id`
    async fn apply_changes(&self, domain_id: DomainId) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A boxed DnsProvider trait object
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
