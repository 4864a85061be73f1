//! Challenge reconciler
//!
//! The ChallengeReconciler is responsible for:
//! - Resolving the challenge zone to a provider domain id
//! - Locating an existing TXT record for the challenge
//! - Creating or deleting that record only when needed
//! - Committing the change in the same call
//!
//! ## Architecture
//!
//! ```text
//!                      ┌──────────────────────┐
//!  ChallengeDescriptor │ ChallengeReconciler  │
//!  ──────────────────▶ │  present / cleanup   │
//!                      └──────────────────────┘
//!                                 │
//!      ┌─────────────┬────────────┼─────────────┬─────────────┐
//!      ▼             ▼            ▼             ▼             │
//! ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌───────────┐        │
//! │ resolver │ │ locator  │ │ mutator  │ │ committer │        │
//! └──────────┘ └──────────┘ └──────────┘ └───────────┘        │
//!      │             │            │             │             │
//!      └─────────────┴────────────┴─────────────┴─────────────┘
//!                                 ▼
//!                        ┌──────────────┐
//!                        │ DnsProvider  │
//!                        └──────────────┘
//! ```
//!
//! ## Call Flow
//!
//! 1. Strip the trailing dot from the zone, resolve it to a domain id
//! 2. Derive the host (first FQDN label)
//! 3. Look for a TXT record with that host and the challenge key
//! 4. Present creates it if missing; CleanUp deletes it if found
//! 5. A mutation is always followed by exactly one commit
//!
//! Nothing is cached between calls and nothing is retried. The caller
//! retries whole operations.

pub mod committer;
pub mod locator;
pub mod mutator;
pub mod resolver;

use crate::challenge::ChallengeDescriptor;
use crate::config::ReconcilerConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DomainId, RecordId, RecordType};
use locator::SearchLimits;
use std::fmt;
use tracing::{debug, info};

/// Result of a successful Present or CleanUp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// The record was missing and has been created and committed
    Created,
    /// A matching record already existed (no-op)
    AlreadyPresent {
        /// The existing record
        record_id: RecordId,
    },
    /// The matching record has been deleted and the deletion committed
    Deleted {
        /// The deleted record
        record_id: RecordId,
    },
    /// No matching record existed (no-op)
    AlreadyAbsent,
}

impl ChallengeOutcome {
    /// Whether the call changed provider state
    pub fn is_mutation(&self) -> bool {
        matches!(self, ChallengeOutcome::Created | ChallengeOutcome::Deleted { .. })
    }
}

/// A staged mutation awaiting commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Creation of a TXT record for `host`
    Create {
        /// Record host
        host: String,
    },
    /// Deletion of a record
    Delete {
        /// Record being deleted
        record_id: RecordId,
    },
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Create { host } => write!(f, "create of TXT record '{}'", host),
            Mutation::Delete { record_id } => write!(f, "delete of record {}", record_id),
        }
    }
}

/// Where a challenge record lives, and whether it already exists
struct ChallengeTarget<'a> {
    domain_id: DomainId,
    host: &'a str,
    existing: Option<RecordId>,
}

/// ACME DNS-01 challenge reconciler
///
/// Owns one provider handle for its lifetime. Concurrent reconciliations
/// should each use their own reconciler (and provider instance).
///
/// ## Idempotency
///
/// Present and CleanUp may be called repeatedly with the same challenge.
/// Repeated calls find the committed state already converged and return a
/// no-op outcome without mutating or committing.
///
/// ## Failure
///
/// Every provider failure aborts the call with an error. A failed commit
/// after an accepted mutation is reported as
/// [`Error::InconsistentState`]; no compensating change is attempted.
pub struct ChallengeReconciler {
    /// DNS provider the records live in
    provider: Box<dyn DnsProvider>,

    /// TTL for created records
    record_ttl: u32,

    /// Page size for listings
    page_size: u32,

    /// Record pages scanned per lookup
    max_record_pages: u32,
}

impl ChallengeReconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `provider`: DNS provider implementation
    /// - `config`: reconciler settings
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)` if the settings are invalid
    pub fn new(provider: Box<dyn DnsProvider>, config: ReconcilerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            record_ttl: config.record_ttl,
            page_size: config.page_size,
            max_record_pages: config.max_record_pages,
        })
    }

    /// Create a reconciler with default settings (TTL 300, pages of 10)
    pub fn with_defaults(provider: Box<dyn DnsProvider>) -> Self {
        let config = ReconcilerConfig::default();
        Self {
            provider,
            record_ttl: config.record_ttl,
            page_size: config.page_size,
            max_record_pages: config.max_record_pages,
        }
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Ensure the challenge TXT record exists
    ///
    /// Creates and commits the record if no record with the same host and
    /// value exists; otherwise does nothing.
    pub async fn present(&self, challenge: &ChallengeDescriptor) -> Result<ChallengeOutcome> {
        info!(
            "Presenting challenge record {} in zone {} [provider: {}]",
            challenge.fqdn,
            challenge.zone,
            self.provider_name()
        );

        let target = self.locate(challenge).await?;

        if let Some(record_id) = target.existing {
            info!(
                "Challenge record already present: {} (record {})",
                challenge.fqdn, record_id
            );
            return Ok(ChallengeOutcome::AlreadyPresent { record_id });
        }

        mutator::create_record(
            self.provider.as_ref(),
            target.domain_id,
            target.host,
            RecordType::Txt,
            &challenge.key,
            self.record_ttl,
        )
        .await?;

        self.commit_after(
            target.domain_id,
            Mutation::Create {
                host: target.host.to_string(),
            },
        )
        .await?;

        info!("Challenge record presented: {}", challenge.fqdn);
        Ok(ChallengeOutcome::Created)
    }

    /// Ensure the challenge TXT record is gone
    ///
    /// Deletes and commits only the record whose host and value match the
    /// challenge. Other records under the same host are left alone.
    pub async fn cleanup(&self, challenge: &ChallengeDescriptor) -> Result<ChallengeOutcome> {
        info!(
            "Cleaning up challenge record {} in zone {} [provider: {}]",
            challenge.fqdn,
            challenge.zone,
            self.provider_name()
        );

        let target = self.locate(challenge).await?;

        let Some(record_id) = target.existing else {
            info!("Challenge record already absent: {}", challenge.fqdn);
            return Ok(ChallengeOutcome::AlreadyAbsent);
        };

        mutator::delete_record(self.provider.as_ref(), target.domain_id, record_id).await?;

        self.commit_after(target.domain_id, Mutation::Delete { record_id })
            .await?;

        info!("Challenge record cleaned up: {} (record {})", challenge.fqdn, record_id);
        Ok(ChallengeOutcome::Deleted { record_id })
    }

    /// Shared first half of Present and CleanUp
    async fn locate<'a>(&self, challenge: &'a ChallengeDescriptor) -> Result<ChallengeTarget<'a>> {
        let domain_name = challenge.domain_name()?;
        let host = challenge.host()?;

        let domain_id = resolver::resolve_domain(self.provider.as_ref(), domain_name, self.page_size)
            .await?
            .ok_or_else(|| Error::domain_not_found(domain_name))?;

        let existing = locator::find_record(
            self.provider.as_ref(),
            domain_id,
            RecordType::Txt,
            host,
            &challenge.key,
            SearchLimits {
                page_size: self.page_size,
                max_pages: self.max_record_pages,
            },
        )
        .await?;

        debug!(
            "Challenge {} resolved to domain {} host {} (existing: {:?})",
            challenge.fqdn, domain_id, host, existing
        );

        Ok(ChallengeTarget {
            domain_id,
            host,
            existing,
        })
    }

    /// Commit a staged mutation, reporting a failure as inconsistent state
    async fn commit_after(&self, domain_id: DomainId, mutation: Mutation) -> Result<()> {
        committer::commit(self.provider.as_ref(), domain_id)
            .await
            .map_err(|e| Error::inconsistent_state(domain_id, mutation, e))
    }
}
