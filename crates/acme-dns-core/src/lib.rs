// # acme-dns-core
//
// Core library for fulfilling ACME DNS-01 challenges against a remote DNS
// provider.
//
// ## Architecture Overview
//
// This library provides the record reconciliation core:
// - **ChallengeDescriptor**: The decoded challenge (zone, FQDN, key)
// - **DnsProvider**: Trait for listing domains/records and staging and
//   committing record changes via a provider API
// - **ChallengeReconciler**: Implements Present and CleanUp on top of the
//   domain resolver, record locator, record mutator and change committer
// - **ProviderRegistry**: Plugin-based registry for DNS providers
// - **MemoryProvider**: In-process provider with pending change sets
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Reconciliation logic is separate from provider APIs
// 2. **Idempotency**: Every call reads provider state fresh and only mutates when needed
// 3. **Commit Discipline**: Each mutation is followed by exactly one commit
// 4. **No Hidden Retries**: Failures surface as errors; the caller retries whole calls
// 5. **Library-First**: The binary is a thin shell around this crate

pub mod challenge;
pub mod config;
pub mod error;
pub mod memory;
pub mod reconciler;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use challenge::ChallengeDescriptor;
pub use config::{AcmeDnsConfig, ProviderConfig, ReconcilerConfig};
pub use error::{Error, Result};
pub use memory::MemoryProvider;
pub use reconciler::{ChallengeOutcome, ChallengeReconciler, Mutation};
pub use registry::ProviderRegistry;
pub use traits::{DnsProvider, DnsProviderFactory};
