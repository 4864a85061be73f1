//! Core traits for the ACME DNS-01 reconciler
//!
//! This module defines the abstract interface every DNS provider backend
//! must follow, together with the provider-side data model.
//!
//! - [`DnsProvider`]: List domains/records, stage mutations, commit them
//! - [`DnsProviderFactory`]: Build providers from configuration

pub mod dns_provider;

pub use dns_provider::{
    DnsProvider, DnsProviderFactory, DnsRecord, Domain, DomainId, NewRecord, Page, PageRequest,
    RecordId, RecordType,
};
