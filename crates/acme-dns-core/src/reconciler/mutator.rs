//! Record mutation: stage creation or deletion of a single record

use crate::error::Result;
use crate::traits::{DnsProvider, DomainId, NewRecord, RecordId, RecordType};
use tracing::info;

/// Stage creation of one record
///
/// Not idempotent: callers check with the locator first.
pub async fn create_record(
    provider: &dyn DnsProvider,
    domain_id: DomainId,
    host: &str,
    record_type: RecordType,
    content: &str,
    ttl: u32,
) -> Result<()> {
    info!(
        "Creating {} record {} in domain {} (ttl: {})",
        record_type, host, domain_id, ttl
    );

    let record = NewRecord {
        host: host.to_string(),
        record_type,
        content: content.to_string(),
        ttl,
    };

    provider.create_records(domain_id, &[record]).await
}

/// Stage deletion of one record
///
/// A record that no longer exists is an error, not a no-op.
pub async fn delete_record(
    provider: &dyn DnsProvider,
    domain_id: DomainId,
    record_id: RecordId,
) -> Result<()> {
    info!("Deleting record {} in domain {}", record_id, domain_id);

    provider.delete_records(domain_id, &[record_id]).await
}
