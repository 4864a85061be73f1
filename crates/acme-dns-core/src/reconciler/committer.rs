//! Change commit: make staged mutations of a domain take effect

use crate::error::Result;
use crate::traits::{DnsProvider, DomainId};
use tracing::info;

/// Apply all staged creates and deletes for `domain_id`
pub async fn commit(provider: &dyn DnsProvider, domain_id: DomainId) -> Result<()> {
    provider.apply_changes(domain_id).await?;

    info!("Committed pending record changes for domain {}", domain_id);
    Ok(())
}
