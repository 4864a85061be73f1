//! Record location: find an existing record by host and value

use crate::error::Result;
use crate::traits::{DnsProvider, DomainId, PageRequest, RecordId, RecordType};
use tracing::{debug, warn};

/// Paging limits for a record search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Entries per page
    pub page_size: u32,
    /// Pages scanned before giving up
    pub max_pages: u32,
}

/// Find the record of `record_type` under `domain_id` whose host equals
/// `host` and whose content equals `expected_value`
///
/// Content is compared against the provider's stored representation, so a
/// TXT value `abc` matches stored content `"abc"`. Pages are scanned in
/// order until a match, the last page, or `limits.max_pages`.
///
/// # Returns
///
/// - `Ok(Some(id))`: first matching record
/// - `Ok(None)`: no match in the scanned pages
/// - `Err(Error)`: transport or provider failure
pub async fn find_record(
    provider: &dyn DnsProvider,
    domain_id: DomainId,
    record_type: RecordType,
    host: &str,
    expected_value: &str,
    limits: SearchLimits,
) -> Result<Option<RecordId>> {
    debug!(
        "Looking up record: {} (type: {}) in domain {}",
        host, record_type, domain_id
    );

    let expected_content = record_type.stored_content(expected_value);
    let mut request = PageRequest::first(limits.page_size);
    let mut scanned = 0;

    loop {
        let page = provider.list_records(domain_id, record_type, request).await?;
        scanned += 1;

        if let Some(record) = page
            .content
            .iter()
            .find(|r| r.host == host && r.content == expected_content)
        {
            debug!("Found record ID: {}", record.id);
            return Ok(Some(record.id));
        }

        if !page.has_next(&request) {
            return Ok(None);
        }

        if scanned >= limits.max_pages {
            warn!(
                "Stopped scanning {} records of domain {} after {} of {} pages without a match",
                record_type, domain_id, scanned, page.total_pages
            );
            return Ok(None);
        }

        request = request.next();
    }
}
