//! Domain resolution: zone name to provider domain id

use crate::error::Result;
use crate::traits::{DnsProvider, Domain, DomainId, PageRequest};
use tracing::{debug, warn};

/// Resolve a zone name (trailing dot already stripped) to a domain id
///
/// Only the first page is requested: the provider filters by exact name, so
/// a small page is enough.
///
/// # Returns
///
/// - `Ok(Some(id))`: the domain exists
/// - `Ok(None)`: the provider reports no such domain, either with an empty
///   listing or a "not found" answer
/// - `Err(Error)`: transport or provider failure
pub async fn resolve_domain(
    provider: &dyn DnsProvider,
    name: &str,
    page_size: u32,
) -> Result<Option<DomainId>> {
    debug!("Looking up domain ID for: {}", name);

    let page = match provider.list_domains(name, PageRequest::first(page_size)).await {
        Ok(page) => page,
        Err(e) if e.is_not_found() => {
            debug!("Provider {} reports no domain {}: {}", provider.provider_name(), name, e);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let domain_id = select_domain(name, &page.content).map(|domain| domain.id);
    if let Some(id) = domain_id {
        debug!("Found domain ID: {} -> {}", name, id);
    }

    Ok(domain_id)
}

/// Pick the domain to use out of a listing
///
/// With several entries the first one in provider order wins. That choice is
/// provisional: the provider gives no guarantee that duplicates cannot occur
/// or about their order.
fn select_domain<'a>(name: &str, domains: &'a [Domain]) -> Option<&'a Domain> {
    let first = domains.first()?;

    if domains.len() > 1 {
        warn!(
            "Domain lookup for {} matched {} entries ({}); using the first one (id {})",
            name,
            domains.len(),
            domains
                .iter()
                .map(|d| format!("{}={}", d.name, d.id))
                .collect::<Vec<_>>()
                .join(", "),
            first.id
        );
    }

    Some(first)
}
