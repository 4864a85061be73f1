// # NCLOUD Global DNS Provider
//
// DnsProvider implementation for the NCLOUD (Naver Cloud Platform) Global
// DNS API.
//
// ## Behavior
//
// - One HTTP request per trait call, no retries, no caching
// - Every request signed with API Gateway signature v2
// - HTTP timeout of 30 seconds
// - HTTP status codes mapped to specific errors (401/403, 404, 429, 5xx)
// - Dry-run mode: listings are real, create/delete/apply are only logged
//
// ## Security Requirements
//
// - The secret key NEVER appears in logs or Debug output
// - Provider creation fails fast if either key is empty
//
// ## API Reference
//
// - List domains:   GET    `/ncpdns/domain?page=&size=&domainName=`
// - List records:   GET    `/ncpdns/record/{domainId}?page=&size=&recordType=`
// - Create records: POST   `/ncpdns/record/{domainId}` body `[{host,type,content,ttl}]`
// - Delete records: DELETE `/ncpdns/record/{domainId}` body `[id, ...]`
// - Apply changes:  PUT    `/ncpdns/record/apply/{domainId}`

pub mod signature;

use acme_dns_core::config::ProviderConfig;
use acme_dns_core::traits::{
    DnsProvider, DnsProviderFactory, DnsRecord, Domain, DomainId, NewRecord, Page, PageRequest,
    RecordId, RecordType,
};
use acme_dns_core::{Error, Result};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Production API base URL
pub const NCLOUD_DNS_API_BASE: &str = "https://globaldns.apigw.ntruss.com/dns/v1";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "ncloud";

/// Paged listing as returned by the API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse<T> {
    #[serde(default = "Vec::new")]
    content: Vec<T>,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct DomainEntry {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RecordEntry {
    id: i64,
    host: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
    #[serde(default)]
    ttl: u32,
}

#[derive(Debug, Serialize)]
struct CreateRecordRequest<'a> {
    host: &'a str,
    #[serde(rename = "type")]
    record_type: &'a str,
    content: &'a str,
    ttl: u32,
}

/// NCLOUD Global DNS provider
///
/// Stateless apart from its HTTP client. Pending changes live at NCLOUD
/// until `apply_changes` is called.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (domain and record listings)
/// - Log the intended POST/DELETE/PUT requests
/// - **NOT** stage or apply any change
pub struct NcloudProvider {
    /// IAM access key (sent in a header, not secret on its own)
    access_key: String,

    /// IAM secret key used for signing
    /// ⚠️ NEVER log this value
    secret_key: String,

    /// API base URL without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: listings only, no mutations
    dry_run: bool,
}

// Custom Debug implementation that hides the secret key
impl std::fmt::Debug for NcloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NcloudProvider")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl NcloudProvider {
    /// Create a new NCLOUD provider
    ///
    /// # Parameters
    ///
    /// - `access_key`: IAM access key
    /// - `secret_key`: IAM secret key
    /// - `api_base`: API base URL, defaults to [`NCLOUD_DNS_API_BASE`]
    /// - `dry_run`: If true, perform listings but skip mutations
    ///
    /// # Errors
    ///
    /// - `Error::Config` if a key is empty or the base URL is malformed
    /// - `Error::Http` if the HTTP client cannot be built
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        api_base: Option<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let access_key = access_key.into();
        let secret_key = secret_key.into();

        if access_key.is_empty() {
            return Err(Error::config("NCLOUD access key cannot be empty"));
        }
        if secret_key.is_empty() {
            return Err(Error::config("NCLOUD secret key cannot be empty"));
        }

        let api_base = api_base
            .unwrap_or_else(|| NCLOUD_DNS_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        Url::parse(&api_base)
            .map_err(|e| Error::config(format!("Invalid NCLOUD API base '{}': {}", api_base, e)))?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            access_key,
            secret_key,
            api_base,
            client,
            dry_run,
        })
    }

    /// Create a provider against the production API (live mode)
    pub fn new_live(access_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        Self::new(access_key, secret_key, None, false)
    }

    /// Create a provider against the production API (dry-run mode)
    pub fn new_dry_run(access_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        Self::new(access_key, secret_key, None, true)
    }

    /// Whether mutations are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.api_base, path))
            .map_err(|e| Error::config(format!("Invalid request URL for {}: {}", path, e)))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Sign and send one request, mapping non-success statuses to errors
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        context: &str,
    ) -> Result<reqwest::Response> {
        let timestamp = signature::timestamp_now();
        let uri = signature::request_uri(&url);
        let signed = signature::sign(
            &self.secret_key,
            &self.access_key,
            method.as_str(),
            &uri,
            &timestamp,
        )?;

        tracing::debug!("NCLOUD request: {} {}", method, uri);

        let mut request = self
            .client
            .request(method, url)
            .header(signature::HEADER_TIMESTAMP, &timestamp)
            .header(signature::HEADER_ACCESS_KEY, &self.access_key)
            .header(signature::HEADER_SIGNATURE, signed);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed during {}: {}", context, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        Err(status_error(status, &error_text, context))
    }

    /// GET a paged listing and convert its entries
    ///
    /// 204 No Content is an empty page. Entries for which `convert` returns
    /// `None` are dropped.
    async fn get_page<T, U>(
        &self,
        url: Url,
        context: &str,
        convert: impl FnMut(T) -> Option<U>,
    ) -> Result<Page<U>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.send(Method::GET, url, None, context).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Page::empty());
        }

        let listing: PageResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e)))?;

        Ok(Page {
            content: listing.content.into_iter().filter_map(convert).collect(),
            total_pages: listing.total_pages,
        })
    }
}

/// Map a non-success HTTP status to an error
fn status_error(status: StatusCode, error_text: &str, context: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "NCLOUD rejected credentials or signature during {}. Status: {}",
            context, status
        )),
        404 => Error::not_found(format!("{}: {} - {}", context, status, error_text)),
        429 => Error::rate_limited(format!(
            "NCLOUD rate limit exceeded during {}. Status: {}",
            context, status
        )),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!(
                "NCLOUD server error (transient) during {}: {} - {}",
                context, status, error_text
            ),
        ),
        _ => Error::provider(
            PROVIDER_NAME,
            format!("{} failed: {} - {}", context, status, error_text),
        ),
    }
}

#[async_trait]
impl DnsProvider for NcloudProvider {
    async fn list_domains(&self, name: &str, page: PageRequest) -> Result<Page<Domain>> {
        let url = self.url(
            "/ncpdns/domain",
            &[
                ("page", page.page.to_string()),
                ("size", page.size.to_string()),
                ("domainName", name.to_string()),
            ],
        )?;

        self.get_page(url, "domain lookup", |d: DomainEntry| {
            Some(Domain {
                id: DomainId(d.id),
                name: d.name,
            })
        })
        .await
    }

    async fn list_records(
        &self,
        domain_id: DomainId,
        record_type: RecordType,
        page: PageRequest,
    ) -> Result<Page<DnsRecord>> {
        let url = self.url(
            &format!("/ncpdns/record/{}", domain_id),
            &[
                ("page", page.page.to_string()),
                ("size", page.size.to_string()),
                ("recordType", record_type.as_str().to_string()),
            ],
        )?;

        self.get_page(url, "record lookup", |entry: RecordEntry| {
            let Some(entry_type) = RecordType::parse(&entry.record_type) else {
                tracing::debug!(
                    "Skipping record {} with unsupported type {}",
                    entry.id,
                    entry.record_type
                );
                return None;
            };

            Some(DnsRecord {
                id: RecordId(entry.id),
                domain_id,
                record_type: entry_type,
                host: entry.host,
                content: entry.content,
                ttl: entry.ttl,
            })
        })
        .await
    }

    async fn create_records(&self, domain_id: DomainId, records: &[NewRecord]) -> Result<()> {
        let url = self.url(&format!("/ncpdns/record/{}", domain_id), &[])?;
        let payload: Vec<CreateRecordRequest<'_>> = records
            .iter()
            .map(|r| CreateRecordRequest {
                host: &r.host,
                record_type: r.record_type.as_str(),
                content: &r.content,
                ttl: r.ttl,
            })
            .collect();
        let body = serde_json::to_value(&payload)?;

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would send POST request to {} with payload: {}", url, body);
            return Ok(());
        }

        self.send(Method::POST, url, Some(body), "record creation").await?;
        tracing::debug!("Staged {} record(s) in domain {}", records.len(), domain_id);
        Ok(())
    }

    async fn delete_records(&self, domain_id: DomainId, record_ids: &[RecordId]) -> Result<()> {
        let url = self.url(&format!("/ncpdns/record/{}", domain_id), &[])?;
        let ids: Vec<i64> = record_ids.iter().map(|id| id.0).collect();
        let body = serde_json::to_value(&ids)?;

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would send DELETE request to {} with payload: {}", url, body);
            return Ok(());
        }

        self.send(Method::DELETE, url, Some(body), "record deletion").await?;
        tracing::debug!("Staged deletion of {} record(s) in domain {}", ids.len(), domain_id);
        Ok(())
    }

    async fn apply_changes(&self, domain_id: DomainId) -> Result<()> {
        let url = self.url(&format!("/ncpdns/record/apply/{}", domain_id), &[])?;

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would send PUT request to {}", url);
            return Ok(());
        }

        self.send(Method::PUT, url, None, "change apply").await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating NCLOUD providers
pub struct NcloudFactory;

impl DnsProviderFactory for NcloudFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Ncloud {
                access_key,
                secret_key,
                api_base,
                dry_run,
            } => {
                if *dry_run {
                    tracing::warn!(
                        "NCLOUD provider running in DRY-RUN mode - no changes will be made"
                    );
                }

                Ok(Box::new(NcloudProvider::new(
                    access_key.clone(),
                    secret_key.clone(),
                    api_base.clone(),
                    *dry_run,
                )?))
            }
            _ => Err(Error::config("Invalid config for NCLOUD provider")),
        }
    }
}

/// Register the NCLOUD provider with a registry
///
/// # Example
///
/// ```rust
/// use acme_dns_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// acme_dns_provider_ncloud::register(&registry);
/// assert!(registry.has_provider("ncloud"));
/// ```
pub fn register(registry: &acme_dns_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(NcloudFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(access_key: &str, secret_key: &str) -> ProviderConfig {
        ProviderConfig::Ncloud {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            api_base: None,
            dry_run: false,
        }
    }

    #[test]
    fn test_factory_creation() {
        let provider = NcloudFactory.create(&config("AK", "SK"));
        assert_eq!(provider.unwrap().provider_name(), "ncloud");
    }

    #[test]
    fn test_factory_missing_secret() {
        let provider = NcloudFactory.create(&config("AK", ""));
        assert!(matches!(provider, Err(Error::Config(_))));
    }

    #[test]
    fn test_factory_rejects_other_config() {
        assert!(NcloudFactory.create(&ProviderConfig::default()).is_err());
    }

    #[test]
    fn test_dry_run_mode() {
        let provider_dry = NcloudProvider::new_dry_run("AK", "SK").unwrap();
        let provider_live = NcloudProvider::new_live("AK", "SK").unwrap();

        assert!(provider_dry.is_dry_run());
        assert!(!provider_live.is_dry_run());
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let provider =
            NcloudProvider::new("AK", "SK", Some("http://127.0.0.1:8080/".to_string()), false)
                .unwrap();
        let url = provider.url("/ncpdns/record/apply/42", &[]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/ncpdns/record/apply/42");
    }

    #[test]
    fn test_query_is_encoded() {
        let provider = NcloudProvider::new_live("AK", "SK").unwrap();
        let url = provider
            .url(
                "/ncpdns/domain",
                &[
                    ("page", "0".to_string()),
                    ("size", "10".to_string()),
                    ("domainName", "example.com".to_string()),
                ],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://globaldns.apigw.ntruss.com/dns/v1/ncpdns/domain?page=0&size=10&domainName=example.com"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "", "domain lookup"),
            Error::Authentication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "", "domain lookup"),
            Error::Authentication(_)
        ));
        assert!(status_error(StatusCode::NOT_FOUND, "", "record lookup").is_not_found());
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "", "change apply"),
            Error::RateLimited(_)
        ));

        let server = status_error(StatusCode::SERVICE_UNAVAILABLE, "busy", "change apply");
        assert!(server.is_transient());
        assert!(server.to_string().contains("transient"));

        let bad = status_error(StatusCode::BAD_REQUEST, "invalid host", "record creation");
        assert!(bad.to_string().contains("invalid host"));
    }

    #[test]
    fn test_secret_key_not_exposed_in_debug() {
        let provider = NcloudProvider::new_live("AK-visible", "secret_key_12345").unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("<REDACTED>"));
        assert!(debug_str.contains("NcloudProvider"));
    }

    #[test]
    fn test_record_entry_ignores_extra_fields() {
        let entry: RecordEntry = serde_json::from_value(serde_json::json!({
            "id": 7,
            "domainId": 42,
            "host": "_acme-challenge",
            "type": "TXT",
            "content": "\"abc123\"",
            "ttl": 300,
            "applyYn": "Y"
        }))
        .unwrap();

        assert_eq!(entry.id, 7);
        assert_eq!(entry.content, "\"abc123\"");
    }
}
