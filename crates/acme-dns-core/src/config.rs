//! Configuration types for the ACME DNS-01 reconciler
//!
//! This module defines all configuration structures used throughout the crate.
//! Decoding (environment, files, webhook payloads) happens outside the core;
//! these types only carry already-decoded values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcmeDnsConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Optional reconciler settings
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

impl AcmeDnsConfig {
    /// Create a new configuration for a provider with default reconciler settings
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            reconciler: ReconcilerConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.reconciler.validate()?;

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// NCLOUD Global DNS provider
    Ncloud {
        /// API access key id
        access_key: String,
        /// API secret key
        secret_key: String,
        /// API base URL override (defaults to the public API gateway)
        #[serde(default)]
        api_base: Option<String>,
        /// Perform lookups but skip mutations and commits
        #[serde(default)]
        dry_run: bool,
    },

    /// In-process provider with no remote side
    Memory {
        /// Domains present from the start
        #[serde(default)]
        domains: Vec<String>,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Ncloud {
                access_key,
                secret_key,
                api_base,
                ..
            } => {
                if access_key.is_empty() {
                    return Err(crate::Error::config("NCLOUD access key cannot be empty"));
                }
                if secret_key.is_empty() {
                    return Err(crate::Error::config("NCLOUD secret key cannot be empty"));
                }
                if let Some(base) = api_base
                    && !base.starts_with("https://")
                    && !base.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "NCLOUD API base must be an HTTP(S) URL. Got: {}",
                        base
                    )));
                }
                Ok(())
            }
            ProviderConfig::Memory { domains } => {
                if domains.iter().any(|d| d.is_empty()) {
                    return Err(crate::Error::config("Memory provider domain names cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Ncloud { .. } => "ncloud",
            ProviderConfig::Memory { .. } => "memory",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Memory {
            domains: Vec::new(),
        }
    }
}

// Keys stay out of logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Ncloud {
                access_key,
                api_base,
                dry_run,
                ..
            } => f
                .debug_struct("Ncloud")
                .field("access_key", access_key)
                .field("secret_key", &"<REDACTED>")
                .field("api_base", api_base)
                .field("dry_run", dry_run)
                .finish(),
            ProviderConfig::Memory { domains } => f
                .debug_struct("Memory")
                .field("domains", domains)
                .finish(),
            ProviderConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}

/// Reconciler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// TTL in seconds for created challenge records
    #[serde(default = "default_record_ttl")]
    pub record_ttl: u32,

    /// Page size for domain and record listings
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Upper bound on record pages scanned per lookup
    ///
    /// Set to 1 to inspect only the first page.
    #[serde(default = "default_max_record_pages")]
    pub max_record_pages: u32,
}

impl ReconcilerConfig {
    /// Validate the reconciler configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.record_ttl == 0 {
            return Err(crate::Error::config("Record TTL must be > 0"));
        }
        if self.page_size == 0 {
            return Err(crate::Error::config("Page size must be > 0"));
        }
        if self.max_record_pages == 0 {
            return Err(crate::Error::config("Max record pages must be > 0"));
        }
        Ok(())
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            record_ttl: default_record_ttl(),
            page_size: default_page_size(),
            max_record_pages: default_max_record_pages(),
        }
    }
}

fn default_record_ttl() -> u32 {
    300
}

fn default_page_size() -> u32 {
    10
}

fn default_max_record_pages() -> u32 {
    10
}
