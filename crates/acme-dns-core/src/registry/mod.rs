//! Plugin-based provider registry
//!
//! The registry allows DNS providers to be registered dynamically at
//! runtime and created from configuration by type name, avoiding hardcoded
//! if-else chains in the binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use acme_dns_core::registry::ProviderRegistry;
//! use acme_dns_core::config::ProviderConfig;
//!
//! // Create a registry with the built-in memory provider
//! let registry = ProviderRegistry::with_builtin();
//!
//! // Provider crates register themselves
//! acme_dns_provider_ncloud::register(&registry);
//!
//! // Create provider from config
//! let config = ProviderConfig::Ncloud { ... };
//! let provider = registry.create_provider(&config)?;
//! ```

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::memory::MemoryProviderFactory;
use crate::traits::{DnsProvider, DnsProviderFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Provider registry for plugin-based DNS provider creation
///
/// The registry maintains a map of provider type names to factory objects,
/// allowing dynamic instantiation of providers based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories
    providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the providers built into this crate
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register_provider("memory", Box::new(MemoryProviderFactory));
        registry
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "ncloud", "memory")
    /// - `factory`: Factory object for creating provider instances
    ///
    /// Registering a name twice replaces the earlier factory.
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let name = name.into();
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.insert(name, factory);
    }

    /// Create a DNS provider from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Provider configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If the configuration is invalid, the provider type is
    ///   not registered, or creation fails
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        config.validate()?;

        let provider_type = config.type_name();
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.contains_key(name)
    }
}
