// # acme-dnsd - ACME DNS-01 hook
//
// Thin shell around acme-dns-core. One invocation performs one Present or
// CleanUp for one challenge and exits. All reconciliation logic lives in
// the core crate; nothing here retries.
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Registering providers
// 3. Running the requested action
// 4. Mapping the result to an exit code
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Challenge
// - `ACME_DNS_ACTION`: `present` or `cleanup`
// - `ACME_DNS_ZONE`: Resolved zone, e.g. `example.com.`
// - `ACME_DNS_FQDN`: Resolved FQDN, e.g. `_acme-challenge.example.com.`
// - `ACME_DNS_KEY`: TXT value to publish
//
// ### DNS Provider
// - `ACME_DNS_PROVIDER_TYPE`: `ncloud` (default) or `memory`
// - `NCLOUD_ACCESS_KEY`, `NCLOUD_SECRET_KEY`: API credentials
// - `NCLOUD_DNS_API_BASE`: API base URL override (optional)
// - `ACME_DNS_MEMORY_DOMAINS`: Comma-separated domains for the memory
//   provider (defaults to the challenge zone)
// - `ACME_DNS_MODE`: `live` (default) or `dry-run`
//
// ### Reconciler
// - `ACME_DNS_RECORD_TTL`: TTL of created records (default 300)
// - `ACME_DNS_MAX_RECORD_PAGES`: Record pages scanned per lookup (default 10)
//
// ### Logging
// - `ACME_DNS_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// ## Example
//
// ```bash
// export ACME_DNS_ACTION=present
// export ACME_DNS_ZONE=example.com.
// export ACME_DNS_FQDN=_acme-challenge.example.com.
// export ACME_DNS_KEY=abc123
// export NCLOUD_ACCESS_KEY=your_access_key
// export NCLOUD_SECRET_KEY=your_secret_key
//
// acme-dnsd
// ```

use acme_dns_core::{
    AcmeDnsConfig, ChallengeDescriptor, ChallengeOutcome, ChallengeReconciler, ProviderConfig,
    ProviderRegistry, ReconcilerConfig,
};
use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for the hook
///
/// - 0: Challenge record converged
/// - 1: Configuration or startup error, no provider call made
/// - 2: Reconciliation failed or was interrupted
#[derive(Debug, Clone, Copy)]
enum HookExitCode {
    /// Present/CleanUp succeeded (including no-ops)
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Provider or reconciliation failure
    ReconcileError = 2,
}

impl From<HookExitCode> for ExitCode {
    fn from(code: HookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Requested hook action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Present,
    CleanUp,
}

impl Action {
    fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "present" => Ok(Action::Present),
            "cleanup" | "clean-up" => Ok(Action::CleanUp),
            _ => anyhow::bail!(
                "ACME_DNS_ACTION '{}' is not valid. Valid actions: present, cleanup",
                s
            ),
        }
    }
}

/// Application configuration
struct Config {
    action: String,
    zone: String,
    fqdn: String,
    key: String,
    provider_type: String,
    ncloud_access_key: Option<String>,
    ncloud_secret_key: Option<String>,
    ncloud_api_base: Option<String>,
    memory_domains: Vec<String>,
    mode: String,
    record_ttl: Option<u32>,
    max_record_pages: Option<u32>,
    log_level: String,
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} is required", name))
}

fn optional_number(name: &str) -> Result<Option<u32>> {
    env::var(name)
        .ok()
        .map(|s| s.trim().parse::<u32>())
        .transpose()
        .with_context(|| format!("{} must be a positive integer", name))
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            action: required("ACME_DNS_ACTION")?,
            zone: required("ACME_DNS_ZONE")?,
            fqdn: required("ACME_DNS_FQDN")?,
            key: required("ACME_DNS_KEY")?,
            provider_type: env::var("ACME_DNS_PROVIDER_TYPE")
                .unwrap_or_else(|_| "ncloud".to_string()),
            ncloud_access_key: env::var("NCLOUD_ACCESS_KEY").ok(),
            ncloud_secret_key: env::var("NCLOUD_SECRET_KEY").ok(),
            ncloud_api_base: env::var("NCLOUD_DNS_API_BASE").ok(),
            memory_domains: env::var("ACME_DNS_MEMORY_DOMAINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            mode: env::var("ACME_DNS_MODE").unwrap_or_else(|_| "live".to_string()),
            record_ttl: optional_number("ACME_DNS_RECORD_TTL")?,
            max_record_pages: optional_number("ACME_DNS_MAX_RECORD_PAGES")?,
            log_level: env::var("ACME_DNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Checks presence and shape of every value. Semantic checks on the
    /// provider and reconciler settings happen in `AcmeDnsConfig::validate`.
    fn validate(&self) -> Result<()> {
        Action::parse(&self.action)?;

        if self.zone.trim_end_matches('.').is_empty() {
            anyhow::bail!("ACME_DNS_ZONE cannot be empty");
        }
        if self.fqdn.trim_end_matches('.').is_empty() {
            anyhow::bail!("ACME_DNS_FQDN cannot be empty");
        }
        if self.key.is_empty() {
            anyhow::bail!("ACME_DNS_KEY cannot be empty");
        }

        match self.provider_type.as_str() {
            "ncloud" => {
                if self.ncloud_access_key.as_ref().is_none_or(|k| k.is_empty()) {
                    anyhow::bail!(
                        "NCLOUD_ACCESS_KEY is required when ACME_DNS_PROVIDER_TYPE=ncloud. \
                        Set it via: export NCLOUD_ACCESS_KEY=your_access_key"
                    );
                }
                if self.ncloud_secret_key.as_ref().is_none_or(|k| k.is_empty()) {
                    anyhow::bail!(
                        "NCLOUD_SECRET_KEY is required when ACME_DNS_PROVIDER_TYPE=ncloud. \
                        Set it via: export NCLOUD_SECRET_KEY=your_secret_key"
                    );
                }
            }
            "memory" => {}
            _ => anyhow::bail!(
                "ACME_DNS_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: ncloud, memory",
                self.provider_type
            ),
        }

        match self.mode.to_lowercase().as_str() {
            "live" | "dry-run" => {}
            _ => anyhow::bail!(
                "ACME_DNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ACME_DNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn dry_run(&self) -> bool {
        self.mode.eq_ignore_ascii_case("dry-run")
    }

    /// Build the core configuration
    fn app_config(&self) -> AcmeDnsConfig {
        let provider = match self.provider_type.as_str() {
            "memory" => ProviderConfig::Memory {
                domains: if self.memory_domains.is_empty() {
                    vec![self.zone.trim_end_matches('.').to_string()]
                } else {
                    self.memory_domains.clone()
                },
            },
            _ => ProviderConfig::Ncloud {
                access_key: self.ncloud_access_key.clone().unwrap_or_default(),
                secret_key: self.ncloud_secret_key.clone().unwrap_or_default(),
                api_base: self.ncloud_api_base.clone(),
                dry_run: self.dry_run(),
            },
        };

        let defaults = ReconcilerConfig::default();
        let reconciler = ReconcilerConfig {
            record_ttl: self.record_ttl.unwrap_or(defaults.record_ttl),
            max_record_pages: self.max_record_pages.unwrap_or(defaults.max_record_pages),
            ..defaults
        };

        AcmeDnsConfig {
            provider,
            reconciler,
        }
    }

    fn challenge(&self) -> ChallengeDescriptor {
        ChallengeDescriptor::new(&self.zone, &self.fqdn, &self.key)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return HookExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HookExitCode::ConfigError.into();
    }

    info!("Starting acme-dnsd ({})", config.action);

    let reconciler = match build_reconciler(&config) {
        Ok(reconciler) => reconciler,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    let result = rt.block_on(async {
        tokio::select! {
            result = run_hook(&config, &reconciler) => match result {
                Ok(outcome) => {
                    info!("Challenge {} done: {:?}", config.fqdn, outcome);
                    HookExitCode::Success
                }
                Err(e) => {
                    error!("Reconciliation failed: {:#}", e);
                    HookExitCode::ReconcileError
                }
            },
            signal = wait_for_shutdown() => {
                match signal {
                    Ok(name) => warn!("Interrupted by {} before the challenge converged", name),
                    Err(e) => error!("Signal handling error: {}", e),
                }
                HookExitCode::ReconcileError
            }
        }
    });

    result.into()
}

/// Register providers and create the reconciler from configuration
fn build_reconciler(config: &Config) -> Result<ChallengeReconciler> {
    let app_config = config.app_config();
    app_config.validate()?;

    let registry = ProviderRegistry::with_builtin();

    #[cfg(feature = "ncloud")]
    {
        info!("Registering NCLOUD provider");
        acme_dns_provider_ncloud::register(&registry);
    }

    info!("Available providers: {}", registry.list_providers().join(", "));

    let provider = registry
        .create_provider(&app_config.provider)
        .with_context(|| format!("Failed to create provider '{}'", config.provider_type))?;

    Ok(ChallengeReconciler::new(provider, app_config.reconciler)?)
}

/// Run the requested action once
async fn run_hook(config: &Config, reconciler: &ChallengeReconciler) -> Result<ChallengeOutcome> {
    let challenge = config.challenge();

    let outcome = match Action::parse(&config.action)? {
        Action::Present => reconciler.present(&challenge).await,
        Action::CleanUp => reconciler.cleanup(&challenge).await,
    };

    outcome.map_err(|e| {
        if e.is_transient() {
            warn!("Failure is transient; the caller may retry the whole action");
        }
        anyhow::Error::new(e)
    })
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    Ok(name)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider_type: &str) -> Config {
        Config {
            action: "present".to_string(),
            zone: "example.com.".to_string(),
            fqdn: "_acme-challenge.example.com.".to_string(),
            key: "abc123".to_string(),
            provider_type: provider_type.to_string(),
            ncloud_access_key: Some("AK".to_string()),
            ncloud_secret_key: Some("SK".to_string()),
            ncloud_api_base: None,
            memory_domains: Vec::new(),
            mode: "live".to_string(),
            record_ttl: None,
            max_record_pages: None,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse("present").unwrap(), Action::Present);
        assert_eq!(Action::parse("CleanUp").unwrap(), Action::CleanUp);
        assert!(Action::parse("delete").is_err());
    }

    #[test]
    fn test_validate_requires_ncloud_keys() {
        assert!(config("ncloud").validate().is_ok());

        let mut missing = config("ncloud");
        missing.ncloud_secret_key = None;
        assert!(missing.validate().is_err());

        // Keys are not needed for the memory provider
        let mut memory = config("memory");
        memory.ncloud_access_key = None;
        memory.ncloud_secret_key = None;
        assert!(memory.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = config("route53");
        assert!(cfg.validate().is_err());

        cfg = config("ncloud");
        cfg.mode = "maybe".to_string();
        assert!(cfg.validate().is_err());

        cfg = config("ncloud");
        cfg.zone = ".".to_string();
        assert!(cfg.validate().is_err());

        cfg = config("ncloud");
        cfg.key = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_app_config_maps_mode_and_overrides() {
        let mut cfg = config("ncloud");
        cfg.mode = "dry-run".to_string();
        cfg.record_ttl = Some(60);

        let app = cfg.app_config();
        assert_eq!(app.reconciler.record_ttl, 60);
        assert_eq!(app.reconciler.max_record_pages, 10);
        match app.provider {
            ProviderConfig::Ncloud { dry_run, .. } => assert!(dry_run),
            other => panic!("unexpected provider config: {:?}", other),
        }
    }

    #[test]
    fn test_memory_provider_defaults_to_zone() {
        let app = config("memory").app_config();
        match app.provider {
            ProviderConfig::Memory { domains } => assert_eq!(domains, vec!["example.com"]),
            other => panic!("unexpected provider config: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_memory_hook_presents_record() {
        let cfg = config("memory");
        let reconciler = build_reconciler(&cfg).unwrap();

        let outcome = run_hook(&cfg, &reconciler).await.unwrap();
        assert_eq!(outcome, ChallengeOutcome::Created);

        // Same reconciler, same provider state: second run is a no-op
        let outcome = run_hook(&cfg, &reconciler).await.unwrap();
        assert!(!outcome.is_mutation());
    }
}
