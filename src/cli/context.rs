//! Command execution context
//!
//! Provides a unified context for command execution, eliminating boilerplate
//! for config loading, authentication validation, and client initialization.

use std::sync::Arc;

use log::debug;
use tokio::sync::watch;

use crate::cache::{EntityCaches, ScopeId};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::{DojoApi, DojoClient};
use crate::config::Config;
use crate::error::{ConfigError, Result};

/// Context for command execution.
///
/// Holds:
/// - Loaded and validated configuration
/// - API client (Arc-wrapped so cache fetchers can share it)
/// - The entity cache for this process
/// - The active-organization channel every mounted handle follows
/// - Output format preference
pub struct CommandContext {
    pub config: Config,
    pub api: Arc<dyn DojoApi>,
    pub caches: EntityCaches,
    pub format: OutputFormat,
    scope_tx: watch::Sender<Option<ScopeId>>,
}

impl CommandContext {
    /// Create a new command context with full initialization.
    ///
    /// # Errors
    /// Returns error if config cannot be loaded or no API key is configured.
    pub async fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_at(opts.config_ref())?;
        config.validate_auth()?;

        if let Some(org) = opts.org_ref() {
            config.org_id = Some(org.to_string());
        }

        let api_key = config.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
        let host = config.api_host_or_default(opts.api_host_ref());
        debug!("Using API host {}", host);

        let api: Arc<dyn DojoApi> = Arc::new(DojoClient::new(
            api_key,
            &host,
            &config.rate_limit.quotas,
        )?);

        Ok(Self::with_api(config, api, opts.format))
    }

    /// Build a context around an existing client.
    pub fn with_api(config: Config, api: Arc<dyn DojoApi>, format: OutputFormat) -> Self {
        let caches = EntityCaches::new(&config.cache);
        let (scope_tx, _) = watch::channel(config.org_id.clone().map(ScopeId::from));

        Self {
            config,
            api,
            caches,
            format,
            scope_tx,
        }
    }

    /// Get the organization ID, returning an error if not set.
    pub fn require_org_id(&self) -> Result<&str> {
        self.config
            .org_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingOrgId.into())
    }

    /// Receiver for the active organization, for mounting cache handles.
    pub fn scope(&self) -> watch::Receiver<Option<ScopeId>> {
        self.scope_tx.subscribe()
    }

    /// Switch the active organization for every mounted handle.
    #[cfg(test)]
    pub fn set_scope(&self, org_id: Option<&str>) {
        self.scope_tx.send_replace(org_id.map(ScopeId::from));
    }
}
