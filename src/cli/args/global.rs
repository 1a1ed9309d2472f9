//! Global CLI options shared across all commands
//!
//! Consolidates the global flags so handlers take one parameter instead of
//! threading each flag through.

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// For most options, the precedence is: CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; config file defaults are resolved later in
/// `CommandContext`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Organization ID override (bypasses config file)
    pub org: Option<String>,

    /// Custom config file path (defaults to ~/.dojokit/config.yaml)
    pub config: Option<String>,

    /// Custom API host for development/testing
    pub api_host: Option<String>,

    /// Debug logging and cache diagnostics
    pub debug: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            org: cli.org.clone(),
            config: cli.config.clone(),
            api_host: cli.api_host.clone(),
            debug: cli.debug,
        }
    }

    /// Get organization override as `Option<&str>`.
    pub fn org_ref(&self) -> Option<&str> {
        self.org.as_deref()
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get API host override as `Option<&str>`.
    pub fn api_host_ref(&self) -> Option<&str> {
        self.api_host.as_deref()
    }
}
