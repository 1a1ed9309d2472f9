//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::config::{Config, RateLimitBackend};
use crate::error::Result;
use crate::ratelimit::EndpointClass;

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "Dojokit Configuration Status".bold());

    let config = match Config::load_at(opts.config_ref()) {
        Ok(config) => config,
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Run {} to create a configuration file.",
                "dojokit init".cyan()
            );
            println!();
            return Ok(());
        }
    };

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!("Config file: {}", config_path.display().to_string().cyan());
    println!();

    if config.api_key.is_some() {
        println!("{} API key configured", "✓".green());
    } else {
        println!("{} API key not configured", "✗".red());
        println!("  → Run 'dojokit init' to configure");
    }

    let org = opts.org_ref().map(str::to_string).or(config.org_id.clone());
    match org {
        Some(org_id) => println!("{} Default organization: {}", "✓".green(), org_id),
        None => {
            println!("{} No default organization set", "○".dimmed());
            println!("  → Run 'dojokit org set <ID>' to set one");
        }
    }

    let host = config.api_host_or_default(opts.api_host_ref());
    if opts.api_host_ref().is_some() || config.api_host.is_some() {
        println!("{} Custom API host: {}", "○".dimmed(), host.cyan());
    }

    println!();
    let default_ttl = config
        .cache
        .default_ttl_secs
        .map_or_else(|| "per entity".to_string(), |secs| format!("{}s", secs));
    println!(
        "Cache: default TTL {}, fetch timeout {}s",
        default_ttl,
        config.cache.fetch_timeout().as_secs()
    );

    match config.rate_limit.backend {
        RateLimitBackend::Disabled => println!("Rate limiting: {}", "disabled".yellow()),
        RateLimitBackend::Memory => {
            let quotas: Vec<String> = EndpointClass::ALL
                .iter()
                .map(|class| {
                    let quota = config.rate_limit.quotas.get(*class);
                    format!("{} {}/{}s", class, quota.limit, quota.window_secs)
                })
                .collect();
            println!("Rate limiting: {}", quotas.join(", "));
        }
    }
    println!();

    Ok(())
}
