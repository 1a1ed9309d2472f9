//! Init command implementation

use colored::Colorize;
use dialoguer::{Password, Select, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::{DojoApi, DojoClient};
use crate::config::Config;
use crate::error::Result;

/// Run the init command
///
/// Prompts for an API key, verifies it by listing organizations, and saves
/// the key plus a default organization. Existing cache and rate-limit
/// settings in the config file are preserved.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to Dojokit!".bold().green());
    println!("Let's connect the CLI to your gym.\n");

    let api_key: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your Dojokit API key")
        .interact()?;

    let mut config = Config::load_at(opts.config_ref()).unwrap_or_default();
    if let Some(host) = opts.api_host_ref() {
        config.api_host = Some(host.to_string());
    }
    let host = config.api_host_or_default(None);

    println!("\n{}", "Fetching your organizations...".cyan());
    let client = DojoClient::new(api_key.clone(), &host, &config.rate_limit.quotas)?;
    let orgs = client.list_orgs().await?;
    println!("{}", "✓ API key accepted".green());

    let org_id = if orgs.is_empty() {
        println!("{}", "⚠ No organizations found.".yellow());
        None
    } else if orgs.len() == 1 {
        let org = &orgs[0];
        println!("Found organization: {}", org.name.bold());
        let use_org = dialoguer::Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Set this as your default organization?")
            .default(true)
            .interact()?;

        if use_org { Some(org.id.clone()) } else { None }
    } else {
        let org_names: Vec<String> = orgs.iter().map(|o| o.name.clone()).collect();

        println!("Found {} organizations.", orgs.len());
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select your default organization")
            .items(&org_names)
            .default(0)
            .interact_opt()?;

        selection.map(|idx| orgs[idx].id.clone())
    };

    config.api_key = Some(api_key);
    config.org_id = org_id;
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );
    if let Some(org_id) = &config.org_id {
        println!("  Default organization: {}", org_id.bold());
    }

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "dojokit status".cyan());
    println!("  {} - List members", "dojokit member list".cyan());
    println!("  {} - Headline numbers", "dojokit dashboard".cyan());

    Ok(())
}
