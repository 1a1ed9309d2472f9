//! Organization command implementations

use colored::Colorize;

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::OrgDisplay;
use crate::output::Formattable;

/// Run the org list command
pub async fn list(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let orgs = ctx.api.list_orgs().await?;

    let display: Vec<OrgDisplay> = orgs.into_iter().map(OrgDisplay::from).collect();
    display.print(ctx.format)
}

/// Run the org set command
pub async fn set(opts: &GlobalOptions, org_id: String) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;

    println!("Verifying organization...");
    let org = ctx
        .api
        .list_orgs()
        .await?
        .into_iter()
        .find(|o| o.id == org_id)
        .ok_or_else(|| ApiError::NotFound(format!("organization {}", org_id)))?;

    // Reload so a --org override is not persisted by accident
    let mut config = Config::load_at(opts.config_ref())?;
    config.org_id = Some(org.id.clone());
    config.save_at(opts.config_ref())?;

    println!(
        "{} Set default organization to: {} ({})",
        "✓".green(),
        org.name.bold(),
        org.id
    );

    Ok(())
}

/// Run the org get command
pub async fn get(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let org_id = ctx.require_org_id()?;

    let org = ctx
        .api
        .list_orgs()
        .await?
        .into_iter()
        .find(|o| o.id == org_id)
        .ok_or_else(|| ApiError::NotFound(format!("organization {}", org_id)))?;

    vec![OrgDisplay::from(org)].print(ctx.format)
}
