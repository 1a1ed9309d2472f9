//! Dashboard command implementation

use colored::Colorize;

use crate::cache::EntityKind;
use crate::cli::args::GlobalOptions;
use crate::cli::handlers::{log_cache_status, settle};
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::StatDisplay;
use crate::output::Formattable;
use crate::output::json::format_json;

/// Run the dashboard command
pub async fn run(opts: &GlobalOptions, refresh: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let org_id = ctx.require_org_id()?.to_string();

    let handle = ctx.caches.dashboard_stats(ctx.api.clone(), ctx.scope());
    let stats = settle(&ctx, EntityKind::DashboardStats, &handle, refresh).await?;
    if opts.debug {
        log_cache_status(&ctx);
    }

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&stats)?),
        OutputFormat::Pretty => {
            println!("{} {}\n", "Dashboard".bold(), org_id.dimmed());
            for row in StatDisplay::rows(stats) {
                println!("  {:<20} {}", row.metric, row.value.bold());
            }
        }
        OutputFormat::Table => StatDisplay::rows(stats).print(ctx.format)?,
    }

    Ok(())
}
