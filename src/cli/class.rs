//! Class and event command implementations

use colored::Colorize;
use log::debug;

use crate::cache::{EntityKind, Mutation};
use crate::cli::CommandContext;
use crate::cli::OutputFormat;
use crate::cli::args::{GlobalOptions, ListArgs};
use crate::cli::handlers::run_list_command;
use crate::client::{Event, GymClass, NewClass};
use crate::error::Result;
use crate::models::{ClassDisplay, EventDisplay};
use crate::output::Formattable;

/// Run the class list command
pub async fn list(opts: &GlobalOptions, list: &ListArgs) -> Result<()> {
    run_list_command::<GymClass, ClassDisplay, _>(opts, list, EntityKind::Classes, |ctx| {
        ctx.caches.classes(ctx.api.clone(), ctx.scope())
    })
    .await
}

/// Run the class add command
pub async fn add(opts: &GlobalOptions, class: NewClass) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let org_id = ctx.require_org_id()?;

    let created = ctx.api.create_class(org_id, &class).await?;
    let notified = ctx.caches.invalidate_after(Mutation::ClassCreated);
    debug!("Class {} created, {} cached views refreshing", created.id, notified);

    if ctx.format == OutputFormat::Pretty {
        println!(
            "{} Scheduled {} ({})",
            "✓".green(),
            created.name.bold(),
            created.id
        );
        return Ok(());
    }
    vec![ClassDisplay::from(created)].print(ctx.format)
}

/// Run the event list command
pub async fn events(opts: &GlobalOptions, list: &ListArgs) -> Result<()> {
    run_list_command::<Event, EventDisplay, _>(opts, list, EntityKind::Events, |ctx| {
        ctx.caches.events(ctx.api.clone(), ctx.scope())
    })
    .await
}
