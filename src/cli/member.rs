//! Member and tag command implementations

use colored::Colorize;
use log::debug;

use crate::cache::{EntityKind, Mutation};
use crate::cli::CommandContext;
use crate::cli::OutputFormat;
use crate::cli::args::{GlobalOptions, ListArgs};
use crate::cli::handlers::run_list_command;
use crate::client::{Member, NewMember, Tag};
use crate::error::Result;
use crate::models::{MemberDisplay, TagDisplay};
use crate::output::Formattable;

/// Run the member list command
pub async fn list(opts: &GlobalOptions, list: &ListArgs) -> Result<()> {
    run_list_command::<Member, MemberDisplay, _>(opts, list, EntityKind::Members, |ctx| {
        ctx.caches.members(ctx.api.clone(), ctx.scope())
    })
    .await
}

/// Run the member add command
pub async fn add(opts: &GlobalOptions, member: NewMember) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let org_id = ctx.require_org_id()?;

    let created = ctx.api.create_member(org_id, &member).await?;
    let notified = ctx.caches.invalidate_after(Mutation::MemberCreated);
    debug!("Member {} created, {} cached views refreshing", created.id, notified);

    if ctx.format == OutputFormat::Pretty {
        println!(
            "{} Added {} ({})",
            "✓".green(),
            created.full_name().bold(),
            created.id
        );
        return Ok(());
    }
    vec![MemberDisplay::from(created)].print(ctx.format)
}

/// Run the tag list command
pub async fn tags(opts: &GlobalOptions, list: &ListArgs) -> Result<()> {
    run_list_command::<Tag, TagDisplay, _>(opts, list, EntityKind::Tags, |ctx| {
        ctx.caches.tags(ctx.api.clone(), ctx.scope())
    })
    .await
}
