//! Watch command implementation
//!
//! Keeps one cache handle mounted, re-renders on every state change and
//! revalidates on a fixed interval until Ctrl-C.

use std::time::Duration;

use chrono::Local;
use colored::Colorize;
use log::debug;
use serde::Serialize;
use tabled::Tabled;
use tokio::time::MissedTickBehavior;

use crate::cache::{CacheState, EntityHandle, EntityKind};
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::{
    CatalogDisplay, ClassDisplay, CouponDisplay, EventDisplay, MemberDisplay, MembershipDisplay,
    SlotDisplay, StatDisplay, TagDisplay, TransactionDisplay,
};
use crate::output::Formattable;

/// Run the watch command
pub async fn run(opts: &GlobalOptions, entity: EntityKind, interval_secs: u64) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    ctx.require_org_id()?;

    let every = Duration::from_secs(interval_secs.max(1));
    let api = ctx.api.clone();
    let scope = ctx.scope();

    match entity {
        EntityKind::Members => {
            let handle = ctx.caches.members(api, scope);
            watch_list::<_, MemberDisplay>(&ctx, entity, handle, every).await
        }
        EntityKind::DashboardStats => {
            let handle = ctx.caches.dashboard_stats(api, scope);
            watch_handle(&ctx, entity, handle, every, StatDisplay::rows).await
        }
        EntityKind::Transactions => {
            let handle = ctx.caches.transactions(api, scope);
            watch_list::<_, TransactionDisplay>(&ctx, entity, handle, every).await
        }
        EntityKind::Catalog => {
            let handle = ctx.caches.catalog(api, scope);
            watch_list::<_, CatalogDisplay>(&ctx, entity, handle, every).await
        }
        EntityKind::Classes => {
            let handle = ctx.caches.classes(api, scope);
            watch_list::<_, ClassDisplay>(&ctx, entity, handle, every).await
        }
        EntityKind::Memberships => {
            let handle = ctx.caches.memberships(api, scope);
            watch_list::<_, MembershipDisplay>(&ctx, entity, handle, every).await
        }
        EntityKind::Coupons => {
            let handle = ctx.caches.coupons(api, scope);
            watch_list::<_, CouponDisplay>(&ctx, entity, handle, every).await
        }
        EntityKind::Tags => {
            let handle = ctx.caches.tags(api, scope);
            watch_list::<_, TagDisplay>(&ctx, entity, handle, every).await
        }
        EntityKind::Events => {
            let handle = ctx.caches.events(api, scope);
            watch_list::<_, EventDisplay>(&ctx, entity, handle, every).await
        }
    }
}

async fn watch_list<T, D>(
    ctx: &CommandContext,
    kind: EntityKind,
    handle: EntityHandle<Vec<T>>,
    every: Duration,
) -> Result<()>
where
    T: Clone + Send + Sync + 'static,
    D: From<T> + Tabled + Serialize,
{
    watch_handle(ctx, kind, handle, every, |items: Vec<T>| {
        items.into_iter().map(D::from).collect::<Vec<D>>()
    })
    .await
}

async fn watch_handle<T, D, R>(
    ctx: &CommandContext,
    kind: EntityKind,
    handle: EntityHandle<T>,
    every: Duration,
    render: R,
) -> Result<()>
where
    T: Clone + Default + Send + Sync + 'static,
    D: Tabled + Serialize,
    R: Fn(T) -> Vec<D>,
{
    let mut states = handle.subscribe();
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately; the mount already loaded
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let initial = states.borrow_and_update().clone();
    print_state(ctx, kind, initial, &render)?;

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                print_state(ctx, kind, state, &render)?;
            }
            _ = ticker.tick() => {
                debug!("Interval refresh of {}", kind);
                handle.revalidate().await;
            }
            _ = &mut ctrl_c => {
                debug!("Stopping watch of {}", kind);
                break;
            }
        }
    }

    handle.unmount();
    Ok(())
}

fn print_state<T, D, R>(
    ctx: &CommandContext,
    kind: EntityKind,
    state: CacheState<T>,
    render: &R,
) -> Result<()>
where
    D: Tabled + Serialize,
    R: Fn(T) -> Vec<D>,
{
    if state.loading {
        if ctx.format != OutputFormat::Json {
            eprintln!("{}", format!("Refreshing {}...", kind).dimmed());
        }
        return Ok(());
    }

    if ctx.format != OutputFormat::Json {
        println!(
            "\n{} {}",
            kind.label().bold(),
            Local::now().format("%H:%M:%S").to_string().dimmed()
        );
    }
    if let Some(error) = &state.error {
        eprintln!("{} {}", "✗".red(), error);
    }
    render(state.data).print(ctx.format)?;

    if ctx.format != OutputFormat::Json {
        let footer: Vec<SlotDisplay> = ctx
            .caches
            .snapshot()
            .into_iter()
            .filter(|s| s.kind == kind)
            .map(SlotDisplay::from)
            .collect();
        println!("{}", footer.format(OutputFormat::Table)?.dimmed());
    }
    Ok(())
}
