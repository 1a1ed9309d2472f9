//! Generic list command handler
//!
//! Every list command follows the same flow:
//! 1. Create command context
//! 2. Mount a cache handle for the active organization
//! 3. Wait for it to settle (revalidating first with `--refresh`)
//! 4. Apply limit
//! 5. Convert to display type
//! 6. Print output

use log::{debug, warn};
use serde::Serialize;
use tabled::Tabled;

use super::spinner;
use crate::cache::{CacheState, EntityHandle, EntityKind};
use crate::cli::args::{GlobalOptions, ListArgs};
use crate::cli::CommandContext;
use crate::error::{Error, Result};
use crate::models::SlotDisplay;
use crate::output::Formattable;

/// Wait for a mounted handle and turn a cold failure into an error.
///
/// A failure with stale data to fall back on is not an error; the stale
/// data is returned.
pub async fn settle<T>(
    ctx: &CommandContext,
    kind: EntityKind,
    handle: &EntityHandle<T>,
    refresh: bool,
) -> Result<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    let progress = spinner(&format!("Loading {}...", kind), ctx.format);
    if refresh {
        handle.revalidate().await;
    }
    let state: CacheState<T> = handle.settled().await;
    progress.finish_and_clear();

    if let Some(error) = state.error {
        return Err(Error::Other(error));
    }
    Ok(state.data)
}

/// Print per-slot cache status on stderr.
pub fn log_cache_status(ctx: &CommandContext) {
    let rows: Vec<SlotDisplay> = ctx
        .caches
        .snapshot()
        .into_iter()
        .filter(|s| s.scope.is_some() || s.in_flight > 0)
        .map(SlotDisplay::from)
        .collect();
    match rows.format(crate::cli::OutputFormat::Table) {
        Ok(table) => debug!("Cache status:\n{}", table),
        Err(e) => warn!("Failed to render cache status: {}", e),
    }
}

/// Run a standard list command with the common mount → settle → limit → print pattern.
///
/// # Type Parameters
///
/// * `T` - The API model type held by the cache (e.g., `Member`, `Tag`)
/// * `D` - The display type that implements `From<T>`, `Tabled`, and `Serialize`
///
/// # Example
///
/// ```ignore
/// run_list_command::<Tag, TagDisplay, _>(opts, list, EntityKind::Tags, |ctx| {
///     ctx.caches.tags(ctx.api.clone(), ctx.scope())
/// })
/// .await
/// ```
pub async fn run_list_command<T, D, F>(
    opts: &GlobalOptions,
    list: &ListArgs,
    kind: EntityKind,
    mount: F,
) -> Result<()>
where
    T: Clone + Send + Sync + 'static,
    D: From<T> + Tabled + Serialize,
    F: FnOnce(&CommandContext) -> EntityHandle<Vec<T>>,
{
    let ctx = CommandContext::new(opts).await?;
    let org_id = ctx.require_org_id()?;

    debug!("Fetching {} for org {}", kind, org_id);

    let handle = mount(&ctx);
    let items = settle(&ctx, kind, &handle, list.refresh).await?;

    debug!("Fetched {} {}", items.len(), kind);
    if opts.debug {
        log_cache_status(&ctx);
    }

    let limit = list.effective_limit(ctx.config.preferences.page_limit);
    let display_items: Vec<D> = items.into_iter().take(limit).map(D::from).collect();
    display_items.print(ctx.format)?;

    Ok(())
}
