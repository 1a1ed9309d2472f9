//! Argument types for list commands

use clap::Args;

/// Shared arguments for list commands.
///
/// Flatten this into any list command:
/// ```ignore
/// List {
///     #[command(flatten)]
///     list: ListArgs,
/// }
/// ```
#[derive(Args, Debug, Default, Clone)]
pub struct ListArgs {
    /// Maximum results to print
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Revalidate instead of serving a cached copy
    #[arg(long)]
    pub refresh: bool,
}

impl ListArgs {
    /// Row limit: the flag, else the configured page limit.
    pub fn effective_limit(&self, page_limit: usize) -> usize {
        self.limit.unwrap_or(page_limit).max(1)
    }
}
