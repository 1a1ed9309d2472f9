//! Output format selection

/// How command results are rendered. The `--format` flag defaults to `pretty`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Bordered tables, colored summaries and spinners
    Pretty,
    /// Borderless columns, one line per row
    #[default]
    Table,
    /// `{data, meta}` envelope for scripts
    Json,
}
