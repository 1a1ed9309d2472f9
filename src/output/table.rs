//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

const EMPTY: &str = "Nothing to show.";

/// Border style for rendered tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    /// Rounded borders with a centered header, for interactive use
    Boxed,
    /// Whitespace-separated columns, friendly to `grep` and `awk`
    Plain,
}

pub fn render<T: Tabled>(rows: &[T], style: TableStyle) -> String {
    if rows.is_empty() {
        return EMPTY.to_string();
    }

    let mut table = Table::new(rows);
    match style {
        TableStyle::Boxed => {
            table
                .with(Style::rounded())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
        }
        TableStyle::Plain => {
            table.with(Style::blank());
        }
    }
    table.to_string()
}
