//! Output formatting for CLI results

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod formatters;
pub mod json;
pub mod table;

use table::TableStyle;

/// Types that can be rendered in any output format
pub trait Formattable {
    /// Format the data according to the specified format
    fn format(&self, format: OutputFormat) -> Result<String>;

    /// Format and print to stdout
    fn print(&self, format: OutputFormat) -> Result<()> {
        println!("{}", self.format(format)?);
        Ok(())
    }
}

impl<D: Tabled + Serialize> Formattable for Vec<D> {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(table::render(self, TableStyle::Boxed)),
            OutputFormat::Table => Ok(table::render(self, TableStyle::Plain)),
            OutputFormat::Json => Ok(json::format_json_list(self)?),
        }
    }
}
