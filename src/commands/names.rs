//! Name generator CLI command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use dungeon_core::error::AppError;
use dungeon_pool::name;

/// Arguments for the names command
#[derive(Debug, Args)]
pub struct NamesArgs {
    /// How many names to generate
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled)]
struct NameRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
}

/// Execute the names command
pub fn execute(args: &NamesArgs, format: OutputFormat) -> Result<(), AppError> {
    if args.count == 0 {
        return Err(AppError::validation("--count must be at least 1"));
    }

    let rows: Vec<NameRow> = (1..=args.count)
        .map(|index| NameRow {
            index,
            name: name::generate_name(),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
