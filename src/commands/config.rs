//! Configuration CLI command.

use crate::output::{self, OutputFormat};
use dungeon_core::config::AppConfig;
use dungeon_core::error::AppError;

/// Print the resolved configuration
pub fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => output::print_json(config),
        OutputFormat::Table => {
            println!("Pool:");
            output::print_kv("Max Instances", &config.pool.max_instances.to_string());
            output::print_kv(
                "Duration (sec)",
                &format!(
                    "{}..={}",
                    config.pool.min_duration_secs, config.pool.max_duration_secs
                ),
            );
            output::print_kv("Time Unit (ms)", &config.pool.time_unit_ms.to_string());
            println!("Roster:");
            output::print_kv("Tanks", &config.roster.tanks.to_string());
            output::print_kv("Healers", &config.roster.healers.to_string());
            output::print_kv("DPS", &config.roster.dps.to_string());
            println!("Logging:");
            output::print_kv("Level", &config.logging.level);
            output::print_kv("Format", &config.logging.format);
        }
    }
    Ok(())
}
