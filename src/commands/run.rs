//! Simulation CLI command. Forms parties and drives the instance pool.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::output::{self, OutputFormat};
use dungeon_core::config::AppConfig;
use dungeon_core::error::AppError;
use dungeon_display::ConsoleDisplay;
use dungeon_pool::{InstanceController, InstanceRecord, PoolError, Roster, ShutdownMode};

/// Arguments for the run command. Flags override the configuration file.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Number of dungeon instances
    #[arg(short = 'n', long)]
    pub instances: Option<usize>,
    /// Queued tanks
    #[arg(short, long)]
    pub tanks: Option<u32>,
    /// Queued healers
    #[arg(long)]
    pub healers: Option<u32>,
    /// Queued DPS
    #[arg(short, long)]
    pub dps: Option<u32>,
    /// Shortest run in simulated seconds
    #[arg(long)]
    pub min_duration: Option<u64>,
    /// Longest run in simulated seconds
    #[arg(long)]
    pub max_duration: Option<u64>,
    /// Milliseconds per simulated second
    #[arg(long)]
    pub time_unit_ms: Option<u64>,
    /// Milliseconds between status table refreshes
    #[arg(long, default_value_t = 1000)]
    pub status_interval_ms: u64,
    /// Do not print the status table while running
    #[arg(short, long)]
    pub quiet: bool,
}

impl RunArgs {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(v) = self.instances {
            config.pool.max_instances = v;
        }
        if let Some(v) = self.min_duration {
            config.pool.min_duration_secs = v;
        }
        if let Some(v) = self.max_duration {
            config.pool.max_duration_secs = v;
        }
        if let Some(v) = self.time_unit_ms {
            config.pool.time_unit_ms = v;
        }
        if let Some(v) = self.tanks {
            config.roster.tanks = v;
        }
        if let Some(v) = self.healers {
            config.roster.healers = v;
        }
        if let Some(v) = self.dps {
            config.roster.dps = v;
        }
    }
}

/// Summary row for one instance.
#[derive(Debug, Serialize, Tabled)]
struct SummaryRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Instance")]
    name: String,
    #[tabled(rename = "Parties Served")]
    parties_served: u32,
    #[tabled(rename = "Total Time (sec)")]
    total_secs: u64,
}

impl From<&InstanceRecord> for SummaryRow {
    fn from(record: &InstanceRecord) -> Self {
        Self {
            id: record.id.get(),
            name: record.name.clone(),
            parties_served: record.parties_served,
            total_secs: record.total_secs,
        }
    }
}

/// Machine-readable run report.
#[derive(Debug, Serialize)]
struct RunReport {
    parties_formed: usize,
    interrupted: bool,
    leftovers: Roster,
    instances: Vec<InstanceRecord>,
}

/// Execute the run command
pub async fn execute(
    args: &RunArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let show_progress = format == OutputFormat::Table;
    let display = Arc::new(if show_progress {
        ConsoleDisplay::new()
    } else {
        ConsoleDisplay::quiet()
    });

    let controller = InstanceController::new(config.pool.clone(), display.clone())?;
    let matchmaking = Roster::from(&config.roster).form_parties();
    let parties_formed = matchmaking.parties.len();

    info!(
        parties = parties_formed,
        leftover_players = matchmaking.leftovers.total(),
        instances = controller.max_instances(),
        "Queue formed"
    );

    let interval = Duration::from_millis(args.status_interval_ms.max(1));
    let (stop_tx, stop_rx) = watch::channel(false);
    let reporter = (show_progress && !args.quiet)
        .then(|| tokio::spawn(report_status(Arc::clone(&display), interval, stop_rx)));

    let mut launcher = tokio::spawn({
        let controller = controller.clone();
        let parties = matchmaking.parties;
        async move {
            for party in parties {
                controller.launch_dungeon(party).await?;
            }
            Ok::<(), PoolError>(())
        }
    });

    let mut interrupted = tokio::select! {
        result = &mut launcher => {
            result.map_err(|e| AppError::internal(format!("Launcher task failed: {e}")))??;
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };
    if !interrupted {
        interrupted = wait_until_idle(&controller, interval).await;
    }

    if interrupted {
        warn!("Interrupted, abandoning dungeon runs in progress");
        launcher.abort();
        controller.shutdown(ShutdownMode::Abandon).await;
    } else {
        controller.shutdown(ShutdownMode::Drain).await;
    }

    let _ = stop_tx.send(true);
    if let Some(reporter) = reporter {
        let _ = reporter.await;
    }

    let summaries = controller.instance_summaries();
    match format {
        OutputFormat::Json => output::print_json(&RunReport {
            parties_formed,
            interrupted,
            leftovers: matchmaking.leftovers,
            instances: summaries,
        }),
        OutputFormat::Table => {
            println!("{}", display.render());
            println!("Leftover players:");
            output::print_kv("Tanks", &matchmaking.leftovers.tanks.to_string());
            output::print_kv("Healers", &matchmaking.leftovers.healers.to_string());
            output::print_kv("DPS", &matchmaking.leftovers.dps.to_string());

            let rows: Vec<SummaryRow> = summaries.iter().map(SummaryRow::from).collect();
            output::print_list(&rows, format);

            if interrupted {
                output::print_warning("Run interrupted; unfinished parties were abandoned");
            } else {
                output::print_success(&format!("{} parties finished", parties_formed));
            }
        }
    }

    Ok(())
}

/// Poll until every instance is free. Returns `true` if interrupted.
async fn wait_until_idle(controller: &InstanceController, interval: Duration) -> bool {
    loop {
        if controller.all_instances_free() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => return true,
        }
    }
}

/// Print the status table on every tick until told to stop.
async fn report_status(
    display: Arc<ConsoleDisplay>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                println!("{}", display.render());
            }
        }
    }
}
