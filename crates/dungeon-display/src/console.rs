//! Terminal status table.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tabled::{Table, Tabled};
use tracing::debug;

use dungeon_core::traits::StatusDisplay;
use dungeon_core::types::InstanceId;

/// One line of the status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct StatusRow {
    /// Instance identifier.
    #[tabled(rename = "ID")]
    pub id: InstanceId,
    /// Instance name.
    #[tabled(rename = "Instance")]
    pub name: String,
    /// `"active"` or `"empty"`.
    #[tabled(rename = "Status")]
    pub status: String,
    /// Party label, blank when empty.
    #[tabled(rename = "Party")]
    pub party: String,
}

#[derive(Debug, Default)]
struct ConsoleState {
    rows: BTreeMap<InstanceId, StatusRow>,
    completions: Vec<String>,
}

/// Status display that renders to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    state: Mutex<ConsoleState>,
    /// Print completion messages to stdout as they arrive.
    echo: bool,
}

impl ConsoleDisplay {
    /// Create a display that prints completion messages immediately.
    pub fn new() -> Self {
        Self {
            state: Mutex::default(),
            echo: true,
        }
    }

    /// Create a display that only collects state.
    pub fn quiet() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ConsoleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current rows, ordered by instance id.
    pub fn rows(&self) -> Vec<StatusRow> {
        self.lock().rows.values().cloned().collect()
    }

    /// Completion messages received so far.
    pub fn completions(&self) -> Vec<String> {
        self.lock().completions.clone()
    }

    /// Render the status table.
    pub fn render(&self) -> String {
        let rows = self.rows();
        if rows.is_empty() {
            return "No instances registered.".to_string();
        }
        Table::new(rows).to_string()
    }

    fn with_row(&self, id: InstanceId, f: impl FnOnce(&mut StatusRow)) {
        let mut state = self.lock();
        let row = state.rows.entry(id).or_insert_with(|| StatusRow {
            id,
            name: String::new(),
            status: "empty".to_string(),
            party: String::new(),
        });
        f(row);
    }
}

impl StatusDisplay for ConsoleDisplay {
    fn register_instance(&self, id: InstanceId, name: &str) {
        self.with_row(id, |row| row.name = name.to_string());
        debug!(instance_id = %id, name, "Instance registered with console");
    }

    fn set_party_in_instance(&self, id: InstanceId, party_label: &str) {
        self.with_row(id, |row| row.party = party_label.to_string());
    }

    fn mark_active(&self, id: InstanceId, active: bool) {
        let status = if active { "active" } else { "empty" };
        self.with_row(id, |row| row.status = status.to_string());
    }

    fn clear_party(&self, id: InstanceId) {
        self.with_row(id, |row| row.party.clear());
    }

    fn log_completion(&self, message: &str) {
        self.lock().completions.push(message.to_string());
        if self.echo {
            println!("{message}");
        }
    }
}
