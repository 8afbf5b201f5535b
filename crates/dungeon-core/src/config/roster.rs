//! Player roster configuration.

use serde::{Deserialize, Serialize};

/// Number of queued players per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Queued tank players.
    #[serde(default = "default_tanks")]
    pub tanks: u32,
    /// Queued healer players.
    #[serde(default = "default_healers")]
    pub healers: u32,
    /// Queued DPS players.
    #[serde(default = "default_dps")]
    pub dps: u32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            tanks: default_tanks(),
            healers: default_healers(),
            dps: default_dps(),
        }
    }
}

fn default_tanks() -> u32 {
    5
}

fn default_healers() -> u32 {
    5
}

fn default_dps() -> u32 {
    15
}
