//! Players and the parties they queue in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role a player fills inside a party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Absorbs damage.
    Tank,
    /// Keeps the party alive.
    Healer,
    /// Deals damage.
    Dps,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tank => write!(f, "tank"),
            Self::Healer => write!(f, "healer"),
            Self::Dps => write!(f, "dps"),
        }
    }
}

/// A queued player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name.
    pub name: String,
    /// Role the player queued for.
    pub role: Role,
}

impl Player {
    /// Create a new player.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// A group of players entering a dungeon together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Party members.
    pub members: Vec<Player>,
}

impl Party {
    /// Tanks in a standard party.
    pub const TANKS: u32 = 1;
    /// Healers in a standard party.
    pub const HEALERS: u32 = 1;
    /// DPS in a standard party.
    pub const DPS: u32 = 3;

    /// Create a party from its members.
    pub fn new(members: Vec<Player>) -> Self {
        Self { members }
    }

    /// Number of members.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Number of members filling the given role.
    pub fn count(&self, role: Role) -> usize {
        self.members.iter().filter(|p| p.role == role).count()
    }

    /// Member names, comma-separated.
    pub fn roster(&self) -> String {
        self.members
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
