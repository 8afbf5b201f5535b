//! Display events describing instance lifecycle transitions.
//!
//! Each variant mirrors one call on the
//! [`StatusDisplay`](crate::traits::StatusDisplay) contract, so a recorded
//! event stream is a faithful transcript of what an observer was told.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::InstanceId;

/// Wrapper for an instance event with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayEvent {
    /// When the event was observed.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: InstanceEvent,
}

impl DisplayEvent {
    /// Create a new event stamped with the current time.
    pub fn new(payload: InstanceEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Instance lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstanceEvent {
    /// An instance was created at pool initialization.
    Registered {
        /// The instance ID.
        instance_id: InstanceId,
        /// The generated instance name.
        name: String,
    },
    /// A party was placed in an instance.
    PartyAssigned {
        /// The instance ID.
        instance_id: InstanceId,
        /// The party label, e.g. `"Party 2"`.
        party_label: String,
    },
    /// An instance became active or inactive.
    ActiveChanged {
        /// The instance ID.
        instance_id: InstanceId,
        /// Whether the instance is now occupied.
        active: bool,
    },
    /// The party label was removed from an instance.
    PartyCleared {
        /// The instance ID.
        instance_id: InstanceId,
    },
    /// A dungeon run finished.
    Completed {
        /// The completion message.
        message: String,
    },
}

impl InstanceEvent {
    /// The instance the event refers to, if any.
    pub fn instance_id(&self) -> Option<InstanceId> {
        match self {
            Self::Registered { instance_id, .. }
            | Self::PartyAssigned { instance_id, .. }
            | Self::ActiveChanged { instance_id, .. }
            | Self::PartyCleared { instance_id } => Some(*instance_id),
            Self::Completed { .. } => None,
        }
    }
}
