//! Status display that records every notification.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dungeon_core::AppResult;
use dungeon_core::events::{DisplayEvent, InstanceEvent};
use dungeon_core::traits::StatusDisplay;
use dungeon_core::types::InstanceId;

#[derive(Debug, Default)]
struct Recording {
    events: Vec<DisplayEvent>,
    active: BTreeSet<InstanceId>,
    peak_active: usize,
}

/// Captures notifications in arrival order and tracks how many instances
/// were active at once.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    inner: Mutex<Recording>,
}

impl RecordingDisplay {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, payload: InstanceEvent) {
        self.lock().events.push(DisplayEvent::new(payload));
    }

    /// Every recorded event.
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.lock().events.clone()
    }

    /// Recorded payloads, without timestamps.
    pub fn payloads(&self) -> Vec<InstanceEvent> {
        self.lock().events.iter().map(|e| e.payload.clone()).collect()
    }

    /// Payloads that concern one instance.
    pub fn events_for(&self, id: InstanceId) -> Vec<InstanceEvent> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.payload.instance_id() == Some(id))
            .map(|e| e.payload.clone())
            .collect()
    }

    /// Registered instance names, by id.
    pub fn registered(&self) -> BTreeMap<InstanceId, String> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match &e.payload {
                InstanceEvent::Registered { instance_id, name } => {
                    Some((*instance_id, name.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Completion messages, in arrival order.
    pub fn completions(&self) -> Vec<String> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match &e.payload {
                InstanceEvent::Completed { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Instances currently marked active.
    pub fn active_count(&self) -> usize {
        self.lock().active.len()
    }

    /// Highest number of instances marked active at the same time.
    pub fn peak_active(&self) -> usize {
        self.lock().peak_active
    }

    /// Serialize the recorded events as a JSON array.
    pub fn to_json(&self) -> AppResult<String> {
        let events = self.events();
        Ok(serde_json::to_string_pretty(&events)?)
    }
}

impl StatusDisplay for RecordingDisplay {
    fn register_instance(&self, id: InstanceId, name: &str) {
        self.push(InstanceEvent::Registered {
            instance_id: id,
            name: name.to_string(),
        });
    }

    fn set_party_in_instance(&self, id: InstanceId, party_label: &str) {
        self.push(InstanceEvent::PartyAssigned {
            instance_id: id,
            party_label: party_label.to_string(),
        });
    }

    fn mark_active(&self, id: InstanceId, active: bool) {
        let mut recording = self.lock();
        if active {
            recording.active.insert(id);
        } else {
            recording.active.remove(&id);
        }
        recording.peak_active = recording.peak_active.max(recording.active.len());
        recording.events.push(DisplayEvent::new(InstanceEvent::ActiveChanged {
            instance_id: id,
            active,
        }));
    }

    fn clear_party(&self, id: InstanceId) {
        self.push(InstanceEvent::PartyCleared { instance_id: id });
    }

    fn log_completion(&self, message: &str) {
        self.push(InstanceEvent::Completed {
            message: message.to_string(),
        });
    }
}
