//! Pool bookkeeping owned by the instance controller.
//!
//! [`PoolState`] is only ever touched through the controller's mutex, so
//! the free-id queue, the occupancy mapping and the party counter always
//! change together.

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use dungeon_core::types::{InstanceId, PartyNumber};

/// Per-instance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Instance identifier.
    pub id: InstanceId,
    /// Name generated at pool initialization.
    pub name: String,
    /// Whether a party currently occupies the instance.
    pub active: bool,
    /// Runs completed in this instance.
    pub parties_served: u32,
    /// Simulated seconds spent on completed runs.
    pub total_secs: u64,
}

/// Point-in-time copy of the pool, taken under the state lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Configured pool size.
    pub max_instances: usize,
    /// Capacity units not currently held by a launch.
    pub available_slots: usize,
    /// Free instance ids, in hand-out order.
    pub free_ids: Vec<InstanceId>,
    /// Occupied instance ids and the party inside each.
    pub occupancy: BTreeMap<InstanceId, PartyNumber>,
    /// Every instance, ordered by id.
    pub instances: Vec<InstanceRecord>,
}

impl PoolSnapshot {
    /// Ids of instances flagged active.
    pub fn active_ids(&self) -> Vec<InstanceId> {
        self.instances
            .iter()
            .filter(|r| r.active)
            .map(|r| r.id)
            .collect()
    }

    /// Check the pool invariant: every id is either free or occupied,
    /// never both, and the active flags agree with the occupancy mapping.
    pub fn is_consistent(&self) -> bool {
        if self.free_ids.len() + self.occupancy.len() != self.max_instances {
            return false;
        }
        if self.free_ids.iter().any(|id| self.occupancy.contains_key(id)) {
            return false;
        }
        let mut free_sorted = self.free_ids.clone();
        free_sorted.sort();
        free_sorted.dedup();
        if free_sorted.len() != self.free_ids.len() {
            return false;
        }
        self.instances
            .iter()
            .all(|r| r.active == self.occupancy.contains_key(&r.id))
    }

    /// Whether nothing is in flight: all capacity is back and every id is free.
    pub fn is_idle(&self) -> bool {
        self.available_slots == self.max_instances
            && self.occupancy.is_empty()
            && self.free_ids.len() == self.max_instances
    }
}

/// Mutable pool bookkeeping.
#[derive(Debug)]
pub(crate) struct PoolState {
    /// Records indexed by `id - 1`.
    instances: Vec<InstanceRecord>,
    /// Free ids, handed out front-first and returned to the back.
    free_ids: VecDeque<InstanceId>,
    /// Occupied ids and their party.
    occupancy: HashMap<InstanceId, PartyNumber>,
    /// Last party number handed out.
    party_counter: u64,
}

impl PoolState {
    /// Build state for instances `1..=names.len()`, all free.
    pub(crate) fn new(names: Vec<String>) -> Self {
        let instances: Vec<InstanceRecord> = names
            .into_iter()
            .zip(1u32..)
            .map(|(name, raw)| InstanceRecord {
                id: InstanceId::new(raw),
                name,
                active: false,
                parties_served: 0,
                total_secs: 0,
            })
            .collect();
        let free_ids = instances.iter().map(|r| r.id).collect();

        Self {
            instances,
            free_ids,
            occupancy: HashMap::new(),
            party_counter: 0,
        }
    }

    /// Pop a free id, assign the next party number and record the occupancy.
    ///
    /// Returns `None` without touching the counter when no id is free.
    pub(crate) fn claim(&mut self) -> Option<(InstanceId, PartyNumber)> {
        let id = self.free_ids.pop_front()?;
        self.party_counter += 1;
        let party = PartyNumber::new(self.party_counter);

        self.occupancy.insert(id, party);
        if let Some(record) = self.record_mut(id) {
            record.active = true;
        }
        Some((id, party))
    }

    /// Remove the occupancy entry and put the id back on the free queue.
    ///
    /// Returns the party that occupied the instance, or `None` if the
    /// instance was not occupied (in which case nothing changes).
    pub(crate) fn release(&mut self, id: InstanceId) -> Option<PartyNumber> {
        let party = self.occupancy.remove(&id)?;
        if let Some(record) = self.record_mut(id) {
            record.active = false;
        }
        self.free_ids.push_back(id);
        Some(party)
    }

    /// Credit a completed run to an instance.
    pub(crate) fn record_run(&mut self, id: InstanceId, secs: u64) {
        if let Some(record) = self.record_mut(id) {
            record.parties_served += 1;
            record.total_secs += secs;
        }
    }

    /// Party currently inside the instance.
    pub(crate) fn occupant(&self, id: InstanceId) -> Option<PartyNumber> {
        self.occupancy.get(&id).copied()
    }

    /// Generated name of the instance.
    pub(crate) fn name(&self, id: InstanceId) -> &str {
        self.record(id).map(|r| r.name.as_str()).unwrap_or("")
    }

    /// All instance records, ordered by id.
    pub(crate) fn records(&self) -> &[InstanceRecord] {
        &self.instances
    }

    /// Copy the state out for observation.
    pub(crate) fn snapshot(&self, available_slots: usize) -> PoolSnapshot {
        PoolSnapshot {
            max_instances: self.instances.len(),
            available_slots,
            free_ids: self.free_ids.iter().copied().collect(),
            occupancy: self.occupancy.iter().map(|(k, v)| (*k, *v)).collect(),
            instances: self.instances.clone(),
        }
    }

    fn index(id: InstanceId) -> Option<usize> {
        usize::try_from(id.get()).ok()?.checked_sub(1)
    }

    fn record(&self, id: InstanceId) -> Option<&InstanceRecord> {
        self.instances.get(Self::index(id)?)
    }

    fn record_mut(&mut self, id: InstanceId) -> Option<&mut InstanceRecord> {
        let index = Self::index(id)?;
        self.instances.get_mut(index)
    }
}
