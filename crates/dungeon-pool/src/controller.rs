//! Instance controller: hands dungeon instances to parties and takes them
//! back when the run is over.
//!
//! Capacity is gated by a counting semaphore; every other piece of pool
//! bookkeeping lives in a single [`PoolState`] behind one mutex. A launch
//! holds an [`OwnedSemaphorePermit`] for as long as its instance is
//! occupied, and the permit is only dropped after the instance id is back
//! on the free queue, so a freed id is never handed out with a stale
//! occupancy record.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use dungeon_core::config::PoolConfig;
use dungeon_core::error::AppError;
use dungeon_core::traits::StatusDisplay;
use dungeon_core::types::{InstanceId, Party, PartyNumber};

use crate::error::PoolError;
use crate::name;
use crate::runner::{DurationBounds, InstanceRunner};
use crate::state::{InstanceRecord, PoolSnapshot, PoolState};

/// How [`InstanceController::shutdown`] treats runs still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Let every run finish and release normally.
    Drain,
    /// Stop every run now and reclaim its instance without a completion log.
    Abandon,
}

/// What a successful launch was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchReceipt {
    /// The claimed instance.
    pub instance_id: InstanceId,
    /// Name of the claimed instance.
    pub instance_name: String,
    /// Party number assigned to the launch.
    pub party_number: PartyNumber,
}

/// Bounded pool of dungeon instances.
///
/// Cheap to clone; clones share the same pool.
#[derive(Debug, Clone)]
pub struct InstanceController {
    inner: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    /// Pool configuration, validated at construction.
    config: PoolConfig,
    /// Run length bounds derived from the configuration.
    bounds: DurationBounds,
    /// Capacity gate; one permit per occupied instance.
    slots: Arc<Semaphore>,
    /// Free ids, occupancy mapping, party counter and instance records.
    state: Mutex<PoolState>,
    /// Lifecycle observer.
    display: Arc<dyn StatusDisplay>,
    /// Completion watchers, one per launch.
    watchers: TaskTracker,
    /// Fired by an abandoning shutdown.
    abandon: CancellationToken,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InstanceController {
    /// Create the pool, name every instance and register it with `display`.
    ///
    /// Fails fast on a configuration the pool cannot honor.
    pub fn new(config: PoolConfig, display: Arc<dyn StatusDisplay>) -> Result<Self, PoolError> {
        config.validate()?;

        let names: Vec<String> = (0..config.max_instances)
            .map(|_| name::generate_name())
            .collect();
        let state = PoolState::new(names);

        for record in state.records() {
            display.register_instance(record.id, &record.name);
        }

        info!(
            max_instances = config.max_instances,
            min_duration_secs = config.min_duration_secs,
            max_duration_secs = config.max_duration_secs,
            time_unit_ms = config.time_unit_ms,
            "Instance pool initialized"
        );

        Ok(Self {
            inner: Arc::new(Shared {
                bounds: DurationBounds::from(&config),
                slots: Arc::new(Semaphore::new(config.max_instances)),
                state: Mutex::new(state),
                display,
                watchers: TaskTracker::new(),
                abandon: CancellationToken::new(),
                config,
            }),
        })
    }

    /// Wait for a free instance, place `party` in it and start the run.
    ///
    /// Returns as soon as the instance is claimed; release happens in the
    /// background. Dropping the returned future while it waits for capacity
    /// claims nothing.
    pub async fn launch_dungeon(&self, party: Party) -> Result<LaunchReceipt, PoolError> {
        // Held until the watcher is spawned so shutdown cannot miss it.
        let _tracked = self.inner.watchers.token();

        let permit = Arc::clone(&self.inner.slots)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)?;

        // No await from here on: the claim is all-or-nothing.
        let receipt = {
            let mut state = self.inner.lock_state();
            let (instance_id, party_number) = state.claim().ok_or_else(|| {
                AppError::internal("capacity granted but no instance id is free")
            })?;
            let instance_name = state.name(instance_id).to_string();

            self.inner
                .display
                .set_party_in_instance(instance_id, &party_number.label());
            self.inner.display.mark_active(instance_id, true);
            debug_assert!(
                state
                    .snapshot(self.inner.slots.available_permits())
                    .is_consistent()
            );

            LaunchReceipt {
                instance_id,
                instance_name,
                party_number,
            }
        };

        info!(
            instance_id = %receipt.instance_id,
            instance = %receipt.instance_name,
            party = %receipt.party_number,
            members = party.size(),
            "Party entered dungeon"
        );
        debug!(party = %receipt.party_number, roster = %party.roster(), "Party roster");

        let runner = InstanceRunner::start(self.inner.bounds, self.inner.config.time_unit());
        let lease = Lease {
            shared: Arc::clone(&self.inner),
            instance_id: receipt.instance_id,
            permit: Some(permit),
        };
        self.inner
            .watchers
            .spawn(watch_completion(runner, lease, self.inner.abandon.clone()));

        Ok(receipt)
    }

    /// Whether every capacity unit is available.
    ///
    /// Not synchronized with concurrent launches; use for coarse polling only.
    pub fn all_instances_free(&self) -> bool {
        self.inner.slots.available_permits() == self.inner.config.max_instances
    }

    /// Copy of the current pool state.
    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.inner.lock_state();
        state.snapshot(self.inner.slots.available_permits())
    }

    /// Per-instance run statistics, ordered by id.
    pub fn instance_summaries(&self) -> Vec<InstanceRecord> {
        self.inner.lock_state().records().to_vec()
    }

    /// Configured pool size.
    pub fn max_instances(&self) -> usize {
        self.inner.config.max_instances
    }

    /// Launches in progress plus completion watchers still running.
    pub fn in_flight(&self) -> usize {
        self.inner.watchers.len()
    }

    /// Stop accepting launches and wait for outstanding runs per `mode`.
    ///
    /// Callers blocked in [`launch_dungeon`](Self::launch_dungeon) get
    /// [`PoolError::Closed`].
    pub async fn shutdown(&self, mode: ShutdownMode) {
        info!(mode = ?mode, in_flight = self.in_flight(), "Instance pool shutting down");

        self.inner.slots.close();
        if mode == ShutdownMode::Abandon {
            self.inner.abandon.cancel();
        }
        self.inner.watchers.close();
        self.inner.watchers.wait().await;

        info!("Instance pool shut down complete");
    }
}

/// Waits for a run to end and hands the instance back.
async fn watch_completion(
    mut runner: InstanceRunner,
    lease: Lease,
    abandon: CancellationToken,
) {
    let outcome = tokio::select! {
        result = runner.await_completion() => Some(result),
        _ = abandon.cancelled() => None,
    };

    match outcome {
        Some(Ok(secs)) => lease.complete(secs),
        Some(Err(e)) => {
            error!(instance_id = %lease.instance_id, error = %e, "Dungeon run failed, reclaiming instance");
            lease.reclaim();
        }
        None => {
            runner.abort();
            warn!(instance_id = %lease.instance_id, "Dungeon run abandoned, reclaiming instance");
            lease.reclaim();
        }
    }
}

/// Occupancy of one instance by one launch.
///
/// Releasing is tied to the lease: whether the run completes, fails, is
/// abandoned, or the watcher task is dropped, the instance returns to the
/// free queue and its capacity unit to the gate exactly once.
#[derive(Debug)]
struct Lease {
    shared: Arc<Shared>,
    instance_id: InstanceId,
    permit: Option<OwnedSemaphorePermit>,
}

impl Lease {
    /// Release after a normal run of `secs` simulated seconds.
    fn complete(mut self, secs: u64) {
        self.release(Some(secs));
    }

    /// Release without crediting a run.
    fn reclaim(mut self) {
        self.release(None);
    }

    fn release(&mut self, elapsed: Option<u64>) {
        let Some(permit) = self.permit.take() else {
            return;
        };
        let id = self.instance_id;

        let party = {
            let mut state = self.shared.lock_state();
            let display = &self.shared.display;
            let party = state.occupant(id);

            display.mark_active(id, false);
            display.clear_party(id);
            if let (Some(secs), Some(party)) = (elapsed, party) {
                display.log_completion(&format!(
                    "{} finished in {} (ID: {}) in {} sec.",
                    party.label(),
                    state.name(id),
                    id,
                    secs
                ));
                state.record_run(id, secs);
            }

            state.release(id);
            party
        };

        // Capacity goes back only once the id is free again.
        drop(permit);

        match (party, elapsed) {
            (Some(party), Some(secs)) => {
                info!(instance_id = %id, party = %party, duration_secs = secs, "Party finished dungeon");
            }
            (party, _) => {
                warn!(instance_id = %id, party = ?party, "Instance reclaimed without completion");
            }
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if self.permit.is_some() {
            self.release(None);
        }
    }
}
