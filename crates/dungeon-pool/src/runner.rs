//! Instance runner: the occupied phase of one dungeon instance.

use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

use dungeon_core::config::PoolConfig;

use crate::error::PoolError;

/// Inclusive range of simulated seconds a run may last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBounds {
    /// Shortest run.
    pub min_secs: u64,
    /// Longest run.
    pub max_secs: u64,
}

impl DurationBounds {
    /// Create bounds. Callers guarantee `min_secs <= max_secs`.
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Whether `secs` lies within the bounds.
    pub fn contains(&self, secs: u64) -> bool {
        (self.min_secs..=self.max_secs).contains(&secs)
    }
}

impl From<&PoolConfig> for DurationBounds {
    fn from(config: &PoolConfig) -> Self {
        Self::new(config.min_duration_secs, config.max_duration_secs)
    }
}

/// Draw a run length uniformly from the inclusive bounds.
pub fn draw_duration<R: Rng + ?Sized>(rng: &mut R, bounds: DurationBounds) -> u64 {
    rng.gen_range(bounds.min_secs..=bounds.max_secs)
}

/// A spawned task that holds an instance for a randomized duration.
///
/// The task runs independently of whoever awaits it: dropping an
/// [`await_completion`](Self::await_completion) future leaves the runner
/// untouched, and a later call still yields the result.
#[derive(Debug)]
pub struct InstanceRunner {
    /// Handle to the sleeping task; resolves to the drawn duration.
    handle: JoinHandle<u64>,
    /// Cached result once the task has been joined.
    outcome: Option<Result<u64, String>>,
}

impl InstanceRunner {
    /// Draw a duration from `bounds` and start a runner for it.
    pub fn start(bounds: DurationBounds, time_unit: Duration) -> Self {
        let duration_secs = draw_duration(&mut rand::thread_rng(), bounds);
        Self::start_for(duration_secs, time_unit)
    }

    /// Start a runner that lasts exactly `duration_secs` simulated seconds.
    pub fn start_for(duration_secs: u64, time_unit: Duration) -> Self {
        let steps = u32::try_from(duration_secs).unwrap_or(u32::MAX);
        let sleep_for = time_unit.saturating_mul(steps);

        let handle = tokio::spawn(async move {
            tracing::trace!(duration_secs, "Instance runner started");
            tokio::time::sleep(sleep_for).await;
            duration_secs
        });

        Self {
            handle,
            outcome: None,
        }
    }

    /// Wait for the runner to finish and return the simulated seconds it ran.
    ///
    /// Cancel safe.
    pub async fn await_completion(&mut self) -> Result<u64, PoolError> {
        if self.outcome.is_none() {
            let joined = (&mut self.handle).await.map_err(|e| e.to_string());
            self.outcome = Some(joined);
        }

        match &self.outcome {
            Some(Ok(secs)) => Ok(*secs),
            Some(Err(msg)) => Err(PoolError::Runner(msg.clone())),
            None => Err(PoolError::Runner("runner outcome missing".to_string())),
        }
    }

    /// Stop the runner early. A pending or later `await_completion` fails.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Whether the runner task has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
