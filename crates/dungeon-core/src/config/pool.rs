//! Instance pool configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Bounded instance pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of dungeon instances that may be occupied at once.
    #[serde(default = "default_max_instances")]
    pub max_instances: usize,
    /// Shortest dungeon run, in simulated seconds (inclusive).
    #[serde(default = "default_min_duration")]
    pub min_duration_secs: u64,
    /// Longest dungeon run, in simulated seconds (inclusive).
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u64,
    /// Wall-clock length of one simulated second, in milliseconds.
    #[serde(default = "default_time_unit")]
    pub time_unit_ms: u64,
}

impl PoolConfig {
    /// Create a pool configuration with the default time unit.
    pub fn new(max_instances: usize, min_duration_secs: u64, max_duration_secs: u64) -> Self {
        Self {
            max_instances,
            min_duration_secs,
            max_duration_secs,
            time_unit_ms: default_time_unit(),
        }
    }

    /// Override the wall-clock length of one simulated second.
    pub fn with_time_unit_ms(mut self, time_unit_ms: u64) -> Self {
        self.time_unit_ms = time_unit_ms;
        self
    }

    /// Wall-clock length of one simulated second.
    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    /// Reject configurations the pool cannot be initialized with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_instances < 1 {
            return Err(AppError::configuration(
                "pool.max_instances must be at least 1",
            ));
        }
        if u32::try_from(self.max_instances).is_err() {
            return Err(AppError::configuration(format!(
                "pool.max_instances must not exceed {}",
                u32::MAX
            )));
        }
        if self.min_duration_secs < 1 {
            return Err(AppError::configuration(
                "pool.min_duration_secs must be at least 1",
            ));
        }
        if self.min_duration_secs > self.max_duration_secs {
            return Err(AppError::configuration(format!(
                "pool.min_duration_secs ({}) must not exceed pool.max_duration_secs ({})",
                self.min_duration_secs, self.max_duration_secs
            )));
        }
        if self.time_unit_ms == 0 {
            return Err(AppError::configuration(
                "pool.time_unit_ms must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(
            default_max_instances(),
            default_min_duration(),
            default_max_duration(),
        )
    }
}

fn default_max_instances() -> usize {
    3
}

fn default_min_duration() -> u64 {
    1
}

fn default_max_duration() -> u64 {
    15
}

fn default_time_unit() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_rejects_empty_pool() {
        let err = PoolConfig::new(0, 1, 2).validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_rejects_inverted_duration_bounds() {
        let err = PoolConfig::new(2, 5, 4).validate().unwrap_err();
        assert!(err.message.contains("min_duration_secs (5)"));
    }

    #[test]
    fn test_rejects_zero_min_duration() {
        assert!(PoolConfig::new(2, 0, 4).validate().is_err());
    }

    #[test]
    fn test_rejects_zero_time_unit() {
        assert!(PoolConfig::new(2, 1, 1).with_time_unit_ms(0).validate().is_err());
    }

    #[test]
    fn test_equal_bounds_are_valid() {
        assert!(PoolConfig::new(1, 1, 1).validate().is_ok());
    }

    #[test]
    fn test_time_unit() {
        let config = PoolConfig::new(1, 1, 1).with_time_unit_ms(25);
        assert_eq!(config.time_unit(), Duration::from_millis(25));
    }
}
