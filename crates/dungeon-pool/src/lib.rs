//! Bounded dungeon instance pool.
//!
//! This crate provides:
//! - A name generator for instances and players
//! - An instance runner that occupies an instance for a random duration
//! - The instance controller that gates, assigns and reclaims instances
//! - Matchmaking that groups a player roster into parties

pub mod controller;
pub mod error;
pub mod matchmaking;
pub mod name;
pub mod runner;
pub mod state;

pub use controller::{InstanceController, LaunchReceipt, ShutdownMode};
pub use error::PoolError;
pub use matchmaking::{Matchmaking, Roster};
pub use runner::{DurationBounds, InstanceRunner};
pub use state::{InstanceRecord, PoolSnapshot};
