//! # dungeon-core
//!
//! Core crate for the dungeon queue. Contains the configuration schema,
//! typed identifiers, party/player types, display events, the
//! [`StatusDisplay`](traits::StatusDisplay) observer trait, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other dungeon crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
