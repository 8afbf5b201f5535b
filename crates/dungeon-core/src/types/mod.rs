//! Shared domain types.

pub mod id;
pub mod party;

pub use id::{InstanceId, PartyNumber};
pub use party::{Party, Player, Role};
