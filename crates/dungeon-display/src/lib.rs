//! Status display implementations.
//!
//! - [`ConsoleDisplay`] keeps a status row per instance and renders it as a
//!   terminal table, echoing completion messages as they arrive.
//! - [`RecordingDisplay`] captures every notification as a
//!   [`DisplayEvent`](dungeon_core::events::DisplayEvent) for later
//!   inspection.

pub mod console;
pub mod recording;

pub use console::{ConsoleDisplay, StatusRow};
pub use recording::RecordingDisplay;
