//! Core traits defined in `dungeon-core` and implemented by other crates.

pub mod status_display;

pub use status_display::StatusDisplay;
