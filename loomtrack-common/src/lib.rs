//! # loomtrack common library
//!
//! Shared code for the loomtrack service:
//! - Entity models and the derivation rules applied on every write
//! - Lenient coercion of untyped request input
//! - SQLite schema initialization and store operations
//! - Configuration resolution
//! - Calendar/date helpers

pub mod config;
pub mod db;
pub mod derivation;
pub mod error;
pub mod input;
pub mod lenient;
pub mod time;

pub use derivation::{AttendanceStatus, DayOfWeek, MachineStatus};
pub use error::{Error, Result};
