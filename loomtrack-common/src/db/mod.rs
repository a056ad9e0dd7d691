//! Database schema, entity models and store operations

pub mod init;
pub mod models;
pub mod production;
pub mod query;
pub mod worker_records;
pub mod workers;

pub use init::*;
pub use models::*;
pub use query::{DateFilter, SortOrder};
