//! HTTP API handlers for loomtrack-api

pub mod health;
pub mod production;
pub mod worker_records;
pub mod workers;

pub use health::health_routes;
pub use production::production_routes;
pub use worker_records::worker_record_routes;
pub use workers::worker_routes;
