// Library interface for the binary and for integration tests

pub mod config;
pub mod constants;
pub mod dashboard;
pub mod db;
pub mod departments;
pub mod enrichment;
pub mod error;
pub mod filter_options;
pub mod models;
pub mod monitor;
pub mod queries;
pub mod recording;
pub mod roster;
pub mod schedule;
pub mod schema;
pub mod seed;
pub mod serve;

pub use error::{AppError, AppResult};
