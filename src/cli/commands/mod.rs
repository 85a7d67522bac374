//! CLI command implementations.

mod config;
mod doctor;
mod mcp;
mod query;

pub use config::run_config;
pub use doctor::run_doctor;
pub use mcp::run_mcp;
pub use query::run_query;
