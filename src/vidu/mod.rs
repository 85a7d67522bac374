//! Client side of the Vidu video generation API.
//!
//! - `types` - wire types and task identifiers
//! - `client` - authenticated HTTP calls and API error mapping
//! - `poller` - waits for a submitted task to reach a terminal state

mod client;
mod poller;
mod types;

pub use client::{check_api_error, ViduApi, ViduClient};
pub use poller::{JobPoller, PollConfig, PollOutcome};
pub use types::{Creation, Endpoint, GenerationResult, TaskId, TaskState, TaskStatus};

#[cfg(test)]
pub(crate) mod testing;
