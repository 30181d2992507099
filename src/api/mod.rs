//! REST API module for Research Crew
//!
//! - `health`: liveness endpoint
//! - `runs`: start a crew run, fetch and download results
//! - `store`: bounded in-memory run store

mod health;
mod runs;
mod store;

pub use health::health_routes;
pub use runs::{runs_routes, AppState};
pub use store::RunStore;
