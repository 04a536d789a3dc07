// Travel Planner - API Core
//
// HTTP entry points for candidate discovery and itinerary generation.
// The planning logic lives in the `planner` crate; this crate wires it to
// real search and reasoning services, a catalog, and env configuration.

pub mod config;
pub mod server;

pub use config::*;
