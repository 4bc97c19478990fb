//! Gridlock match server.
//!
//! Hosts any number of matches of the gridlock rules engine behind a JSON
//! HTTP API. Clients drive a match with one request per engine operation and
//! follow it by polling the event log with a timestamp cursor.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api_error;
mod config;
mod registry;
mod routes;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Matches
pub use registry::{MatchHandle, MatchRegistry};

// Crate-level exports - HTTP
pub use api_error::ApiError;
pub use routes::{router, EventsQuery, EventsResponse, MatchList, RollResponse};
