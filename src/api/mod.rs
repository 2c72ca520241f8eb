//! HTTP API over the scheduling engine.
//!
//! Routes are nested under `/api/`. Every route except `/api/health`
//! requires `X-Actor-Id` and `X-Actor-Name` headers identifying the acting
//! user; the handlers pass that `Actor` to the engine and record an activity
//! entry for each change.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ApiSession};
pub use types::ApiContext;
