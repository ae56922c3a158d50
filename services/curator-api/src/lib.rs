//! Library surface of the curator API, exposed so integration tests can
//! drive the router directly.

pub mod server;

pub use server::{build_router, start_server, ServerState};
