//! In-memory host collaborators backed by a JSON fixture.
//!
//! Used by the `herald` binary and by tests to stand in for the chat
//! platform's user store, community store, presence API, and message transport.

pub mod fixture_host;
pub mod host_fixture;

pub use fixture_host::*;
pub use host_fixture::*;
