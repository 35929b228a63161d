//! Common test infrastructure
//!
//! Spawns an isolated archive server per test, with its own temporary
//! database and archive directory. Tests import from this module only.

mod server;

pub use server::TestServer;
