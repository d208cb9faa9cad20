//! Blueprint server library: HTTP API, MCP server, and the AI suggestion
//! client, layered over `blueprint-core`.

pub mod ai;
pub mod api;
pub mod mcp;

// Re-export the core layers so binaries and tests use one crate path.
pub use blueprint_core::{board, db, models};
