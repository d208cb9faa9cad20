//! Core library for Blueprint.
//!
//! This crate provides the domain models, the SQLite-backed store, and the
//! roadmap board reconciler, independent of any transport layer (HTTP, MCP,
//! etc.).
//!
//! # Usage
//!
//! ```no_run
//! use blueprint_core::db::Database;
//! use blueprint_core::models::*;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let workspace = db.create_workspace(CreateWorkspaceInput {
//!     name: "Acme".into(),
//!     owner: None,
//! })?;
//! let roadmap = db.roadmap_for_workspace(workspace.id)?;
//! let features = db.list_features(roadmap.id)?;
//! # Ok::<(), blueprint_core::Error>(())
//! ```

pub mod board;
pub mod db;
pub mod error;
pub mod models;

// Re-export commonly used types at crate root
pub use board::{BoardCommit, BoardSession, DragTarget, RoadmapBoard};
pub use db::Database;
pub use error::{Error, Result};
