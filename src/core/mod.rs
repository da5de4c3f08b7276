//! core
//!
//! Core domain types and the lane assignment machinery.
//!
//! # Modules
//!
//! - [`types`] - Strong types: CommitId, Commit
//! - [`lane`] - Lane kinds, directions and snapshots
//! - [`lanes`] - The incremental lane engine
//! - [`cache`] - Arrival-ordered revision cache with bounded retention
//! - [`graph`] - Per-commit driver over the cache and engine
//! - [`verify`] - Invariant checks for engine and cache
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Incomplete history is normal input, not an error
//! - All layout is deterministic

pub mod cache;
pub mod config;
pub mod graph;
pub mod lane;
pub mod lanes;
pub mod types;
pub mod verify;
