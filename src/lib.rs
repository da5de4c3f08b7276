//! commit-lanes - Incremental lane assignment for commit graphs
//!
//! Given commits in newest-to-oldest topological order, commit-lanes assigns
//! each one a snapshot of lanes (parallel tracks of development) that a
//! renderer can turn into a commit graph: forks, merges, heads, tails and
//! history boundaries. Every commit is visited once and its snapshot never
//! changes afterwards, so redraws never recompute history.
//!
//! # Architecture
//!
//! - [`core`] - Commit types, lane types, the lane engine, the revision
//!   cache and the driver that ties them together
//! - [`ui`] - Diagnostic output
//!
//! # Example
//!
//! ```
//! use commit_lanes::core::graph::LaneGraph;
//! use commit_lanes::core::lane::LaneKind;
//! use commit_lanes::core::types::{Commit, CommitId};
//!
//! let id = |s: &str| CommitId::new(s).unwrap();
//!
//! let mut graph = LaneGraph::new();
//! graph.push(Commit::new(id("c2"), vec![id("c1")])).unwrap();
//! graph.push(Commit::new(id("c1"), vec![])).unwrap();
//!
//! let lanes = graph.lanes_of(&id("c1")).unwrap();
//! assert_eq!(lanes[0].kind(), LaneKind::Initial);
//! ```
//!
//! # Correctness Invariants
//!
//! 1. Every lane has exactly one expectation slot
//! 2. A captured snapshot is never rewritten
//! 3. Row indices and commit identities form a bijection

pub mod core;
pub mod ui;
