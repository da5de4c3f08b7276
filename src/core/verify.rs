//! core::verify
//!
//! Structural verification of lane state.
//!
//! # Checks
//!
//! - **Engine**: the cursor is in range and only directional kinds carry a
//!   direction
//! - **Cache**: row indices match positions and the identity index is a
//!   bijection over live rows
//! - **Graph**: both of the above, plus every row below the frontier has
//!   lanes and no row at or past it does
//!
//! # Invariants
//!
//! - Never mutates what it inspects
//! - Must be deterministic

use thiserror::Error;

use super::cache::RevisionCache;
use super::graph::LaneGraph;
use super::lane::{Direction, Lane};
use super::lanes::LaneEngine;
use super::types::CommitId;

/// Errors from verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("active lane {active} out of range ({len} lanes)")]
    ActiveOutOfRange { active: usize, len: usize },

    #[error("lane {index} carries a direction its kind does not take: {lane}")]
    IllegalDirection { index: usize, lane: Lane },

    #[error("row at position {position} reports index {index}")]
    RowIndexMismatch { position: usize, index: usize },

    #[error("identity index does not map {0} to its row")]
    IdentityMismatch(CommitId),

    #[error("identity index holds {indexed} entries for {rows} rows")]
    IndexSizeMismatch { indexed: usize, rows: usize },

    #[error("row {0} is below the layout frontier but has no lanes")]
    MissingLanes(usize),

    #[error("row {0} is past the layout frontier but has lanes")]
    PrematureLanes(usize),

    #[error("row {0} has an empty lane snapshot")]
    EmptySnapshot(usize),
}

/// Result of verification.
#[derive(Debug)]
pub struct VerifyResult {
    /// Whether verification passed
    pub ok: bool,
    /// Errors found during verification
    pub errors: Vec<VerifyError>,
}

impl VerifyResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: vec![],
        }
    }

    /// Create a failed result with errors.
    pub fn failure(errors: Vec<VerifyError>) -> Self {
        Self { ok: false, errors }
    }

    fn from_errors(errors: Vec<VerifyError>) -> Self {
        if errors.is_empty() {
            Self::success()
        } else {
            Self::failure(errors)
        }
    }
}

/// Verify the engine's lane state.
///
/// An uninitialized engine is trivially valid.
pub fn verify_engine(engine: &LaneEngine) -> VerifyResult {
    VerifyResult::from_errors(engine_errors(engine))
}

/// Verify the cache's row and identity bookkeeping.
pub fn verify_cache<P>(cache: &RevisionCache<P>) -> VerifyResult {
    VerifyResult::from_errors(cache_errors(cache))
}

/// Verify the engine, the cache and the layout frontier of a graph.
pub fn verify_graph(graph: &LaneGraph) -> VerifyResult {
    let mut errors = engine_errors(graph.engine());
    errors.extend(cache_errors(graph.cache()));

    for row in graph.cache().iter() {
        let below = row.index() < graph.laid_out();
        match row.lanes() {
            None if below => errors.push(VerifyError::MissingLanes(row.index())),
            Some(_) if !below => errors.push(VerifyError::PrematureLanes(row.index())),
            Some(lanes) if lanes.is_empty() => {
                errors.push(VerifyError::EmptySnapshot(row.index()))
            }
            _ => {}
        }
    }

    VerifyResult::from_errors(errors)
}

fn engine_errors(engine: &LaneEngine) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    if engine.is_empty() {
        return errors;
    }

    if engine.active_lane() >= engine.len() {
        errors.push(VerifyError::ActiveOutOfRange {
            active: engine.active_lane(),
            len: engine.len(),
        });
    }

    for (index, lane) in engine.lanes().enumerate() {
        if lane.dir() != Direction::None && !lane.kind().takes_direction() {
            errors.push(VerifyError::IllegalDirection { index, lane });
        }
    }
    errors
}

fn cache_errors<P>(cache: &RevisionCache<P>) -> Vec<VerifyError> {
    let mut errors = Vec::new();

    for (position, row) in cache.iter().enumerate() {
        if row.index() != position {
            errors.push(VerifyError::RowIndexMismatch {
                position,
                index: row.index(),
            });
        }
        if cache.row_of(row.id()) != Some(position) {
            errors.push(VerifyError::IdentityMismatch(row.id().clone()));
        }
    }

    if cache.indexed() != cache.len() {
        errors.push(VerifyError::IndexSizeMismatch {
            indexed: cache.indexed(),
            rows: cache.len(),
        });
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Commit;

    fn id(s: &str) -> CommitId {
        CommitId::new(s).unwrap()
    }

    #[test]
    fn fresh_state_is_valid() {
        assert!(verify_engine(&LaneEngine::new()).ok);
        assert!(verify_cache(&RevisionCache::<()>::new()).ok);
        assert!(verify_graph(&LaneGraph::new()).ok);
    }

    #[test]
    fn engine_after_merge_is_valid() {
        let mut engine = LaneEngine::new();
        engine.init(&id("m"));
        engine.set_merge(&[id("a"), id("b"), id("c")]);

        let result = verify_engine(&engine);
        assert!(result.ok, "{:?}", result.errors);
    }

    #[test]
    fn graph_with_pending_rows_is_valid() {
        let mut graph = LaneGraph::new();
        graph
            .extend(vec![
                Commit::new(id("m"), vec![id("a"), id("b")]),
                Commit::new(id("b"), vec![id("a")]),
                Commit::new(id("a"), vec![]),
            ])
            .unwrap();
        graph.trim_tail(2, 1);

        let result = verify_graph(&graph);
        assert!(result.ok, "{:?}", result.errors);
        assert_eq!(graph.laid_out(), 1);
    }

    #[test]
    fn cache_after_trim_is_valid() {
        let mut cache = RevisionCache::new();
        for name in ["a", "b", "c", "d"] {
            cache.insert_row(id(name), ()).unwrap();
        }
        cache.trim_tail(2, 0);

        assert!(verify_cache(&cache).ok);
    }

    #[test]
    fn failure_carries_errors() {
        let result = VerifyResult::failure(vec![VerifyError::MissingLanes(3)]);
        assert!(!result.ok);
        assert_eq!(
            result.errors[0].to_string(),
            "row 3 is below the layout frontier but has no lanes"
        );
    }
}
