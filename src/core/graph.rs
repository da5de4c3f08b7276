//! core::graph
//!
//! The per-commit driver over the revision cache and the lane engine.
//!
//! # Architecture
//!
//! [`LaneGraph`] owns a [`RevisionCache`] of commits and a [`LaneEngine`].
//! Commits are appended in newest-to-oldest topological order; each new row
//! is laid out right away, and rows whose lanes were cleared by retention
//! trimming are laid out again on the next pass. Layout resumes at the
//! first row without lanes (the frontier); everything above the frontier
//! is committed and immutable.
//!
//! # Invariants
//!
//! - Rows below [`LaneGraph::laid_out`] have lanes, rows at or past it
//!   have none
//! - A batch is applied completely or not at all
//! - Mutation needs `&mut self`, so readers never observe a half-applied
//!   commit and never straddle a [`LaneGraph::reset`]

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use thiserror::Error;

use super::cache::{CacheError, RevisionCache, Row};
use super::config::Config;
use super::lane::{Lane, LaneSnapshot};
use super::lanes::LaneEngine;
use super::types::{Commit, CommitId, CommitShape};
use crate::ui::output::{self, Verbosity};

/// Errors from graph operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("commit appears twice in batch: {0}")]
    DuplicateInBatch(CommitId),
}

/// Commit rows with their lane snapshots.
///
/// # Example
///
/// ```
/// use commit_lanes::core::graph::LaneGraph;
/// use commit_lanes::core::types::{Commit, CommitId};
///
/// let id = |s: &str| CommitId::new(s).unwrap();
///
/// let mut graph = LaneGraph::new();
/// graph
///     .extend(vec![
///         Commit::new(id("merge"), vec![id("left"), id("right")]),
///         Commit::new(id("right"), vec![id("base")]),
///         Commit::new(id("left"), vec![id("base")]),
///         Commit::new(id("base"), vec![]),
///     ])
///     .unwrap();
///
/// assert_eq!(graph.lanes_of(&id("merge")).unwrap().len(), 2);
/// assert_eq!(graph.lanes_of(&id("base")).unwrap().len(), 2);
/// assert_eq!(graph.lane_parent(&id("right"), 1), Some(&id("right")));
/// ```
#[derive(Debug, Default)]
pub struct LaneGraph {
    cache: RevisionCache<Commit>,
    engine: LaneEngine,
    /// First row without lanes
    frontier: usize,
    /// Parent id -> rows of loaded children, in row order
    children: HashMap<CommitId, Vec<usize>>,
    verbosity: Verbosity,
}

impl LaneGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph sized and tuned by `config`.
    pub fn with_config(config: &Config) -> Self {
        Self {
            cache: RevisionCache::with_capacity(config.initial_capacity()),
            verbosity: config.verbosity(),
            ..Self::default()
        }
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// Append a commit and lay out every pending row through it.
    ///
    /// Returns the commit's row.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Cache` if the commit is already loaded; the
    /// graph is left unchanged.
    pub fn push(&mut self, commit: Commit) -> Result<usize, GraphError> {
        let row = self.insert(commit)?;
        self.layout_pending()?;
        Ok(row)
    }

    /// Append a batch of commits atomically.
    ///
    /// The batch is checked for identities that are already loaded or
    /// repeated within the batch before anything is inserted. Returns the
    /// rows assigned to the batch.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Cache` for an already-loaded commit and
    /// `GraphError::DuplicateInBatch` for a repeat; the graph is left
    /// unchanged in both cases.
    pub fn extend(
        &mut self,
        batch: impl IntoIterator<Item = Commit>,
    ) -> Result<Range<usize>, GraphError> {
        let batch: Vec<Commit> = batch.into_iter().collect();

        let mut seen = HashSet::with_capacity(batch.len());
        for commit in &batch {
            if self.cache.contains(commit.id()) {
                return Err(CacheError::DuplicateCommit(commit.id().clone()).into());
            }
            if !seen.insert(commit.id()) {
                return Err(GraphError::DuplicateInBatch(commit.id().clone()));
            }
        }

        let start = self.cache.len();
        for commit in batch {
            self.insert(commit)?;
        }
        self.layout_pending()?;

        output::debug(
            format_args!("applied batch of {} commits", self.cache.len() - start),
            self.verbosity,
        );
        Ok(start..self.cache.len())
    }

    /// Lay out every row that has no lanes yet.
    pub fn layout_pending(&mut self) -> Result<(), GraphError> {
        while self.frontier < self.cache.len() {
            self.layout_next()?;
        }
        Ok(())
    }

    /// Lay out rows up to and including the row of `id`.
    ///
    /// Returns `false` if `id` is not loaded (yet).
    pub fn layout_until(&mut self, id: &CommitId) -> Result<bool, GraphError> {
        let Some(target) = self.cache.row_of(id) else {
            return Ok(false);
        };
        while self.frontier <= target {
            self.layout_next()?;
        }
        Ok(true)
    }

    /// Discard rows from `keep` on and clear lanes from `clear_lanes_from`
    /// on, so those rows are laid out again by the next pass.
    ///
    /// The engine restarts at the new frontier. Passing `0` for
    /// `clear_lanes_from` (or calling [`LaneGraph::rebuild`]) reproduces a
    /// full pass exactly. Does nothing if `keep` is not below the row
    /// count. Returns the number of rows discarded.
    pub fn trim_tail(&mut self, keep: usize, clear_lanes_from: usize) -> usize {
        let dropped = self.cache.trim_tail(keep, clear_lanes_from);
        if dropped == 0 {
            return 0;
        }

        self.engine.clear();
        self.frontier = self.frontier.min(clear_lanes_from).min(self.cache.len());

        self.children.retain(|_, rows| {
            rows.retain(|&row| row < keep);
            !rows.is_empty()
        });

        output::debug(
            format_args!(
                "trimmed {} rows, layout resumes at row {}",
                dropped, self.frontier
            ),
            self.verbosity,
        );
        dropped
    }

    /// Recompute every row's lanes from scratch.
    pub fn rebuild(&mut self) -> Result<(), GraphError> {
        self.cache.clear_lanes_from(0);
        self.engine.clear();
        self.frontier = 0;
        output::debug(
            format_args!("rebuilding lanes for {} rows", self.cache.len()),
            self.verbosity,
        );
        self.layout_pending()
    }

    /// Drop all rows and lane state.
    pub fn reset(&mut self) {
        self.cache.reset();
        self.engine.clear();
        self.children.clear();
        self.frontier = 0;
    }

    // =========================================================================
    // Readers
    // =========================================================================

    /// Number of loaded rows.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Number of rows with committed lanes. Readers must not look past it.
    pub fn laid_out(&self) -> usize {
        self.frontier
    }

    pub fn row_of(&self, id: &CommitId) -> Option<usize> {
        self.cache.row_of(id)
    }

    pub fn by_row(&self, row: usize) -> Option<&Row<Commit>> {
        self.cache.by_row(row)
    }

    /// The lanes captured for `id`, if it is loaded and laid out.
    pub fn lanes_of(&self, id: &CommitId) -> Option<&LaneSnapshot> {
        self.cache.by_id(id).and_then(Row::lanes)
    }

    /// Loaded commits that list `id` as a parent, in row order.
    pub fn children(&self, id: &CommitId) -> Vec<&CommitId> {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|&row| self.cache.by_row(row).map(Row::id))
            .collect()
    }

    /// The commit that line `lane` of `id`'s row leads into, seen from
    /// above.
    ///
    /// Walks up from the row above `id` to the first row where `lane` is
    /// not a passing line, then left to that row's node, counting heads on
    /// the way; the count selects the node commit's parent.
    pub fn lane_parent(&self, id: &CommitId, lane: usize) -> Option<&CommitId> {
        let row = self.cache.row_of(id)?;

        for above in (0..row).rev() {
            let entry = self.cache.by_row(above)?;
            let lanes = entry.lanes()?;
            if lane >= lanes.len() {
                return None;
            }
            if lanes[lane].is_free() {
                continue;
            }

            let mut idx = lane;
            let mut parent = 0;
            while !lanes[idx].is_merge() && lanes[idx] != Lane::ACTIVE {
                if lanes[idx].is_head() {
                    parent += 1;
                }
                idx = idx.checked_sub(1)?;
            }
            return entry.payload().parent(parent);
        }
        None
    }

    pub fn cache(&self) -> &RevisionCache<Commit> {
        &self.cache
    }

    pub fn engine(&self) -> &LaneEngine {
        &self.engine
    }

    // =========================================================================
    // Layout
    // =========================================================================

    fn insert(&mut self, commit: Commit) -> Result<usize, GraphError> {
        let parents = commit.parents().to_vec();
        let row = self.cache.insert_row(commit.id().clone(), commit)?;
        for parent in parents {
            if let Some(parent_row) = self.cache.row_of(&parent) {
                output::warn(
                    format_args!(
                        "row {} lists {} (row {}) as parent; history is not newest-first",
                        row, parent, parent_row
                    ),
                    self.verbosity,
                );
            }
            self.children.entry(parent).or_default().push(row);
        }
        Ok(row)
    }

    fn layout_next(&mut self) -> Result<(), GraphError> {
        let row = self.frontier;
        let len = self.cache.len();
        let commit = self
            .cache
            .by_row(row)
            .ok_or(CacheError::RowOutOfRange { row, len })?
            .payload();

        let snapshot = apply_commit(&mut self.engine, commit, self.verbosity);
        self.cache.set_lanes(row, snapshot)?;
        self.frontier += 1;
        Ok(())
    }
}

/// Run the per-commit transition sequence and return the captured lanes.
fn apply_commit(engine: &mut LaneEngine, commit: &Commit, verbosity: Verbosity) -> LaneSnapshot {
    let id = commit.id();
    let shape = commit.shape();

    if engine.is_empty() {
        engine.init(id);
    }

    let check = engine.is_fork(id);
    if check.discontinuity {
        // uses the previous commit's boundary state
        engine.change_active_lane(id);
        output::debug(
            format_args!("{} continues on lane {}", id, engine.active_lane()),
            verbosity,
        );
    }

    engine.set_boundary(commit.is_boundary());

    if check.fork {
        engine.set_fork(id);
        output::debug(format_args!("{} is a fork point", id), verbosity);
    }
    if shape == CommitShape::Merge {
        engine.set_merge(commit.parents());
        output::debug(
            format_args!("{} merges {} parents", id, commit.parents().len()),
            verbosity,
        );
    }
    if commit.is_applied() {
        engine.set_applied();
    }
    if shape == CommitShape::Root {
        engine.set_initial();
    }

    let snapshot = engine.snapshot();

    engine.next_parent(commit.parent(0));

    if commit.is_applied() {
        engine.after_applied();
    }
    if shape == CommitShape::Merge {
        engine.after_merge();
    }
    if check.fork {
        engine.after_fork();
    }
    if engine.is_branch() {
        engine.after_branch();
    }
    if shape == CommitShape::Root {
        engine.after_initial();
    }

    snapshot
}
