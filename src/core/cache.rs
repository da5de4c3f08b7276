//! core::cache
//!
//! Arrival-ordered revision cache.
//!
//! Rows are appended in the order the history walker delivers commits.
//! Each row carries its identity, its row index, a caller payload and,
//! once laid out, the captured lane snapshot.
//!
//! # Invariants
//!
//! - Identities are unique across the cache
//! - Row indices equal insertion position and strictly increase
//! - Row index and identity form a bijection over live rows
//! - A snapshot, once written, is only ever cleared, never rewritten
//!
//! # Retention
//!
//! [`RevisionCache::trim_tail`] discards the oldest suffix of rows and
//! clears snapshots from a given row on, so those rows are laid out again
//! on the next pass instead of being drawn with stale lanes.

use std::collections::HashMap;

use thiserror::Error;

use super::lane::LaneSnapshot;
use super::types::CommitId;

/// Errors from cache operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("commit already cached: {0}")]
    DuplicateCommit(CommitId),

    #[error("row {row} out of range ({len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("lanes already captured for row {0}")]
    SnapshotSealed(usize),
}

/// A cached commit row.
#[derive(Debug, Clone)]
pub struct Row<P> {
    id: CommitId,
    index: usize,
    payload: P,
    lanes: Option<LaneSnapshot>,
}

impl<P> Row<P> {
    pub fn id(&self) -> &CommitId {
        &self.id
    }

    /// Position of the row in arrival order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// The captured lanes, or `None` if the row still has to be laid out.
    pub fn lanes(&self) -> Option<&LaneSnapshot> {
        self.lanes.as_ref()
    }
}

/// Commits in arrival order with O(1) lookup by identity and by row.
#[derive(Debug, Clone)]
pub struct RevisionCache<P> {
    rows: Vec<Row<P>>,
    index: HashMap<CommitId, usize>,
}

impl<P> Default for RevisionCache<P> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<P> RevisionCache<P> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache sized for `capacity` rows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Append a row and return its index.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::DuplicateCommit` if `id` is already cached.
    pub fn insert_row(&mut self, id: CommitId, payload: P) -> Result<usize, CacheError> {
        if self.index.contains_key(&id) {
            return Err(CacheError::DuplicateCommit(id));
        }

        let index = self.rows.len();
        self.index.insert(id.clone(), index);
        self.rows.push(Row {
            id,
            index,
            payload,
            lanes: None,
        });
        Ok(index)
    }

    /// Row index of `id`, or `None` if it has not been loaded (yet).
    pub fn row_of(&self, id: &CommitId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// The row at `row`, or `None` past the end.
    pub fn by_row(&self, row: usize) -> Option<&Row<P>> {
        self.rows.get(row)
    }

    /// The row for `id`, if cached.
    pub fn by_id(&self, id: &CommitId) -> Option<&Row<P>> {
        self.row_of(id).and_then(|row| self.rows.get(row))
    }

    pub fn contains(&self, id: &CommitId) -> bool {
        self.index.contains_key(id)
    }

    /// Store the captured lanes of `row`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::RowOutOfRange` for unknown rows and
    /// `CacheError::SnapshotSealed` if the row already has lanes.
    pub fn set_lanes(&mut self, row: usize, lanes: LaneSnapshot) -> Result<(), CacheError> {
        let len = self.rows.len();
        let target = self
            .rows
            .get_mut(row)
            .ok_or(CacheError::RowOutOfRange { row, len })?;
        if target.lanes.is_some() {
            return Err(CacheError::SnapshotSealed(row));
        }
        target.lanes = Some(lanes);
        Ok(())
    }

    /// Discard every row from `keep` on and clear the lanes of surviving
    /// rows from `clear_lanes_from` on.
    ///
    /// Does nothing if `keep` is not below the current row count.
    /// Returns the number of rows discarded.
    pub fn trim_tail(&mut self, keep: usize, clear_lanes_from: usize) -> usize {
        if keep >= self.rows.len() {
            return 0;
        }

        let dropped = self.rows.len() - keep;
        for row in self.rows.drain(keep..) {
            self.index.remove(&row.id);
        }
        self.clear_lanes_from(clear_lanes_from);
        dropped
    }

    /// Clear the lanes of every row from `row` on.
    pub fn clear_lanes_from(&mut self, row: usize) {
        for row in self.rows.iter_mut().skip(row) {
            row.lanes = None;
        }
    }

    /// Drop all rows, returning to the just-constructed state.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Number of entries in the identity index.
    pub(crate) fn indexed(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in arrival order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Row<P>> {
        self.rows.iter()
    }
}
