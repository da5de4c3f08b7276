//! core::lanes
//!
//! The incremental lane engine.
//!
//! # Architecture
//!
//! The engine walks commits newest to oldest. At any point it holds a row
//! of lanes, and each lane waits for one commit identity: the next
//! ancestor on that line of history. When a commit arrives, the lanes
//! waiting for it are resolved, a snapshot of the row is captured for the
//! commit, and the lane then waits for the commit's first parent.
//!
//! Lanes live in an index-addressed arena of slots. A slot pairs the lane
//! type with its expectation, so the two sequences can never disagree in
//! length. Slots holding [`LaneKind::Empty`] form an implicit free list
//! that is reused by linear scan; live lane counts are bounded by the
//! number of concurrent branches.
//!
//! # Per-commit protocol
//!
//! The driver in [`crate::core::graph`] calls, exactly once per commit:
//!
//! 1. [`LaneEngine::is_fork`], then [`LaneEngine::change_active_lane`] on
//!    a discontinuity
//! 2. [`LaneEngine::set_boundary`]
//! 3. structural marks: [`LaneEngine::set_fork`], [`LaneEngine::set_merge`],
//!    [`LaneEngine::set_applied`], [`LaneEngine::set_initial`]
//! 4. [`LaneEngine::snapshot`]
//! 5. [`LaneEngine::next_parent`]
//! 6. the matching `after_*` passes, then [`LaneEngine::after_initial`]
//!    for roots
//!
//! # Invariants
//!
//! - `active_lane() < len()` whenever the engine is initialized
//! - Lane indices are only meaningful for the commit being processed

use super::lane::{Direction, Lane, LaneKind, LaneSnapshot};
use super::types::CommitId;

/// One lane and the commit it waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    lane: Lane,
    expected: Option<CommitId>,
}

/// Result of probing whether a commit is a fork point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkCheck {
    /// More than one lane waits for the commit
    pub fork: bool,
    /// The first lane waiting for the commit is not the active lane,
    /// or no lane waits for it at all
    pub discontinuity: bool,
}

/// Incremental lane state machine.
///
/// # Example
///
/// ```
/// use commit_lanes::core::lane::Lane;
/// use commit_lanes::core::lanes::LaneEngine;
/// use commit_lanes::core::types::CommitId;
///
/// let tip = CommitId::new("tip").unwrap();
/// let mut engine = LaneEngine::new();
/// engine.init(&tip);
///
/// assert_eq!(&engine.snapshot()[..], &[Lane::BRANCH]);
/// assert_eq!(engine.expected(0), Some(&tip));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LaneEngine {
    slots: Vec<Slot>,
    active: usize,
    boundary: bool,
}

impl LaneEngine {
    /// Create an uninitialized engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all state and start with a single branch lane waiting for
    /// `root`.
    pub fn init(&mut self, root: &CommitId) {
        self.clear();
        self.active = 0;
        self.set_boundary(false);
        self.add(Lane::BRANCH, Some(root.clone()), self.active);
    }

    /// Discard all state. The engine must be re-initialized before use.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.active = 0;
        self.boundary = false;
    }

    /// Whether the engine holds no lanes (uninitialized).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of lanes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Index of the lane holding the traversal cursor.
    pub fn active_lane(&self) -> usize {
        self.active
    }

    /// Whether boundary symbols are in effect.
    pub fn is_boundary(&self) -> bool {
        self.boundary
    }

    /// The current lane sequence.
    pub fn lanes(&self) -> impl ExactSizeIterator<Item = Lane> + '_ {
        self.slots.iter().map(|slot| slot.lane)
    }

    /// The commit lane `index` is waiting for, if any.
    pub fn expected(&self, index: usize) -> Option<&CommitId> {
        self.slots.get(index).and_then(|slot| slot.expected.as_ref())
    }

    /// Capture the current lane sequence.
    pub fn snapshot(&self) -> LaneSnapshot {
        self.lanes().collect()
    }

    /// Probe whether `id` is a fork point and whether reaching it moves the
    /// cursor off the active lane.
    pub fn is_fork(&self, id: &CommitId) -> ForkCheck {
        self.assert_initialized();

        match self.find_expected(id, 0) {
            None => ForkCheck {
                fork: false,
                discontinuity: true,
            },
            Some(first) => ForkCheck {
                fork: self.find_expected(id, first + 1).is_some(),
                discontinuity: first != self.active,
            },
        }
    }

    /// Mark the lanes converging on fork point `id`.
    ///
    /// Every lane waiting for `id` becomes a tail, the active lane becomes
    /// the node, and lanes between the outermost tails are drawn crossing
    /// behind the connector.
    pub fn set_fork(&mut self, id: &CommitId) {
        self.assert_initialized();

        let Some(first) = self.find_expected(id, 0) else {
            debug_assert!(false, "set_fork on {id} which no lane expects");
            return;
        };

        let range_start = first;
        let mut range_end = first;
        let mut next = Some(first);
        while let Some(idx) = next {
            range_end = idx;
            self.slots[idx].lane = Lane::TAIL;
            next = self.find_expected(id, idx + 1);
        }

        let node = self.node(Direction::None);
        self.slots[self.active].lane = node;

        if self.slots[range_start].lane == node {
            self.slots[range_start].lane = self.node(Direction::Left);
        }
        if self.slots[range_end].lane == node {
            self.slots[range_end].lane = self.node(Direction::Right);
        }
        if self.slots[range_start].lane == Lane::TAIL {
            self.slots[range_start].lane = Lane::TAIL.with_dir(Direction::Left);
        }
        if self.slots[range_end].lane == Lane::TAIL {
            self.slots[range_end].lane = Lane::TAIL.with_dir(Direction::Right);
        }

        for slot in self.interior(range_start, range_end) {
            slot.lane = match slot.lane.kind() {
                LaneKind::NotActive => Lane::CROSS,
                LaneKind::Empty => Lane::CROSS_EMPTY,
                _ => slot.lane,
            };
        }
    }

    /// Mark the lanes of a merge commit with the given parents.
    ///
    /// Must run after [`LaneEngine::set_fork`] when both apply. The first
    /// parent is represented by the active lane; every other parent joins a
    /// lane already waiting for it or starts a new head lane.
    pub fn set_merge(&mut self, parents: &[CommitId]) {
        self.assert_initialized();

        if self.boundary {
            // drawn as a plain active line
            return;
        }

        let was = self.slots[self.active].lane;
        let was_fork = was == self.node(Direction::None);
        let was_fork_left = was == self.node(Direction::Left);
        let was_fork_right = was == self.node(Direction::Right);
        let mut start_join_was_cross = false;
        let mut end_join_was_cross = false;

        let node = self.node(Direction::None);
        self.slots[self.active].lane = node;

        let mut range_start = self.active;
        let mut range_end = self.active;

        for parent in parents.iter().skip(1) {
            match self.find_expected(parent, 0) {
                Some(idx) => {
                    if idx > range_end {
                        range_end = idx;
                        end_join_was_cross = self.slots[idx].lane == Lane::CROSS;
                    }
                    if idx < range_start {
                        range_start = idx;
                        start_join_was_cross = self.slots[idx].lane == Lane::CROSS;
                    }
                    self.slots[idx].lane = Lane::JOIN;
                }
                None => {
                    range_end = self.add(Lane::HEAD, Some(parent.clone()), range_end + 1);
                }
            }
        }

        if self.slots[range_start].lane == node && !was_fork && !was_fork_right {
            self.slots[range_start].lane = self.node(Direction::Left);
        }
        if self.slots[range_end].lane == node && !was_fork && !was_fork_left {
            self.slots[range_end].lane = self.node(Direction::Right);
        }
        if self.slots[range_start].lane == Lane::JOIN && !start_join_was_cross {
            self.slots[range_start].lane = Lane::JOIN.with_dir(Direction::Left);
        }
        if self.slots[range_end].lane == Lane::JOIN && !end_join_was_cross {
            self.slots[range_end].lane = Lane::JOIN.with_dir(Direction::Right);
        }
        if self.slots[range_start].lane == Lane::HEAD {
            self.slots[range_start].lane = Lane::HEAD.with_dir(Direction::Left);
        }
        if self.slots[range_end].lane == Lane::HEAD {
            self.slots[range_end].lane = Lane::HEAD.with_dir(Direction::Right);
        }

        for slot in self.interior(range_start, range_end) {
            slot.lane = match slot.lane.kind() {
                LaneKind::NotActive => Lane::CROSS,
                LaneKind::Empty => Lane::CROSS_EMPTY,
                // a crossing connector cancels the tail's direction
                LaneKind::Tail => Lane::TAIL,
                _ => slot.lane,
            };
        }
    }

    /// Mark the active lane as a root commit, unless a fork, merge or
    /// applied mark already claimed it.
    pub fn set_initial(&mut self) {
        self.assert_initialized();

        let lane = self.slots[self.active].lane;
        if !self.is_node(lane) && lane != Lane::APPLIED {
            self.slots[self.active].lane = if self.boundary {
                Lane::BOUNDARY
            } else {
                Lane::INITIAL
            };
        }
    }

    /// Mark the active lane as an applied patch.
    pub fn set_applied(&mut self) {
        self.assert_initialized();
        self.slots[self.active].lane = Lane::APPLIED;
    }

    /// Switch between ordinary node symbols and boundary symbols.
    ///
    /// Must be the first state change for a commit. Turning boundary mode
    /// on marks the active lane as a boundary right away.
    pub fn set_boundary(&mut self, boundary: bool) {
        self.boundary = boundary;
        if boundary {
            self.assert_initialized();
            self.slots[self.active].lane = Lane::BOUNDARY;
        }
    }

    /// Terminate the active lane and move the cursor to the lane waiting
    /// for `id`, opening a new branch lane if none is.
    pub fn change_active_lane(&mut self, id: &CommitId) {
        self.assert_initialized();

        let current = &mut self.slots[self.active].lane;
        *current = if *current == Lane::INITIAL || current.is_boundary() {
            Lane::EMPTY
        } else {
            Lane::NOT_ACTIVE
        };

        let idx = match self.find_expected(id, 0) {
            Some(idx) => {
                self.slots[idx].lane = Lane::ACTIVE;
                idx
            }
            None => self.add(Lane::BRANCH, Some(id.clone()), 0),
        };
        self.active = idx;
    }

    /// Settle the transient marks of a merge commit.
    pub fn after_merge(&mut self) {
        self.assert_initialized();

        if self.boundary {
            // reset by change_active_lane()
            return;
        }

        let node_set = self.node_set();
        for slot in &mut self.slots {
            let lane = slot.lane;
            slot.lane = if lane.is_head() || lane.is_join() || lane == Lane::CROSS {
                Lane::NOT_ACTIVE
            } else if lane == Lane::CROSS_EMPTY {
                Lane::EMPTY
            } else if node_set.contains(&lane) {
                Lane::ACTIVE
            } else {
                lane
            };
        }
    }

    /// Settle the transient marks of a fork commit and drop trailing empty
    /// lanes.
    pub fn after_fork(&mut self) {
        self.assert_initialized();

        let node_set = self.node_set();
        for slot in &mut self.slots {
            if slot.lane == Lane::CROSS {
                slot.lane = Lane::NOT_ACTIVE;
            } else if slot.lane.is_tail() || slot.lane == Lane::CROSS_EMPTY {
                // free slots wait for nothing
                slot.lane = Lane::EMPTY;
                slot.expected = None;
            }

            if !self.boundary && node_set.contains(&slot.lane) {
                slot.lane = Lane::ACTIVE;
            }
        }

        while self.slots.len() > self.active + 1
            && self.slots.last().is_some_and(|slot| slot.lane == Lane::EMPTY)
        {
            self.slots.pop();
        }
    }

    /// Whether the active lane is a fresh branch.
    pub fn is_branch(&self) -> bool {
        self.slots
            .get(self.active)
            .is_some_and(|slot| slot.lane == Lane::BRANCH)
    }

    pub fn after_branch(&mut self) {
        self.assert_initialized();
        self.slots[self.active].lane = Lane::ACTIVE;
    }

    pub fn after_applied(&mut self) {
        self.assert_initialized();
        self.slots[self.active].lane = Lane::ACTIVE;
    }

    /// Mark a root's lane as initial once the fork and applied passes have
    /// settled it, so the next cursor move frees it.
    ///
    /// The snapshot is already captured; only the live lane changes.
    pub fn after_initial(&mut self) {
        self.assert_initialized();
        if !self.boundary && self.slots[self.active].lane == Lane::ACTIVE {
            self.slots[self.active].lane = Lane::INITIAL;
        }
    }

    /// Record the commit the active lane waits for next.
    ///
    /// Boundary lanes never resolve further, so they wait for nothing.
    pub fn next_parent(&mut self, id: Option<&CommitId>) {
        self.assert_initialized();
        self.slots[self.active].expected = if self.boundary { None } else { id.cloned() };
    }

    /// Node symbol for the current mode.
    fn node(&self, dir: Direction) -> Lane {
        match (self.boundary, dir) {
            (false, dir) => Lane::directed(LaneKind::MergeFork, dir),
            (true, Direction::None) => Lane::new(LaneKind::BoundaryCommit),
            (true, dir) => Lane::directed(LaneKind::Boundary, dir),
        }
    }

    fn node_set(&self) -> [Lane; 3] {
        [
            self.node(Direction::None),
            self.node(Direction::Left),
            self.node(Direction::Right),
        ]
    }

    fn is_node(&self, lane: Lane) -> bool {
        self.node_set().contains(&lane)
    }

    fn find_expected(&self, id: &CommitId, from: usize) -> Option<usize> {
        self.slots
            .iter()
            .skip(from)
            .position(|slot| slot.expected.as_ref() == Some(id))
            .map(|pos| pos + from)
    }

    fn find_lane(&self, lane: Lane, from: usize) -> Option<usize> {
        self.slots
            .iter()
            .skip(from)
            .position(|slot| slot.lane == lane)
            .map(|pos| pos + from)
    }

    /// Place a lane in the first empty slot at or after `from`, or append.
    fn add(&mut self, lane: Lane, expected: Option<CommitId>, from: usize) -> usize {
        if let Some(idx) = self.find_lane(Lane::EMPTY, from) {
            self.slots[idx] = Slot { lane, expected };
            return idx;
        }
        self.slots.push(Slot { lane, expected });
        self.slots.len() - 1
    }

    /// Slots strictly between `start` and `end`.
    fn interior(&mut self, start: usize, end: usize) -> impl Iterator<Item = &mut Slot> {
        let from = (start + 1).min(end);
        self.slots[from..end].iter_mut()
    }

    fn assert_initialized(&self) {
        assert!(
            self.active < self.slots.len(),
            "lane engine used before init (active lane {}, {} lanes)",
            self.active,
            self.slots.len()
        );
    }
}
