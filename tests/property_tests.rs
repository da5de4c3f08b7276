//! Property-based tests for lane assignment.
//!
//! These tests use proptest to verify invariants hold across randomly
//! generated histories delivered newest first.

use proptest::prelude::*;

use commit_lanes::core::graph::LaneGraph;
use commit_lanes::core::lane::{Lane, LaneSnapshot};
use commit_lanes::core::types::{Commit, CommitId};
use commit_lanes::core::verify::{verify_engine, verify_graph};

fn id(s: &str) -> CommitId {
    CommitId::new(s).unwrap()
}

/// Raw shape of one generated commit: parent picks, whether it also has a
/// parent outside the history, and its boundary and applied flags.
type RawCommit = (Vec<usize>, bool, bool, bool);

/// Strategy for generating histories in newest-to-oldest order.
///
/// Commit `c{i}` only names parents `c{j}` with `j > i`, so every history is
/// a valid topological order. Some commits also name a parent that is never
/// loaded.
fn history_strategy() -> impl Strategy<Value = Vec<Commit>> {
    prop::collection::vec(
        (
            prop::collection::vec(any::<usize>(), 0..4),
            prop::bool::weighted(0.15),
            prop::bool::weighted(0.1),
            prop::bool::weighted(0.1),
        ),
        1..40,
    )
    .prop_map(build_history)
}

/// Histories without boundary or applied commits.
fn plain_history_strategy() -> impl Strategy<Value = Vec<Commit>> {
    history_strategy().prop_map(|commits| {
        commits
            .into_iter()
            .map(|c| c.with_boundary(false).with_applied(false))
            .collect()
    })
}

fn build_history(raw: Vec<RawCommit>) -> Vec<Commit> {
    let n = raw.len();
    raw.into_iter()
        .enumerate()
        .map(|(i, (picks, external, boundary, applied))| {
            let older = n - i - 1;
            let mut parents: Vec<CommitId> = Vec::new();
            if older > 0 {
                for pick in picks {
                    let parent = id(&format!("c{}", i + 1 + pick % older));
                    if !parents.contains(&parent) {
                        parents.push(parent);
                    }
                }
            }
            if external {
                parents.push(id(&format!("x{i}")));
            }
            Commit::new(id(&format!("c{i}")), parents)
                .with_boundary(boundary)
                .with_applied(applied)
        })
        .collect()
}

fn snapshots(graph: &LaneGraph) -> Vec<LaneSnapshot> {
    graph
        .cache()
        .iter()
        .map(|row| row.lanes().cloned().unwrap())
        .collect()
}

proptest! {
    /// Every commit gets a non-empty snapshot and all structural checks pass.
    #[test]
    fn every_row_laid_out(history in history_strategy()) {
        let mut graph = LaneGraph::new();
        graph.extend(history.clone()).unwrap();

        prop_assert_eq!(graph.laid_out(), history.len());
        let result = verify_graph(&graph);
        prop_assert!(result.ok, "{:?}", result.errors);
    }

    /// The engine stays consistent after every single commit.
    #[test]
    fn engine_consistent_after_each_commit(history in history_strategy()) {
        let mut graph = LaneGraph::new();
        for commit in history {
            graph.push(commit).unwrap();
            let engine = graph.engine();
            prop_assert!(engine.active_lane() < engine.len());
            let result = verify_engine(engine);
            prop_assert!(result.ok, "{:?}", result.errors);
        }
    }

    /// Recomputing from scratch yields identical snapshots.
    #[test]
    fn rebuild_is_deterministic(history in history_strategy()) {
        let mut graph = LaneGraph::new();
        graph.extend(history).unwrap();
        let before = snapshots(&graph);

        graph.rebuild().unwrap();

        prop_assert_eq!(before, snapshots(&graph));
    }

    /// Trimming with a full lane reset and reloading the tail reproduces the
    /// full-pass layout.
    #[test]
    fn trim_and_reload_matches_full_pass(
        history in history_strategy(),
        keep in any::<prop::sample::Index>(),
    ) {
        let mut full = LaneGraph::new();
        full.extend(history.clone()).unwrap();

        let keep = keep.index(history.len());
        let mut graph = LaneGraph::new();
        graph.extend(history.clone()).unwrap();
        graph.trim_tail(keep, 0);
        graph.extend(history[keep..].to_vec()).unwrap();

        prop_assert_eq!(snapshots(&full), snapshots(&graph));
    }

    /// Each extra parent of a merge shows up as exactly one head or join.
    #[test]
    fn merge_rows_mark_extra_parents(history in plain_history_strategy()) {
        let mut graph = LaneGraph::new();
        graph.extend(history.clone()).unwrap();

        for commit in history.iter().filter(|c| c.parents().len() > 1) {
            let lanes = graph.lanes_of(commit.id()).unwrap();
            let marked = lanes.iter().filter(|l| l.is_head() || l.is_join()).count();
            prop_assert_eq!(marked, commit.parents().len() - 1);
        }
    }

    /// Without merges or forks no row shows connectors.
    #[test]
    fn chains_have_no_connectors(len in 1usize..30) {
        let history: Vec<Commit> = (0..len)
            .map(|i| {
                let parents = if i + 1 < len {
                    vec![id(&format!("c{}", i + 1))]
                } else {
                    vec![]
                };
                Commit::new(id(&format!("c{i}")), parents)
            })
            .collect();

        let mut graph = LaneGraph::new();
        graph.extend(history).unwrap();

        for row in graph.cache().iter() {
            let lanes = row.lanes().unwrap();
            prop_assert_eq!(lanes.len(), 1);
            prop_assert!(lanes[0] == Lane::BRANCH || lanes[0] == Lane::ACTIVE || lanes[0] == Lane::INITIAL);
        }
    }

    /// Every loaded child is reported for each of its parents.
    #[test]
    fn children_mirror_parents(history in history_strategy()) {
        let mut graph = LaneGraph::new();
        graph.extend(history.clone()).unwrap();

        for commit in &history {
            for parent in commit.parents() {
                prop_assert!(graph.children(parent).contains(&commit.id()));
            }
        }
    }

    /// Resolved lane parents are always real parents of a loaded commit.
    #[test]
    fn lane_parent_is_a_parent(history in history_strategy(), lane in 0usize..6) {
        let mut graph = LaneGraph::new();
        graph.extend(history.clone()).unwrap();

        for commit in &history {
            if let Some(parent) = graph.lane_parent(commit.id(), lane) {
                prop_assert!(history.iter().any(|c| c.parents().contains(parent)));
            }
        }
    }

    /// Short identities are prefixes of the full identity.
    #[test]
    fn commit_id_short_is_prefix(name in "[a-f0-9]{1,40}", len in 1usize..50) {
        let commit_id = id(&name);
        prop_assert!(commit_id.as_str().starts_with(commit_id.short(len)));
    }
}
