//! core::lane
//!
//! Lane types: what a single lane looks like on a single row.
//!
//! A lane type is a base [`LaneKind`] plus an optional [`Direction`]. Only
//! node, head, join, tail and boundary kinds carry a direction; it tells the
//! renderer which end of a horizontal connector the lane sits on.
//!
//! # Textual codes
//!
//! Every lane type has a short stable code used for `Display` and serde:
//! `active`, `fork-left`, `tail-right`, `cross-empty`, ...

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable per-commit capture of the lane sequence.
///
/// Cheap to clone; readers may hold one while the writer keeps going.
pub type LaneSnapshot = Arc<[Lane]>;

/// Base lane kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// The lane holding the current commit's line
    Active,
    /// A line passing by without a commit on this row
    NotActive,
    /// An unused slot
    Empty,
    /// First commit of a new line
    Branch,
    /// Root commit
    Initial,
    /// Applied patch
    Applied,
    /// Merge and/or fork node
    MergeFork,
    /// Line starting at a merge's extra parent
    Head,
    /// Existing line absorbing a merge's extra parent
    Join,
    /// Line ending at a fork node
    Tail,
    /// Line passing behind a horizontal connector
    Cross,
    /// Empty slot under a horizontal connector
    CrossEmpty,
    /// History truncated here
    Boundary,
    /// Node of a boundary commit
    BoundaryCommit,
}

impl LaneKind {
    /// Whether this kind may carry a left/right modifier.
    pub fn takes_direction(self) -> bool {
        matches!(
            self,
            LaneKind::MergeFork
                | LaneKind::Head
                | LaneKind::Join
                | LaneKind::Tail
                | LaneKind::Boundary
        )
    }

    fn code(self) -> &'static str {
        match self {
            LaneKind::Active => "active",
            LaneKind::NotActive => "not-active",
            LaneKind::Empty => "empty",
            LaneKind::Branch => "branch",
            LaneKind::Initial => "initial",
            LaneKind::Applied => "applied",
            LaneKind::MergeFork => "fork",
            LaneKind::Head => "head",
            LaneKind::Join => "join",
            LaneKind::Tail => "tail",
            LaneKind::Cross => "cross",
            LaneKind::CrossEmpty => "cross-empty",
            LaneKind::Boundary => "boundary",
            LaneKind::BoundaryCommit => "boundary-commit",
        }
    }

    const ALL: [LaneKind; 14] = [
        LaneKind::Active,
        LaneKind::NotActive,
        LaneKind::Empty,
        LaneKind::Branch,
        LaneKind::Initial,
        LaneKind::Applied,
        LaneKind::MergeFork,
        LaneKind::Head,
        LaneKind::Join,
        LaneKind::Tail,
        LaneKind::Cross,
        LaneKind::CrossEmpty,
        LaneKind::Boundary,
        LaneKind::BoundaryCommit,
    ];
}

/// Directional modifier of a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    None,
    Left,
    Right,
}

/// A lane type: base kind plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lane {
    kind: LaneKind,
    dir: Direction,
}

impl Lane {
    pub const ACTIVE: Lane = Lane::new(LaneKind::Active);
    pub const NOT_ACTIVE: Lane = Lane::new(LaneKind::NotActive);
    pub const EMPTY: Lane = Lane::new(LaneKind::Empty);
    pub const BRANCH: Lane = Lane::new(LaneKind::Branch);
    pub const INITIAL: Lane = Lane::new(LaneKind::Initial);
    pub const APPLIED: Lane = Lane::new(LaneKind::Applied);
    pub const HEAD: Lane = Lane::new(LaneKind::Head);
    pub const JOIN: Lane = Lane::new(LaneKind::Join);
    pub const TAIL: Lane = Lane::new(LaneKind::Tail);
    pub const CROSS: Lane = Lane::new(LaneKind::Cross);
    pub const CROSS_EMPTY: Lane = Lane::new(LaneKind::CrossEmpty);
    pub const BOUNDARY: Lane = Lane::new(LaneKind::Boundary);

    /// An undirected lane of the given kind.
    pub const fn new(kind: LaneKind) -> Self {
        Self {
            kind,
            dir: Direction::None,
        }
    }

    /// A lane of the given kind and direction.
    ///
    /// Only kinds for which [`LaneKind::takes_direction`] holds may be
    /// directed.
    pub fn directed(kind: LaneKind, dir: Direction) -> Self {
        debug_assert!(
            dir == Direction::None || kind.takes_direction(),
            "{kind:?} lanes cannot carry a direction"
        );
        Self { kind, dir }
    }

    /// The same kind with a different direction.
    pub fn with_dir(self, dir: Direction) -> Self {
        Self::directed(self.kind, dir)
    }

    pub fn kind(self) -> LaneKind {
        self.kind
    }

    pub fn dir(self) -> Direction {
        self.dir
    }

    pub fn is_head(self) -> bool {
        self.kind == LaneKind::Head
    }

    pub fn is_tail(self) -> bool {
        self.kind == LaneKind::Tail
    }

    pub fn is_join(self) -> bool {
        self.kind == LaneKind::Join
    }

    /// Any boundary marker, node or not.
    pub fn is_boundary(self) -> bool {
        matches!(self.kind, LaneKind::Boundary | LaneKind::BoundaryCommit)
    }

    /// A merge/fork node, including boundary markers.
    pub fn is_merge(self) -> bool {
        self.kind == LaneKind::MergeFork || self.is_boundary()
    }

    /// The lane holds a commit glyph or the line leading into one.
    pub fn is_active(self) -> bool {
        matches!(
            self.kind,
            LaneKind::Active | LaneKind::Initial | LaneKind::Branch
        ) || self.is_merge()
    }

    /// The lane carries no commit of its own on this row.
    pub fn is_free(self) -> bool {
        matches!(self.kind, LaneKind::NotActive | LaneKind::Cross) || self.is_join()
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dir {
            Direction::None => f.write_str(self.kind.code()),
            Direction::Left => write!(f, "{}-left", self.kind.code()),
            Direction::Right => write!(f, "{}-right", self.kind.code()),
        }
    }
}

/// Errors from parsing lane codes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LaneParseError {
    #[error("unknown lane type: {0}")]
    Unknown(String),
}

impl FromStr for Lane {
    type Err = LaneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, dir) = if let Some(base) = s.strip_suffix("-left") {
            (base, Direction::Left)
        } else if let Some(base) = s.strip_suffix("-right") {
            (base, Direction::Right)
        } else {
            (s, Direction::None)
        };

        LaneKind::ALL
            .into_iter()
            .find(|kind| kind.code() == base)
            .filter(|kind| dir == Direction::None || kind.takes_direction())
            .map(|kind| Lane::directed(kind, dir))
            .ok_or_else(|| LaneParseError::Unknown(s.to_string()))
    }
}

impl Serialize for Lane {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Lane {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_kinds() {
        let directed: Vec<_> = LaneKind::ALL
            .into_iter()
            .filter(|k| k.takes_direction())
            .collect();
        assert_eq!(
            directed,
            vec![
                LaneKind::MergeFork,
                LaneKind::Head,
                LaneKind::Join,
                LaneKind::Tail,
                LaneKind::Boundary
            ]
        );
    }

    #[test]
    fn kind_and_direction_are_independent() {
        let lane = Lane::directed(LaneKind::Tail, Direction::Left);
        assert!(lane.is_tail());
        assert_eq!(lane.dir(), Direction::Left);
        assert_eq!(lane.with_dir(Direction::None), Lane::TAIL);
    }

    #[test]
    fn boundary_counts_as_merge() {
        assert!(Lane::BOUNDARY.is_merge());
        assert!(Lane::new(LaneKind::BoundaryCommit).is_merge());
        assert!(Lane::directed(LaneKind::Boundary, Direction::Right).is_boundary());
        assert!(!Lane::TAIL.is_merge());
    }

    #[test]
    fn active_predicate() {
        assert!(Lane::ACTIVE.is_active());
        assert!(Lane::INITIAL.is_active());
        assert!(Lane::BRANCH.is_active());
        assert!(Lane::directed(LaneKind::MergeFork, Direction::Left).is_active());
        assert!(!Lane::APPLIED.is_active());
        assert!(!Lane::NOT_ACTIVE.is_active());
    }

    #[test]
    fn free_predicate() {
        assert!(Lane::NOT_ACTIVE.is_free());
        assert!(Lane::CROSS.is_free());
        assert!(Lane::directed(LaneKind::Join, Direction::Right).is_free());
        assert!(!Lane::EMPTY.is_free());
        assert!(!Lane::CROSS_EMPTY.is_free());
        assert!(!Lane::HEAD.is_free());
    }

    #[test]
    fn display_codes() {
        assert_eq!(Lane::CROSS_EMPTY.to_string(), "cross-empty");
        assert_eq!(
            Lane::directed(LaneKind::MergeFork, Direction::Left).to_string(),
            "fork-left"
        );
        assert_eq!(
            Lane::directed(LaneKind::Tail, Direction::Right).to_string(),
            "tail-right"
        );
    }

    #[test]
    fn parse_every_code() {
        for kind in LaneKind::ALL {
            let lane = Lane::new(kind);
            assert_eq!(lane.to_string().parse::<Lane>(), Ok(lane));
            if kind.takes_direction() {
                for dir in [Direction::Left, Direction::Right] {
                    let lane = Lane::directed(kind, dir);
                    assert_eq!(lane.to_string().parse::<Lane>(), Ok(lane));
                }
            }
        }
    }

    #[test]
    fn parse_rejects_direction_on_plain_kinds() {
        assert!("cross-left".parse::<Lane>().is_err());
        assert!("cross-empty-right".parse::<Lane>().is_err());
        assert!("sideways".parse::<Lane>().is_err());
    }

    #[test]
    fn snapshot_serializes_as_codes() {
        let snapshot: LaneSnapshot = Arc::from(vec![
            Lane::directed(LaneKind::MergeFork, Direction::Left),
            Lane::directed(LaneKind::Head, Direction::Right),
        ]);
        let json = serde_json::to_string(&snapshot[..]).unwrap();
        assert_eq!(json, r#"["fork-left","head-right"]"#);

        let parsed: Vec<Lane> = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed[..], &snapshot[..]);
    }
}
