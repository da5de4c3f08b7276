//! core::types
//!
//! Strong types for commits fed into the lane engine.
//!
//! # Types
//!
//! - [`CommitId`] - Opaque commit identity (usually a hash)
//! - [`Commit`] - Commit descriptor: identity plus ordered parents
//! - [`CommitShape`] - Root, linear or merge
//!
//! # Validation
//!
//! Identities are opaque, but they cannot be empty: an empty expectation
//! is how a lane says it waits for nothing. Whitespace is rejected too,
//! since identities are compared byte for byte.
//!
//! # Examples
//!
//! ```
//! use commit_lanes::core::types::{Commit, CommitId, CommitShape};
//!
//! let parent = CommitId::new("9fceb02").unwrap();
//! let commit = Commit::new(CommitId::new("a1b2c3d").unwrap(), vec![parent]);
//! assert_eq!(commit.shape(), CommitShape::Linear);
//!
//! assert!(CommitId::new("").is_err());
//! assert!(CommitId::new("has space").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid commit id: {0}")]
    InvalidCommitId(String),
}

/// An opaque commit identity.
///
/// Two commits are the same commit iff their identities are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Create a new validated commit identity.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCommitId` if the identity is empty or
    /// contains whitespace or control characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    fn validate(id: &str) -> Result<(), TypeError> {
        if id.is_empty() {
            return Err(TypeError::InvalidCommitId(
                "commit id cannot be empty".into(),
            ));
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidCommitId(format!(
                "commit id '{}' cannot contain whitespace or control characters",
                id.escape_debug()
            )));
        }
        Ok(())
    }

    /// Get the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get an abbreviated form of the identity.
    ///
    /// Returns the first `len` characters, or the whole identity if it is
    /// shorter.
    ///
    /// ```
    /// use commit_lanes::core::types::CommitId;
    ///
    /// let id = CommitId::new("abc123def").unwrap();
    /// assert_eq!(id.short(7), "abc123d");
    /// assert_eq!(id.short(40), "abc123def");
    /// ```
    pub fn short(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl TryFrom<String> for CommitId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for CommitId {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The structural shape of a commit, derived from its parent count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitShape {
    /// No parents
    Root,
    /// Exactly one parent
    Linear,
    /// Two or more parents
    Merge,
}

/// A commit as delivered by the history walker.
///
/// The lane engine only looks at the identity, the parent order and the
/// two flags. Everything else about a commit belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    id: CommitId,
    parents: Vec<CommitId>,
    /// Parents lie outside the loaded history window
    #[serde(default)]
    boundary: bool,
    /// Applied patch from a patch queue
    #[serde(default)]
    applied: bool,
}

impl Commit {
    /// Create a commit descriptor. Parent order is significant: the first
    /// parent continues the commit's own lane.
    pub fn new(id: CommitId, parents: Vec<CommitId>) -> Self {
        Self {
            id,
            parents,
            boundary: false,
            applied: false,
        }
    }

    /// Mark this commit as a history boundary.
    pub fn with_boundary(mut self, boundary: bool) -> Self {
        self.boundary = boundary;
        self
    }

    /// Mark this commit as an applied patch.
    pub fn with_applied(mut self, applied: bool) -> Self {
        self.applied = applied;
        self
    }

    pub fn id(&self) -> &CommitId {
        &self.id
    }

    pub fn parents(&self) -> &[CommitId] {
        &self.parents
    }

    /// Get the parent at `index`, if any.
    pub fn parent(&self, index: usize) -> Option<&CommitId> {
        self.parents.get(index)
    }

    pub fn is_boundary(&self) -> bool {
        self.boundary
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Classify the commit by parent count.
    pub fn shape(&self) -> CommitShape {
        match self.parents.len() {
            0 => CommitShape::Root,
            1 => CommitShape::Linear,
            _ => CommitShape::Merge,
        }
    }
}
