//! Path-derived node identifiers.
//!
//! Identifiers come from a node's position in the tree, never from its label, so they are unique
//! within a render and stable across re-renders no matter what the labels contain.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Problem,
    Major { m: usize },
    Sub { m: usize, s: usize },
    Root { m: usize, s: usize, t: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeRole {
    Problem,
    Category,
    SubCause,
    RootCause,
}

impl NodeId {
    /// Builds the identifier for a zero-based index path.
    ///
    /// An empty path is the problem node; paths longer than three levels are not part of the
    /// taxonomy and yield `None`.
    pub fn from_path(path: &[usize]) -> Option<Self> {
        match *path {
            [] => Some(Self::Problem),
            [m] => Some(Self::Major { m }),
            [m, s] => Some(Self::Sub { m, s }),
            [m, s, t] => Some(Self::Root { m, s, t }),
            _ => None,
        }
    }

    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Problem => None,
            Self::Major { .. } => Some(Self::Problem),
            Self::Sub { m, .. } => Some(Self::Major { m }),
            Self::Root { m, s, .. } => Some(Self::Sub { m, s }),
        }
    }

    pub fn role(self) -> NodeRole {
        match self {
            Self::Problem => NodeRole::Problem,
            Self::Major { .. } => NodeRole::Category,
            Self::Sub { .. } => NodeRole::SubCause,
            Self::Root { .. } => NodeRole::RootCause,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Problem => f.write_str("Problem"),
            Self::Major { m } => write!(f, "M{m}"),
            Self::Sub { m, s } => write!(f, "M{m}S{s}"),
            Self::Root { m, s, t } => write!(f, "M{m}S{s}T{t}"),
        }
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `identify(path)` as a string token (`M2`, `M2S1`, `M2S1T0`).
pub fn identify(path: &[usize]) -> Option<String> {
    NodeId::from_path(path).map(|id| id.to_string())
}
