//! Time-indexed node identities.
//!
//! A DBN template materializes exactly two slices. Inside the model every
//! node lives in either the [`Slice::Current`] or the [`Slice::Next`] copy.
//! Callers describe nodes with a [`TimedNode`], whose slice is an arbitrary
//! integer; admission normalizes it onto the two canonical slices.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StructureError;

/// One of the two canonical slices of the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slice {
    /// Slice 0: the current time step.
    Current,
    /// Slice 1: the generic "next" time step.
    Next,
}

impl Slice {
    /// The other slice of the template.
    #[must_use]
    pub const fn mirror(self) -> Self {
        match self {
            Self::Current => Self::Next,
            Self::Next => Self::Current,
        }
    }

    /// Integer index of this slice (0 or 1).
    #[must_use]
    pub const fn index(self) -> i64 {
        match self {
            Self::Current => 0,
            Self::Next => 1,
        }
    }

    /// Maps an integer index onto a canonical slice.
    #[must_use]
    pub const fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Current),
            1 => Some(Self::Next),
            _ => None,
        }
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// A variable of the two-slice template: a base name in one canonical slice.
///
/// # Examples
///
/// ```
/// use dbnet::{Node, Slice};
///
/// let d0 = Node::current("D");
/// assert_eq!(d0.mirrored(), Node::new("D", Slice::Next));
/// assert_eq!(d0.to_string(), "(D, 0)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    /// Base variable name, shared by both slice copies.
    pub name: String,
    /// Canonical slice of this copy.
    pub slice: Slice,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>, slice: Slice) -> Self {
        Self {
            name: name.into(),
            slice,
        }
    }

    /// Node in slice 0.
    #[must_use]
    pub fn current(name: impl Into<String>) -> Self {
        Self::new(name, Slice::Current)
    }

    /// Node in slice 1.
    #[must_use]
    pub fn next(name: impl Into<String>) -> Self {
        Self::new(name, Slice::Next)
    }

    /// The same variable in the other slice.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self::new(self.name.clone(), self.slice.mirror())
    }

    /// Same base name, relabeled to an arbitrary time slice.
    #[must_use]
    pub fn at(&self, time_slice: i64) -> TimedNode {
        TimedNode::new(self.name.clone(), time_slice)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.name, self.slice)
    }
}

impl From<&Node> for TimedNode {
    fn from(node: &Node) -> Self {
        node.at(node.slice.index())
    }
}

impl From<Node> for TimedNode {
    fn from(node: Node) -> Self {
        Self::from(&node)
    }
}

/// A `(name, time_slice)` coordinate with an unconstrained slice index.
///
/// Used both for caller input to edge admission and for query results
/// relabeled to a requested slice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimedNode {
    pub name: String,
    pub time_slice: i64,
}

impl TimedNode {
    #[must_use]
    pub fn new(name: impl Into<String>, time_slice: i64) -> Self {
        Self {
            name: name.into(),
            time_slice,
        }
    }

    /// Parses a dynamically-typed `[name, time_slice]` pair.
    ///
    /// The name may be a string or an integer; the slice must be an integer.
    ///
    /// # Errors
    ///
    /// Returns `StructureError::MalformedNode` unless `value` is a
    /// two-element array of `(name, integer)`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, StructureError> {
        let Some(parts) = value.as_array() else {
            return Err(malformed(format!("expected a [name, time_slice] pair, got {value}")));
        };
        let [name, time_slice] = parts.as_slice() else {
            return Err(malformed(format!("expected 2 elements, got {}", parts.len())));
        };

        let name = match name {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
            other => return Err(malformed(format!("node name must be a string or integer, got {other}"))),
        };
        let Some(time_slice) = time_slice.as_i64() else {
            return Err(malformed(format!("time slice must be an integer, got {time_slice}")));
        };

        Ok(Self { name, time_slice })
    }

    /// Returns the canonical node if the slice index is 0 or 1.
    #[must_use]
    pub fn canonical(&self) -> Option<Node> {
        Slice::from_index(self.time_slice).map(|slice| Node::new(self.name.clone(), slice))
    }
}

impl fmt::Display for TimedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.name, self.time_slice)
    }
}

impl<S: Into<String>> From<(S, i64)> for TimedNode {
    fn from((name, time_slice): (S, i64)) -> Self {
        Self::new(name, time_slice)
    }
}

fn malformed(reason: String) -> StructureError {
    StructureError::MalformedNode { reason }
}

/// Rejects negative slice arguments of slice queries.
pub(crate) fn validate_time_slice(time_slice: i64) -> Result<(), StructureError> {
    if time_slice < 0 {
        return Err(StructureError::InvalidSlice { time_slice });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slice_mirror_is_involution() {
        assert_eq!(Slice::Current.mirror(), Slice::Next);
        assert_eq!(Slice::Next.mirror(), Slice::Current);
        assert_eq!(Slice::Current.mirror().mirror(), Slice::Current);
    }

    #[test]
    fn test_slice_index_roundtrip() {
        assert_eq!(Slice::from_index(0), Some(Slice::Current));
        assert_eq!(Slice::from_index(1), Some(Slice::Next));
        assert_eq!(Slice::from_index(2), None);
        assert_eq!(Slice::from_index(-1), None);
        assert_eq!(Slice::Next.index(), 1);
    }

    #[test]
    fn test_node_display_and_mirror() {
        let g1 = Node::next("G");
        assert_eq!(g1.to_string(), "(G, 1)");
        assert_eq!(g1.mirrored(), Node::current("G"));
    }

    #[test]
    fn test_node_relabel() {
        let d = Node::current("D");
        assert_eq!(d.at(7), TimedNode::new("D", 7));
        assert_eq!(TimedNode::from(Node::next("D")), TimedNode::new("D", 1));
    }

    #[test]
    fn test_timed_node_from_json() {
        let node = TimedNode::from_json(&json!(["D", 0])).unwrap();
        assert_eq!(node, TimedNode::new("D", 0));

        let numeric = TimedNode::from_json(&json!([3, 1])).unwrap();
        assert_eq!(numeric, TimedNode::new("3", 1));
    }

    #[test]
    fn test_timed_node_from_json_rejects_malformed() {
        for value in [
            json!("D"),
            json!(["D"]),
            json!(["D", 0, 1]),
            json!(["D", "0"]),
            json!(["D", 0.5]),
            json!([["D"], 0]),
            json!(["D", true]),
        ] {
            let err = TimedNode::from_json(&value).unwrap_err();
            assert!(matches!(err, StructureError::MalformedNode { .. }), "{value}");
        }
    }

    #[test]
    fn test_timed_node_canonical() {
        assert_eq!(TimedNode::new("A", 1).canonical(), Some(Node::next("A")));
        assert_eq!(TimedNode::new("A", 3).canonical(), None);
    }

    #[test]
    fn test_validate_time_slice() {
        assert!(validate_time_slice(0).is_ok());
        assert!(validate_time_slice(12).is_ok());
        assert_eq!(
            validate_time_slice(-2),
            Err(StructureError::InvalidSlice { time_slice: -2 })
        );
    }

    #[test]
    fn test_node_serialization() {
        let node = Node::next("L");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"name":"L","slice":"next"}"#);
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
