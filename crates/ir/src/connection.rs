//! Global (cross-floor) connections
//!
//! Same-floor edges live on the nodes themselves; the project-level list
//! only holds edges that change floor through a stair or an elevator.
//! Global connections are undirected: `(a, b)` and `(b, a)` name the same
//! edge.

use floorgraph_core::{ConnectionType, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Connection
// ============================================================================

/// An edge between two vertical nodes on different floors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub distance: f64,
    #[serde(rename = "type", default)]
    pub kind: ConnectionType,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl Connection {
    /// Create a connection with empty metadata
    pub fn new(from: NodeId, to: NodeId, distance: f64, kind: ConnectionType) -> Self {
        Self {
            from,
            to,
            distance,
            kind,
            meta: Map::new(),
        }
    }

    /// Whether `node` is one of the endpoints
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.from == node || &self.to == node
    }

    /// Whether this connection links `a` and `b`, in either orientation
    pub fn links(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.from == a && &self.to == b) || (&self.from == b && &self.to == a)
    }

    /// The endpoint opposite `node`, if `node` is an endpoint
    pub fn other_end(&self, node: &NodeId) -> Option<&NodeId> {
        if &self.from == node {
            Some(&self.to)
        } else if &self.to == node {
            Some(&self.from)
        } else {
            None
        }
    }
}

// ============================================================================
// GlobalConnectionDraft
// ============================================================================

/// Request to link two nodes across floors.
///
/// `kind` is expressed as a node type because callers pick it from the
/// same vocabulary; only `stair` and `elevator` pass the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalConnectionDraft {
    pub from: NodeId,
    pub to: NodeId,
    pub distance: f64,
    pub kind: NodeType,
    pub meta: Map<String, Value>,
}

impl GlobalConnectionDraft {
    /// Create a draft
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>, kind: NodeType, distance: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            distance,
            kind,
            meta: Map::new(),
        }
    }

    /// Draft a stair connection
    pub fn stair(from: impl Into<NodeId>, to: impl Into<NodeId>, distance: f64) -> Self {
        Self::new(from, to, NodeType::Stair, distance)
    }

    /// Draft an elevator connection
    pub fn elevator(from: impl Into<NodeId>, to: impl Into<NodeId>, distance: f64) -> Self {
        Self::new(from, to, NodeType::Elevator, distance)
    }
}

// ============================================================================
// Tests
// ============================================================================
