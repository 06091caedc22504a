//! Node definitions
//!
//! A node is a point of interest placed on one floor. Its `connections`
//! list holds the local (same-floor) adjacency, stored on both endpoints.

use floorgraph_core::{FloorId, GraphError, GraphResult, GridPoint, NodeId, NodeType, Validatable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Node
// ============================================================================

/// A typed, positioned point of interest on a floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier across the whole project
    pub node_id: NodeId,

    /// Human readable label
    #[serde(default)]
    pub name: String,

    /// Kind of point of interest
    #[serde(rename = "type", default)]
    pub kind: NodeType,

    /// Grid position plus the id of the containing floor
    pub coordinates: Coordinates,

    /// Local adjacency (same-floor neighbours)
    #[serde(default)]
    pub connections: Vec<LocalConnection>,

    /// Open-ended custom metadata
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl Node {
    /// Build a fully populated node from a draft, placed on `floor`.
    ///
    /// A missing or blank id is generated and the position is clamped
    /// into the grid.
    pub fn from_draft(draft: NodeDraft, floor: FloorId) -> Self {
        let node_id = match draft.node_id {
            Some(id) if !id.is_empty() => id,
            _ => NodeId::generate(),
        };
        let position = draft.position.clamped();

        Self {
            node_id,
            name: draft.name,
            kind: draft.kind,
            coordinates: Coordinates {
                x: position.x,
                y: position.y,
                floor,
            },
            connections: Vec::new(),
            meta: draft.meta,
        }
    }

    /// Grid position of this node
    pub fn position(&self) -> GridPoint {
        GridPoint::new(self.coordinates.x, self.coordinates.y)
    }

    /// Id of the floor this node claims to live on
    pub fn floor_id(&self) -> &FloorId {
        &self.coordinates.floor
    }

    /// Whether this node lists `other` as a local neighbour
    pub fn is_connected_to(&self, other: &NodeId) -> bool {
        self.connections.iter().any(|c| &c.node_id == other)
    }

    /// Distance to a local neighbour, if connected
    pub fn distance_to_neighbor(&self, other: &NodeId) -> Option<f64> {
        self.connections
            .iter()
            .find(|c| &c.node_id == other)
            .map(|c| c.distance)
    }

    /// Insert or refresh the local edge towards `other`.
    ///
    /// Returns `true` when something changed.
    pub(crate) fn upsert_neighbor(&mut self, other: &NodeId, distance: f64) -> bool {
        match self.connections.iter_mut().find(|c| &c.node_id == other) {
            Some(existing) if existing.distance == distance => false,
            Some(existing) => {
                existing.distance = distance;
                true
            }
            None => {
                self.connections.push(LocalConnection {
                    node_id: other.clone(),
                    distance,
                });
                true
            }
        }
    }

    /// Drop every local edge towards `other`, returning how many were removed
    pub(crate) fn drop_neighbor(&mut self, other: &NodeId) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| &c.node_id != other);
        before - self.connections.len()
    }

    /// Apply a typed update; returns `true` when any field changed
    pub(crate) fn apply(&mut self, update: NodeUpdate) -> bool {
        let mut changed = false;

        if let Some(name) = update.name {
            changed |= self.name != name;
            self.name = name;
        }
        if let Some(kind) = update.kind {
            changed |= self.kind != kind;
            self.kind = kind;
        }
        if let Some(position) = update.position {
            let position = position.clamped();
            changed |= self.position() != position;
            self.coordinates.x = position.x;
            self.coordinates.y = position.y;
        }
        if let Some(meta) = update.meta {
            for (key, value) in meta {
                if self.meta.get(&key) != Some(&value) {
                    changed = true;
                    self.meta.insert(key, value);
                }
            }
        }

        changed
    }
}

impl Validatable for Node {
    fn validate(&self) -> GraphResult<()> {
        if self.node_id.is_empty() {
            return Err(GraphError::validation("Node id cannot be empty"));
        }
        if !self.position().in_bounds() {
            return Err(GraphError::validation(format!(
                "Node '{}' lies outside the grid at ({}, {})",
                self.node_id, self.coordinates.x, self.coordinates.y
            )));
        }
        for edge in &self.connections {
            if !edge.distance.is_finite() || edge.distance < 0.0 {
                return Err(GraphError::validation(format!(
                    "Node '{}' has an invalid distance to '{}'",
                    self.node_id, edge.node_id
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Coordinates
// ============================================================================

/// Grid position of a node with a back-reference to its floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    /// Must always equal the id of the floor containing the node
    #[serde(default)]
    pub floor: FloorId,
}

// ============================================================================
// LocalConnection
// ============================================================================

/// One endpoint's view of a same-floor edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalConnection {
    /// The neighbour on the same floor
    pub node_id: NodeId,
    /// Edge weight
    pub distance: f64,
}

// ============================================================================
// NodeDraft / NodeUpdate
// ============================================================================

/// Caller-supplied fields for a new node; everything else is defaulted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDraft {
    /// Explicit id, generated when absent
    pub node_id: Option<NodeId>,
    pub name: String,
    pub kind: NodeType,
    pub position: GridPoint,
    pub meta: Map<String, Value>,
}

impl NodeDraft {
    /// Create a draft for a node of `kind` at `position`
    pub fn new(kind: NodeType, position: GridPoint) -> Self {
        Self {
            kind,
            position,
            ..Default::default()
        }
    }

    /// Set the label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Use an explicit id instead of a generated one
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    /// Attach a metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Partial update of a node.
///
/// There is deliberately no floor field: a node changes floor only through
/// `Project::move_node_to_floor`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub kind: Option<NodeType>,
    pub position: Option<GridPoint>,
    /// Shallow-merged into the node's metadata
    pub meta: Option<Map<String, Value>>,
}

impl NodeUpdate {
    /// Update that only renames
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Update that only changes the kind
    pub fn kind(kind: NodeType) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    /// Update that only moves the node
    pub fn position(position: GridPoint) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    /// Whether the update carries no field at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.kind.is_none() && self.position.is_none() && self.meta.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================
