//! Core types used throughout FloorGraph
//!
//! Identifiers for floors and nodes, and the closed vocabularies for node
//! kinds and cross-floor connection kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GraphError;

// ============================================================================
// Unique Identifiers
// ============================================================================

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Borrow the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is blank
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a floor, unique within a project
    FloorId
);

string_id!(
    /// Identifier of a node, unique across every floor of a project
    NodeId
);

string_id!(
    /// Identifier of the building a project describes
    BuildingId
);

// ============================================================================
// Node Types
// ============================================================================

/// Kind of point of interest a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Room,
    Hallway,
    Stair,
    Elevator,
}

impl NodeType {
    /// All node types in display order
    pub fn all() -> &'static [NodeType] {
        &[
            NodeType::Room,
            NodeType::Hallway,
            NodeType::Stair,
            NodeType::Elevator,
        ]
    }

    /// Wire name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Room => "room",
            NodeType::Hallway => "hallway",
            NodeType::Stair => "stair",
            NodeType::Elevator => "elevator",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeType::Room => "Room",
            NodeType::Hallway => "Hallway",
            NodeType::Stair => "Stair",
            NodeType::Elevator => "Elevator",
        }
    }

    /// Whether nodes of this type may anchor a cross-floor connection
    pub fn is_vertical(&self) -> bool {
        matches!(self, NodeType::Stair | NodeType::Elevator)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "room" => Ok(NodeType::Room),
            "hallway" => Ok(NodeType::Hallway),
            "stair" | "stairs" => Ok(NodeType::Stair),
            "elevator" | "lift" => Ok(NodeType::Elevator),
            other => Err(GraphError::validation(format!(
                "Unknown node type '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// Connection Types
// ============================================================================

/// Kind of a cross-floor connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Stair,
    Elevator,
}

impl ConnectionType {
    /// Wire name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Stair => "stair",
            ConnectionType::Elevator => "elevator",
        }
    }

    /// Narrow a node type to a connection type.
    ///
    /// Only stairs and elevators can carry a cross-floor connection.
    pub fn from_node_type(node_type: NodeType) -> Option<Self> {
        match node_type {
            NodeType::Stair => Some(ConnectionType::Stair),
            NodeType::Elevator => Some(ConnectionType::Elevator),
            NodeType::Room | NodeType::Hallway => None,
        }
    }

    /// Pick the connection type linking two endpoint kinds.
    ///
    /// Two elevators form an elevator shaft; any other pair of vertical
    /// nodes is walked as a stair. Returns `None` when either endpoint
    /// is not vertical.
    pub fn for_endpoints(a: NodeType, b: NodeType) -> Option<Self> {
        match (Self::from_node_type(a)?, Self::from_node_type(b)?) {
            (ConnectionType::Elevator, ConnectionType::Elevator) => Some(ConnectionType::Elevator),
            _ => Some(ConnectionType::Stair),
        }
    }
}

impl From<ConnectionType> for NodeType {
    fn from(kind: ConnectionType) -> Self {
        match kind {
            ConnectionType::Stair => NodeType::Stair,
            ConnectionType::Elevator => NodeType::Elevator,
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
