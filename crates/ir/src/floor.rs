//! Floor definitions
//!
//! A floor is a named, leveled container of nodes tied to one floor-plan
//! image. The image itself is opaque to the graph: only its native pixel
//! size matters, for coordinate conversion.

use floorgraph_core::{FloorDimensions, FloorId, GraphError, GraphResult, NodeId, Validatable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Node;

// ============================================================================
// Floor
// ============================================================================

/// One storey of the building and the nodes placed on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    /// Unique identifier within the project
    pub id: FloorId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Storey number, drives display order
    #[serde(default)]
    pub level: i32,

    /// Floor-plan image reference (data URL or path), managed by the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Native image width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    /// Native image height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    /// Nodes living on this floor; the sole source of truth for membership
    #[serde(default)]
    pub nodes: Vec<Node>,

    /// Open-ended floor metadata
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl Floor {
    /// Build a floor from a draft. `default_level` is used when the draft
    /// carries no level.
    pub fn from_draft(draft: FloorDraft, default_level: i32) -> Self {
        let id = match draft.id {
            Some(id) if !id.is_empty() => id,
            _ => FloorId::generate(),
        };
        let (width, height) = match draft.dimensions {
            Some(dims) => (Some(dims.width), Some(dims.height)),
            None => (None, None),
        };

        Self {
            id,
            name: draft.name,
            level: draft.level.unwrap_or(default_level),
            image_url: draft.image_url,
            width,
            height,
            nodes: Vec::new(),
            meta: draft.meta,
        }
    }

    /// Pixel size of the floor plan, when both sides are known
    pub fn dimensions(&self) -> Option<FloorDimensions> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some(FloorDimensions::new(width, height)),
            _ => None,
        }
    }

    /// Get a node on this floor
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.node_id == id)
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.node_id == id)
    }

    /// Whether a node lives on this floor
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of nodes on this floor
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ids of every node on this floor
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().map(|n| &n.node_id)
    }

    /// Apply a typed update; returns `true` when any field changed
    pub(crate) fn apply(&mut self, update: FloorUpdate) -> bool {
        let mut changed = false;

        if let Some(name) = update.name {
            changed |= self.name != name;
            self.name = name;
        }
        if let Some(level) = update.level {
            changed |= self.level != level;
            self.level = level;
        }
        if let Some(image_url) = update.image_url {
            changed |= self.image_url.as_deref() != Some(image_url.as_str());
            self.image_url = Some(image_url);
        }
        if let Some(dims) = update.dimensions {
            changed |= self.dimensions() != Some(dims);
            self.width = Some(dims.width);
            self.height = Some(dims.height);
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

impl Validatable for Floor {
    fn validate(&self) -> GraphResult<()> {
        if self.id.is_empty() {
            return Err(GraphError::validation("Floor id cannot be empty"));
        }
        if let (Some(_), Some(_)) = (self.width, self.height) {
            if !self.dimensions().is_some_and(|d| d.is_usable()) {
                return Err(GraphError::validation(format!(
                    "Floor '{}' has unusable dimensions",
                    self.id
                )));
            }
        }
        for node in &self.nodes {
            node.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// FloorDraft / FloorUpdate
// ============================================================================

/// Caller-supplied fields for a new floor; everything else is defaulted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorDraft {
    /// Explicit id, generated when absent
    pub id: Option<FloorId>,
    pub name: String,
    /// Defaults to the number of floors already in the project
    pub level: Option<i32>,
    pub image_url: Option<String>,
    pub dimensions: Option<FloorDimensions>,
    pub meta: Map<String, Value>,
}

impl FloorDraft {
    /// Create a draft with a display name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Use an explicit id instead of a generated one
    pub fn with_id(mut self, id: impl Into<FloorId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the storey number
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    /// Attach the floor-plan image and its pixel size
    pub fn with_image(mut self, image_url: impl Into<String>, dimensions: FloorDimensions) -> Self {
        self.image_url = Some(image_url.into());
        self.dimensions = Some(dimensions);
        self
    }

    /// Set the pixel size without an image reference
    pub fn with_dimensions(mut self, dimensions: FloorDimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

/// Partial update of a floor. Only schema fields can be expressed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorUpdate {
    pub name: Option<String>,
    pub level: Option<i32>,
    pub image_url: Option<String>,
    pub dimensions: Option<FloorDimensions>,
    /// Shallow-merged into the floor's metadata
    pub meta: Option<Map<String, Value>>,
}

impl FloorUpdate {
    /// Update that only renames
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Update that only changes the level
    pub fn level(level: i32) -> Self {
        Self {
            level: Some(level),
            ..Default::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
