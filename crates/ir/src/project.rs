//! Project definitions for FloorGraph
//!
//! This module contains `Project`, the root aggregate holding the building
//! metadata, every floor with its nodes, and the cross-floor connections.
//! All mutation goes through the operations below, each of which keeps the
//! graph invariants intact:
//!
//! 1. every referenced node id resolves to an existing node,
//! 2. local connections are symmetric with equal distances,
//! 3. global connections link stair/elevator nodes on different floors,
//! 4. deleting a node removes every edge that references it,
//! 5. deleting a floor removes its nodes and, transitively, their edges.
//!
//! Operations given an unknown floor or node id are no-ops: they leave the
//! project untouched, log at debug level and report `false`/`None`.

use chrono::{DateTime, Utc};
use floorgraph_core::{
    BuildingId, ConnectionType, FloorId, GraphResult, NodeId, NodeType, Validatable,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::{
    Connection, Floor, FloorDraft, FloorUpdate, GlobalConnectionDraft, LocalConnection, Node,
    NodeDraft, NodeUpdate,
};

// ============================================================================
// Project
// ============================================================================

/// Root container for a building's navigation graph
///
/// The `Project` is serialized as-is for export, import and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Building metadata
    pub(crate) building: Building,

    /// Floors in insertion order
    #[serde(default)]
    pub(crate) floors: Vec<Floor>,

    /// Cross-floor connections
    #[serde(default)]
    pub(crate) connections: Vec<Connection>,
}

impl Project {
    /// Create an empty project for a building with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            building: Building::new(name),
            floors: Vec::new(),
            connections: Vec::new(),
        }
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Building metadata
    pub fn building(&self) -> &Building {
        &self.building
    }

    /// Shallow-merge custom entries into the building metadata and stamp
    /// `updatedAt`. The managed timestamp keys cannot be overwritten.
    pub fn update_building_meta(&mut self, meta: Map<String, Value>) {
        for (key, value) in meta {
            if key == "createdAt" || key == "updatedAt" {
                tracing::debug!("Ignoring managed building meta key '{}'", key);
                continue;
            }
            self.building.meta.extra.insert(key, value);
        }
        self.touch();
    }

    /// Rename the building and stamp `updatedAt`
    pub fn set_building_name(&mut self, name: impl Into<String>) {
        self.building.name = name.into();
        self.touch();
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.building.meta.updated_at = Utc::now();
    }

    // ========================================================================
    // Floor Management
    // ========================================================================

    /// Append a floor built from `draft`, returning its id.
    ///
    /// Always succeeds. Level collisions are allowed; an id that is already
    /// taken is replaced by a generated one.
    pub fn add_floor(&mut self, draft: FloorDraft) -> FloorId {
        let mut floor = Floor::from_draft(draft, self.next_level());
        if self.floor(&floor.id).is_some() {
            let fresh = FloorId::generate();
            tracing::warn!(
                "Floor id '{}' already in use, assigning '{}'",
                floor.id,
                fresh
            );
            floor.id = fresh;
        }

        let id = floor.id.clone();
        tracing::debug!("Added floor '{}' at level {}", id, floor.level);
        self.floors.push(floor);
        id
    }

    /// Merge `update` into a floor. Unknown ids are ignored.
    pub fn update_floor(&mut self, floor_id: &FloorId, update: FloorUpdate) -> bool {
        match self.floor_mut(floor_id) {
            Some(floor) => floor.apply(update),
            None => {
                tracing::debug!("update_floor: no floor '{}'", floor_id);
                false
            }
        }
    }

    /// Remove a floor with all of its nodes and every connection touching them
    pub fn remove_floor(&mut self, floor_id: &FloorId) -> Option<Floor> {
        let Some(index) = self.floors.iter().position(|f| &f.id == floor_id) else {
            tracing::debug!("remove_floor: no floor '{}'", floor_id);
            return None;
        };

        let floor = self.floors.remove(index);
        let gone: HashSet<&NodeId> = floor.node_ids().collect();

        let before = self.connections.len();
        self.connections
            .retain(|c| !gone.contains(&c.from) && !gone.contains(&c.to));
        for node in self.floors.iter_mut().flat_map(|f| f.nodes.iter_mut()) {
            node.connections.retain(|edge| !gone.contains(&edge.node_id));
        }

        tracing::debug!(
            "Removed floor '{}' with {} node(s) and {} global connection(s)",
            floor.id,
            floor.nodes.len(),
            before - self.connections.len()
        );
        Some(floor)
    }

    /// Get a floor by ID
    pub fn floor(&self, floor_id: &FloorId) -> Option<&Floor> {
        self.floors.iter().find(|f| &f.id == floor_id)
    }

    pub(crate) fn floor_mut(&mut self, floor_id: &FloorId) -> Option<&mut Floor> {
        self.floors.iter_mut().find(|f| &f.id == floor_id)
    }

    /// Floors in insertion order
    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    /// Floors sorted by level; floors sharing a level keep insertion order
    pub fn floors_by_level(&self) -> Vec<&Floor> {
        let mut floors: Vec<&Floor> = self.floors.iter().collect();
        floors.sort_by_key(|f| f.level);
        floors
    }

    /// Id of the first floor in insertion order
    pub fn first_floor_id(&self) -> Option<&FloorId> {
        self.floors.first().map(|f| &f.id)
    }

    /// Level suggested for the next floor (the current floor count)
    pub fn next_level(&self) -> i32 {
        self.floors.len() as i32
    }

    /// Get the number of floors
    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    // ========================================================================
    // Node Management
    // ========================================================================

    /// Add a node to a floor, returning its id.
    ///
    /// Returns `None` when the floor does not exist, when the position is
    /// not finite, or when the draft names an id that is already used
    /// anywhere in the project.
    pub fn add_node(&mut self, floor_id: &FloorId, draft: NodeDraft) -> Option<NodeId> {
        if !draft.position.is_finite() {
            tracing::warn!(
                "add_node: rejected non-finite position ({}, {})",
                draft.position.x,
                draft.position.y
            );
            return None;
        }
        if let Some(requested) = draft.node_id.as_ref().filter(|id| !id.is_empty()) {
            if self.contains_node(requested) {
                tracing::warn!("add_node: node id '{}' already in use", requested);
                return None;
            }
        }

        let Some(floor) = self.floor_mut(floor_id) else {
            tracing::debug!("add_node: no floor '{}'", floor_id);
            return None;
        };

        let node = Node::from_draft(draft, floor_id.clone());
        let id = node.node_id.clone();
        tracing::debug!("Added {} node '{}' on floor '{}'", node.kind, id, floor_id);
        floor.nodes.push(node);
        Some(id)
    }

    /// Merge `update` into a node, looked up on `floor_id` only.
    ///
    /// Turning a stair or elevator into a room or hallway also drops its
    /// global connections, which it could no longer anchor.
    pub fn update_node(&mut self, floor_id: &FloorId, node_id: &NodeId, update: NodeUpdate) -> bool {
        if let Some(position) = update.position.filter(|p| !p.is_finite()) {
            tracing::warn!(
                "update_node: rejected non-finite position ({}, {}) for '{}'",
                position.x,
                position.y,
                node_id
            );
            return false;
        }
        let Some(node) = self
            .floor_mut(floor_id)
            .and_then(|floor| floor.node_mut(node_id))
        else {
            tracing::debug!("update_node: no node '{}' on floor '{}'", node_id, floor_id);
            return false;
        };

        let was_vertical = node.kind.is_vertical();
        let changed = node.apply(update);
        let lost_vertical = was_vertical && !node.kind.is_vertical();

        if lost_vertical {
            let dropped = self.drop_global_connections_of(node_id);
            if dropped > 0 {
                tracing::warn!(
                    "Node '{}' is no longer a stair or elevator, dropped {} global connection(s)",
                    node_id,
                    dropped
                );
            }
        }
        changed
    }

    /// Remove a node and every local and global edge that references it
    pub fn remove_node(&mut self, floor_id: &FloorId, node_id: &NodeId) -> Option<Node> {
        let Some(floor) = self.floor_mut(floor_id) else {
            tracing::debug!("remove_node: no floor '{}'", floor_id);
            return None;
        };
        let Some(index) = floor.nodes.iter().position(|n| &n.node_id == node_id) else {
            tracing::debug!("remove_node: no node '{}' on floor '{}'", node_id, floor_id);
            return None;
        };

        let node = floor.nodes.remove(index);
        for other in self.floors.iter_mut().flat_map(|f| f.nodes.iter_mut()) {
            other.drop_neighbor(node_id);
        }
        self.drop_global_connections_of(node_id);

        tracing::debug!("Removed node '{}' from floor '{}'", node_id, floor_id);
        Some(node)
    }

    /// Move a node onto another floor.
    ///
    /// Its local edges are dropped (they would now cross floors), and so are
    /// global connections whose other end lives on the destination floor.
    pub fn move_node_to_floor(&mut self, from: &FloorId, node_id: &NodeId, to: &FloorId) -> bool {
        if from == to {
            return false;
        }
        if self.floor(to).is_none() {
            tracing::debug!("move_node_to_floor: no floor '{}'", to);
            return false;
        }
        let Some(mut node) = self.remove_node_keeping_global(from, node_id) else {
            return false;
        };

        node.connections.clear();
        node.coordinates.floor = to.clone();
        if let Some(target) = self.floor_mut(to) {
            target.nodes.push(node);
        }

        let same_floor: HashSet<NodeId> = self
            .floor(to)
            .map(|f| f.node_ids().cloned().collect())
            .unwrap_or_default();
        self.connections.retain(|c| {
            !(c.touches(node_id) && same_floor.contains(&c.from) && same_floor.contains(&c.to))
        });

        tracing::debug!("Moved node '{}' from floor '{}' to '{}'", node_id, from, to);
        true
    }

    fn remove_node_keeping_global(&mut self, floor_id: &FloorId, node_id: &NodeId) -> Option<Node> {
        let floor = self.floor_mut(floor_id)?;
        let index = floor.nodes.iter().position(|n| &n.node_id == node_id)?;
        let node = floor.nodes.remove(index);
        for other in self.floors.iter_mut().flat_map(|f| f.nodes.iter_mut()) {
            other.drop_neighbor(node_id);
        }
        Some(node)
    }

    /// Get a node on a specific floor
    pub fn node(&self, floor_id: &FloorId, node_id: &NodeId) -> Option<&Node> {
        self.floor(floor_id).and_then(|f| f.node(node_id))
    }

    /// Find a node on any floor, together with its containing floor
    pub fn find_node(&self, node_id: &NodeId) -> Option<(&Floor, &Node)> {
        self.floors
            .iter()
            .find_map(|f| f.node(node_id).map(|n| (f, n)))
    }

    /// Id of the floor containing a node
    pub fn node_floor_id(&self, node_id: &NodeId) -> Option<&FloorId> {
        self.find_node(node_id).map(|(f, _)| &f.id)
    }

    /// Whether a node exists on any floor
    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.find_node(node_id).is_some()
    }

    /// Every node of every floor
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.floors.iter().flat_map(|f| f.nodes.iter())
    }

    /// Get the number of nodes across all floors
    pub fn node_count(&self) -> usize {
        self.floors.iter().map(|f| f.nodes.len()).sum()
    }

    // ========================================================================
    // Local Connection Management
    // ========================================================================

    /// Connect two nodes of the same floor, on both endpoints.
    ///
    /// Connecting an already connected pair refreshes the distance instead
    /// of adding a parallel edge. Self-loops and invalid distances are
    /// rejected.
    pub fn add_local_connection(
        &mut self,
        floor_id: &FloorId,
        from: &NodeId,
        to: &NodeId,
        distance: f64,
    ) -> bool {
        if from == to {
            tracing::warn!("Rejected local connection: '{}' cannot connect to itself", from);
            return false;
        }
        if !distance.is_finite() || distance < 0.0 {
            tracing::warn!("Rejected local connection {} -> {}: invalid distance {}", from, to, distance);
            return false;
        }

        let Some(floor) = self.floor_mut(floor_id) else {
            tracing::debug!("add_local_connection: no floor '{}'", floor_id);
            return false;
        };
        if !floor.contains_node(from) || !floor.contains_node(to) {
            tracing::debug!(
                "add_local_connection: '{}' or '{}' not on floor '{}'",
                from,
                to,
                floor_id
            );
            return false;
        }

        let mut changed = false;
        if let Some(a) = floor.node_mut(from) {
            changed |= a.upsert_neighbor(to, distance);
        }
        if let Some(b) = floor.node_mut(to) {
            changed |= b.upsert_neighbor(from, distance);
        }
        changed
    }

    /// Remove the edge between two nodes of a floor, on both endpoints
    pub fn remove_local_connection(&mut self, floor_id: &FloorId, from: &NodeId, to: &NodeId) -> bool {
        let Some(floor) = self.floor_mut(floor_id) else {
            tracing::debug!("remove_local_connection: no floor '{}'", floor_id);
            return false;
        };

        let mut removed = 0;
        if let Some(a) = floor.node_mut(from) {
            removed += a.drop_neighbor(to);
        }
        if let Some(b) = floor.node_mut(to) {
            removed += b.drop_neighbor(from);
        }
        removed > 0
    }

    /// Local neighbours of a node, wherever it lives
    pub fn neighbors(&self, node_id: &NodeId) -> &[LocalConnection] {
        self.find_node(node_id)
            .map(|(_, n)| n.connections.as_slice())
            .unwrap_or(&[])
    }

    // ========================================================================
    // Global Connection Management
    // ========================================================================

    /// Link two vertical nodes on different floors.
    ///
    /// Rejected (no-op, warning logged) when the requested kind is not
    /// stair/elevator, when either endpoint is not a stair/elevator node,
    /// or when both endpoints share a floor. Linking an already linked pair
    /// updates the existing record.
    pub fn add_global_connection(&mut self, draft: GlobalConnectionDraft) -> bool {
        let Some(kind) = ConnectionType::from_node_type(draft.kind) else {
            tracing::warn!(
                "Rejected global connection {} -> {}: type '{}' must be stair or elevator",
                draft.from,
                draft.to,
                draft.kind
            );
            return false;
        };
        if draft.from == draft.to {
            tracing::warn!("Rejected global connection: '{}' cannot connect to itself", draft.from);
            return false;
        }
        if !draft.distance.is_finite() || draft.distance < 0.0 {
            tracing::warn!(
                "Rejected global connection {} -> {}: invalid distance {}",
                draft.from,
                draft.to,
                draft.distance
            );
            return false;
        }

        let (Some((from_floor, from_node)), Some((to_floor, to_node))) =
            (self.find_node(&draft.from), self.find_node(&draft.to))
        else {
            tracing::debug!(
                "add_global_connection: '{}' or '{}' does not exist",
                draft.from,
                draft.to
            );
            return false;
        };
        if !from_node.kind.is_vertical() || !to_node.kind.is_vertical() {
            tracing::warn!(
                "Rejected global connection {} -> {}: endpoints must be stairs or elevators ({} / {})",
                draft.from,
                draft.to,
                from_node.kind,
                to_node.kind
            );
            return false;
        }
        if from_floor.id == to_floor.id {
            tracing::warn!(
                "Rejected global connection {} -> {}: both nodes are on floor '{}'",
                draft.from,
                draft.to,
                from_floor.id
            );
            return false;
        }

        if let Some(existing) = self
            .connections
            .iter_mut()
            .find(|c| c.links(&draft.from, &draft.to))
        {
            let changed = existing.distance != draft.distance || existing.kind != kind;
            existing.distance = draft.distance;
            existing.kind = kind;
            existing.meta.extend(draft.meta);
            return changed;
        }

        tracing::debug!("Added {} connection {} <-> {}", kind, draft.from, draft.to);
        self.connections.push(Connection {
            from: draft.from,
            to: draft.to,
            distance: draft.distance,
            kind,
            meta: draft.meta,
        });
        true
    }

    /// Remove the global connection between two nodes, in either orientation
    pub fn remove_global_connection(&mut self, a: &NodeId, b: &NodeId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| !c.links(a, b));
        let removed = before != self.connections.len();
        if !removed {
            tracing::debug!("remove_global_connection: no connection {} <-> {}", a, b);
        }
        removed
    }

    fn drop_global_connections_of(&mut self, node_id: &NodeId) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(node_id));
        before - self.connections.len()
    }

    /// All global connections
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Global connections touching a node
    pub fn connections_for_node(&self, node_id: &NodeId) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|c| c.touches(node_id))
            .collect()
    }

    // ========================================================================
    // Utility Methods
    // ========================================================================

    /// Check if the project has no floors
    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    /// Summary counts for overviews
    pub fn stats(&self) -> ProjectStats {
        let mut pairs: HashSet<(&NodeId, &NodeId)> = HashSet::new();
        for node in self.nodes() {
            for edge in &node.connections {
                let pair = if node.node_id <= edge.node_id {
                    (&node.node_id, &edge.node_id)
                } else {
                    (&edge.node_id, &node.node_id)
                };
                pairs.insert(pair);
            }
        }

        let nodes_by_type = NodeType::all()
            .iter()
            .map(|kind| (*kind, self.nodes().filter(|n| n.kind == *kind).count()))
            .collect();

        ProjectStats {
            floor_count: self.floors.len(),
            node_count: self.node_count(),
            local_edge_count: pairs.len(),
            global_connection_count: self.connections.len(),
            nodes_by_type,
        }
    }
}

impl Validatable for Project {
    fn validate(&self) -> GraphResult<()> {
        for floor in &self.floors {
            floor.validate()?;
        }
        self.check_integrity().to_result()
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new("New Project")
    }
}

// ============================================================================
// Building
// ============================================================================

/// Building identity and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Unique building identifier
    pub id: BuildingId,

    /// Building name
    #[serde(default)]
    pub name: String,

    /// Timestamps plus open-ended entries
    #[serde(default)]
    pub meta: BuildingMeta,
}

impl Building {
    /// Create building metadata with a generated id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BuildingId::generate(),
            name: name.into(),
            meta: BuildingMeta::default(),
        }
    }
}

/// Building timestamps and custom entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingMeta {
    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last metadata update
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    /// Custom entries (address, campus, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for BuildingMeta {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            extra: Map::new(),
        }
    }
}

// ============================================================================
// ProjectStats
// ============================================================================

/// Counts shown in project overviews
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectStats {
    pub floor_count: usize,
    pub node_count: usize,
    /// Undirected same-floor edges (each stored twice in the graph)
    pub local_edge_count: usize,
    pub global_connection_count: usize,
    pub nodes_by_type: Vec<(NodeType, usize)>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use floorgraph_core::GridPoint;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(kind: NodeType, id: &str, x: f64, y: f64) -> NodeDraft {
        NodeDraft::new(kind, GridPoint::new(x, y)).with_id(id).with_name(id)
    }

    /// L1: A(room) B(hallway) S1(stair) E1(elevator); L2: S2(stair) E2(elevator)
    fn two_floor_project() -> Project {
        let mut project = Project::new("Campus");
        let l1 = project.add_floor(FloorDraft::new("L1").with_id("L1").with_level(0));
        let l2 = project.add_floor(FloorDraft::new("L2").with_id("L2").with_level(1));
        project.add_node(&l1, node(NodeType::Room, "A", 10.0, 10.0));
        project.add_node(&l1, node(NodeType::Hallway, "B", 50.0, 50.0));
        project.add_node(&l1, node(NodeType::Stair, "S1", 90.0, 10.0));
        project.add_node(&l1, node(NodeType::Elevator, "E1", 90.0, 90.0));
        project.add_node(&l2, node(NodeType::Stair, "S2", 90.0, 10.0));
        project.add_node(&l2, node(NodeType::Elevator, "E2", 90.0, 90.0));
        project
    }

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    fn fid(s: &str) -> FloorId {
        FloorId::new(s)
    }

    fn assert_consistent(project: &Project) {
        let report = project.check_integrity();
        assert!(report.valid, "integrity violations: {:?}", report.errors);
    }

    #[test]
    fn test_project_new() {
        let project = Project::new("Library");
        assert_eq!(project.building().name, "Library");
        assert!(project.is_empty());
        assert!(project.connections().is_empty());
    }

    #[test]
    fn test_add_floor_generates_id_and_level() {
        let mut project = Project::default();
        let first = project.add_floor(FloorDraft::new("Ground"));
        let second = project.add_floor(FloorDraft::new("First"));
        assert_ne!(first, second);
        assert_eq!(project.floor(&first).unwrap().level, 0);
        assert_eq!(project.floor(&second).unwrap().level, 1);
    }

    #[test]
    fn test_add_floor_with_taken_id_gets_fresh_id() {
        let mut project = Project::default();
        project.add_floor(FloorDraft::new("A").with_id("F"));
        let second = project.add_floor(FloorDraft::new("B").with_id("F"));
        assert_ne!(second, fid("F"));
        assert_eq!(project.floor_count(), 2);
    }

    #[test]
    fn test_level_collisions_are_allowed() {
        let mut project = Project::default();
        project.add_floor(FloorDraft::new("A").with_level(2));
        project.add_floor(FloorDraft::new("B").with_level(2));
        assert_eq!(project.floor_count(), 2);
    }

    #[test]
    fn test_floors_by_level_is_stable() {
        let mut project = Project::default();
        project.add_floor(FloorDraft::new("Roof").with_level(5));
        project.add_floor(FloorDraft::new("Basement").with_level(-1));
        project.add_floor(FloorDraft::new("Mezzanine").with_level(5));
        let names: Vec<&str> = project
            .floors_by_level()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["Basement", "Roof", "Mezzanine"]);
    }

    #[test]
    fn test_update_floor_unknown_is_noop() {
        let mut project = two_floor_project();
        let before = project.clone();
        assert!(!project.update_floor(&fid("nope"), FloorUpdate::name("x")));
        assert_eq!(project, before);
        assert!(project.update_floor(&fid("L1"), FloorUpdate::name("Lobby")));
        assert_eq!(project.floor(&fid("L1")).unwrap().name, "Lobby");
    }

    #[test]
    fn test_add_node_sets_floor_back_reference() {
        let project = two_floor_project();
        let (floor, node) = project.find_node(&id("S2")).unwrap();
        assert_eq!(floor.id, fid("L2"));
        assert_eq!(node.floor_id(), &fid("L2"));
        assert_eq!(project.node_count(), 6);
    }

    #[test]
    fn test_add_node_unknown_floor_is_noop() {
        let mut project = two_floor_project();
        let before = project.clone();
        assert_eq!(
            project.add_node(&fid("L9"), NodeDraft::new(NodeType::Room, GridPoint::default())),
            None
        );
        assert_eq!(project, before);
    }

    #[test]
    fn test_add_node_rejects_duplicate_id() {
        let mut project = two_floor_project();
        assert_eq!(project.add_node(&fid("L2"), node(NodeType::Room, "A", 1.0, 1.0)), None);
        assert_eq!(project.node_count(), 6);
    }

    #[test]
    fn test_local_connection_symmetry() {
        let mut project = two_floor_project();
        assert!(project.add_local_connection(&fid("L1"), &id("A"), &id("B"), 5.0));

        let a = project.node(&fid("L1"), &id("A")).unwrap();
        let b = project.node(&fid("L1"), &id("B")).unwrap();
        assert_eq!(a.connections, vec![LocalConnection { node_id: id("B"), distance: 5.0 }]);
        assert_eq!(b.connections, vec![LocalConnection { node_id: id("A"), distance: 5.0 }]);

        assert!(project.remove_local_connection(&fid("L1"), &id("A"), &id("B")));
        assert!(project.neighbors(&id("A")).is_empty());
        assert!(project.neighbors(&id("B")).is_empty());
        assert_consistent(&project);
    }

    #[test]
    fn test_local_connection_is_deduplicated() {
        let mut project = two_floor_project();
        assert!(project.add_local_connection(&fid("L1"), &id("A"), &id("B"), 5.0));
        assert!(!project.add_local_connection(&fid("L1"), &id("A"), &id("B"), 5.0));
        assert!(project.add_local_connection(&fid("L1"), &id("B"), &id("A"), 8.0));

        assert_eq!(project.neighbors(&id("A")).len(), 1);
        assert_eq!(project.neighbors(&id("A"))[0].distance, 8.0);
        assert_eq!(project.neighbors(&id("B"))[0].distance, 8.0);
        assert_consistent(&project);
    }

    #[test]
    fn test_local_connection_rejections() {
        let mut project = two_floor_project();
        let before = project.clone();
        assert!(!project.add_local_connection(&fid("L1"), &id("A"), &id("A"), 1.0));
        assert!(!project.add_local_connection(&fid("L1"), &id("A"), &id("S2"), 1.0));
        assert!(!project.add_local_connection(&fid("L1"), &id("A"), &id("B"), f64::NAN));
        assert!(!project.add_local_connection(&fid("L1"), &id("A"), &id("B"), -1.0));
        assert!(!project.add_local_connection(&fid("L9"), &id("A"), &id("B"), 1.0));
        assert_eq!(project, before);
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut project = two_floor_project();
        project.add_local_connection(&fid("L1"), &id("A"), &id("S1"), 4.0);
        project.add_local_connection(&fid("L1"), &id("B"), &id("S1"), 2.0);
        project.add_global_connection(GlobalConnectionDraft::stair("S1", "S2", 3.0));

        let removed = project.remove_node(&fid("L1"), &id("S1")).unwrap();
        assert_eq!(removed.node_id, id("S1"));

        assert!(project.nodes().all(|n| !n.is_connected_to(&id("S1"))));
        assert!(project.connections_for_node(&id("S1")).is_empty());
        assert_consistent(&project);
    }

    #[test]
    fn test_remove_node_wrong_floor_is_noop() {
        let mut project = two_floor_project();
        let before = project.clone();
        assert!(project.remove_node(&fid("L2"), &id("A")).is_none());
        assert_eq!(project, before);
    }

    #[test]
    fn test_remove_floor_cascades() {
        let mut project = two_floor_project();
        project.add_local_connection(&fid("L2"), &id("S2"), &id("E2"), 6.0);
        project.add_global_connection(GlobalConnectionDraft::stair("S1", "S2", 3.0));
        project.add_global_connection(GlobalConnectionDraft::elevator("E1", "E2", 2.0));

        let floor = project.remove_floor(&fid("L2")).unwrap();
        assert_eq!(floor.nodes.len(), 2);
        assert!(project.connections().is_empty());
        assert_eq!(project.floor_count(), 1);
        assert!(!project.contains_node(&id("S2")));
        assert_consistent(&project);

        assert!(project.remove_floor(&fid("L2")).is_none());
    }

    #[test]
    fn test_update_node_stays_on_given_floor() {
        let mut project = two_floor_project();
        assert!(!project.update_node(&fid("L2"), &id("A"), NodeUpdate::name("Lobby")));
        assert!(project.update_node(&fid("L1"), &id("A"), NodeUpdate::name("Lobby")));
        assert_eq!(project.node(&fid("L1"), &id("A")).unwrap().name, "Lobby");
    }

    #[test]
    fn test_update_node_kind_drops_global_connections() {
        let mut project = two_floor_project();
        project.add_global_connection(GlobalConnectionDraft::stair("S1", "S2", 3.0));
        assert!(project.update_node(&fid("L1"), &id("S1"), NodeUpdate::kind(NodeType::Room)));
        assert!(project.connections().is_empty());
        assert_consistent(&project);
    }

    #[test]
    fn test_move_node_to_floor() {
        let mut project = two_floor_project();
        project.add_local_connection(&fid("L1"), &id("S1"), &id("A"), 3.0);
        project.add_global_connection(GlobalConnectionDraft::stair("S1", "S2", 3.0));
        project.add_global_connection(GlobalConnectionDraft::elevator("E1", "E2", 3.0));

        assert!(project.move_node_to_floor(&fid("L1"), &id("E1"), &fid("L2")));
        assert_eq!(project.node_floor_id(&id("E1")), Some(&fid("L2")));
        assert_eq!(
            project.node(&fid("L2"), &id("E1")).unwrap().floor_id(),
            &fid("L2")
        );
        assert!(project.connections_for_node(&id("E1")).is_empty());
        assert_eq!(project.connections().len(), 1);

        assert!(project.move_node_to_floor(&fid("L1"), &id("S1"), &fid("L2")));
        assert!(project.neighbors(&id("A")).is_empty());
        assert!(project.connections().is_empty());
        assert_consistent(&project);

        assert!(!project.move_node_to_floor(&fid("L2"), &id("S1"), &fid("L2")));
        assert!(!project.move_node_to_floor(&fid("L2"), &id("S1"), &fid("L9")));
    }

    #[test]
    fn test_global_connection_between_stairs() {
        let mut project = two_floor_project();
        assert!(project.add_global_connection(GlobalConnectionDraft::stair("S1", "S2", 3.0)));
        assert_eq!(project.connections().len(), 1);
        assert_eq!(project.connections()[0].kind, ConnectionType::Stair);
        assert_consistent(&project);
    }

    #[test]
    fn test_global_connection_type_gate() {
        let mut project = two_floor_project();
        let draft = GlobalConnectionDraft::new("S1", "S2", NodeType::Hallway, 3.0);
        assert!(!project.add_global_connection(draft));
        assert!(project.connections().is_empty());
    }

    #[test]
    fn test_global_connection_rejects_non_vertical_endpoints() {
        let mut project = two_floor_project();
        project.add_node(&fid("L2"), node(NodeType::Room, "R2", 5.0, 5.0));
        assert!(!project.add_global_connection(GlobalConnectionDraft::elevator("A", "R2", 3.0)));
        assert!(project.connections().is_empty());
    }

    #[test]
    fn test_global_connection_rejects_same_floor() {
        let mut project = two_floor_project();
        assert!(!project.add_global_connection(GlobalConnectionDraft::stair("S1", "E1", 1.0)));
        assert!(!project.add_global_connection(GlobalConnectionDraft::stair("S1", "S1", 1.0)));
        assert!(!project.add_global_connection(GlobalConnectionDraft::stair("S1", "ghost", 1.0)));
        assert!(project.connections().is_empty());
    }

    #[test]
    fn test_global_connection_pair_is_unique_and_undirected() {
        let mut project = two_floor_project();
        assert!(project.add_global_connection(GlobalConnectionDraft::stair("S1", "S2", 3.0)));
        assert!(project.add_global_connection(GlobalConnectionDraft::stair("S2", "S1", 4.0)));
        assert_eq!(project.connections().len(), 1);
        assert_eq!(project.connections()[0].distance, 4.0);

        assert!(project.remove_global_connection(&id("S2"), &id("S1")));
        assert!(project.connections().is_empty());
        assert!(!project.remove_global_connection(&id("S2"), &id("S1")));
    }

    #[test]
    fn test_update_building_meta_stamps_updated_at() {
        let mut project = Project::new("HQ");
        let created = project.building().meta.created_at;
        let mut meta = Map::new();
        meta.insert("address".into(), json!("1 Main St"));
        meta.insert("createdAt".into(), json!("1999-01-01T00:00:00Z"));
        project.update_building_meta(meta);

        let building_meta = &project.building().meta;
        assert_eq!(building_meta.extra["address"], json!("1 Main St"));
        assert_eq!(building_meta.created_at, created);
        assert!(building_meta.updated_at >= created);
        assert!(!building_meta.extra.contains_key("createdAt"));
    }

    #[test]
    fn test_stats() {
        let mut project = two_floor_project();
        project.add_local_connection(&fid("L1"), &id("A"), &id("B"), 5.0);
        project.add_local_connection(&fid("L1"), &id("B"), &id("S1"), 5.0);
        project.add_global_connection(GlobalConnectionDraft::stair("S1", "S2", 3.0));

        let stats = project.stats();
        assert_eq!(stats.floor_count, 2);
        assert_eq!(stats.node_count, 6);
        assert_eq!(stats.local_edge_count, 2);
        assert_eq!(stats.global_connection_count, 1);
        assert_eq!(
            stats.nodes_by_type,
            vec![
                (NodeType::Room, 1),
                (NodeType::Hallway, 1),
                (NodeType::Stair, 2),
                (NodeType::Elevator, 2),
            ]
        );
    }

    #[test]
    fn test_non_finite_positions_are_rejected() {
        let mut project = two_floor_project();
        let before = project.clone();

        assert_eq!(project.add_node(&fid("L1"), node(NodeType::Room, "N", f64::NAN, 5.0)), None);
        assert!(!project.update_node(
            &fid("L1"),
            &id("A"),
            NodeUpdate::position(GridPoint::new(3.0, f64::INFINITY))
        ));
        assert_eq!(project, before);

        let json = crate::export_project(&project).unwrap();
        assert_eq!(crate::import_project(&json).unwrap(), project);
    }

    #[test]
    fn test_validate_fresh_project() {
        let project = two_floor_project();
        assert!(project.is_valid());
    }

    mod random_edits {
        use super::*;
        use proptest::prelude::*;

        const KINDS: [NodeType; 4] = [
            NodeType::Room,
            NodeType::Hallway,
            NodeType::Stair,
            NodeType::Elevator,
        ];

        fn apply(project: &mut Project, (op, a, b, c): (u8, usize, usize, usize)) {
            let (na, nb, f) = (id(&format!("N{}", a)), id(&format!("N{}", b)), fid(&format!("F{}", c)));
            let floor_of = |p: &Project, n: &NodeId| p.node_floor_id(n).cloned();
            match op {
                0 => {
                    project.add_node(&f, node(KINDS[b % 4], na.as_str(), a as f64 * 10.0, c as f64 * 20.0));
                }
                1 => {
                    if let Some(floor) = floor_of(project, &na) {
                        project.remove_node(&floor, &na);
                    }
                }
                2 => {
                    if let Some(floor) = floor_of(project, &na) {
                        project.add_local_connection(&floor, &na, &nb, b as f64 + 1.0);
                    }
                }
                3 => {
                    if let Some(floor) = floor_of(project, &na) {
                        project.remove_local_connection(&floor, &na, &nb);
                    }
                }
                4 => {
                    let kind = project.find_node(&na).map(|(_, n)| n.kind).unwrap_or_default();
                    project.add_global_connection(GlobalConnectionDraft::new(na, nb, kind, 2.0));
                }
                5 => {
                    if let Some(floor) = floor_of(project, &na) {
                        project.update_node(&floor, &na, NodeUpdate::kind(KINDS[b % 4]));
                    }
                }
                6 => {
                    if let Some(floor) = floor_of(project, &na) {
                        project.move_node_to_floor(&floor, &na, &f);
                    }
                }
                _ => {
                    if project.remove_floor(&f).is_none() {
                        project.add_floor(FloorDraft::new(f.as_str()).with_id(f.as_str()));
                    }
                }
            }
        }

        proptest! {
            #[test]
            fn edits_preserve_integrity(
                ops in prop::collection::vec((0u8..8, 0usize..6, 0usize..6, 0usize..3), 1..60)
            ) {
                let mut project = Project::new("Random");
                for c in 0..3 {
                    let name = format!("F{}", c);
                    project.add_floor(FloorDraft::new(name.as_str()).with_id(name.as_str()));
                }
                for op in ops {
                    apply(&mut project, op);
                    let report = project.check_integrity();
                    prop_assert!(report.valid, "after {:?}: {:?}", op, report.errors);
                }
            }
        }
    }
}
