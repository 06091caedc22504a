//! Interaction modes and what a gesture means in each of them
//!
//! [`Interaction`] holds no graph state of its own beyond a pending
//! connection endpoint. It turns clicks and key presses into an [`Intent`]
//! that the editor then carries out against the graph store.

use std::fmt;

use floorgraph_core::{ConnectionType, FloorId, NodeId, NodeType};
use floorgraph_ir::Project;

// ============================================================================
// EditorMode
// ============================================================================

/// Active canvas tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    /// Clicking a node selects it
    #[default]
    Select,
    /// Two clicks connect two nodes
    Connect,
    /// Nodes can be dragged
    Move,
}

impl EditorMode {
    /// Get all modes
    pub fn all() -> &'static [EditorMode] {
        &[EditorMode::Select, EditorMode::Connect, EditorMode::Move]
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            EditorMode::Select => "Select",
            EditorMode::Connect => "Connect",
            EditorMode::Move => "Move",
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Shortcut
// ============================================================================

/// Keyboard commands understood by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    SetMode(EditorMode),
    /// Drop a pending connection and return to select mode
    Cancel,
    DeleteSelected,
    Undo,
    Redo,
}

impl Shortcut {
    /// Map a key press to a command.
    ///
    /// `key` uses DOM key names ("c", "Escape", "Delete", ...); letters are
    /// matched case-insensitively.
    pub fn from_key(key: &str, ctrl: bool, shift: bool) -> Option<Self> {
        let lower = key.to_ascii_lowercase();
        if ctrl {
            return match lower.as_str() {
                "z" if shift => Some(Shortcut::Redo),
                "z" => Some(Shortcut::Undo),
                "y" => Some(Shortcut::Redo),
                _ => None,
            };
        }
        match lower.as_str() {
            "c" => Some(Shortcut::SetMode(EditorMode::Connect)),
            "m" => Some(Shortcut::SetMode(EditorMode::Move)),
            "s" => Some(Shortcut::SetMode(EditorMode::Select)),
            "escape" => Some(Shortcut::Cancel),
            "delete" | "backspace" => Some(Shortcut::DeleteSelected),
            _ => None,
        }
    }
}

// ============================================================================
// Intent
// ============================================================================

/// What a gesture asks the graph store to do
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Nothing to do
    None,
    /// Make this node the selection
    Select(NodeId),
    /// Clear the selection
    ClearSelection,
    /// First endpoint of a connection was picked
    ConnectionStarted(NodeId),
    /// The pending connection was dropped
    ConnectionCancelled,
    /// Connect two nodes of one floor
    ConnectLocal {
        floor: FloorId,
        from: NodeId,
        to: NodeId,
    },
    /// Connect two nodes on different floors
    ConnectGlobal {
        from: NodeId,
        to: NodeId,
        kind: NodeType,
    },
}

// ============================================================================
// Interaction
// ============================================================================

/// Mode plus connection-in-progress state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interaction {
    mode: EditorMode,
    pending: Option<NodeId>,
    dragging: Option<NodeId>,
}

impl Interaction {
    /// Start in select mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// First endpoint of a connection being drawn
    pub fn pending_connection(&self) -> Option<&NodeId> {
        self.pending.as_ref()
    }

    /// Node being dragged
    pub fn dragging(&self) -> Option<&NodeId> {
        self.dragging.as_ref()
    }

    /// Switch mode, dropping any gesture in progress
    pub fn set_mode(&mut self, mode: EditorMode) {
        if self.mode != mode {
            tracing::debug!("Mode {} -> {}", self.mode, mode);
        }
        self.mode = mode;
        self.pending = None;
        self.dragging = None;
    }

    /// Escape: drop the pending connection and go back to select mode
    pub fn cancel(&mut self) -> Intent {
        let had_pending = self.pending.is_some();
        self.set_mode(EditorMode::Select);
        if had_pending {
            Intent::ConnectionCancelled
        } else {
            Intent::None
        }
    }

    /// Resolve a click on `node`.
    ///
    /// In connect mode the first click remembers the node and the second
    /// click on a different node connects the two: locally when they share
    /// a floor, globally otherwise. Clicking the pending node again does
    /// nothing.
    pub fn click_node(&mut self, node: &NodeId, project: &Project) -> Intent {
        if self.mode != EditorMode::Connect {
            return Intent::Select(node.clone());
        }

        let Some((node_floor, target)) = project.find_node(node) else {
            tracing::debug!("click_node: no node '{}'", node);
            return Intent::None;
        };

        let pending = self
            .pending
            .as_ref()
            .and_then(|id| project.find_node(id));
        let Some((pending_floor, source)) = pending else {
            self.pending = Some(node.clone());
            return Intent::ConnectionStarted(node.clone());
        };

        if source.node_id == target.node_id {
            return Intent::None;
        }

        let from = source.node_id.clone();
        let to = target.node_id.clone();
        self.pending = None;

        if pending_floor.id == node_floor.id {
            Intent::ConnectLocal {
                floor: node_floor.id.clone(),
                from,
                to,
            }
        } else {
            let kind = ConnectionType::for_endpoints(source.kind, target.kind)
                .map(NodeType::from)
                .unwrap_or(source.kind);
            Intent::ConnectGlobal { from, to, kind }
        }
    }

    /// Resolve a click on empty canvas
    pub fn click_background(&mut self) -> Intent {
        match self.mode {
            EditorMode::Connect if self.pending.take().is_some() => Intent::ConnectionCancelled,
            EditorMode::Connect => Intent::None,
            _ => Intent::ClearSelection,
        }
    }

    /// Begin dragging `node`; only possible in move mode
    pub fn begin_drag(&mut self, node: &NodeId) -> bool {
        if self.mode != EditorMode::Move || self.dragging.is_some() {
            return false;
        }
        self.dragging = Some(node.clone());
        true
    }

    /// Finish the drag, returning the dragged node
    pub fn end_drag(&mut self) -> Option<NodeId> {
        self.dragging.take()
    }

    /// Forget nodes that no longer exist in `project`
    pub fn reconcile(&mut self, project: &Project) {
        if self.pending.as_ref().is_some_and(|id| !project.contains_node(id)) {
            self.pending = None;
        }
        if self.dragging.as_ref().is_some_and(|id| !project.contains_node(id)) {
            self.dragging = None;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use floorgraph_core::GridPoint;
    use floorgraph_ir::{FloorDraft, NodeDraft};
    use pretty_assertions::assert_eq;

    fn project() -> Project {
        let mut project = Project::new("Test");
        let l1 = project.add_floor(FloorDraft::new("L1").with_id("L1"));
        let l2 = project.add_floor(FloorDraft::new("L2").with_id("L2"));
        for (floor, kind, id) in [
            (&l1, NodeType::Room, "A"),
            (&l1, NodeType::Hallway, "B"),
            (&l1, NodeType::Elevator, "E1"),
            (&l2, NodeType::Elevator, "E2"),
            (&l2, NodeType::Room, "R2"),
        ] {
            project.add_node(floor, NodeDraft::new(kind, GridPoint::new(1.0, 1.0)).with_id(id));
        }
        project
    }

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    #[test]
    fn test_select_mode_selects() {
        let mut interaction = Interaction::new();
        assert_eq!(interaction.click_node(&id("A"), &project()), Intent::Select(id("A")));
        assert_eq!(interaction.click_background(), Intent::ClearSelection);
    }

    #[test]
    fn test_connect_same_floor_is_local() {
        let project = project();
        let mut interaction = Interaction::new();
        interaction.set_mode(EditorMode::Connect);

        assert_eq!(
            interaction.click_node(&id("A"), &project),
            Intent::ConnectionStarted(id("A"))
        );
        assert_eq!(interaction.click_node(&id("A"), &project), Intent::None);
        assert_eq!(
            interaction.click_node(&id("B"), &project),
            Intent::ConnectLocal {
                floor: FloorId::new("L1"),
                from: id("A"),
                to: id("B"),
            }
        );
        assert_eq!(interaction.pending_connection(), None);
        assert_eq!(interaction.mode(), EditorMode::Connect);
    }

    #[test]
    fn test_connect_across_floors_is_global() {
        let project = project();
        let mut interaction = Interaction::new();
        interaction.set_mode(EditorMode::Connect);

        interaction.click_node(&id("E1"), &project);
        assert_eq!(
            interaction.click_node(&id("E2"), &project),
            Intent::ConnectGlobal {
                from: id("E1"),
                to: id("E2"),
                kind: NodeType::Elevator,
            }
        );

        interaction.click_node(&id("A"), &project);
        assert_eq!(
            interaction.click_node(&id("R2"), &project),
            Intent::ConnectGlobal {
                from: id("A"),
                to: id("R2"),
                kind: NodeType::Room,
            }
        );
    }

    #[test]
    fn test_escape_cancels_pending_connection() {
        let project = project();
        let mut interaction = Interaction::new();
        interaction.set_mode(EditorMode::Connect);
        interaction.click_node(&id("A"), &project);

        assert_eq!(interaction.cancel(), Intent::ConnectionCancelled);
        assert_eq!(interaction.mode(), EditorMode::Select);
        assert_eq!(interaction.cancel(), Intent::None);
    }

    #[test]
    fn test_background_click_cancels_pending_connection() {
        let project = project();
        let mut interaction = Interaction::new();
        interaction.set_mode(EditorMode::Connect);
        interaction.click_node(&id("A"), &project);
        assert_eq!(interaction.click_background(), Intent::ConnectionCancelled);
        assert_eq!(interaction.click_background(), Intent::None);
    }

    #[test]
    fn test_pending_node_deleted_restarts_connection() {
        let mut project = project();
        let mut interaction = Interaction::new();
        interaction.set_mode(EditorMode::Connect);
        interaction.click_node(&id("A"), &project);

        project.remove_node(&FloorId::new("L1"), &id("A"));
        interaction.reconcile(&project);
        assert_eq!(interaction.pending_connection(), None);
        assert_eq!(
            interaction.click_node(&id("B"), &project),
            Intent::ConnectionStarted(id("B"))
        );
    }

    #[test]
    fn test_drag_only_in_move_mode() {
        let mut interaction = Interaction::new();
        assert!(!interaction.begin_drag(&id("A")));
        interaction.set_mode(EditorMode::Move);
        assert!(interaction.begin_drag(&id("A")));
        assert!(!interaction.begin_drag(&id("B")));
        assert_eq!(interaction.end_drag(), Some(id("A")));
        assert_eq!(interaction.end_drag(), None);
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(
            Shortcut::from_key("c", false, false),
            Some(Shortcut::SetMode(EditorMode::Connect))
        );
        assert_eq!(
            Shortcut::from_key("M", false, true),
            Some(Shortcut::SetMode(EditorMode::Move))
        );
        assert_eq!(
            Shortcut::from_key("s", false, false),
            Some(Shortcut::SetMode(EditorMode::Select))
        );
        assert_eq!(Shortcut::from_key("Escape", false, false), Some(Shortcut::Cancel));
        assert_eq!(Shortcut::from_key("Delete", false, false), Some(Shortcut::DeleteSelected));
        assert_eq!(Shortcut::from_key("Backspace", false, false), Some(Shortcut::DeleteSelected));
        assert_eq!(Shortcut::from_key("z", true, false), Some(Shortcut::Undo));
        assert_eq!(Shortcut::from_key("Z", true, true), Some(Shortcut::Redo));
        assert_eq!(Shortcut::from_key("y", true, false), Some(Shortcut::Redo));
        assert_eq!(Shortcut::from_key("c", true, false), None);
        assert_eq!(Shortcut::from_key("q", false, false), None);
    }
}
