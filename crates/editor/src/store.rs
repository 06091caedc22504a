//! The graph store: sole owner of the live project
//!
//! `GraphStore` wraps a [`Project`] together with the editing focus (active
//! floor, selected node) and keeps the focus pointing at things that exist.
//! Every successful edit is handed to the autosaver, except inside a
//! transaction, where saving waits for the transaction to end.

use floorgraph_core::{GraphResult, GridPoint};
use floorgraph_ir::{
    ExportOptions, Floor, FloorDraft, FloorId, FloorUpdate, GlobalConnectionDraft, Node,
    NodeDraft, NodeId, NodeUpdate, Project, RepairReport, export_project, export_project_with,
    import_project, import_project_strict,
};
use serde_json::{Map, Value};

use crate::history::History;
use crate::persistence::{Autosaver, ProjectStorage};

/// A drag (or any other continuous gesture) in progress
#[derive(Debug, Clone)]
struct Transaction {
    label: String,
    before: Project,
}

/// Owner of the live project and of the editing focus
#[derive(Debug, Default)]
pub struct GraphStore {
    project: Project,
    active_floor: Option<FloorId>,
    selected_node: Option<NodeId>,
    transaction: Option<Transaction>,
    autosaver: Option<Autosaver>,
}

impl GraphStore {
    /// Create a store around an empty project
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store around an existing project, focused on its first floor
    pub fn with_project(project: Project) -> Self {
        let active_floor = project.first_floor_id().cloned();
        Self {
            project,
            active_floor,
            ..Default::default()
        }
    }

    /// Attach an autosaver; every later edit is queued to it
    pub fn with_autosaver(mut self, autosaver: Autosaver) -> Self {
        self.autosaver = Some(autosaver);
        self
    }

    /// Build a store from persisted state.
    ///
    /// Falls back to a fresh project when nothing is stored or the stored
    /// document cannot be read.
    pub async fn load<S: ProjectStorage>(storage: &S, key: &str) -> Self {
        let project = match storage.load(key).await {
            Ok(Some(json)) => match import_project(&json) {
                Ok(project) => project,
                Err(e) => {
                    tracing::warn!("Stored project '{}' is unreadable, starting fresh: {}", key, e);
                    Project::default()
                }
            },
            Ok(None) => {
                tracing::info!("No stored project under '{}', starting fresh", key);
                Project::default()
            }
            Err(e) => {
                tracing::error!("Failed to load project '{}': {}", key, e);
                Project::default()
            }
        };
        Self::with_project(project)
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// The live project
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Id of the floor being edited
    pub fn active_floor_id(&self) -> Option<&FloorId> {
        self.active_floor.as_ref()
    }

    /// The floor being edited
    pub fn active_floor(&self) -> Option<&Floor> {
        self.active_floor.as_ref().and_then(|id| self.project.floor(id))
    }

    /// Id of the selected node
    pub fn selected_node_id(&self) -> Option<&NodeId> {
        self.selected_node.as_ref()
    }

    /// The selected node with its floor
    pub fn selected_node(&self) -> Option<(&Floor, &Node)> {
        self.selected_node
            .as_ref()
            .and_then(|id| self.project.find_node(id))
    }

    /// Whether a transaction is open
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Change the active floor. Unknown ids are ignored.
    pub fn set_active_floor(&mut self, floor_id: Option<FloorId>) -> bool {
        if let Some(id) = &floor_id {
            if self.project.floor(id).is_none() {
                tracing::debug!("set_active_floor: no floor '{}'", id);
                return false;
            }
        }
        self.active_floor = floor_id;
        true
    }

    /// Change the selected node. Unknown ids are ignored.
    pub fn set_selected_node(&mut self, node_id: Option<NodeId>) -> bool {
        if let Some(id) = &node_id {
            if !self.project.contains_node(id) {
                tracing::debug!("set_selected_node: no node '{}'", id);
                return false;
            }
        }
        self.selected_node = node_id;
        true
    }

    /// Point the focus back at existing things after the project changed
    /// underneath it. A missing active floor falls back to the first floor.
    fn reconcile_focus(&mut self) {
        if let Some(id) = &self.active_floor {
            if self.project.floor(id).is_none() {
                let fallback = self.project.first_floor_id().cloned();
                tracing::debug!("Active floor '{}' is gone, now {:?}", id, fallback);
                self.active_floor = fallback;
            }
        }
        if let Some(id) = &self.selected_node {
            if !self.project.contains_node(id) {
                tracing::debug!("Selected node '{}' is gone, clearing selection", id);
                self.selected_node = None;
            }
        }
    }

    fn committed(&mut self, changed: bool) -> bool {
        if changed {
            self.reconcile_focus();
            self.schedule_save();
        }
        changed
    }

    fn schedule_save(&self) {
        if self.transaction.is_some() {
            return;
        }
        if let Some(saver) = &self.autosaver {
            saver.enqueue(&self.project);
        }
    }

    // ========================================================================
    // Floors
    // ========================================================================

    /// Append a floor and make it the active floor
    pub fn add_floor(&mut self, draft: FloorDraft) -> FloorId {
        let id = self.project.add_floor(draft);
        self.active_floor = Some(id.clone());
        self.committed(true);
        id
    }

    /// Update a floor's fields
    pub fn update_floor(&mut self, floor_id: &FloorId, update: FloorUpdate) -> bool {
        let changed = self.project.update_floor(floor_id, update);
        self.committed(changed)
    }

    /// Remove a floor with everything on it
    pub fn remove_floor(&mut self, floor_id: &FloorId) -> bool {
        let changed = self.project.remove_floor(floor_id).is_some();
        self.committed(changed)
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Add a node to a floor
    pub fn add_node(&mut self, floor_id: &FloorId, draft: NodeDraft) -> Option<NodeId> {
        let id = self.project.add_node(floor_id, draft);
        self.committed(id.is_some());
        id
    }

    /// Update a node on the given floor
    pub fn update_node(&mut self, floor_id: &FloorId, node_id: &NodeId, update: NodeUpdate) -> bool {
        let changed = self.project.update_node(floor_id, node_id, update);
        self.committed(changed)
    }

    /// Remove a node and its edges; clears the selection if it was selected
    pub fn remove_node(&mut self, floor_id: &FloorId, node_id: &NodeId) -> bool {
        let changed = self.project.remove_node(floor_id, node_id).is_some();
        self.committed(changed)
    }

    /// Move a node to another floor
    pub fn move_node_to_floor(&mut self, from: &FloorId, node_id: &NodeId, to: &FloorId) -> bool {
        let changed = self.project.move_node_to_floor(from, node_id, to);
        self.committed(changed)
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Connect two nodes of one floor
    pub fn add_local_connection(
        &mut self,
        floor_id: &FloorId,
        from: &NodeId,
        to: &NodeId,
        distance: f64,
    ) -> bool {
        let changed = self.project.add_local_connection(floor_id, from, to, distance);
        self.committed(changed)
    }

    /// Disconnect two nodes of one floor
    pub fn remove_local_connection(&mut self, floor_id: &FloorId, from: &NodeId, to: &NodeId) -> bool {
        let changed = self.project.remove_local_connection(floor_id, from, to);
        self.committed(changed)
    }

    /// Link two vertical nodes across floors
    pub fn add_global_connection(&mut self, draft: GlobalConnectionDraft) -> bool {
        let changed = self.project.add_global_connection(draft);
        self.committed(changed)
    }

    /// Remove a cross-floor link
    pub fn remove_global_connection(&mut self, a: &NodeId, b: &NodeId) -> bool {
        let changed = self.project.remove_global_connection(a, b);
        self.committed(changed)
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Merge custom building metadata
    pub fn update_building_meta(&mut self, meta: Map<String, Value>) {
        self.project.update_building_meta(meta);
        self.committed(true);
    }

    /// Rename the building
    pub fn set_building_name(&mut self, name: impl Into<String>) {
        self.project.set_building_name(name);
        self.committed(true);
    }

    // ========================================================================
    // Whole-project operations
    // ========================================================================

    /// Replace the project with a parsed document.
    ///
    /// On error the live project is untouched.
    pub fn import_project(&mut self, json: &str) -> GraphResult<()> {
        let project = import_project(json)?;
        self.replace(project);
        Ok(())
    }

    /// Like [`GraphStore::import_project`] but rejects documents that break
    /// graph invariants
    pub fn import_project_strict(&mut self, json: &str) -> GraphResult<()> {
        let project = import_project_strict(json)?;
        self.replace(project);
        Ok(())
    }

    fn replace(&mut self, project: Project) {
        self.project = project;
        self.transaction = None;
        self.selected_node = None;
        self.active_floor = self.project.first_floor_id().cloned();
        self.schedule_save();
    }

    /// Canonical JSON export
    pub fn export_project(&self) -> GraphResult<String> {
        export_project(&self.project)
    }

    /// JSON export with explicit options
    pub fn export_project_with(&self, options: ExportOptions) -> GraphResult<String> {
        export_project_with(&self.project, options)
    }

    /// Start over with an empty project and no focus
    pub fn reset(&mut self) {
        self.project = Project::default();
        self.active_floor = None;
        self.selected_node = None;
        self.transaction = None;
        tracing::info!("Project reset");
        self.schedule_save();
    }

    /// Install a project taken from history, keeping the focus where it
    /// still makes sense
    pub fn restore(&mut self, project: Project) {
        self.project = project;
        self.transaction = None;
        self.reconcile_focus();
        self.schedule_save();
    }

    /// Run integrity repair on the live project
    pub fn repair(&mut self) -> RepairReport {
        let report = self.project.repair();
        self.committed(!report.is_clean());
        report
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Open a transaction: one history snapshot now, no saves until it ends.
    /// Returns `false` if one is already open.
    pub fn begin_transaction(&mut self, history: &mut History, label: impl Into<String>) -> bool {
        if let Some(open) = &self.transaction {
            tracing::debug!("Transaction '{}' already open", open.label);
            return false;
        }
        let label = label.into();
        history.save_state(label.clone(), &self.project);
        self.transaction = Some(Transaction {
            label,
            before: self.project.clone(),
        });
        true
    }

    /// Reposition a node on the active floor during a gesture
    pub fn apply_move(&mut self, node_id: &NodeId, position: GridPoint) -> bool {
        let Some(floor_id) = self.active_floor.clone() else {
            tracing::debug!("apply_move: no active floor");
            return false;
        };
        self.project
            .update_node(&floor_id, node_id, NodeUpdate::position(position))
    }

    /// Close the open transaction and save once
    pub fn end_transaction(&mut self) -> bool {
        let Some(transaction) = self.transaction.take() else {
            return false;
        };
        tracing::debug!("Committed '{}'", transaction.label);
        self.reconcile_focus();
        self.schedule_save();
        true
    }

    /// Abort the open transaction, restoring the project as it was at begin
    pub fn cancel_transaction(&mut self) -> bool {
        let Some(transaction) = self.transaction.take() else {
            return false;
        };
        tracing::debug!("Cancelled '{}'", transaction.label);
        self.project = transaction.before;
        self.reconcile_focus();
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
