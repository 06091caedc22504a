//! Editing session
//!
//! [`Editor`] bundles the graph store, the undo history and the interaction
//! state, and follows the snapshot-then-mutate protocol for every user
//! action so callers cannot get the order wrong.

use floorgraph_core::{GraphError, GraphResult, MapPoint, NodeType, clamp_grid_point, map_to_grid, round_to};
use floorgraph_ir::{FloorId, GlobalConnectionDraft, NodeDraft, NodeId, Project};

use crate::config::EditorConfig;
use crate::history::History;
use crate::interaction::{EditorMode, Intent, Interaction, Shortcut};
use crate::persistence::{Autosaver, JsonFileStorage, ProjectStorage};
use crate::store::GraphStore;

/// A single editing session over one project
#[derive(Debug)]
pub struct Editor {
    store: GraphStore,
    history: History,
    interaction: Interaction,
    config: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Start a session on an empty project
    pub fn new(config: EditorConfig) -> Self {
        Self::with_store(GraphStore::new(), config)
    }

    /// Start a session on an existing project
    pub fn with_project(project: Project, config: EditorConfig) -> Self {
        Self::with_store(GraphStore::with_project(project), config)
    }

    fn with_store(store: GraphStore, config: EditorConfig) -> Self {
        Self {
            store,
            history: History::with_capacity(config.history_capacity),
            interaction: Interaction::new(),
            config,
        }
    }

    /// Start a session from persisted state, autosaving to the same storage
    /// when the configuration asks for it. Must run inside a Tokio runtime.
    pub async fn init<S: ProjectStorage>(config: EditorConfig, storage: S) -> Self {
        let mut store = GraphStore::load(&storage, &config.storage_key).await;
        if config.autosave {
            let (saver, _task) = Autosaver::spawn(storage, config.storage_key.clone());
            store = store.with_autosaver(saver);
        }
        tracing::info!(
            "Editor ready: '{}' with {} floor(s)",
            store.project().building().name,
            store.project().floor_count()
        );
        Self::with_store(store, config)
    }

    /// [`Editor::init`] backed by the configured storage directory
    pub async fn init_from_dir(config: EditorConfig) -> GraphResult<Self> {
        let dir = config.storage_dir.clone().ok_or_else(|| {
            GraphError::InvalidConfig("storage_dir is required for file storage".to_string())
        })?;
        Ok(Self::init(config, JsonFileStorage::new(dir)).await)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The graph store
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// The live project
    pub fn project(&self) -> &Project {
        self.store.project()
    }

    /// The undo history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Mode and pending-gesture state
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Session configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Snapshot, then run `edit` against the store.
    ///
    /// This is the one entry point for discrete user actions.
    pub fn edit<R>(&mut self, action: &str, edit: impl FnOnce(&mut GraphStore) -> R) -> R {
        self.history.save_state(action, self.store.project());
        let result = edit(&mut self.store);
        self.history.discard_unchanged(self.store.project());
        self.interaction.reconcile(self.store.project());
        if self.interaction.dragging().is_none() && self.store.in_transaction() {
            self.store.end_transaction();
        }
        result
    }

    /// Create a node where the user clicked on the active floor's plan.
    ///
    /// Fails when the active floor has no usable dimensions. Returns
    /// `Ok(None)` when there is no active floor.
    pub fn create_node_at(
        &mut self,
        point: MapPoint,
        kind: NodeType,
        name: impl Into<String>,
    ) -> GraphResult<Option<NodeId>> {
        let Some(floor) = self.store.active_floor() else {
            tracing::debug!("create_node_at: no active floor");
            return Ok(None);
        };
        let floor_id = floor.id.clone();
        let grid = clamp_grid_point(map_to_grid(point, floor.dimensions())?);

        let draft = NodeDraft::new(kind, grid).with_name(name);
        Ok(self.edit("add node", |store| store.add_node(&floor_id, draft)))
    }

    /// Delete the selected node
    pub fn delete_selected(&mut self) -> bool {
        let Some((floor, node)) = self.store.selected_node() else {
            return false;
        };
        let (floor_id, node_id) = (floor.id.clone(), node.node_id.clone());
        self.edit("delete node", |store| store.remove_node(&floor_id, &node_id))
    }

    /// Handle a click on a node according to the current mode
    pub fn click_node(&mut self, node: &NodeId) -> bool {
        let intent = self.interaction.click_node(node, self.store.project());
        self.apply_intent(intent)
    }

    /// Handle a click on empty canvas
    pub fn click_background(&mut self) -> bool {
        let intent = self.interaction.click_background();
        self.apply_intent(intent)
    }

    /// Show another floor. Focus changes are not recorded in history.
    ///
    /// A drag in progress is committed first.
    pub fn set_active_floor(&mut self, floor: Option<FloorId>) -> bool {
        if self.store.active_floor_id() != floor.as_ref() {
            self.end_drag();
        }
        self.store.set_active_floor(floor)
    }

    /// Switch the interaction mode, committing a drag in progress
    pub fn set_mode(&mut self, mode: EditorMode) {
        self.end_drag();
        self.interaction.set_mode(mode);
    }

    fn apply_intent(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::None | Intent::ConnectionStarted(_) | Intent::ConnectionCancelled => false,
            Intent::Select(node) => self.store.set_selected_node(Some(node)),
            Intent::ClearSelection => self.store.set_selected_node(None),
            Intent::ConnectLocal { floor, from, to } => {
                let distance = self.local_distance(&from, &to);
                self.edit("connect nodes", |store| {
                    store.add_local_connection(&floor, &from, &to, distance)
                })
            }
            Intent::ConnectGlobal { from, to, kind } => {
                let draft = GlobalConnectionDraft::new(from, to, kind, self.config.floor_change_distance);
                self.edit("connect floors", |store| store.add_global_connection(draft))
            }
        }
    }

    fn local_distance(&self, from: &NodeId, to: &NodeId) -> f64 {
        let project = self.store.project();
        match (project.find_node(from), project.find_node(to)) {
            (Some((_, a)), Some((_, b))) => round_to(
                a.position().distance_to(&b.position()),
                self.config.distance_precision,
            ),
            _ => 0.0,
        }
    }

    /// Apply a keyboard command. Returns whether anything changed.
    pub fn handle_shortcut(&mut self, shortcut: Shortcut) -> bool {
        match shortcut {
            Shortcut::SetMode(mode) => {
                self.set_mode(mode);
                false
            }
            Shortcut::Cancel => {
                let reverted = self.cancel_drag();
                self.interaction.cancel();
                reverted
            }
            Shortcut::DeleteSelected => self.delete_selected(),
            Shortcut::Undo => self.undo(),
            Shortcut::Redo => self.redo(),
        }
    }

    // ========================================================================
    // Dragging
    // ========================================================================

    /// Start dragging a node of the active floor (move mode only);
    /// snapshots once
    pub fn begin_drag(&mut self, node: &NodeId) -> bool {
        if !self.store.active_floor().is_some_and(|f| f.contains_node(node)) {
            tracing::debug!("begin_drag: '{}' is not on the active floor", node);
            return false;
        }
        if !self.interaction.begin_drag(node) {
            return false;
        }
        if !self.store.begin_transaction(&mut self.history, "move node") {
            self.interaction.end_drag();
            return false;
        }
        true
    }

    /// Move the dragged node to a point on the active floor's plan
    pub fn drag_to(&mut self, point: MapPoint) -> GraphResult<bool> {
        let Some(node) = self
            .interaction
            .dragging()
            .cloned()
            .filter(|_| self.store.in_transaction())
        else {
            return Ok(false);
        };
        let dimensions = self.store.active_floor().and_then(|f| f.dimensions());
        let grid = map_to_grid(point, dimensions)?;
        Ok(self.store.apply_move(&node, grid))
    }

    /// Finish the drag and commit it. A drag that moved nothing leaves no
    /// undo step.
    pub fn end_drag(&mut self) -> bool {
        self.interaction.end_drag();
        let committed = self.store.end_transaction();
        if committed {
            self.history.discard_unchanged(self.store.project());
        }
        committed
    }

    /// Abort the drag, putting the node back
    pub fn cancel_drag(&mut self) -> bool {
        self.interaction.end_drag();
        let cancelled = self.store.cancel_transaction();
        if cancelled {
            self.history.discard_unchanged(self.store.project());
        }
        cancelled
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Revert the most recent action
    pub fn undo(&mut self) -> bool {
        if self.store.in_transaction() {
            return false;
        }
        match self.history.undo(self.store.project()) {
            Some(previous) => {
                self.store.restore(previous);
                self.interaction.reconcile(self.store.project());
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently reverted action
    pub fn redo(&mut self) -> bool {
        if self.store.in_transaction() {
            return false;
        }
        match self.history.redo() {
            Some(next) => {
                self.store.restore(next);
                self.interaction.reconcile(self.store.project());
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Replace the project with a JSON document and forget the old history
    pub fn import_project(&mut self, json: &str) -> GraphResult<()> {
        self.store.import_project(json)?;
        self.history.clear();
        self.interaction = Interaction::new();
        Ok(())
    }

    /// Start over with an empty project and no history
    pub fn reset(&mut self) {
        self.store.reset();
        self.history.clear();
        self.interaction = Interaction::new();
    }
}

// ============================================================================
// Tests
// ============================================================================
