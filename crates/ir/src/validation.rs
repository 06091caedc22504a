//! Integrity checks and repair for FloorGraph projects
//!
//! The editing operations on [`Project`] never break the graph invariants,
//! but imported documents can. The rules below report every violation with
//! a code and a path; [`Project::repair`] restores the invariants.

use crate::Project;
use floorgraph_core::{FloorId, GraphError, GraphResult, NodeId};
use std::collections::{HashMap, HashSet};
use std::fmt;

// ============================================================================
// ValidationResult
// ============================================================================

/// Result of a validation operation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub valid: bool,

    /// List of errors (empty if valid)
    pub errors: Vec<ValidationError>,

    /// List of warnings (non-fatal issues)
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, error: ValidationError) {
        self.valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the result
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether any error carries `code`
    pub fn has_code(&self, code: ValidationErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Convert to GraphResult (fails if any errors)
    pub fn to_result(self) -> GraphResult<()> {
        if self.valid {
            Ok(())
        } else {
            let msg = self
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Err(GraphError::integrity(msg))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

// ============================================================================
// ValidationError
// ============================================================================

/// An invariant violation
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Error code for programmatic handling
    pub code: ValidationErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Path to the problematic element (e.g. "floors.L1.nodes.A")
    pub path: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Add a path to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] {}", path, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

/// Error codes for integrity violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    // Identity
    EmptyId,
    DuplicateFloorId,
    DuplicateNodeId,
    FloorBackReferenceMismatch,
    CoordinatesOutOfRange,

    // Local connections
    DanglingLocalReference,
    AsymmetricLocalConnection,
    DuplicateLocalConnection,
    SelfLoop,
    InvalidDistance,

    // Global connections
    DanglingGlobalReference,
    InvalidGlobalEndpointType,
    SameFloorGlobalConnection,
    DuplicateGlobalConnection,
}

// ============================================================================
// ValidationWarning
// ============================================================================

/// A non-fatal observation about the project
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Warning code
    pub code: ValidationWarningCode,

    /// Human-readable warning message
    pub message: String,

    /// Path to the element
    pub path: Option<String>,
}

impl ValidationWarning {
    /// Create a new warning
    pub fn new(code: ValidationWarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Add a path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] Warning: {}", path, self.message)
        } else {
            write!(f, "Warning: {}", self.message)
        }
    }
}

/// Warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationWarningCode {
    MissingDimensions,
    SharedLevel,
    EmptyFloor,
    IsolatedNode,
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait for validation rules
pub trait ValidationRule {
    /// Get the rule name
    fn name(&self) -> &'static str;

    /// Get the rule description
    fn description(&self) -> &'static str;

    /// Validate a project and return the result
    fn validate(&self, project: &Project) -> ValidationResult;
}

// ============================================================================
// Validator
// ============================================================================

/// Project validator that runs multiple validation rules
#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a validator with every integrity rule
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(FloorsRule));
        validator.add_rule(Box::new(NodesRule));
        validator.add_rule(Box::new(LocalConnectionsRule));
        validator.add_rule(Box::new(GlobalConnectionsRule));
        validator
    }

    /// Add a validation rule
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Validate a project with all rules
    pub fn validate(&self, project: &Project) -> ValidationResult {
        let mut result = ValidationResult::ok();
        for rule in &self.rules {
            let rule_result = rule.validate(project);
            if rule_result.has_errors() {
                tracing::debug!(
                    "Rule '{}' reported {} error(s)",
                    rule.name(),
                    rule_result.errors.len()
                );
            }
            result.merge(rule_result);
        }
        result
    }
}

// ============================================================================
// Built-in Validation Rules
// ============================================================================

fn floor_path(floor: &FloorId) -> String {
    format!("floors.{}", floor)
}

fn node_path(floor: &FloorId, node: &NodeId) -> String {
    format!("floors.{}.nodes.{}", floor, node)
}

/// Rule: floor ids are unique, floors are usable
pub struct FloorsRule;

impl ValidationRule for FloorsRule {
    fn name(&self) -> &'static str {
        "floors"
    }

    fn description(&self) -> &'static str {
        "Validates that floor ids are present and unique"
    }

    fn validate(&self, project: &Project) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut seen: HashSet<&FloorId> = HashSet::new();
        let mut levels: HashSet<i32> = HashSet::new();

        for floor in project.floors() {
            let path = floor_path(&floor.id);

            if floor.id.is_empty() {
                result.add_error(
                    ValidationError::new(ValidationErrorCode::EmptyId, "Floor id cannot be empty")
                        .with_path(&path),
                );
            }
            if !seen.insert(&floor.id) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::DuplicateFloorId,
                        format!("Duplicate floor id '{}'", floor.id),
                    )
                    .with_path(&path),
                );
            }
            if !levels.insert(floor.level) {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::SharedLevel,
                        format!("Level {} is used by more than one floor", floor.level),
                    )
                    .with_path(&path),
                );
            }
            if floor.dimensions().is_none_or(|d| !d.is_usable()) {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::MissingDimensions,
                        format!("Floor '{}' has no usable plan dimensions", floor.name),
                    )
                    .with_path(&path),
                );
            }
            if floor.nodes.is_empty() {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::EmptyFloor,
                        format!("Floor '{}' has no nodes", floor.name),
                    )
                    .with_path(&path),
                );
            }
        }

        result
    }
}

/// Rule: node ids are unique and nodes agree with their floor
pub struct NodesRule;

impl ValidationRule for NodesRule {
    fn name(&self) -> &'static str {
        "nodes"
    }

    fn description(&self) -> &'static str {
        "Validates node ids, floor back-references and grid positions"
    }

    fn validate(&self, project: &Project) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut seen: HashSet<&NodeId> = HashSet::new();
        let globally_linked: HashSet<&NodeId> = project
            .connections()
            .iter()
            .flat_map(|c| [&c.from, &c.to])
            .collect();

        for floor in project.floors() {
            for node in &floor.nodes {
                let path = node_path(&floor.id, &node.node_id);

                if node.node_id.is_empty() {
                    result.add_error(
                        ValidationError::new(ValidationErrorCode::EmptyId, "Node id cannot be empty")
                            .with_path(&path),
                    );
                }
                if !seen.insert(&node.node_id) {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::DuplicateNodeId,
                            format!("Duplicate node id '{}'", node.node_id),
                        )
                        .with_path(&path),
                    );
                }
                if node.floor_id() != &floor.id {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::FloorBackReferenceMismatch,
                            format!(
                                "Node '{}' claims floor '{}' but lives on '{}'",
                                node.node_id,
                                node.floor_id(),
                                floor.id
                            ),
                        )
                        .with_path(&path),
                    );
                }
                if !node.position().in_bounds() {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::CoordinatesOutOfRange,
                            format!(
                                "Node '{}' lies outside the grid at ({}, {})",
                                node.node_id, node.coordinates.x, node.coordinates.y
                            ),
                        )
                        .with_path(&path),
                    );
                }
                if node.connections.is_empty() && !globally_linked.contains(&node.node_id) {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::IsolatedNode,
                            format!("Node '{}' is not connected to anything", node.node_id),
                        )
                        .with_path(&path),
                    );
                }
            }
        }

        result
    }
}

/// Rule: local edges are same-floor, symmetric and unique
pub struct LocalConnectionsRule;

impl ValidationRule for LocalConnectionsRule {
    fn name(&self) -> &'static str {
        "local_connections"
    }

    fn description(&self) -> &'static str {
        "Validates that same-floor edges are stored on both ends with equal distances"
    }

    fn validate(&self, project: &Project) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for floor in project.floors() {
            for node in &floor.nodes {
                let path = node_path(&floor.id, &node.node_id);
                let mut targets: HashSet<&NodeId> = HashSet::new();

                for edge in &node.connections {
                    if edge.node_id == node.node_id {
                        result.add_error(
                            ValidationError::new(
                                ValidationErrorCode::SelfLoop,
                                format!("Node '{}' is connected to itself", node.node_id),
                            )
                            .with_path(&path),
                        );
                        continue;
                    }
                    if !targets.insert(&edge.node_id) {
                        result.add_error(
                            ValidationError::new(
                                ValidationErrorCode::DuplicateLocalConnection,
                                format!(
                                    "Node '{}' lists '{}' more than once",
                                    node.node_id, edge.node_id
                                ),
                            )
                            .with_path(&path),
                        );
                    }
                    if !edge.distance.is_finite() || edge.distance < 0.0 {
                        result.add_error(
                            ValidationError::new(
                                ValidationErrorCode::InvalidDistance,
                                format!(
                                    "Edge '{}' -> '{}' has invalid distance {}",
                                    node.node_id, edge.node_id, edge.distance
                                ),
                            )
                            .with_path(&path),
                        );
                    }

                    let Some(neighbor) = floor.node(&edge.node_id) else {
                        result.add_error(
                            ValidationError::new(
                                ValidationErrorCode::DanglingLocalReference,
                                format!(
                                    "Node '{}' references '{}' which is not on floor '{}'",
                                    node.node_id, edge.node_id, floor.id
                                ),
                            )
                            .with_path(&path),
                        );
                        continue;
                    };
                    if neighbor.distance_to_neighbor(&node.node_id) != Some(edge.distance) {
                        result.add_error(
                            ValidationError::new(
                                ValidationErrorCode::AsymmetricLocalConnection,
                                format!(
                                    "Edge '{}' -> '{}' has no matching reverse entry",
                                    node.node_id, edge.node_id
                                ),
                            )
                            .with_path(&path),
                        );
                    }
                }
            }
        }

        result
    }
}

/// Rule: global connections link existing vertical nodes across floors
pub struct GlobalConnectionsRule;

impl ValidationRule for GlobalConnectionsRule {
    fn name(&self) -> &'static str {
        "global_connections"
    }

    fn description(&self) -> &'static str {
        "Validates that global connections link stairs or elevators on different floors"
    }

    fn validate(&self, project: &Project) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut pairs: HashSet<(&NodeId, &NodeId)> = HashSet::new();

        for (index, connection) in project.connections().iter().enumerate() {
            let path = format!("connections.{}", index);
            let label = format!("{} <-> {}", connection.from, connection.to);

            if connection.from == connection.to {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::SelfLoop,
                        format!("Global connection {} links a node to itself", label),
                    )
                    .with_path(&path),
                );
                continue;
            }

            let pair = if connection.from <= connection.to {
                (&connection.from, &connection.to)
            } else {
                (&connection.to, &connection.from)
            };
            if !pairs.insert(pair) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::DuplicateGlobalConnection,
                        format!("Global connection {} is listed more than once", label),
                    )
                    .with_path(&path),
                );
            }
            if !connection.distance.is_finite() || connection.distance < 0.0 {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::InvalidDistance,
                        format!("Global connection {} has invalid distance", label),
                    )
                    .with_path(&path),
                );
            }

            let (Some((from_floor, from)), Some((to_floor, to))) = (
                project.find_node(&connection.from),
                project.find_node(&connection.to),
            ) else {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::DanglingGlobalReference,
                        format!("Global connection {} references a missing node", label),
                    )
                    .with_path(&path),
                );
                continue;
            };

            if !from.kind.is_vertical() || !to.kind.is_vertical() {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::InvalidGlobalEndpointType,
                        format!(
                            "Global connection {} joins {} and {}; both ends must be stairs or elevators",
                            label, from.kind, to.kind
                        ),
                    )
                    .with_path(&path),
                );
            }
            if from_floor.id == to_floor.id {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::SameFloorGlobalConnection,
                        format!(
                            "Global connection {} stays on floor '{}'",
                            label, from_floor.id
                        ),
                    )
                    .with_path(&path),
                );
            }
        }

        result
    }
}

// ============================================================================
// Integrity check and repair
// ============================================================================

/// What [`Project::repair`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub floor_ids_reassigned: usize,
    pub duplicate_nodes_removed: usize,
    pub back_references_fixed: usize,
    pub coordinates_clamped: usize,
    pub local_entries_removed: usize,
    pub local_entries_added: usize,
    pub local_distances_aligned: usize,
    pub global_connections_removed: usize,
}

impl RepairReport {
    /// Total number of fixes applied
    pub fn total(&self) -> usize {
        self.floor_ids_reassigned
            + self.duplicate_nodes_removed
            + self.back_references_fixed
            + self.coordinates_clamped
            + self.local_entries_removed
            + self.local_entries_added
            + self.local_distances_aligned
            + self.global_connections_removed
    }

    /// Whether nothing needed fixing
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for RepairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            (self.floor_ids_reassigned, "floor id(s) reassigned"),
            (self.duplicate_nodes_removed, "duplicate node(s) removed"),
            (self.back_references_fixed, "floor back-reference(s) fixed"),
            (self.coordinates_clamped, "position(s) clamped"),
            (self.local_entries_removed, "local edge entr(ies) removed"),
            (self.local_entries_added, "reverse edge entr(ies) added"),
            (self.local_distances_aligned, "edge distance(s) aligned"),
            (self.global_connections_removed, "global connection(s) removed"),
        ];
        let applied: Vec<String> = parts
            .iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, what)| format!("{} {}", count, what))
            .collect();
        if applied.is_empty() {
            write!(f, "nothing to repair")
        } else {
            write!(f, "{}", applied.join(", "))
        }
    }
}

impl Project {
    /// Run every integrity rule
    pub fn check_integrity(&self) -> ValidationResult {
        Validator::with_default_rules().validate(self)
    }

    /// Restore every graph invariant, dropping what cannot be salvaged.
    ///
    /// Later duplicates lose to earlier ones; for asymmetric local edges
    /// the first entry seen in floor order sets the distance.
    pub fn repair(&mut self) -> RepairReport {
        let mut report = RepairReport::default();

        let mut floor_ids: HashSet<FloorId> = HashSet::new();
        for floor in &mut self.floors {
            if floor.id.is_empty() || !floor_ids.insert(floor.id.clone()) {
                floor.id = FloorId::generate();
                floor_ids.insert(floor.id.clone());
                report.floor_ids_reassigned += 1;
            }
        }

        let mut node_ids: HashSet<NodeId> = HashSet::new();
        for floor in &mut self.floors {
            let before = floor.nodes.len();
            floor
                .nodes
                .retain(|n| !n.node_id.is_empty() && node_ids.insert(n.node_id.clone()));
            report.duplicate_nodes_removed += before - floor.nodes.len();

            for node in &mut floor.nodes {
                if node.coordinates.floor != floor.id {
                    node.coordinates.floor = floor.id.clone();
                    report.back_references_fixed += 1;
                }
                let clamped = node.position().clamped();
                if clamped != node.position() {
                    node.coordinates.x = clamped.x;
                    node.coordinates.y = clamped.y;
                    report.coordinates_clamped += 1;
                }
            }
        }

        for floor in &mut self.floors {
            repair_local_edges(floor, &mut report);
        }

        let before = self.connections.len();
        let mut pairs: HashSet<(NodeId, NodeId)> = HashSet::new();
        let located: HashMap<&NodeId, (&FloorId, bool)> = self
            .floors
            .iter()
            .flat_map(|f| f.nodes.iter().map(move |n| (&n.node_id, (&f.id, n.kind.is_vertical()))))
            .collect();
        let keep: Vec<bool> = self
            .connections
            .iter()
            .map(|c| {
                let (Some((from_floor, from_vertical)), Some((to_floor, to_vertical))) =
                    (located.get(&c.from), located.get(&c.to))
                else {
                    return false;
                };
                let pair = if c.from <= c.to {
                    (c.from.clone(), c.to.clone())
                } else {
                    (c.to.clone(), c.from.clone())
                };
                *from_vertical
                    && *to_vertical
                    && from_floor != to_floor
                    && c.distance.is_finite()
                    && c.distance >= 0.0
                    && pairs.insert(pair)
            })
            .collect();
        let mut flags = keep.into_iter();
        self.connections.retain(|_| flags.next().unwrap_or(false));
        report.global_connections_removed = before - self.connections.len();

        if report.is_clean() {
            tracing::debug!("Project '{}' needed no repair", self.building.name);
        } else {
            tracing::info!("Repaired project '{}': {}", self.building.name, report);
        }
        report
    }
}

fn repair_local_edges(floor: &mut crate::Floor, report: &mut RepairReport) {
    let members: HashSet<NodeId> = floor.node_ids().cloned().collect();

    // Per-node cleanup: self-loops, foreign targets, bad distances, duplicates
    for node in &mut floor.nodes {
        let before = node.connections.len();
        let mut targets: HashSet<NodeId> = HashSet::new();
        let own = node.node_id.clone();
        node.connections.retain(|edge| {
            edge.node_id != own
                && members.contains(&edge.node_id)
                && edge.distance.is_finite()
                && edge.distance >= 0.0
                && targets.insert(edge.node_id.clone())
        });
        report.local_entries_removed += before - node.connections.len();
    }

    // First entry seen per unordered pair fixes the distance
    let mut canonical: HashMap<(NodeId, NodeId), f64> = HashMap::new();
    for node in &floor.nodes {
        for edge in &node.connections {
            let key = if node.node_id <= edge.node_id {
                (node.node_id.clone(), edge.node_id.clone())
            } else {
                (edge.node_id.clone(), node.node_id.clone())
            };
            canonical.entry(key).or_insert(edge.distance);
        }
    }

    for ((a, b), distance) in &canonical {
        for (from, to) in [(a, b), (b, a)] {
            let Some(node) = floor.node_mut(from) else {
                continue;
            };
            match node.distance_to_neighbor(to) {
                None => report.local_entries_added += 1,
                Some(existing) if existing != *distance => report.local_distances_aligned += 1,
                Some(_) => {}
            }
            node.upsert_neighbor(to, *distance);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
