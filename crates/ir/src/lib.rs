//! # FloorGraph IR
//!
//! Data model of an indoor-navigation graph and the operations that edit it.
//!
//! ## Core Concepts
//!
//! - **Project**: the root aggregate (building metadata, floors, global connections)
//! - **Floor**: one storey with its floor-plan dimensions and its nodes
//! - **Node**: a typed point of interest whose `connections` hold the same-floor edges
//! - **Connection**: a cross-floor edge between two stairs or two elevators
//!
//! Every mutating operation lives on [`Project`] and keeps the graph
//! consistent. [`validation`] checks documents that arrive from outside and
//! [`serialization`] handles the JSON wire format.

// Module declarations
pub mod connection;
pub mod floor;
pub mod node;
pub mod project;
pub mod serialization;
pub mod validation;

// Re-export commonly used types at crate root
pub use connection::{Connection, GlobalConnectionDraft};
pub use floor::{Floor, FloorDraft, FloorUpdate};
pub use node::{Coordinates, LocalConnection, Node, NodeDraft, NodeUpdate};
pub use project::{Building, BuildingMeta, Project, ProjectStats};
pub use serialization::{
    ExportOptions, export_project, export_project_with, import_project, import_project_strict,
    load_project, save_project,
};
pub use validation::{
    RepairReport, ValidationError, ValidationErrorCode, ValidationResult, ValidationRule,
    ValidationWarning, ValidationWarningCode, Validator,
};

// Re-export core types that are commonly used with IR
pub use floorgraph_core::{
    BuildingId, ConnectionType, FloorDimensions, FloorId, GraphError, GraphResult, GridPoint,
    MapPoint, NodeId, NodeType, Validatable,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        Connection, ConnectionType, Floor, FloorDraft, FloorId, FloorUpdate,
        GlobalConnectionDraft, GraphError, GraphResult, GridPoint, Node, NodeDraft, NodeId,
        NodeType, NodeUpdate, Project, Validatable,
    };
}
