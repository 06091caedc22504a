//! # FloorGraph Core
//!
//! Core types, geometry, traits, and error handling for FloorGraph.
//!
//! This crate provides the foundational building blocks used throughout
//! the FloorGraph workspace, including:
//!
//! - **Types**: floor/node identifiers, node and connection kinds
//! - **Geometry**: conversion between the 0-100 grid and floor pixel space
//! - **Traits**: `Validatable`
//! - **Errors**: unified error handling with `GraphError` and `GraphResult`
//!

pub mod error;
pub mod geometry;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{GraphError, GraphResult, ResultExt};
pub use geometry::{
    FloorDimensions, GRID_MAX, GridPoint, MapPoint, clamp_grid_point, grid_to_map, map_to_grid,
    round_to,
};
pub use traits::Validatable;
pub use types::{BuildingId, ConnectionType, FloorId, NodeId, NodeType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
