//! Error types for FloorGraph
//!
//! This module provides unified error handling across the workspace,
//! covering geometry errors, malformed imports, integrity violations,
//! IO, configuration and persistence failures.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for FloorGraph
#[derive(Debug, Error)]
pub enum GraphError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The project graph violates one of its structural invariants
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Floor not found
    #[error("Floor not found: {0}")]
    FloorNotFound(String),

    /// Node not found
    #[error("Node '{node}' not found on floor '{floor}'")]
    NodeNotFound { floor: String, node: String },

    /// Project file not found
    #[error("Project not found at path: {0}")]
    ProjectNotFound(PathBuf),

    // ========================================================================
    // Geometry Errors
    // ========================================================================
    /// Floor has no usable pixel dimensions for coordinate conversion
    #[error("Missing floor dimensions in {operation}")]
    MissingFloorDimensions { operation: &'static str },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Imported document is not a project
    #[error("Invalid project file format: {0}")]
    InvalidProjectFormat(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // ========================================================================
    // Persistence Errors
    // ========================================================================
    /// Storage backend failed to load or save
    #[error("Storage error for key '{key}': {message}")]
    Storage { key: String, message: String },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl GraphError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        GraphError::Validation(msg.into())
    }

    /// Create an integrity error
    pub fn integrity(msg: impl Into<String>) -> Self {
        GraphError::Integrity(msg.into())
    }

    /// Create a storage error
    pub fn storage(key: impl Into<String>, msg: impl Into<String>) -> Self {
        GraphError::Storage {
            key: key.into(),
            message: msg.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        GraphError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        GraphError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, GraphError::Validation(_) | GraphError::Integrity(_))
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GraphError::FloorNotFound(_)
                | GraphError::NodeNotFound { .. }
                | GraphError::ProjectNotFound(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            GraphError::Io(_)
                | GraphError::FileRead { .. }
                | GraphError::FileWrite { .. }
                | GraphError::DirectoryCreate { .. }
        )
    }
}

/// Result type alias using GraphError
pub type GraphResult<T> = Result<T, GraphError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> GraphResult<T>;
}

impl<T, E: Into<GraphError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> GraphResult<T> {
        self.map_err(|e| {
            let err: GraphError = e.into();
            GraphError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
