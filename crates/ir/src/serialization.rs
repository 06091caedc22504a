//! Import, export and file I/O for FloorGraph projects
//!
//! The JSON document produced here is both the export format handed to
//! pathfinding consumers and the persisted state format. It contains the
//! schema fields only, so an exported project always re-imports to an
//! equal [`Project`].

use crate::Project;
use floorgraph_core::{GraphError, GraphResult};
use std::path::{Path, PathBuf};

// ============================================================================
// Constants
// ============================================================================

/// File extension for exported projects
pub const PROJECT_EXTENSION: &str = "json";

// ============================================================================
// Export
// ============================================================================

/// Export variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Drop floor image references for lean graph-only exports
    pub strip_images: bool,
    /// Two-space indented output instead of a single line
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            strip_images: false,
            pretty: true,
        }
    }
}

/// Serialize a project to canonical, pretty-printed JSON
pub fn export_project(project: &Project) -> GraphResult<String> {
    export_project_with(project, ExportOptions::default())
}

/// Serialize a project with explicit export options
pub fn export_project_with(project: &Project, options: ExportOptions) -> GraphResult<String> {
    let stripped;
    let project = if options.strip_images {
        let mut copy = project.clone();
        for floor in &mut copy.floors {
            floor.image_url = None;
        }
        stripped = copy;
        &stripped
    } else {
        project
    };

    let json = if options.pretty {
        serde_json::to_string_pretty(project)?
    } else {
        serde_json::to_string(project)?
    };

    tracing::info!(
        "Exported project '{}' ({} floor(s), {} bytes)",
        project.building().name,
        project.floor_count(),
        json.len()
    );
    Ok(json)
}

// ============================================================================
// Import
// ============================================================================

fn parse_project(json: &str) -> GraphResult<Project> {
    serde_json::from_str(json).map_err(|e| {
        GraphError::InvalidProjectFormat(format!(
            "{} (line {}, column {})",
            e,
            e.line(),
            e.column()
        ))
    })
}

/// Parse a project document.
///
/// Malformed JSON or a document of the wrong shape is an error. A
/// well-formed document is accepted even if it breaks graph invariants;
/// each violation is logged as a warning so callers can offer
/// [`Project::repair`].
pub fn import_project(json: &str) -> GraphResult<Project> {
    let project = parse_project(json)?;

    let report = project.check_integrity();
    for error in &report.errors {
        tracing::warn!("Imported project violates an invariant: {}", error);
    }
    tracing::info!(
        "Imported project '{}' ({} floor(s), {} node(s), {} integrity issue(s))",
        project.building().name,
        project.floor_count(),
        project.node_count(),
        report.errors.len()
    );
    Ok(project)
}

/// Parse a project document and reject it if it breaks any graph invariant
pub fn import_project_strict(json: &str) -> GraphResult<Project> {
    let project = parse_project(json)?;
    project.check_integrity().to_result()?;
    tracing::info!("Imported project '{}'", project.building().name);
    Ok(project)
}

// ============================================================================
// File I/O
// ============================================================================

/// Save a project to a file, creating parent directories as needed
pub fn save_project(project: &Project, path: impl AsRef<Path>) -> GraphResult<()> {
    save_project_with(project, path, ExportOptions::default())
}

/// Save a project to a file with explicit export options
pub fn save_project_with(
    project: &Project,
    path: impl AsRef<Path>,
    options: ExportOptions,
) -> GraphResult<()> {
    let path = path.as_ref();
    let json = export_project_with(project, options).map_err(|e| GraphError::FileWrite {
        path: path.to_path_buf(),
        message: format!("Failed to serialize project: {}", e),
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| GraphError::DirectoryCreate {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| GraphError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!("Saved project to {}", path.display());
    Ok(())
}

/// Load a project from a file (lenient, see [`import_project`])
pub fn load_project(path: impl AsRef<Path>) -> GraphResult<Project> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(GraphError::ProjectNotFound(path.to_path_buf()));
    }

    let json = std::fs::read_to_string(path).map_err(|e| GraphError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    import_project(&json).map_err(|e| match e {
        GraphError::InvalidProjectFormat(message) => GraphError::InvalidProjectFormat(format!(
            "{}: {}",
            path.display(),
            message
        )),
        other => other,
    })
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Get the default file name for a building
pub fn default_file_name(building_name: &str) -> String {
    let safe_name: String = building_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = if safe_name.is_empty() {
        "project".to_string()
    } else {
        safe_name.to_lowercase()
    };
    format!("{}.{}", stem, PROJECT_EXTENSION)
}

/// Ensure a path has the project extension
pub fn ensure_extension(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    if path.extension().is_none_or(|e| e != PROJECT_EXTENSION) {
        let mut new_path = path.to_path_buf();
        new_path.set_extension(PROJECT_EXTENSION);
        new_path
    } else {
        path.to_path_buf()
    }
}

// ============================================================================
// Tests
// ============================================================================
