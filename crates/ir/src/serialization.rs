//! Reading and writing diagram files
//!
//! Two on-disk formats are supported: the full project JSON exchanged with
//! the backend, and the `diagram-interface.json` export (`{nodes, edges}`).

use crate::project::{DiagramExport, DiagramSnapshot, Project};
use forge_core::{ForgeError, ForgeResult};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

// ============================================================================
// Constants
// ============================================================================

/// File name used when exporting without a save handler
pub const EXPORT_FILE_NAME: &str = "diagram-interface.json";

/// Extension for saved project files
pub const PROJECT_EXTENSION: &str = "json";

// ============================================================================
// Export
// ============================================================================

/// Render an export as pretty-printed JSON
pub fn export_to_string(export: &DiagramExport) -> ForgeResult<String> {
    to_pretty(export)
}

/// Write `diagram-interface.json` (or any other path)
pub fn export_diagram(export: &DiagramExport, path: impl AsRef<Path>) -> ForgeResult<()> {
    write_json(export, path.as_ref())
}

/// Read an export file back
pub fn load_diagram_export(path: impl AsRef<Path>) -> ForgeResult<DiagramExport> {
    let path = path.as_ref();
    let json = read_file(path)?;
    serde_json::from_str(&json).map_err(|e| invalid_file(path, e))
}

// ============================================================================
// Project files
// ============================================================================

/// Save a full project as pretty JSON
pub fn save_project_file(project: &Project, path: impl AsRef<Path>) -> ForgeResult<()> {
    write_json(project, path.as_ref())
}

/// Load a full project from a file
pub fn load_project_file(path: impl AsRef<Path>) -> ForgeResult<Project> {
    let path = path.as_ref();
    let json = read_file(path)?;
    load_project_from_string(&json).map_err(|e| match e {
        ForgeError::JsonSerialization(je) => invalid_file(path, je),
        other => other,
    })
}

/// Load a full project from a JSON string
pub fn load_project_from_string(json: &str) -> ForgeResult<Project> {
    Ok(serde_json::from_str(json)?)
}

/// A file opened for offline work
#[derive(Debug, Clone, PartialEq)]
pub enum DiagramFile {
    /// A full project record
    Project(Box<Project>),
    /// A bare snapshot or export
    Diagram(DiagramSnapshot),
}

impl DiagramFile {
    /// The diagram part, whatever the file held
    pub fn snapshot(&self) -> &DiagramSnapshot {
        match self {
            DiagramFile::Project(project) => &project.nodes,
            DiagramFile::Diagram(snapshot) => snapshot,
        }
    }

    /// Consume into a project, wrapping bare diagrams in an unnamed one
    pub fn into_project(self) -> Project {
        match self {
            DiagramFile::Project(project) => *project,
            DiagramFile::Diagram(snapshot) => {
                let mut project = Project::default();
                project.refresh_from(snapshot);
                project
            }
        }
    }
}

/// Open a project, snapshot, or export file
///
/// A top-level `nodes` array means a snapshot/export; a `nodes` object (or
/// none at all) means a project.
pub fn open_diagram_file(path: impl AsRef<Path>) -> ForgeResult<DiagramFile> {
    let path = path.as_ref();
    let json = read_file(path)?;
    let value: Value = serde_json::from_str(&json).map_err(|e| invalid_file(path, e))?;

    if !value.is_object() {
        return Err(ForgeError::InvalidProjectFormat(format!(
            "{}: expected a JSON object",
            path.display()
        )));
    }

    let file = if value.get("nodes").is_some_and(Value::is_array) {
        debug!("Opening {} as a diagram", path.display());
        DiagramFile::Diagram(serde_json::from_value(value).map_err(|e| invalid_file(path, e))?)
    } else {
        debug!("Opening {} as a project", path.display());
        DiagramFile::Project(Box::new(
            serde_json::from_value(value).map_err(|e| invalid_file(path, e))?,
        ))
    };
    Ok(file)
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Default file name for a project
pub fn default_file_name(project_name: &str) -> String {
    let safe_name: String = project_name
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

    let safe_name = if safe_name.is_empty() {
        "project".to_string()
    } else {
        safe_name.to_lowercase()
    };
    format!("{}.{}", safe_name, PROJECT_EXTENSION)
}

fn to_pretty<T: Serialize>(value: &T) -> ForgeResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> ForgeResult<()> {
    let json = to_pretty(value).map_err(|e| ForgeError::FileWrite {
        path: path.to_path_buf(),
        message: format!("Failed to serialize: {}", e),
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ForgeError::DirectoryCreate {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| ForgeError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    debug!("Wrote {}", path.display());
    Ok(())
}

fn read_file(path: &Path) -> ForgeResult<String> {
    if !path.exists() {
        return Err(ForgeError::ProjectNotFound(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|e| ForgeError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn invalid_file(path: &Path, error: serde_json::Error) -> ForgeError {
    ForgeError::FileRead {
        path: path.to_path_buf(),
        message: format!("Invalid diagram file format: {}", error),
    }
}

// ============================================================================
// Tests
// ============================================================================
