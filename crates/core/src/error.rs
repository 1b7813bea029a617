//! Error types for SchemaForge
//!
//! This module provides unified error handling across the workspace,
//! including validation errors, lookup failures, editor state errors,
//! IO errors and serialization errors.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for SchemaForge
#[derive(Debug, Error)]
pub enum ForgeError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Class validation failed
    #[error("Class validation failed for '{class}': {message}")]
    ClassValidation { class: String, message: String },

    /// Attribute validation failed
    #[error("Attribute validation failed for '{class}.{attribute}': {message}")]
    AttributeValidation {
        class: String,
        attribute: String,
        message: String,
    },

    /// Enum validation failed
    #[error("Enum validation failed for '{name}': {message}")]
    EnumValidation { name: String, message: String },

    /// A foreign-key reference is malformed (expected `Class.attribute`)
    #[error("Invalid foreign key reference '{0}': expected ClassName.attributeName")]
    InvalidReference(String),

    /// Enum still referenced by attributes
    #[error("Enum '{name}' is still used by: {}", users.join(", "))]
    EnumInUse { name: String, users: Vec<String> },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Class not found by name
    #[error("Target class \"{0}\" not found")]
    ClassNotFound(String),

    /// Attribute not found on a class
    #[error("Attribute \"{attribute}\" not found in \"{class}\"")]
    AttributeNotFound { class: String, attribute: String },

    /// Diagram node not found by id
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Enum not found by name
    #[error("Enum not found: {0}")]
    EnumNotFound(String),

    /// Project file not found
    #[error("Project not found at path: {0}")]
    ProjectNotFound(PathBuf),

    // ========================================================================
    // Duplicate Errors
    // ========================================================================
    /// Duplicate class name
    #[error("Duplicate class name: '{0}' already exists")]
    DuplicateClass(String),

    /// Duplicate attribute name
    #[error("Duplicate attribute name: '{attribute}' already exists in class '{class}'")]
    DuplicateAttribute { class: String, attribute: String },

    /// Duplicate enum name
    #[error("Duplicate enum name: '{0}' already exists")]
    DuplicateEnum(String),

    // ========================================================================
    // Editor Errors
    // ========================================================================
    /// An editor operation was invoked in the wrong editor state
    #[error("Editor state error: {0}")]
    EditorState(String),

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

    /// Invalid project or diagram file format
    #[error("Invalid project file format: {0}")]
    InvalidProjectFormat(String),

}

impl ForgeError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        ForgeError::Validation(msg.into())
    }

    /// Create a class validation error
    pub fn class_validation(class: impl Into<String>, msg: impl Into<String>) -> Self {
        ForgeError::ClassValidation {
            class: class.into(),
            message: msg.into(),
        }
    }

    /// Create an attribute validation error
    pub fn attribute_validation(
        class: impl Into<String>,
        attribute: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        ForgeError::AttributeValidation {
            class: class.into(),
            attribute: attribute.into(),
            message: msg.into(),
        }
    }

    /// Create an enum validation error
    pub fn enum_validation(name: impl Into<String>, msg: impl Into<String>) -> Self {
        ForgeError::EnumValidation {
            name: name.into(),
            message: msg.into(),
        }
    }

    /// Create an editor state error
    pub fn editor_state(msg: impl Into<String>) -> Self {
        ForgeError::EditorState(msg.into())
    }

    /// Check if this error is a validation error (recoverable by fixing the input)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ForgeError::Validation(_)
                | ForgeError::ClassValidation { .. }
                | ForgeError::AttributeValidation { .. }
                | ForgeError::EnumValidation { .. }
                | ForgeError::InvalidReference(_)
                | ForgeError::EnumInUse { .. }
                | ForgeError::ClassNotFound(_)
                | ForgeError::AttributeNotFound { .. }
                | ForgeError::DuplicateClass(_)
                | ForgeError::DuplicateAttribute { .. }
                | ForgeError::DuplicateEnum(_)
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ForgeError::ClassNotFound(_)
                | ForgeError::AttributeNotFound { .. }
                | ForgeError::NodeNotFound(_)
                | ForgeError::EnumNotFound(_)
                | ForgeError::ProjectNotFound(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            ForgeError::Io(_)
                | ForgeError::FileRead { .. }
                | ForgeError::FileWrite { .. }
                | ForgeError::DirectoryCreate { .. }
        )
    }
}

/// Result type alias using ForgeError
pub type ForgeResult<T> = Result<T, ForgeError>;

// ============================================================================
// Tests
// ============================================================================
