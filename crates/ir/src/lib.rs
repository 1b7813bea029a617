//! # Forge IR
//!
//! The model behind a SchemaForge diagram.
//!
//! ## Core Concepts
//!
//! - **Attribute**: A column of a class (`is_primary`, `is_foreign`, enum reference, ...)
//! - **ClassNode**: A class placed on the diagram, held in a `ClassRegistry`
//! - **EnumType**: A named enumeration, held in an `EnumRegistry`
//! - **Edge**: A relationship line, always derived from foreign-key attributes
//! - **Project**: The backend record carrying configuration and a `DiagramSnapshot`
//!

mod serde_helpers;

pub mod attribute;
pub mod class;
pub mod enums;
pub mod project;
pub mod relationship;
pub mod serialization;
pub mod validation;

// Re-export commonly used types at crate root
pub use attribute::{Attribute, AttributeChange, handle_for, parse_reference, split_reference};
pub use class::{CLASS_NODE_TYPE, ClassData, ClassNode, ClassRegistry, retarget_enum_in};
pub use enums::{EnumRegistry, EnumType, EnumValue};
pub use project::{
    DiagramExport, DiagramSnapshot, MigrationPayload, MigrationRequest, OtherConfig, Project,
    ProjectConfig, ProjectId,
};
pub use relationship::{Derivation, DerivationIssue, Edge, derive_edges, edge_id, fingerprint};
pub use serialization::{
    DiagramFile, EXPORT_FILE_NAME, export_diagram, load_diagram_export, load_project_file,
    open_diagram_file, save_project_file,
};
pub use validation::{ValidationResult, ValidationRule, Validator};

// Re-export core types that are commonly used with IR
pub use forge_core::{DataType, ForgeError, ForgeResult, NodeId, Position, Rect, Size, Validatable};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        // Model
        Attribute,
        AttributeChange,
        ClassData,
        ClassNode,
        ClassRegistry,
        // Re-exported from core
        DataType,
        DiagramSnapshot,
        Edge,
        EnumRegistry,
        EnumType,
        ForgeError,
        ForgeResult,
        NodeId,
        Position,
        Project,
        Size,
        Validatable,
        // Derivation
        derive_edges,
    };
}
