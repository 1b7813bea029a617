//! Core types used throughout SchemaForge
//!
//! This module contains the fundamental types shared by the model, the
//! editor session and the API client: node identifiers, canvas geometry
//! and the column data types a class attribute can take.

use crate::error::{ForgeError, ForgeResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Unique Identifiers
// ============================================================================

/// Opaque identifier of a diagram node
///
/// Ids loaded from a project are kept verbatim (older projects use
/// timestamp strings). Fresh ids are UUID v4 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an existing id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, collision-resistant id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// Geometry Types
// ============================================================================

/// Position on the 2D canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Create a new position
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Create a position at the origin (0, 0)
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::zero()
    }
}

/// Size of a node on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size assumed for a class node whose layout has not been measured yet
    pub fn default_node() -> Self {
        Self {
            width: 200.0,
            height: 120.0,
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::default_node()
    }
}

/// Bounding rectangle of a node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub position: Position,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(position: Position, size: Size) -> Self {
        Self { position, size }
    }

    /// Get the center point of the rectangle
    pub fn center(&self) -> Position {
        Position {
            x: self.position.x + self.size.width / 2.0,
            y: self.position.y + self.size.height / 2.0,
        }
    }
}

// ============================================================================
// Data Types
// ============================================================================

/// Column types an attribute can take
///
/// Serialized as the MySQL spelling the backend expects (`"VARCHAR(255)"`,
/// `"DECIMAL(10,2)"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    Int,
    #[default]
    Varchar,
    Text,
    Date,
    DateTime,
    Timestamp,
    Decimal,
    Boolean,
    Blob,
    Json,
    /// References a named enum from the project's enum registry
    Enum,
}

impl DataType {
    /// All supported types, in the order the type picker lists them
    pub fn all() -> &'static [DataType] {
        &[
            DataType::Int,
            DataType::Varchar,
            DataType::Text,
            DataType::Date,
            DataType::DateTime,
            DataType::Timestamp,
            DataType::Decimal,
            DataType::Boolean,
            DataType::Blob,
            DataType::Json,
            DataType::Enum,
        ]
    }

    /// SQL spelling of the type
    pub fn as_sql(&self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Varchar => "VARCHAR(255)",
            DataType::Text => "TEXT",
            DataType::Date => "DATE",
            DataType::DateTime => "DATETIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Decimal => "DECIMAL(10,2)",
            DataType::Boolean => "BOOLEAN",
            DataType::Blob => "BLOB",
            DataType::Json => "JSON",
            DataType::Enum => "ENUM",
        }
    }

    /// Check if this is the enum type
    pub fn is_enum(&self) -> bool {
        matches!(self, DataType::Enum)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for DataType {
    type Err = ForgeError;

    fn from_str(s: &str) -> ForgeResult<Self> {
        DataType::all()
            .iter()
            .copied()
            .find(|t| t.as_sql() == s)
            .ok_or_else(|| ForgeError::validation(format!("Unsupported data type '{}'", s)))
    }
}

impl TryFrom<String> for DataType {
    type Error = ForgeError;

    fn try_from(value: String) -> ForgeResult<Self> {
        value.parse()
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.as_sql().to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rect_center() {
        let rect = Rect::new(Position::new(100.0, 50.0), Size::new(200.0, 120.0));
        assert_eq!(rect.center(), Position::new(200.0, 110.0));
    }

    #[test]
    fn test_default_node_size() {
        assert_eq!(Size::default(), Size::new(200.0, 120.0));
    }

    #[test]
    fn test_data_type_sql_spelling() {
        assert_eq!(DataType::Varchar.to_string(), "VARCHAR(255)");
        assert_eq!(DataType::Decimal.to_string(), "DECIMAL(10,2)");
        assert_eq!("ENUM".parse::<DataType>().unwrap(), DataType::Enum);
        assert_eq!(DataType::all().len(), 11);
    }

    #[test]
    fn test_data_type_rejects_unknown() {
        let err = "VARCHAR(64)".parse::<DataType>().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_data_type_serde() {
        let json = serde_json::to_string(&DataType::DateTime).unwrap();
        assert_eq!(json, "\"DATETIME\"");

        let parsed: DataType = serde_json::from_str("\"BOOLEAN\"").unwrap();
        assert_eq!(parsed, DataType::Boolean);
        assert!(serde_json::from_str::<DataType>("\"UUID\"").is_err());
    }

    #[test]
    fn test_node_id_generation_is_unique() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert_ne!(a, b);
        assert_eq!(NodeId::from("1712345678").as_str(), "1712345678");
    }

    #[test]
    fn test_node_id_is_transparent_string() {
        let id = NodeId::new("42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
    }
}
