//! Attribute definitions for class columns
//!
//! This module contains the `Attribute` struct (one column of a class) and
//! `AttributeChange`, the single-field edits the attribute editor applies
//! to a draft.

use crate::enums::EnumRegistry;
use crate::serde_helpers::empty_as_none;
use forge_core::{DataType, ForgeError, ForgeResult, Validatable};
use serde::{Deserialize, Serialize};

/// Separator between class and attribute in a composed reference
pub const REFERENCE_SEPARATOR: char = '.';

// ============================================================================
// Attribute
// ============================================================================

/// A single column of a class
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attribute {
    /// Column name, unique within the owning class
    pub name: String,

    /// Column type
    #[serde(rename = "type", default)]
    pub data_type: DataType,

    /// Optional explicit length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    #[serde(default)]
    pub is_primary: bool,

    #[serde(default)]
    pub is_foreign: bool,

    /// Name of the referenced class (when `is_foreign`)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub foreign_key_class: Option<String>,

    /// Name of the referenced attribute on `foreign_key_class`
    #[serde(default, deserialize_with = "empty_as_none")]
    pub foreign_key: Option<String>,

    #[serde(default)]
    pub is_unique: bool,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default)]
    pub is_indexed: bool,

    #[serde(default)]
    pub is_auto_increment: bool,

    /// Name of the ORM relation generated for this foreign key
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub relation_name: Option<String>,

    /// Enum referenced by name when the type is `ENUM`
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub enum_name: Option<String>,
}

impl Attribute {
    /// Create a new attribute with the given name and type
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            ..Self::default()
        }
    }

    /// Create an auto-incrementing integer primary key
    pub fn primary_key(name: impl Into<String>) -> Self {
        Self {
            is_primary: true,
            is_required: true,
            is_auto_increment: true,
            ..Self::new(name, DataType::Int)
        }
    }

    /// Create a foreign key attribute referencing `class.attribute`
    pub fn foreign_key(
        name: impl Into<String>,
        target_class: impl Into<String>,
        target_attribute: impl Into<String>,
    ) -> Self {
        Self {
            is_foreign: true,
            foreign_key_class: Some(target_class.into()),
            foreign_key: Some(target_attribute.into()),
            ..Self::new(name, DataType::Int)
        }
    }

    /// Create an enum-typed attribute
    pub fn enumeration(name: impl Into<String>, enum_name: impl Into<String>) -> Self {
        Self {
            enum_name: Some(enum_name.into()),
            ..Self::new(name, DataType::Enum)
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the attribute as required
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Mark the attribute as unique
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Mark the attribute as indexed
    pub fn indexed(mut self) -> Self {
        self.is_indexed = true;
        self
    }

    /// Set the relation name
    pub fn with_relation_name(mut self, relation_name: impl Into<String>) -> Self {
        self.relation_name = Some(relation_name.into());
        self
    }

    /// Set an explicit length
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Apply a single-field change, keeping the key flags consistent
    pub fn apply(&mut self, change: AttributeChange) {
        match change {
            AttributeChange::Name(name) => self.name = name,
            AttributeChange::Type(data_type) => self.data_type = data_type,
            AttributeChange::Length(length) => self.length = length,
            AttributeChange::Primary(on) => {
                self.is_primary = on;
                if on {
                    self.is_foreign = false;
                    self.foreign_key_class = None;
                    self.foreign_key = None;
                }
            }
            AttributeChange::Foreign(on) => {
                self.is_foreign = on;
                if on {
                    self.is_primary = false;
                }
            }
            AttributeChange::Reference(reference) => {
                let (class, attribute) = split_reference(&reference);
                self.foreign_key_class = non_empty(class);
                self.foreign_key = non_empty(attribute);
            }
            AttributeChange::ForeignKeyClass(class) => self.foreign_key_class = non_empty(&class),
            AttributeChange::ForeignKey(attribute) => self.foreign_key = non_empty(&attribute),
            AttributeChange::Unique(on) => self.is_unique = on,
            AttributeChange::Required(on) => self.is_required = on,
            AttributeChange::Indexed(on) => self.is_indexed = on,
            AttributeChange::AutoIncrement(on) => self.is_auto_increment = on,
            AttributeChange::RelationName(name) => self.relation_name = non_empty(&name),
        }
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Whether this attribute declares a foreign key the deriver should resolve
    pub fn declares_foreign_key(&self) -> bool {
        self.is_foreign && self.foreign_key_class.is_some()
    }

    /// Composed `Class.attribute` reference as typed into the editor
    pub fn reference(&self) -> String {
        format!(
            "{}{}{}",
            self.foreign_key_class.as_deref().unwrap_or_default(),
            REFERENCE_SEPARATOR,
            self.foreign_key.as_deref().unwrap_or_default()
        )
    }

    /// Diagram handle the attribute's relationship edge is anchored on
    pub fn handle(&self) -> String {
        handle_for(&self.name)
    }

    /// Type label for display, tolerating dangling enum references
    pub fn type_label(&self, enums: &EnumRegistry) -> String {
        match (&self.data_type, &self.enum_name) {
            (DataType::Enum, Some(name)) if enums.contains(name) => format!("ENUM({})", name),
            (DataType::Enum, Some(name)) => format!("ENUM(?{})", name),
            (data_type, _) => data_type.to_string(),
        }
    }
}

impl Validatable for Attribute {
    fn validate(&self) -> ForgeResult<()> {
        if self.name.is_empty() {
            return Err(ForgeError::validation("Attribute name is required"));
        }

        if self.is_primary && self.is_foreign {
            return Err(ForgeError::validation(
                "An attribute cannot be both primary and foreign key",
            ));
        }

        if self.is_foreign && self.foreign_key_class.is_none() {
            return Err(ForgeError::validation("Foreign key reference is required"));
        }

        if self.data_type.is_enum() && self.enum_name.is_none() {
            return Err(ForgeError::validation("Enum type is required"));
        }

        Ok(())
    }
}

// ============================================================================
// AttributeChange
// ============================================================================

/// A single field edit applied to an attribute draft
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeChange {
    Name(String),
    Type(DataType),
    Length(Option<u32>),
    /// Setting primary clears the foreign-key flag and its reference
    Primary(bool),
    /// Setting foreign clears the primary flag
    Foreign(bool),
    /// Composed `Class.attribute` reference
    Reference(String),
    ForeignKeyClass(String),
    ForeignKey(String),
    Unique(bool),
    Required(bool),
    Indexed(bool),
    AutoIncrement(bool),
    RelationName(String),
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Handle id for the attribute named `name`
pub fn handle_for(name: &str) -> String {
    format!("fk-{}", name)
}

/// Split a composed reference on the first separator
///
/// Missing halves come back empty.
pub fn split_reference(reference: &str) -> (&str, &str) {
    reference
        .split_once(REFERENCE_SEPARATOR)
        .unwrap_or((reference, ""))
}

/// Split a composed reference, requiring both halves
pub fn parse_reference(reference: &str) -> ForgeResult<(&str, &str)> {
    match split_reference(reference) {
        (class, attribute) if !class.is_empty() && !attribute.is_empty() => {
            Ok((class, attribute))
        }
        _ => Err(ForgeError::InvalidReference(reference.to_string())),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// ============================================================================
// Tests
// ============================================================================
