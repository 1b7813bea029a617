//! Enumerated types shared across a project
//!
//! Attributes of type `ENUM` reference an `EnumType` by name; the registry
//! owns the definitions.

use forge_core::{ForgeError, ForgeResult, Validatable};
use serde::{Deserialize, Serialize};

// ============================================================================
// EnumValue / EnumType
// ============================================================================

/// One key/value pair of an enum
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnumValue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl EnumValue {
    /// Create a new pair
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Both key and value are filled in
    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }
}

/// A named enumeration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValue>,
}

impl EnumType {
    /// Create an enum with no values
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Add a value pair
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push(EnumValue::new(key, value));
        self
    }

    /// Drop pairs with an empty key or an empty value
    pub fn retain_complete(&mut self) {
        self.values.retain(EnumValue::is_complete);
    }
}

impl Validatable for EnumType {
    fn validate(&self) -> ForgeResult<()> {
        if self.name.is_empty() {
            return Err(ForgeError::validation("Enum name is required"));
        }
        Ok(())
    }
}

// ============================================================================
// EnumRegistry
// ============================================================================

/// Ordered set of the project's enums, unique by name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumRegistry {
    enums: Vec<EnumType>,
}

impl EnumRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from an existing list
    pub fn from_enums(enums: Vec<EnumType>) -> Self {
        Self { enums }
    }

    /// Look up an enum by name
    pub fn get(&self, name: &str) -> Option<&EnumType> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Check if an enum with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Append an enum
    pub fn push(&mut self, enum_type: EnumType) {
        self.enums.push(enum_type);
    }

    /// Replace the enum currently named `original`
    pub fn replace(&mut self, original: &str, enum_type: EnumType) -> ForgeResult<()> {
        let slot = self
            .enums
            .iter_mut()
            .find(|e| e.name == original)
            .ok_or_else(|| ForgeError::EnumNotFound(original.to_string()))?;
        *slot = enum_type;
        Ok(())
    }

    /// Remove an enum by name
    pub fn remove(&mut self, name: &str) -> Option<EnumType> {
        let index = self.enums.iter().position(|e| e.name == name)?;
        Some(self.enums.remove(index))
    }

    /// All enums, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &EnumType> {
        self.enums.iter()
    }

    /// Enum names, in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.enums.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
