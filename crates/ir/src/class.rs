//! Class definitions and the class registry
//!
//! A `ClassData` is the semantic definition of a table (name plus ordered
//! attributes). A `ClassNode` places it on the diagram under an opaque
//! `NodeId`. The `ClassRegistry` is the ordered set of nodes of a project.

use crate::attribute::Attribute;
use forge_core::{ForgeError, ForgeResult, NodeId, Position, Rect, Size, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Node type tag the diagram renderer uses for class nodes
pub const CLASS_NODE_TYPE: &str = "classNode";

// ============================================================================
// ClassData
// ============================================================================

/// An entity definition: a name and its ordered attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassData {
    /// Class name, unique across the project
    #[serde(default)]
    pub name: String,

    /// Attributes in display order
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl ClassData {
    /// Create a class with no attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Add an attribute using builder pattern
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Get an attribute by name
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check if the class has an attribute with this exact name
    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Name shown in lists; unnamed classes show as `Untitled`
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Untitled"
        } else {
            &self.name
        }
    }
}

impl Validatable for ClassData {
    fn validate(&self) -> ForgeResult<()> {
        if self.name.is_empty() {
            return Err(ForgeError::validation("Class name is required"));
        }

        if self.attributes.is_empty() {
            return Err(ForgeError::class_validation(
                &self.name,
                "At least one column is required",
            ));
        }

        for attribute in &self.attributes {
            attribute.validate().map_err(|e| {
                ForgeError::attribute_validation(&self.name, &attribute.name, e.to_string())
            })?;
        }

        let mut names = HashSet::new();
        for attribute in &self.attributes {
            if !names.insert(attribute.name.as_str()) {
                return Err(ForgeError::DuplicateAttribute {
                    class: self.name.clone(),
                    attribute: attribute.name.clone(),
                });
            }
        }

        Ok(())
    }
}

// ============================================================================
// ClassNode
// ============================================================================

/// A class placed on the diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassNode {
    /// Diagram identity (distinct from the class name)
    pub id: NodeId,

    /// Renderer node type
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,

    #[serde(default)]
    pub position: Position,

    #[serde(default)]
    pub data: ClassData,

    /// Measured width, once the renderer has laid the node out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,

    /// Measured height, once the renderer has laid the node out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,

    /// Renderer fields this crate does not interpret, kept for round trips
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ClassNode {
    /// Create a node at a position
    pub fn new(id: NodeId, position: Position, data: ClassData) -> Self {
        Self {
            id,
            node_type: default_node_type(),
            position,
            data,
            width: None,
            height: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Measured size, if the renderer reported one
    pub fn measured_size(&self) -> Option<Size> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some(Size::new(width, height)),
            _ => None,
        }
    }

    /// Bounding rectangle, using `fallback` for unmeasured nodes
    pub fn bounds(&self, fallback: Size) -> Rect {
        Rect::new(self.position, self.measured_size().unwrap_or(fallback))
    }
}

fn default_node_type() -> String {
    CLASS_NODE_TYPE.to_string()
}

// ============================================================================
// ClassRegistry
// ============================================================================

/// The ordered set of class nodes of one project
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassRegistry {
    nodes: Vec<ClassNode>,
}

impl ClassRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from existing nodes
    pub fn from_nodes(nodes: Vec<ClassNode>) -> Self {
        Self { nodes }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Get a node by id
    pub fn get(&self, id: &NodeId) -> Option<&ClassNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Get a mutable node by id
    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut ClassNode> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    /// Check if a node with this id exists
    pub fn contains(&self, id: &NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Find a node by exact class name (foreign-key resolution key)
    pub fn find_by_name(&self, name: &str) -> Option<&ClassNode> {
        self.nodes.iter().find(|n| n.data.name == name)
    }

    /// All nodes in diagram insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ClassNode> {
        self.nodes.iter()
    }

    /// Mutable access to all nodes
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClassNode> {
        self.nodes.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Append a node
    pub fn insert(&mut self, node: ClassNode) {
        self.nodes.push(node);
    }

    /// Remove a node by id
    pub fn remove(&mut self, id: &NodeId) -> Option<ClassNode> {
        let index = self.nodes.iter().position(|n| &n.id == id)?;
        Some(self.nodes.remove(index))
    }

    /// Replace a node's class data wholesale
    pub fn replace_data(&mut self, id: &NodeId, data: ClassData) -> ForgeResult<()> {
        let node = self
            .get_mut(id)
            .ok_or_else(|| ForgeError::NodeNotFound(id.to_string()))?;
        node.data = data;
        Ok(())
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Flattened class model, one entry per node
    pub fn class_model(&self) -> Vec<ClassData> {
        self.nodes.iter().map(|n| n.data.clone()).collect()
    }

    /// `Class.attr` of every attribute referencing the enum `name`
    pub fn enum_users(&self, name: &str) -> Vec<String> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.data
                    .attributes
                    .iter()
                    .filter(move |a| a.enum_name.as_deref() == Some(name))
                    .map(move |a| format!("{}.{}", node.data.name, a.name))
            })
            .collect()
    }

    /// Point every reference to enum `from` at `to` (or clear it when `to` is `None`)
    ///
    /// Returns the number of attributes changed.
    pub fn retarget_enum(&mut self, from: &str, to: Option<&str>) -> usize {
        self.nodes
            .iter_mut()
            .map(|node| retarget_enum_in(&mut node.data, from, to))
            .sum()
    }
}

/// Retarget enum references inside one class (also used on class drafts)
pub fn retarget_enum_in(class: &mut ClassData, from: &str, to: Option<&str>) -> usize {
    let mut changed = 0;
    for attribute in &mut class.attributes {
        if attribute.enum_name.as_deref() == Some(from) {
            attribute.enum_name = to.map(str::to_string);
            changed += 1;
        }
    }
    changed
}

// ============================================================================
// Tests
// ============================================================================
