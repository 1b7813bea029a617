//! Relationship edges derived from foreign-key attributes
//!
//! Edges are never authored directly. `derive_edges` computes them from the
//! class registry: one edge per foreign-key attribute whose target class and
//! target attribute both exist. Unresolvable declarations are reported as
//! `DerivationIssue`s and produce no edge.

use crate::attribute::{Attribute, handle_for};
use crate::class::{ClassNode, ClassRegistry};
use forge_core::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::warn;

// ============================================================================
// Edge
// ============================================================================

/// A relationship edge between two class nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Deterministic id: `edge-{source}-{target}-{attribute}`
    pub id: String,

    /// Node holding the foreign-key attribute
    pub source: NodeId,

    /// Node being referenced
    pub target: NodeId,

    /// Attribute-scoped anchor on the source node (`fk-{attribute}`)
    #[serde(rename = "sourceHandle")]
    pub source_handle: String,

    #[serde(
        rename = "targetHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_handle: Option<String>,

    /// `Class.attr → TargetClass.targetAttr`
    #[serde(default)]
    pub label: String,
}

impl Edge {
    /// Build the edge for a resolved foreign key
    pub fn for_foreign_key(source: &ClassNode, attribute: &Attribute, target: &ClassNode) -> Self {
        let target_attribute = attribute.foreign_key.as_deref().unwrap_or_default();
        Self {
            id: edge_id(&source.id, &target.id, &attribute.name),
            source: source.id.clone(),
            target: target.id.clone(),
            source_handle: handle_for(&attribute.name),
            target_handle: None,
            label: format!(
                "{}.{} → {}.{}",
                source.data.name, attribute.name, target.data.name, target_attribute
            ),
        }
    }

    /// Check if a node is either end of this edge
    pub fn involves(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    /// Check if the edge is anchored on `handle` of node `source`
    pub fn is_anchored_on(&self, source: &NodeId, handle: &str) -> bool {
        &self.source == source && self.source_handle == handle
    }
}

/// Deterministic edge id for a (source, target, attribute) triple
pub fn edge_id(source: &NodeId, target: &NodeId, attribute: &str) -> String {
    format!("edge-{}-{}-{}", source, target, attribute)
}

// ============================================================================
// Derivation
// ============================================================================

/// Why a foreign-key declaration produced no edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivationIssue {
    /// No class with the referenced name exists
    TargetClassNotFound {
        source_class: String,
        attribute: String,
        target_class: String,
    },
    /// The referenced class has no attribute with the referenced name
    TargetAttributeNotFound {
        source_class: String,
        attribute: String,
        target_class: String,
        target_attribute: String,
    },
}

impl DerivationIssue {
    /// `Class.attr` of the offending attribute
    pub fn location(&self) -> String {
        match self {
            DerivationIssue::TargetClassNotFound {
                source_class,
                attribute,
                ..
            }
            | DerivationIssue::TargetAttributeNotFound {
                source_class,
                attribute,
                ..
            } => format!("{}.{}", source_class, attribute),
        }
    }
}

impl std::fmt::Display for DerivationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DerivationIssue::TargetClassNotFound { target_class, .. } => {
                write!(f, "Target class \"{}\" not found", target_class)
            }
            DerivationIssue::TargetAttributeNotFound {
                target_class,
                target_attribute,
                ..
            } => write!(
                f,
                "Attribute \"{}\" not found in \"{}\"",
                target_attribute, target_class
            ),
        }
    }
}

/// Result of one derivation pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Derivation {
    /// Edges in registry order (nodes, then attributes)
    pub edges: Vec<Edge>,
    /// Foreign keys that could not be resolved
    pub issues: Vec<DerivationIssue>,
}

impl Derivation {
    /// Check if an edge with this id was derived
    pub fn has_edge(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.id == id)
    }
}

/// Compute the edge set implied by the registry's foreign-key attributes
///
/// Pure and idempotent: the same registry always yields the same edges in
/// the same order.
pub fn derive_edges(registry: &ClassRegistry) -> Derivation {
    let mut derivation = Derivation::default();
    let mut seen_ids = HashSet::new();
    let mut seen_anchors = HashSet::new();

    for source in registry.iter() {
        for attribute in source.data.attributes.iter().filter(|a| a.declares_foreign_key()) {
            match resolve(registry, source, attribute) {
                Ok(target) => {
                    let edge = Edge::for_foreign_key(source, attribute, target);
                    let anchor = (
                        edge.source.clone(),
                        edge.target.clone(),
                        edge.source_handle.clone(),
                    );
                    if seen_ids.contains(&edge.id) || seen_anchors.contains(&anchor) {
                        continue;
                    }
                    seen_ids.insert(edge.id.clone());
                    seen_anchors.insert(anchor);
                    derivation.edges.push(edge);
                }
                Err(issue) => {
                    warn!("{}: {}", issue.location(), issue);
                    derivation.issues.push(issue);
                }
            }
        }
    }

    derivation
}

fn resolve<'a>(
    registry: &'a ClassRegistry,
    source: &ClassNode,
    attribute: &Attribute,
) -> Result<&'a ClassNode, DerivationIssue> {
    let target_class = attribute.foreign_key_class.as_deref().unwrap_or_default();
    let target = registry
        .find_by_name(target_class)
        .ok_or_else(|| DerivationIssue::TargetClassNotFound {
            source_class: source.data.name.clone(),
            attribute: attribute.name.clone(),
            target_class: target_class.to_string(),
        })?;

    let target_attribute = attribute.foreign_key.as_deref().unwrap_or_default();
    if !target.data.has_attribute(target_attribute) {
        return Err(DerivationIssue::TargetAttributeNotFound {
            source_class: source.data.name.clone(),
            attribute: attribute.name.clone(),
            target_class: target_class.to_string(),
            target_attribute: target_attribute.to_string(),
        });
    }

    Ok(target)
}

/// Hash of everything derivation depends on
///
/// Positions and sizes are excluded: moving a node never changes its edges.
pub fn fingerprint(registry: &ClassRegistry) -> u64 {
    let mut hasher = DefaultHasher::new();
    for node in registry.iter() {
        node.id.hash(&mut hasher);
        node.data.name.hash(&mut hasher);
        for attribute in &node.data.attributes {
            attribute.name.hash(&mut hasher);
            attribute.is_foreign.hash(&mut hasher);
            attribute.foreign_key_class.hash(&mut hasher);
            attribute.foreign_key.hash(&mut hasher);
        }
        // Separates "A has x" from "A, then a class starting with x"
        usize::MAX.hash(&mut hasher);
    }
    hasher.finish()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassData;
    use forge_core::{DataType, Position};
    use pretty_assertions::assert_eq;

    fn shop() -> ClassRegistry {
        let user = ClassData::new("User")
            .with_attribute(Attribute::primary_key("id"))
            .with_attribute(Attribute::new("name", DataType::Varchar));
        let order = ClassData::new("Order")
            .with_attribute(Attribute::primary_key("id"))
            .with_attribute(Attribute::foreign_key("user_id", "User", "id"));

        ClassRegistry::from_nodes(vec![
            ClassNode::new(NodeId::new("u"), Position::zero(), user),
            ClassNode::new(NodeId::new("o"), Position::new(300.0, 0.0), order),
        ])
    }

    #[test]
    fn test_single_foreign_key_edge() {
        let derivation = derive_edges(&shop());

        assert!(derivation.issues.is_empty());
        assert_eq!(derivation.edges.len(), 1);

        let edge = &derivation.edges[0];
        assert_eq!(edge.id, "edge-o-u-user_id");
        assert_eq!(edge.source, NodeId::new("o"));
        assert_eq!(edge.target, NodeId::new("u"));
        assert_eq!(edge.source_handle, "fk-user_id");
        assert_eq!(edge.label, "Order.user_id → User.id");
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let registry = shop();
        let first = derive_edges(&registry);
        let second = derive_edges(&registry);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_target_attribute_drops_edge() {
        let mut registry = shop();
        let order = registry.get_mut(&NodeId::new("o")).unwrap();
        order.data.attributes[1].foreign_key = Some("uuid".to_string());

        let derivation = derive_edges(&registry);
        assert!(derivation.edges.is_empty());
        assert_eq!(
            derivation.issues,
            vec![DerivationIssue::TargetAttributeNotFound {
                source_class: "Order".to_string(),
                attribute: "user_id".to_string(),
                target_class: "User".to_string(),
                target_attribute: "uuid".to_string(),
            }]
        );
        assert_eq!(
            derivation.issues[0].to_string(),
            "Attribute \"uuid\" not found in \"User\""
        );
    }

    #[test]
    fn test_missing_target_class_is_non_fatal() {
        let mut registry = shop();
        let invoice = ClassData::new("Invoice")
            .with_attribute(Attribute::primary_key("id"))
            .with_attribute(Attribute::foreign_key("customer_id", "Customer", "id"))
            .with_attribute(Attribute::foreign_key("order_id", "Order", "id"));
        registry.insert(ClassNode::new(NodeId::new("i"), Position::zero(), invoice));

        let derivation = derive_edges(&registry);
        assert_eq!(derivation.edges.len(), 2);
        assert!(derivation.has_edge("edge-i-o-order_id"));
        assert_eq!(derivation.issues.len(), 1);
        assert_eq!(derivation.issues[0].location(), "Invoice.customer_id");
    }

    #[test]
    fn test_foreign_flag_without_class_is_ignored() {
        let mut attr = Attribute::new("ref", DataType::Int);
        attr.is_foreign = true;
        let registry = ClassRegistry::from_nodes(vec![ClassNode::new(
            NodeId::new("a"),
            Position::zero(),
            ClassData::new("A").with_attribute(attr),
        )]);

        let derivation = derive_edges(&registry);
        assert!(derivation.edges.is_empty());
        assert!(derivation.issues.is_empty());
    }

    #[test]
    fn test_self_reference() {
        let category = ClassData::new("Category")
            .with_attribute(Attribute::primary_key("id"))
            .with_attribute(Attribute::foreign_key("parent_id", "Category", "id"));
        let registry = ClassRegistry::from_nodes(vec![ClassNode::new(
            NodeId::new("c"),
            Position::zero(),
            category,
        )]);

        let derivation = derive_edges(&registry);
        assert_eq!(derivation.edges.len(), 1);
        assert_eq!(derivation.edges[0].source, derivation.edges[0].target);
    }

    #[test]
    fn test_duplicate_anchor_suppressed() {
        let mut registry = shop();
        let order = registry.get_mut(&NodeId::new("o")).unwrap();
        order
            .data
            .attributes
            .push(Attribute::foreign_key("user_id", "User", "name"));

        let derivation = derive_edges(&registry);
        assert_eq!(derivation.edges.len(), 1);
        assert_eq!(derivation.edges[0].label, "Order.user_id → User.id");
    }

    #[test]
    fn test_fingerprint_ignores_layout() {
        let mut registry = shop();
        let before = fingerprint(&registry);

        registry.get_mut(&NodeId::new("u")).unwrap().position = Position::new(999.0, 1.0);
        assert_eq!(fingerprint(&registry), before);

        registry.get_mut(&NodeId::new("o")).unwrap().data.attributes[1].foreign_key =
            Some("name".to_string());
        assert_ne!(fingerprint(&registry), before);
    }

    #[test]
    fn test_edge_wire_format() {
        let edge = derive_edges(&shop()).edges.remove(0);
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["sourceHandle"], "fk-user_id");
        assert!(json.get("targetHandle").is_none());

        let back: Edge = serde_json::from_value(json).unwrap();
        assert_eq!(back, edge);
    }
}
