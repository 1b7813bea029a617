//! Class list and search

use forge_core::{NodeId, Position, Size};
use forge_ir::{ClassNode, ClassRegistry};
use serde::Serialize;

/// One row of the class list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub id: NodeId,
    /// Display name (`Untitled` for unnamed classes)
    pub name: String,
    pub attribute_count: usize,
    pub position: Position,
    pub size: Option<Size>,
}

impl ClassSummary {
    pub fn from_node(node: &ClassNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.data.display_name().to_string(),
            attribute_count: node.data.attributes.len(),
            position: node.position,
            size: node.measured_size(),
        }
    }
}

/// All classes sorted by name, case-insensitively
///
/// Ties fall back to the exact name, then the id, so the order never depends
/// on insertion order.
pub fn sorted_summaries(registry: &ClassRegistry) -> Vec<ClassSummary> {
    let mut summaries: Vec<ClassSummary> = registry.iter().map(ClassSummary::from_node).collect();
    summaries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    summaries
}

/// Sorted classes whose name contains `query`, ignoring case
pub fn search_classes(registry: &ClassRegistry, query: &str) -> Vec<ClassSummary> {
    let needle = query.trim().to_lowercase();
    sorted_summaries(registry)
        .into_iter()
        .filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
        .collect()
}
