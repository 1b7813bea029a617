//! Focus requests for the diagram view

use forge_core::{Position, Size};
use forge_ir::ClassNode;
use serde::{Deserialize, Serialize};

/// Zoom and animation length used when focusing a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusOptions {
    pub zoom: f32,
    pub duration_ms: u32,
}

impl Default for FocusOptions {
    fn default() -> Self {
        Self {
            zoom: 1.2,
            duration_ms: 600,
        }
    }
}

impl FocusOptions {
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// A request for the renderer to move the view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewTransition {
    pub center: Position,
    pub zoom: f32,
    pub duration_ms: u32,
}

/// Center the view on a node
///
/// Nodes that were never measured use `fallback` for their size.
pub fn focus_on(node: &ClassNode, fallback: Size, options: FocusOptions) -> ViewTransition {
    ViewTransition {
        center: node.bounds(fallback).center(),
        zoom: options.zoom,
        duration_ms: options.duration_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::NodeId;
    use forge_ir::ClassData;

    #[test]
    fn test_focus_uses_fallback_size() {
        let node = ClassNode::new(NodeId::new("a"), Position::new(100.0, 50.0), ClassData::new("A"));
        let transition = focus_on(&node, Size::default_node(), FocusOptions::default());

        assert_eq!(transition.center, Position::new(200.0, 110.0));
        assert_eq!(transition.zoom, 1.2);
        assert_eq!(transition.duration_ms, 600);
    }

    #[test]
    fn test_focus_uses_measured_size() {
        let mut node = ClassNode::new(NodeId::new("a"), Position::zero(), ClassData::new("A"));
        node.width = Some(300.0);
        node.height = Some(80.0);

        let options = FocusOptions::default().with_zoom(2.0).with_duration(0);
        let transition = focus_on(&node, Size::default_node(), options);
        assert_eq!(transition.center, Position::new(150.0, 40.0));
        assert_eq!(transition.zoom, 2.0);
        assert_eq!(transition.duration_ms, 0);
    }
}
