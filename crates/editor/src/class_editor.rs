//! Class editor
//!
//! Holds a scratch `{name, attributes}` copy. The registry only sees it on
//! `commit`, and an edit replaces the node's data wholesale.

use crate::draft::{Draft, EditorMode};
use forge_core::{ForgeError, ForgeResult, NodeId, Position};
use forge_ir::{ClassData, ClassNode, ClassRegistry};
use tracing::debug;

/// Outcome of a successful class commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCommit {
    pub id: NodeId,
    pub name: String,
    pub created: bool,
}

/// Draft state for one class
#[derive(Debug, Clone, Default)]
pub struct ClassEditor {
    draft: Draft<ClassData, NodeId>,
    /// Where a created class will be placed
    position: Position,
}

impl ClassEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &EditorMode<NodeId> {
        self.draft.mode()
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_open()
    }

    pub fn draft(&self) -> &ClassData {
        self.draft.value()
    }

    /// Mutable draft, for attribute operations
    pub fn draft_mut(&mut self) -> ForgeResult<&mut ClassData> {
        if self.draft.is_open() {
            Ok(self.draft.value_mut())
        } else {
            Err(ForgeError::editor_state("No class is being edited"))
        }
    }

    /// Node being edited, if any
    pub fn editing(&self) -> Option<&NodeId> {
        self.draft.mode().editing()
    }

    /// Start a new class that will be placed at `position`
    pub fn begin_create(&mut self, position: Position) {
        self.draft.open_create(ClassData::default());
        self.position = position;
        debug!("Class editor: creating at ({}, {})", position.x, position.y);
    }

    /// Start editing a copy of the class on node `id`
    pub fn begin_edit(&mut self, registry: &ClassRegistry, id: &NodeId) -> ForgeResult<()> {
        let node = registry
            .get(id)
            .ok_or_else(|| ForgeError::NodeNotFound(id.to_string()))?;
        self.draft.open_edit(id.clone(), node.data.clone());
        self.position = node.position;
        debug!("Class editor: editing '{}'", node.data.name);
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ForgeResult<()> {
        self.draft_mut()?.name = name.into();
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.draft.close();
    }

    /// Validate the draft and write it to the registry
    pub fn commit(&mut self, registry: &mut ClassRegistry) -> ForgeResult<ClassCommit> {
        if !self.draft.is_open() {
            return Err(ForgeError::editor_state("No class is being edited"));
        }

        let mut data = self.draft.value().clone();
        data.name = data.name.trim().to_string();

        if data.name.is_empty() {
            return Err(ForgeError::class_validation("", "Class name is required"));
        }
        if data.attributes.is_empty() {
            return Err(ForgeError::class_validation(
                &data.name,
                "At least one column is required",
            ));
        }

        let editing = self.draft.mode().editing();
        let taken = registry
            .iter()
            .any(|node| Some(&node.id) != editing && node.data.name == data.name);
        if taken {
            return Err(ForgeError::DuplicateClass(data.name));
        }

        let name = data.name.clone();
        let commit = match editing {
            Some(id) => {
                registry.replace_data(id, data)?;
                ClassCommit {
                    id: id.clone(),
                    name,
                    created: false,
                }
            }
            None => {
                let id = NodeId::generate();
                registry.insert(ClassNode::new(id.clone(), self.position, data));
                ClassCommit {
                    id,
                    name,
                    created: true,
                }
            }
        };

        debug!("Class '{}' committed", commit.name);
        self.cancel();
        Ok(commit)
    }
}

/// `Class_{n+1}` for a registry of n classes, bumped past taken names
pub fn generated_class_name(registry: &ClassRegistry) -> String {
    let mut n = registry.len() + 1;
    loop {
        let name = format!("Class_{}", n);
        if registry.find_by_name(&name).is_none() {
            return name;
        }
        n += 1;
    }
}
