//! The diagram editing session
//!
//! `DiagramSession` owns every piece of editor state for one project: the
//! committed registries, the derived edges, the three editors, the
//! highlight, search and notices. Every mutation goes through it, and after
//! each registry change it re-derives edges and re-checks the highlight
//! before returning, so callers never see the two out of step.

use crate::attribute_editor::{AttributeEditor, ReferenceScope, remove_attribute};
use crate::class_editor::{ClassCommit, ClassEditor, generated_class_name};
use crate::enum_editor::{EnumCommit, EnumDeletePolicy, EnumEditor};
use crate::notice::Notice;
use crate::search::{ClassSummary, search_classes};
use crate::viewport::{FocusOptions, ViewTransition, focus_on};
use forge_core::{ForgeError, ForgeResult, NodeId, Position, Size};
use forge_ir::{
    Attribute, AttributeChange, ClassNode, ClassRegistry, DerivationIssue, DiagramExport,
    DiagramSnapshot, Edge, EnumRegistry, EnumType, MigrationRequest, Project, derive_edges,
    fingerprint, retarget_enum_in,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, info, warn};

// ============================================================================
// Configuration
// ============================================================================

/// Behaviour knobs of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub enum_delete_policy: EnumDeletePolicy,
    pub focus: FocusOptions,
    /// Size assumed for nodes the renderer has not measured
    pub default_node_size: Size,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enum_delete_policy: EnumDeletePolicy::Forbid,
            focus: FocusOptions::default(),
            default_node_size: Size::default_node(),
        }
    }
}

impl SessionConfig {
    pub fn with_enum_delete_policy(mut self, policy: EnumDeletePolicy) -> Self {
        self.enum_delete_policy = policy;
        self
    }

    pub fn with_focus(mut self, focus: FocusOptions) -> Self {
        self.focus = focus;
        self
    }
}

// ============================================================================
// Persistence
// ============================================================================

/// Receives the diagram when the user saves
pub trait SaveHandler {
    fn save(&mut self, snapshot: &DiagramSnapshot) -> ForgeResult<()>;
}

impl<F> SaveHandler for F
where
    F: FnMut(&DiagramSnapshot) -> ForgeResult<()>,
{
    fn save(&mut self, snapshot: &DiagramSnapshot) -> ForgeResult<()> {
        self(snapshot)
    }
}

/// Busy flags for the two outbound operations
///
/// A second save may start while one is in flight; neither cancels the
/// other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistenceState {
    pub saving_diagram: bool,
    pub saving_migration: bool,
    pub last_error: Option<String>,
}

impl PersistenceState {
    pub fn begin_diagram_save(&mut self) {
        self.saving_diagram = true;
    }

    pub fn finish_diagram_save<E: Display>(&mut self, outcome: &Result<(), E>) {
        self.saving_diagram = false;
        self.record(outcome);
    }

    pub fn begin_migration(&mut self) {
        self.saving_migration = true;
    }

    pub fn finish_migration<E: Display>(&mut self, outcome: &Result<(), E>) {
        self.saving_migration = false;
        self.record(outcome);
    }

    pub fn is_busy(&self) -> bool {
        self.saving_diagram || self.saving_migration
    }

    fn record<E: Display>(&mut self, outcome: &Result<(), E>) {
        self.last_error = outcome.as_ref().err().map(|e| e.to_string());
    }
}

// ============================================================================
// DiagramSession
// ============================================================================

/// Editing state for one project's diagram
#[derive(Debug, Clone)]
pub struct DiagramSession {
    /// Project record; `nodes` and `class_model` are refreshed on export
    project: Project,
    classes: ClassRegistry,
    enums: EnumRegistry,

    edges: Vec<Edge>,
    issues: Vec<DerivationIssue>,
    /// Fingerprint `edges` were derived from; `None` forces re-derivation
    derived_from: Option<u64>,
    derivations: usize,
    /// `(node, handle)` anchors hidden while the class draft is open
    pruned: Vec<(NodeId, String)>,

    highlighted: Option<NodeId>,
    search_query: String,
    last_transition: Option<ViewTransition>,

    class_editor: ClassEditor,
    attribute_editor: AttributeEditor,
    enum_editor: EnumEditor,

    notices: Vec<Notice>,
    updated_classes: Vec<String>,
    persistence: PersistenceState,
    config: SessionConfig,
}

impl DiagramSession {
    /// Empty session for an unnamed project
    pub fn new(config: SessionConfig) -> Self {
        Self::from_project(Project::default(), config)
    }

    /// Open a project; stored edges are discarded and re-derived
    pub fn from_project(mut project: Project, config: SessionConfig) -> Self {
        let snapshot = std::mem::take(&mut project.nodes);
        let stored_edges = snapshot.edges.len();

        let mut session = Self {
            project,
            classes: snapshot.nodes,
            enums: snapshot.enums,
            edges: Vec::new(),
            issues: Vec::new(),
            derived_from: None,
            derivations: 0,
            pruned: Vec::new(),
            highlighted: None,
            search_query: String::new(),
            last_transition: None,
            class_editor: ClassEditor::new(),
            attribute_editor: AttributeEditor::new(),
            enum_editor: EnumEditor::new(),
            notices: Vec::new(),
            updated_classes: Vec::new(),
            persistence: PersistenceState::default(),
            config,
        };
        session.sync();

        if stored_edges != session.edges.len() {
            debug!(
                "Stored edge count {} differs from derived {}",
                stored_edges,
                session.edges.len()
            );
        }
        info!(
            "Opened '{}' with {} classes, {} enums",
            session.project.name,
            session.classes.len(),
            session.enums.len()
        );
        session
    }

    /// Open a bare diagram
    pub fn from_snapshot(snapshot: DiagramSnapshot, config: SessionConfig) -> Self {
        let project = Project {
            nodes: snapshot,
            ..Default::default()
        };
        Self::from_project(project, config)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn enums(&self) -> &EnumRegistry {
        &self.enums
    }

    /// Edges currently shown
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Foreign keys that produced no edge on the last derivation
    pub fn issues(&self) -> &[DerivationIssue] {
        &self.issues
    }

    /// Number of derivation passes actually run
    pub fn derivation_count(&self) -> usize {
        self.derivations
    }

    pub fn highlighted(&self) -> Option<&NodeId> {
        self.highlighted.as_ref()
    }

    pub fn last_transition(&self) -> Option<&ViewTransition> {
        self.last_transition.as_ref()
    }

    pub fn class_editor(&self) -> &ClassEditor {
        &self.class_editor
    }

    pub fn attribute_editor(&self) -> &AttributeEditor {
        &self.attribute_editor
    }

    pub fn enum_editor(&self) -> &EnumEditor {
        &self.enum_editor
    }

    /// Classes edited since the last successful migration
    pub fn updated_classes(&self) -> &[String] {
        &self.updated_classes
    }

    pub fn persistence(&self) -> &PersistenceState {
        &self.persistence
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Type label for display (`ENUM(?Name)` for dangling references)
    pub fn type_label(&self, attribute: &Attribute) -> String {
        attribute.type_label(&self.enums)
    }

    // ========================================================================
    // Class Editor
    // ========================================================================

    /// Open a new class draft placed at `position`
    pub fn begin_class_create(&mut self, position: Position) {
        self.attribute_editor.cancel();
        self.restore_edges();
        self.class_editor.begin_create(position);
    }

    /// Open a draft of an existing class and highlight it
    pub fn begin_class_edit(&mut self, id: &NodeId) -> ForgeResult<()> {
        self.attribute_editor.cancel();
        self.restore_edges();
        let result = self.class_editor.begin_edit(&self.classes, id);
        if result.is_ok() {
            self.highlighted = Some(id.clone());
        }
        self.report(result)
    }

    pub fn set_class_name(&mut self, name: impl Into<String>) -> ForgeResult<()> {
        let result = self.class_editor.set_name(name);
        self.report(result)
    }

    /// Fill the draft name with `Class_{n+1}`
    pub fn generate_class_name(&mut self) -> ForgeResult<String> {
        let name = generated_class_name(&self.classes);
        let result = self.class_editor.set_name(name.clone()).map(|_| name);
        self.report(result)
    }

    /// Commit the class draft
    pub fn commit_class(&mut self) -> ForgeResult<NodeId> {
        let result = self.class_editor.commit(&mut self.classes);
        let ClassCommit { id, name, created } = self.report(result)?;

        self.attribute_editor.cancel();
        if !created {
            self.mark_updated(name.clone());
        }
        self.restore_edges();
        self.sync();

        let verb = if created { "created" } else { "updated" };
        info!("Class '{}' {}", name, verb);
        self.notices
            .push(Notice::success(format!("Class '{}' {}", name, verb)));
        Ok(id)
    }

    /// Drop the class draft; pruned edges come back
    pub fn cancel_class(&mut self) {
        self.attribute_editor.cancel();
        self.class_editor.cancel();
        self.restore_edges();
    }

    /// Remove a class, its edges and any highlight of it
    pub fn delete_class(&mut self, id: &NodeId) -> ForgeResult<ClassNode> {
        let result = self
            .classes
            .remove(id)
            .ok_or_else(|| ForgeError::NodeNotFound(id.to_string()));
        let node = self.report(result)?;

        if self.class_editor.editing() == Some(id) {
            self.attribute_editor.cancel();
            self.class_editor.cancel();
            self.pruned.clear();
        }
        self.edges.retain(|edge| !edge.involves(id));
        self.sync();

        info!("Class '{}' deleted", node.data.display_name());
        self.notices.push(Notice::success(format!(
            "Class '{}' deleted",
            node.data.display_name()
        )));
        Ok(node)
    }

    // ========================================================================
    // Attribute Editor
    // ========================================================================

    pub fn begin_attribute_create(&mut self) -> ForgeResult<()> {
        let result = self.class_editor.draft_mut().map(|_| ());
        self.report(result)?;
        self.attribute_editor.begin_create();
        Ok(())
    }

    pub fn begin_attribute_edit(&mut self, index: usize) -> ForgeResult<()> {
        let result = match self.class_editor.draft_mut() {
            Ok(class) => self.attribute_editor.begin_edit(class, index),
            Err(e) => Err(e),
        };
        self.report(result)
    }

    pub fn set_attribute_field(&mut self, change: AttributeChange) -> ForgeResult<()> {
        let result = self.attribute_editor.set_field(change);
        self.report(result)
    }

    pub fn select_enum(&mut self, name: Option<String>) -> ForgeResult<()> {
        let result = self.attribute_editor.select_enum(name);
        self.report(result)
    }

    /// Commit the attribute draft into the class draft
    pub fn commit_attribute(&mut self) -> ForgeResult<usize> {
        let editing = self.class_editor.editing().cloned();
        let scope = ReferenceScope {
            registry: &self.classes,
            editing: editing.as_ref(),
            enums: &self.enums,
        };
        let result = match self.class_editor.draft_mut() {
            Ok(class) => self.attribute_editor.commit(class, scope),
            Err(e) => Err(e),
        };
        self.report(result)
    }

    pub fn cancel_attribute(&mut self) {
        self.attribute_editor.cancel();
    }

    /// Remove an attribute from the class draft
    ///
    /// A foreign key's edge disappears right away; it returns if the class
    /// edit is cancelled.
    pub fn delete_attribute(&mut self, index: usize) -> ForgeResult<Attribute> {
        let result = self
            .class_editor
            .draft_mut()
            .and_then(|class| remove_attribute(class, index));
        let removed = self.report(result)?;
        self.attribute_editor.attribute_removed(index);

        if removed.is_foreign {
            if let Some(id) = self.class_editor.editing() {
                let handle = removed.handle();
                self.edges.retain(|edge| !edge.is_anchored_on(id, &handle));
                debug!("Pruned edges anchored on {}:{}", id, handle);
                self.pruned.push((id.clone(), handle));
            }
        }
        Ok(removed)
    }

    // ========================================================================
    // Enum Editor
    // ========================================================================

    pub fn begin_enum_create(&mut self) {
        self.enum_editor.begin_create();
    }

    pub fn begin_enum_edit(&mut self, name: &str) -> ForgeResult<()> {
        let result = self.enum_editor.begin_edit(&self.enums, name);
        self.report(result)
    }

    pub fn set_enum_name(&mut self, name: impl Into<String>) -> ForgeResult<()> {
        let result = self.enum_editor.set_name(name);
        self.report(result)
    }

    pub fn add_enum_value(&mut self) -> ForgeResult<()> {
        let result = self.enum_editor.add_value_pair();
        self.report(result)
    }

    pub fn remove_enum_value(&mut self, index: usize) -> ForgeResult<()> {
        let result = self.enum_editor.remove_value_pair(index).map(|_| ());
        self.report(result)
    }

    pub fn set_enum_value(
        &mut self,
        index: usize,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> ForgeResult<()> {
        let result = self.enum_editor.set_value_pair(index, key, value);
        self.report(result)
    }

    pub fn cancel_enum(&mut self) {
        self.enum_editor.cancel();
    }

    /// Commit the enum draft; a rename follows through to every attribute
    pub fn commit_enum(&mut self) -> ForgeResult<String> {
        let result = self.enum_editor.commit(&mut self.enums);
        let EnumCommit { name, renamed_from } = self.report(result)?;

        if let Some(from) = renamed_from {
            let changed = self.retarget_enum(&from, Some(&name));
            info!("Enum '{}' renamed to '{}' ({} attributes)", from, name, changed);
        }
        self.sync();

        self.notices
            .push(Notice::success(format!("Enum '{}' saved", name)));
        Ok(name)
    }

    /// Delete an enum according to the configured policy
    pub fn delete_enum(&mut self, name: &str) -> ForgeResult<EnumType> {
        let result = self.check_enum_delete(name);
        self.report(result)?;

        let cleared = self.retarget_enum(name, None);
        if self.enum_editor.mode().editing().map(String::as_str) == Some(name) {
            self.enum_editor.cancel();
        }
        let result = self
            .enums
            .remove(name)
            .ok_or_else(|| ForgeError::EnumNotFound(name.to_string()));
        let removed = self.report(result)?;
        self.sync();

        info!("Enum '{}' deleted ({} references cleared)", name, cleared);
        self.notices
            .push(Notice::success(format!("Enum '{}' deleted", name)));
        Ok(removed)
    }

    fn check_enum_delete(&self, name: &str) -> ForgeResult<()> {
        if !self.enums.contains(name) {
            return Err(ForgeError::EnumNotFound(name.to_string()));
        }
        if self.config.enum_delete_policy == EnumDeletePolicy::Cascade {
            return Ok(());
        }

        let mut users = self.classes.enum_users(name);
        if self.class_editor.is_open() {
            let draft = self.class_editor.draft();
            for attribute in &draft.attributes {
                if attribute.enum_name.as_deref() == Some(name) {
                    let user = format!("{}.{}", draft.display_name(), attribute.name);
                    if !users.contains(&user) {
                        users.push(user);
                    }
                }
            }
        }

        if users.is_empty() {
            Ok(())
        } else {
            Err(ForgeError::EnumInUse {
                name: name.to_string(),
                users,
            })
        }
    }

    /// Rewrite enum references in the registry and in open drafts
    fn retarget_enum(&mut self, from: &str, to: Option<&str>) -> usize {
        let mut changed = self.classes.retarget_enum(from, to);
        if let Ok(draft) = self.class_editor.draft_mut() {
            changed += retarget_enum_in(draft, from, to);
        }
        self.attribute_editor.retarget_enum(from, to);
        changed
    }

    // ========================================================================
    // View
    // ========================================================================

    /// Focus a node with the configured zoom and duration
    pub fn focus_node(&mut self, id: &NodeId) -> ForgeResult<ViewTransition> {
        self.focus_node_with(id, self.config.focus)
    }

    /// Focus a node, centering on `position + size / 2`
    pub fn focus_node_with(
        &mut self,
        id: &NodeId,
        options: FocusOptions,
    ) -> ForgeResult<ViewTransition> {
        let result = self
            .classes
            .get(id)
            .map(|node| focus_on(node, self.config.default_node_size, options))
            .ok_or_else(|| ForgeError::NodeNotFound(id.to_string()));
        let transition = self.report(result)?;
        debug!(
            "Focus {} at ({}, {})",
            id, transition.center.x, transition.center.y
        );
        self.last_transition = Some(transition);
        Ok(transition)
    }

    /// Pick a class from the list: highlight, close the class editor, focus
    pub fn select_from_list(&mut self, id: &NodeId) -> ForgeResult<ViewTransition> {
        if !self.classes.contains(id) {
            let result = Err(ForgeError::NodeNotFound(id.to_string()));
            return self.report(result);
        }
        self.highlighted = Some(id.clone());
        self.cancel_class();
        self.focus_node(id)
    }

    pub fn highlight(&mut self, id: &NodeId) -> ForgeResult<()> {
        if self.classes.contains(id) {
            self.highlighted = Some(id.clone());
            Ok(())
        } else {
            let result = Err(ForgeError::NodeNotFound(id.to_string()));
            self.report(result)
        }
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Class list for the current query
    pub fn search_results(&self) -> Vec<ClassSummary> {
        search_classes(&self.classes, &self.search_query)
    }

    /// Move a node; layout only, edges are untouched
    pub fn move_node(&mut self, id: &NodeId, position: Position) -> ForgeResult<()> {
        let result = self
            .classes
            .get_mut(id)
            .map(|node| node.position = position)
            .ok_or_else(|| ForgeError::NodeNotFound(id.to_string()));
        self.report(result)?;
        self.sync();
        Ok(())
    }

    /// Record the size the renderer measured for a node
    pub fn resize_node(&mut self, id: &NodeId, size: Size) -> ForgeResult<()> {
        let result = self
            .classes
            .get_mut(id)
            .map(|node| {
                node.width = Some(size.width);
                node.height = Some(size.height);
            })
            .ok_or_else(|| ForgeError::NodeNotFound(id.to_string()));
        self.report(result)?;
        self.sync();
        Ok(())
    }

    // ========================================================================
    // Save / Export
    // ========================================================================

    /// `{nodes, edges, enums}` of the committed state
    pub fn snapshot(&self) -> DiagramSnapshot {
        DiagramSnapshot {
            nodes: self.classes.clone(),
            edges: self.committed_edges(),
            enums: self.enums.clone(),
        }
    }

    /// One `ClassData` per node
    pub fn class_model(&self) -> Vec<forge_ir::ClassData> {
        self.classes.class_model()
    }

    /// The project record with `nodes` and `class_model` brought up to date
    pub fn to_project(&self) -> Project {
        let mut project = self.project.clone();
        project.refresh_from(self.snapshot());
        project
    }

    /// `{nodes, edges}` for `diagram-interface.json`
    pub fn export(&self) -> DiagramExport {
        self.snapshot().into()
    }

    /// Hand the snapshot to a save collaborator
    pub fn save(&mut self, handler: &mut dyn SaveHandler) -> ForgeResult<()> {
        self.persistence.begin_diagram_save();
        let outcome = handler.save(&self.snapshot());
        self.finish_save(outcome)
    }

    /// Mark a diagram save as started and get the project to send
    pub fn begin_save(&mut self) -> Project {
        self.persistence.begin_diagram_save();
        self.to_project()
    }

    /// Record how a diagram save ended
    pub fn finish_save<E: Display>(&mut self, outcome: Result<(), E>) -> Result<(), E> {
        self.persistence.finish_diagram_save(&outcome);
        match &outcome {
            Ok(()) => {
                info!("Diagram saved");
                self.notices.push(Notice::success("Diagram saved"));
            }
            Err(e) => {
                warn!("Diagram save failed: {}", e);
                self.notices
                    .push(Notice::error(format!("Failed to save diagram: {}", e)));
            }
        }
        outcome
    }

    /// Name a class as changed without going through the class editor
    pub fn mark_updated(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.updated_classes.contains(&name) {
            self.updated_classes.push(name);
        }
    }

    /// Build a migration request and mark it in flight
    pub fn migration_request(&mut self, message: &str) -> ForgeResult<MigrationRequest> {
        let message = message.trim();
        if message.is_empty() {
            let result = Err(ForgeError::validation("Migration message is required"));
            return self.report(result);
        }

        self.persistence.begin_migration();
        Ok(MigrationRequest::new(
            self.class_model(),
            message,
            self.updated_classes.clone(),
        ))
    }

    /// Record how a migration ended; success resets `updated_classes`
    pub fn finish_migration<E: Display>(&mut self, outcome: Result<(), E>) -> Result<(), E> {
        self.persistence.finish_migration(&outcome);
        match &outcome {
            Ok(()) => {
                self.updated_classes.clear();
                info!("Migration generated");
                self.notices.push(Notice::success("Migration generated"));
            }
            Err(e) => {
                warn!("Migration failed: {}", e);
                self.notices
                    .push(Notice::error(format!("Failed to generate migration: {}", e)));
            }
        }
        outcome
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Re-derive edges if the registry changed and drop a stale highlight
    fn sync(&mut self) {
        let current = fingerprint(&self.classes);
        if self.derived_from != Some(current) {
            let derivation = derive_edges(&self.classes);
            self.edges = derivation.edges;
            self.issues = derivation.issues;
            self.derived_from = Some(current);
            self.derivations += 1;

            let pruned = &self.pruned;
            self.edges.retain(|edge| {
                !pruned
                    .iter()
                    .any(|(id, handle)| edge.is_anchored_on(id, handle))
            });
        }

        if let Some(id) = &self.highlighted {
            if !self.classes.contains(id) {
                debug!("Highlight on removed node {} cleared", id);
                self.highlighted = None;
            }
        }
    }

    /// Undo pruning done while a class draft was open
    fn restore_edges(&mut self) {
        if !self.pruned.is_empty() {
            self.pruned.clear();
            self.derived_from = None;
            self.sync();
        }
    }

    fn committed_edges(&self) -> Vec<Edge> {
        if self.pruned.is_empty() {
            self.edges.clone()
        } else {
            derive_edges(&self.classes).edges
        }
    }

    fn report<T>(&mut self, result: ForgeResult<T>) -> ForgeResult<T> {
        if let Err(e) = &result {
            warn!("{}", e);
            self.notices.push(Notice::error(e.to_string()));
        }
        result
    }
}

impl Default for DiagramSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
