//! Attribute editor
//!
//! Edits go to a draft `Attribute`. `commit` validates the draft against the
//! class draft it belongs to and only then appends or replaces it there.

use crate::draft::{Draft, EditorMode};
use forge_core::{DataType, ForgeError, ForgeResult, NodeId};
use forge_ir::{Attribute, AttributeChange, ClassData, ClassRegistry, EnumRegistry, parse_reference};
use tracing::debug;

/// Where foreign-key targets are looked up during a commit
#[derive(Debug, Clone, Copy)]
pub struct ReferenceScope<'a> {
    /// Committed classes
    pub registry: &'a ClassRegistry,
    /// Node whose class draft is open; skipped in the registry since the
    /// draft supersedes it
    pub editing: Option<&'a NodeId>,
    pub enums: &'a EnumRegistry,
}

/// Draft state for one attribute of the open class draft
#[derive(Debug, Clone, Default)]
pub struct AttributeEditor {
    draft: Draft<Attribute, usize>,
    selected_enum: Option<String>,
}

impl AttributeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &EditorMode<usize> {
        self.draft.mode()
    }

    pub fn draft(&self) -> &Attribute {
        self.draft.value()
    }

    /// Enum chosen for an `ENUM` draft
    pub fn selected_enum(&self) -> Option<&str> {
        self.selected_enum.as_deref()
    }

    /// Start drafting a new attribute
    pub fn begin_create(&mut self) {
        self.draft.open_create(Attribute::default());
        self.selected_enum = None;
        debug!("Attribute editor: creating");
    }

    /// Start editing the attribute at `index` of `class`
    pub fn begin_edit(&mut self, class: &ClassData, index: usize) -> ForgeResult<()> {
        let attribute = class
            .attributes
            .get(index)
            .ok_or_else(|| ForgeError::editor_state(format!("No attribute at index {}", index)))?
            .clone();

        self.selected_enum = if attribute.data_type.is_enum() {
            attribute.enum_name.clone()
        } else {
            None
        };
        debug!("Attribute editor: editing '{}' at {}", attribute.name, index);
        self.draft.open_edit(index, attribute);
        Ok(())
    }

    /// Apply one field change to the draft
    pub fn set_field(&mut self, change: AttributeChange) -> ForgeResult<()> {
        self.require_open()?;
        self.draft.value_mut().apply(change);
        Ok(())
    }

    /// Choose the enum an `ENUM` draft will reference
    pub fn select_enum(&mut self, name: Option<String>) -> ForgeResult<()> {
        self.require_open()?;
        self.selected_enum = name.filter(|n| !n.is_empty());
        Ok(())
    }

    /// Drop the draft
    pub fn cancel(&mut self) {
        self.draft.close();
        self.selected_enum = None;
    }

    /// Validate the draft and write it into `class`
    ///
    /// Returns the index the attribute now occupies. On error nothing
    /// changes: neither `class` nor the draft.
    pub fn commit(&mut self, class: &mut ClassData, scope: ReferenceScope<'_>) -> ForgeResult<usize> {
        self.require_open()?;
        let attribute = self.validated(class, scope)?;

        let index = match self.draft.mode() {
            EditorMode::Editing(index) => {
                let index = *index;
                let slot = class.attributes.get_mut(index).ok_or_else(|| {
                    ForgeError::editor_state(format!("No attribute at index {}", index))
                })?;
                *slot = attribute;
                index
            }
            _ => {
                class.attributes.push(attribute);
                class.attributes.len() - 1
            }
        };

        debug!(
            "Attribute '{}' committed to '{}'",
            class.attributes[index].name,
            class.display_name()
        );
        self.cancel();
        Ok(index)
    }

    /// Keep an open edit pointing at the right slot after `index` was removed
    pub fn attribute_removed(&mut self, index: usize) {
        if let EditorMode::Editing(current) = self.draft.mode() {
            let current = *current;
            if current == index {
                self.cancel();
            } else if current > index {
                let value = self.draft.value().clone();
                self.draft.open_edit(current - 1, value);
            }
        }
    }

    /// Follow an enum rename (`Some`) or deletion (`None`)
    pub fn retarget_enum(&mut self, from: &str, to: Option<&str>) {
        if self.selected_enum.as_deref() == Some(from) {
            self.selected_enum = to.map(str::to_string);
        }
        let draft = self.draft.value_mut();
        if draft.enum_name.as_deref() == Some(from) {
            draft.enum_name = to.map(str::to_string);
        }
    }

    fn require_open(&self) -> ForgeResult<()> {
        if self.draft.is_open() {
            Ok(())
        } else {
            Err(ForgeError::editor_state("No attribute is being edited"))
        }
    }

    fn validated(&self, class: &ClassData, scope: ReferenceScope<'_>) -> ForgeResult<Attribute> {
        let mut attribute = self.draft.value().clone();
        attribute.name = attribute.name.trim().to_string();
        let class_name = class.display_name();

        if attribute.name.is_empty() {
            return Err(ForgeError::attribute_validation(
                class_name,
                "",
                "Attribute name is required",
            ));
        }

        let editing = self.draft.mode().editing().copied();
        let duplicate = class
            .attributes
            .iter()
            .enumerate()
            .any(|(i, a)| Some(i) != editing && a.name == attribute.name);
        if duplicate {
            return Err(ForgeError::DuplicateAttribute {
                class: class_name.to_string(),
                attribute: attribute.name,
            });
        }

        if attribute.is_foreign {
            if attribute.foreign_key_class.is_none() {
                return Err(ForgeError::attribute_validation(
                    class_name,
                    &attribute.name,
                    "Foreign key reference is required",
                ));
            }
            let reference = attribute.reference();
            let (target_class, target_attribute) = parse_reference(&reference)?;
            resolve_reference(class, scope, target_class, target_attribute)?;
        }

        if attribute.data_type == DataType::Enum {
            let enum_name = self.selected_enum.clone().ok_or_else(|| {
                ForgeError::attribute_validation(class_name, &attribute.name, "Enum type is required")
            })?;
            if !scope.enums.contains(&enum_name) {
                return Err(ForgeError::EnumNotFound(enum_name));
            }
            attribute.enum_name = Some(enum_name);
        } else {
            attribute.enum_name = None;
        }

        Ok(attribute)
    }
}

/// Check that `target_class.target_attribute` exists
///
/// The open class draft wins over the committed registry, so a class can
/// reference its own attributes before it is first committed.
pub fn resolve_reference(
    class: &ClassData,
    scope: ReferenceScope<'_>,
    target_class: &str,
    target_attribute: &str,
) -> ForgeResult<()> {
    let target = if class.name == target_class {
        class
    } else {
        &scope
            .registry
            .iter()
            .filter(|node| Some(&node.id) != scope.editing)
            .find(|node| node.data.name == target_class)
            .ok_or_else(|| ForgeError::ClassNotFound(target_class.to_string()))?
            .data
    };

    if target.has_attribute(target_attribute) {
        Ok(())
    } else {
        Err(ForgeError::AttributeNotFound {
            class: target_class.to_string(),
            attribute: target_attribute.to_string(),
        })
    }
}

/// Remove the attribute at `index` from a class draft
pub fn remove_attribute(class: &mut ClassData, index: usize) -> ForgeResult<Attribute> {
    if index >= class.attributes.len() {
        return Err(ForgeError::editor_state(format!("No attribute at index {}", index)));
    }
    Ok(class.attributes.remove(index))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::Position;
    use forge_ir::{ClassNode, EnumType};
    use pretty_assertions::assert_eq;

    struct Fixture {
        registry: ClassRegistry,
        enums: EnumRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let user = ClassData::new("User")
                .with_attribute(Attribute::primary_key("id"))
                .with_attribute(Attribute::new("name", DataType::Varchar));
            let mut enums = EnumRegistry::new();
            enums.push(EnumType::new("Status").with_value("OPEN", "open"));
            Self {
                registry: ClassRegistry::from_nodes(vec![ClassNode::new(
                    NodeId::new("u"),
                    Position::zero(),
                    user,
                )]),
                enums,
            }
        }

        fn scope(&self) -> ReferenceScope<'_> {
            ReferenceScope {
                registry: &self.registry,
                editing: None,
                enums: &self.enums,
            }
        }
    }

    fn order_draft() -> ClassData {
        ClassData::new("Order").with_attribute(Attribute::primary_key("id"))
    }

    #[test]
    fn test_primary_and_foreign_are_exclusive() {
        let mut editor = AttributeEditor::new();
        editor.begin_create();

        editor.set_field(AttributeChange::Foreign(true)).unwrap();
        editor
            .set_field(AttributeChange::Reference("User.id".to_string()))
            .unwrap();
        editor.set_field(AttributeChange::Primary(true)).unwrap();

        let draft = editor.draft();
        assert!(draft.is_primary);
        assert!(!draft.is_foreign);
        assert_eq!(draft.foreign_key_class, None);
        assert_eq!(draft.foreign_key, None);

        editor.set_field(AttributeChange::Foreign(true)).unwrap();
        assert!(!editor.draft().is_primary);
        assert!(editor.draft().is_foreign);
    }

    #[test]
    fn test_create_appends_and_resets() {
        let fx = Fixture::new();
        let mut class = order_draft();
        let mut editor = AttributeEditor::new();

        editor.begin_create();
        editor
            .set_field(AttributeChange::Name("user_id".to_string()))
            .unwrap();
        editor.set_field(AttributeChange::Type(DataType::Int)).unwrap();
        editor.set_field(AttributeChange::Foreign(true)).unwrap();
        editor
            .set_field(AttributeChange::Reference("User.id".to_string()))
            .unwrap();

        let index = editor.commit(&mut class, fx.scope()).unwrap();
        assert_eq!(index, 1);
        assert_eq!(class.attributes[1].foreign_key.as_deref(), Some("id"));
        assert!(editor.mode().is_idle());
        assert_eq!(editor.draft(), &Attribute::default());
    }

    #[test]
    fn test_foreign_without_class_is_rejected() {
        let fx = Fixture::new();
        let mut class = order_draft();
        let mut editor = AttributeEditor::new();

        editor.begin_create();
        editor
            .set_field(AttributeChange::Name("user_id".to_string()))
            .unwrap();
        editor.set_field(AttributeChange::Foreign(true)).unwrap();

        let err = editor.commit(&mut class, fx.scope()).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(class.attributes.len(), 1);
        assert!(editor.mode().is_creating());
    }

    #[test]
    fn test_unresolvable_references_are_rejected() {
        let fx = Fixture::new();
        let mut class = order_draft();
        let mut editor = AttributeEditor::new();
        editor.begin_create();
        editor
            .set_field(AttributeChange::Name("user_id".to_string()))
            .unwrap();
        editor.set_field(AttributeChange::Foreign(true)).unwrap();

        for (reference, expected) in [
            ("User", "Invalid foreign key reference 'User.'"),
            ("Customer.id", "Target class \"Customer\" not found"),
            ("User.uuid", "Attribute \"uuid\" not found in \"User\""),
        ] {
            editor
                .set_field(AttributeChange::Reference(reference.to_string()))
                .unwrap();
            let err = editor.commit(&mut class, fx.scope()).unwrap_err();
            assert!(err.to_string().starts_with(expected), "{}", err);
        }
        assert_eq!(class.attributes.len(), 1);
    }

    #[test]
    fn test_self_reference_resolves_against_draft() {
        let fx = Fixture::new();
        let mut class = ClassData::new("Category").with_attribute(Attribute::primary_key("id"));
        let mut editor = AttributeEditor::new();

        editor.begin_create();
        editor
            .set_field(AttributeChange::Name("parent_id".to_string()))
            .unwrap();
        editor.set_field(AttributeChange::Foreign(true)).unwrap();
        editor
            .set_field(AttributeChange::Reference("Category.id".to_string()))
            .unwrap();

        assert!(editor.commit(&mut class, fx.scope()).is_ok());
    }

    #[test]
    fn test_duplicate_name_is_rejected_except_for_itself() {
        let fx = Fixture::new();
        let mut class = order_draft();
        let mut editor = AttributeEditor::new();

        editor.begin_create();
        editor.set_field(AttributeChange::Name("id".to_string())).unwrap();
        let err = editor.commit(&mut class, fx.scope()).unwrap_err();
        assert!(matches!(err, ForgeError::DuplicateAttribute { .. }));

        editor.begin_edit(&class, 0).unwrap();
        editor.set_field(AttributeChange::Unique(true)).unwrap();
        assert_eq!(editor.commit(&mut class, fx.scope()).unwrap(), 0);
        assert!(class.attributes[0].is_unique);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let fx = Fixture::new();
        let mut class = order_draft();
        let mut editor = AttributeEditor::new();

        editor.begin_create();
        editor.set_field(AttributeChange::Name("   ".to_string())).unwrap();
        assert!(editor.commit(&mut class, fx.scope()).is_err());
    }

    #[test]
    fn test_enum_is_stamped_from_selection() {
        let fx = Fixture::new();
        let mut class = order_draft();
        let mut editor = AttributeEditor::new();

        editor.begin_create();
        editor
            .set_field(AttributeChange::Name("status".to_string()))
            .unwrap();
        editor.set_field(AttributeChange::Type(DataType::Enum)).unwrap();
        assert!(editor.commit(&mut class, fx.scope()).is_err());

        editor.select_enum(Some("Missing".to_string())).unwrap();
        assert!(editor.commit(&mut class, fx.scope()).is_err());

        editor.select_enum(Some("Status".to_string())).unwrap();
        let index = editor.commit(&mut class, fx.scope()).unwrap();
        assert_eq!(class.attributes[index].enum_name.as_deref(), Some("Status"));

        editor.begin_edit(&class, index).unwrap();
        assert_eq!(editor.selected_enum(), Some("Status"));
        editor.set_field(AttributeChange::Type(DataType::Text)).unwrap();
        editor.commit(&mut class, fx.scope()).unwrap();
        assert_eq!(class.attributes[index].enum_name, None);
    }

    #[test]
    fn test_operations_require_open_draft() {
        let fx = Fixture::new();
        let mut class = order_draft();
        let mut editor = AttributeEditor::new();

        assert!(editor.set_field(AttributeChange::Unique(true)).is_err());
        assert!(editor.commit(&mut class, fx.scope()).is_err());
        assert!(editor.begin_edit(&class, 5).is_err());
    }

    #[test]
    fn test_removal_shifts_open_edit() {
        let mut class = order_draft()
            .with_attribute(Attribute::new("a", DataType::Int))
            .with_attribute(Attribute::new("b", DataType::Int));
        let mut editor = AttributeEditor::new();

        editor.begin_edit(&class, 2).unwrap();
        remove_attribute(&mut class, 1).unwrap();
        editor.attribute_removed(1);
        assert_eq!(editor.mode(), &EditorMode::Editing(1));

        remove_attribute(&mut class, 1).unwrap();
        editor.attribute_removed(1);
        assert!(editor.mode().is_idle());
        assert!(remove_attribute(&mut class, 3).is_err());
    }
}
