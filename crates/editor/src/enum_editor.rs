//! Enum editor

use crate::draft::{Draft, EditorMode};
use forge_core::{ForgeError, ForgeResult};
use forge_ir::{EnumRegistry, EnumType, EnumValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What deleting an enum that attributes still reference does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumDeletePolicy {
    /// Refuse, naming the referencing attributes
    #[default]
    Forbid,
    /// Delete and clear `enum_name` on every referencing attribute
    Cascade,
}

/// Outcome of a successful enum commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCommit {
    pub name: String,
    /// Previous name when an edit renamed the enum
    pub renamed_from: Option<String>,
}

/// Draft state for one enum
#[derive(Debug, Clone, Default)]
pub struct EnumEditor {
    draft: Draft<EnumType, String>,
}

impl EnumEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &EditorMode<String> {
        self.draft.mode()
    }

    pub fn draft(&self) -> &EnumType {
        self.draft.value()
    }

    /// Start a new enum with one empty pair
    pub fn begin_create(&mut self) {
        let mut enum_type = EnumType::new("");
        enum_type.values.push(EnumValue::default());
        self.draft.open_create(enum_type);
        debug!("Enum editor: creating");
    }

    /// Start editing the enum currently named `name`
    pub fn begin_edit(&mut self, enums: &EnumRegistry, name: &str) -> ForgeResult<()> {
        let enum_type = enums
            .get(name)
            .ok_or_else(|| ForgeError::EnumNotFound(name.to_string()))?
            .clone();
        self.draft.open_edit(name.to_string(), enum_type);
        debug!("Enum editor: editing '{}'", name);
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ForgeResult<()> {
        self.require_open()?;
        self.draft.value_mut().name = name.into();
        Ok(())
    }

    pub fn add_value_pair(&mut self) -> ForgeResult<()> {
        self.require_open()?;
        self.draft.value_mut().values.push(EnumValue::default());
        Ok(())
    }

    pub fn remove_value_pair(&mut self, index: usize) -> ForgeResult<EnumValue> {
        self.require_open()?;
        let values = &mut self.draft.value_mut().values;
        if index >= values.len() {
            return Err(ForgeError::editor_state(format!("No value pair at index {}", index)));
        }
        Ok(values.remove(index))
    }

    pub fn set_value_pair(
        &mut self,
        index: usize,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> ForgeResult<()> {
        self.require_open()?;
        let pair = self
            .draft
            .value_mut()
            .values
            .get_mut(index)
            .ok_or_else(|| ForgeError::editor_state(format!("No value pair at index {}", index)))?;
        pair.key = key.into();
        pair.value = value.into();
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.draft.close();
    }

    /// Validate the draft and store it in `enums`
    ///
    /// Incomplete pairs are dropped. An edit replaces the entry with the
    /// name the draft was opened with.
    pub fn commit(&mut self, enums: &mut EnumRegistry) -> ForgeResult<EnumCommit> {
        self.require_open()?;

        let mut enum_type = self.draft.value().clone();
        enum_type.name = enum_type.name.trim().to_string();
        enum_type.retain_complete();

        if enum_type.name.is_empty() {
            return Err(ForgeError::enum_validation("", "Enum name is required"));
        }

        let original = self.draft.mode().editing().cloned();
        let collides = match &original {
            Some(original) => original != &enum_type.name && enums.contains(&enum_type.name),
            None => enums.contains(&enum_type.name),
        };
        if collides {
            return Err(ForgeError::DuplicateEnum(enum_type.name));
        }

        let name = enum_type.name.clone();
        match &original {
            Some(original) => enums.replace(original, enum_type)?,
            None => enums.push(enum_type),
        }

        debug!("Enum '{}' committed", name);
        self.cancel();
        Ok(EnumCommit {
            renamed_from: original.filter(|o| o != &name),
            name,
        })
    }

    fn require_open(&self) -> ForgeResult<()> {
        if self.draft.is_open() {
            Ok(())
        } else {
            Err(ForgeError::editor_state("No enum is being edited"))
        }
    }
}
