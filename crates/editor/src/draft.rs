//! Draft/commit state shared by the three editors

/// What an editor is currently doing
///
/// `K` identifies the committed item being edited: a node id for classes,
/// an index into the class draft for attributes, the original name for
/// enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode<K> {
    /// Nothing open
    Idle,
    /// Drafting a new item
    Creating,
    /// Drafting changes to an existing item
    Editing(K),
}

impl<K> Default for EditorMode<K> {
    fn default() -> Self {
        EditorMode::Idle
    }
}

impl<K> EditorMode<K> {
    pub fn is_idle(&self) -> bool {
        matches!(self, EditorMode::Idle)
    }

    /// A draft is open (creating or editing)
    pub fn is_open(&self) -> bool {
        !self.is_idle()
    }

    pub fn is_creating(&self) -> bool {
        matches!(self, EditorMode::Creating)
    }

    /// Key of the item being edited
    pub fn editing(&self) -> Option<&K> {
        match self {
            EditorMode::Editing(key) => Some(key),
            _ => None,
        }
    }
}

/// A scratch copy of `T` plus the mode it was opened in
///
/// The committed value is never touched until the owner applies the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft<T, K> {
    mode: EditorMode<K>,
    value: T,
}

impl<T: Default, K> Default for Draft<T, K> {
    fn default() -> Self {
        Self {
            mode: EditorMode::Idle,
            value: T::default(),
        }
    }
}

impl<T: Default, K> Draft<T, K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a draft for a new item
    pub fn open_create(&mut self, value: T) {
        self.mode = EditorMode::Creating;
        self.value = value;
    }

    /// Open a draft holding a copy of an existing item
    pub fn open_edit(&mut self, key: K, value: T) {
        self.mode = EditorMode::Editing(key);
        self.value = value;
    }

    /// Back to idle with a fresh default value
    pub fn close(&mut self) {
        self.mode = EditorMode::Idle;
        self.value = T::default();
    }

    pub fn mode(&self) -> &EditorMode<K> {
        &self.mode
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_mode() {
        let mode: EditorMode<usize> = EditorMode::default();
        assert!(mode.is_idle());
        assert!(!mode.is_open());

        let mode = EditorMode::Editing(3usize);
        assert!(mode.is_open());
        assert!(!mode.is_creating());
        assert_eq!(mode.editing(), Some(&3));
    }

    #[test]
    fn test_draft_lifecycle() {
        let mut draft: Draft<String, usize> = Draft::new();
        assert!(!draft.is_open());

        draft.open_edit(1, "user".to_string());
        draft.value_mut().push_str("_id");
        assert_eq!(draft.value(), "user_id");
        assert_eq!(draft.mode().editing(), Some(&1));

        draft.close();
        assert!(draft.mode().is_idle());
        assert!(draft.value().is_empty());
    }
}
