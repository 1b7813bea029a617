//! # Forge Editor
//!
//! Editing state for a SchemaForge diagram.
//!
//! A [`DiagramSession`] owns the committed class and enum registries and
//! the three draft/commit editors. Relationship edges are never edited
//! directly: the session re-derives them from foreign-key attributes after
//! every committed change.
//!
//! ```no_run
//! use forge_editor::{DiagramSession, SessionConfig};
//! use forge_ir::Position;
//!
//! let mut session = DiagramSession::new(SessionConfig::default());
//! session.begin_class_create(Position::new(100.0, 100.0));
//! session.generate_class_name().ok();
//! ```

pub mod attribute_editor;
pub mod class_editor;
pub mod draft;
pub mod enum_editor;
pub mod notice;
pub mod search;
pub mod session;
pub mod viewport;

pub use attribute_editor::{AttributeEditor, ReferenceScope, remove_attribute, resolve_reference};
pub use class_editor::{ClassCommit, ClassEditor, generated_class_name};
pub use draft::{Draft, EditorMode};
pub use enum_editor::{EnumCommit, EnumDeletePolicy, EnumEditor};
pub use notice::{Notice, NoticeLevel};
pub use search::{ClassSummary, search_classes, sorted_summaries};
pub use session::{DiagramSession, PersistenceState, SaveHandler, SessionConfig};
pub use viewport::{FocusOptions, ViewTransition, focus_on};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
