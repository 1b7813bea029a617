//! # Forge Core
//!
//! Core types, traits, and error handling for SchemaForge.
//!
//! This crate provides the foundational building blocks used throughout
//! the SchemaForge workspace, including:
//!
//! - **Types**: Column data types, node identifiers, geometric primitives (Position, Size, Rect)
//! - **Traits**: The `Validatable` contract shared by model types
//! - **Errors**: Unified error handling with `ForgeError` and `ForgeResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{ForgeError, ForgeResult};
pub use traits::Validatable;
pub use types::{DataType, NodeId, Position, Rect, Size};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
