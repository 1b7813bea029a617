//! # Forge API
//!
//! Async client for the SchemaForge project backend.
//!
//! The backend stores projects (configuration, class model and diagram
//! snapshot) and generates migrations. Every call here maps one-to-one onto
//! a backend route; see [`Endpoint`].

pub mod client;
pub mod config;
pub mod error;
pub mod requests;

pub use client::{ApiClient, check_status, decode_body};
pub use config::{API_URL_ENV, ApiConfig, DEFAULT_API_URL, LEGACY_API_URL_ENV};
pub use error::{ApiError, ApiResult};
pub use requests::{DEFAULT_LIMIT, DEFAULT_SKIP, Endpoint};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
