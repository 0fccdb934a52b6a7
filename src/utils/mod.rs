//! # Utilities Module
//!
//! Cross-cutting concerns shared by the filesystem and HTTP halves of the crate.
//!
//! ## Modules
//!
//! - [`errors`]: Typed error hierarchy using `thiserror` for domain-specific errors
//!
//! ## Design Notes
//!
//! Error types are defined here to avoid circular dependencies between the
//! `core` and `web` modules. Nothing in this crate retries on its own; transport
//! and auth failures surface as [`SessionError`] and the caller decides.

pub mod errors;

pub use errors::{CredentialError, FormError, SessionError};
