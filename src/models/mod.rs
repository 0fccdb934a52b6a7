//! # Domain Models
//!
//! Core data structures: discovered forms and server credentials.
//!
//! ## Security Design
//!
//! The [`SecureString`] type provides memory-safe credential handling:
//! - Password data is zeroed on drop to prevent leakage via swap/core dumps
//! - Never exposed in `Debug` or `Display` implementations
//!
//! Credentials only ever live in memory for the length of one work session.
//! [`IssuedCredential`] carries the registration time used for expiry.

pub mod credentials;
pub mod form;

pub use credentials::{Credentials, IssuedCredential, SecureString, Username};
pub use form::FormRecord;
