//! formbridge - form storage discovery and OpenRosa sessions
//!
//! Two halves share this crate:
//! - [`core`]: recognising project and device roots on disk and listing the
//!   forms they hold
//! - [`web`]: an authenticated, cookie-keeping HTTP session against an
//!   OpenRosa forms server

pub mod constants;
pub mod core;
pub mod logger;
pub mod models;
pub mod utils;
pub mod web;

// Re-export commonly used types
pub use crate::core::{DefinitionFileCheck, FormScanner, FormValidator};
pub use crate::models::{Credentials, FormRecord, SecureString, Username};
pub use crate::utils::{CredentialError, FormError, SessionError};
pub use crate::web::{new_client, ClientConfig, OpenRosaClient, OpenRosaRequest, SessionContext};
