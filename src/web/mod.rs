//! OpenRosa HTTP session plumbing
//!
//! ## Modules
//!
//! - [`auth_scope`]: which (host, port, scheme) triples a credential covers
//! - [`credential`]: aging credential store
//! - [`session`]: cookie jar + credential store for one work session
//! - [`request`]: protocol-stamped HEAD/GET/POST requests
//! - [`challenge`]: `WWW-Authenticate` parsing, Digest and Basic answers
//! - [`client`]: configured client that drives redirects, cookies and auth
//!
//! One [`SessionContext`] is created per work session and passed explicitly
//! to every [`OpenRosaClient::execute`] call; there is no process-wide state.

pub mod auth_scope;
pub mod challenge;
pub mod client;
pub mod credential;
pub mod request;
pub mod session;

pub use auth_scope::{scopes_for, AuthScheme, AuthScope};
pub use client::{new_client, ClientConfig, OpenRosaClient};
pub use credential::{Clock, CredentialStore, SystemClock};
pub use request::{http_date, OpenRosaRequest};
pub use session::SessionContext;
