//! # Application-Wide Constants
//!
//! Centralized configuration values and magic numbers used throughout formbridge.
//!
//! Constants live here rather than in the modules that use them so the on-disk
//! layout names and the protocol values can be found in one place.
//!
//! ## Usage
//!
//! ```rust
//! use formbridge::constants::*;
//!
//! let timeout = std::time::Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS);
//! ```

// ============================================================================
// OpenRosa Protocol
// ============================================================================

/// Header identifying the OpenRosa protocol revision spoken by the client
pub const OPEN_ROSA_VERSION_HEADER: &str = "X-OpenRosa-Version";

/// OpenRosa protocol revision stamped on every outbound request
pub const OPEN_ROSA_VERSION: &str = "1.0";

/// RFC-1036 date layout used for the `Date` header (e.g. `Sun, 06-Nov-94 08:49:37 GMT`)
///
/// Aggregate servers reject requests whose `Date` header is missing or
/// unparseable, so this layout is fixed.
pub const RFC1036_DATE_FORMAT: &str = "%a, %d-%b-%y %H:%M:%S GMT";

// ============================================================================
// Timeouts and Limits
// ============================================================================

/// Lifetime of a credential after it was last set (seconds)
///
/// **Rationale**: 7 minutes covers a typical pull/push cycle against a server
/// while making a walked-away session re-prompt for the password.
pub const CREDENTIAL_EXPIRY_SECS: i64 = 7 * 60;

/// Default connect and read timeout for HTTP requests (milliseconds)
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

/// Maximum number of redirect hops followed for a single request
///
/// Matches the limit `reqwest` applies with its default redirect policy.
pub const MAX_REDIRECTS: usize = 10;

/// Environment override for [`DEFAULT_HTTP_TIMEOUT_MS`]
pub const ENV_HTTP_TIMEOUT_MS: &str = "FORMBRIDGE_HTTP_TIMEOUT_MS";

/// Environment override for [`MAX_REDIRECTS`]
pub const ENV_MAX_REDIRECTS: &str = "FORMBRIDGE_MAX_REDIRECTS";

// ============================================================================
// Authentication Scopes
// ============================================================================

/// Standard TLS port on which Basic credentials may be sent
pub const HTTPS_PORT: u16 = 443;

/// Alternate TLS port (servlet containers) on which Basic credentials may be sent
pub const ALT_HTTPS_PORT: u16 = 8443;

// ============================================================================
// On-Disk Layout
// ============================================================================

/// Project-root child holding one sub-directory per downloaded form
pub const FORMS_DIR: &str = "forms";

/// Project-root child used as a working area during transfers
pub const SCRATCH_DIR: &str = "scratch";

/// Device-root child created by the collection app
pub const ODK_DIR: &str = "odk";

/// Device child (under [`ODK_DIR`]) holding filled-in form instances
pub const INSTANCES_DIR: &str = "instances";

/// Suffix of form definition and instance files
pub const XML_SUFFIX: &str = ".xml";

/// Suffix appended to an instance file name to mark submission progress
pub const ENVELOPE_SUFFIX: &str = ".xml.envelope";

// ============================================================================
// Mount Points
// ============================================================================

/// Parent-relative marker used on Windows, where drive letters have no common root
pub const WINDOWS_MOUNT_POINT: &str = "\\..";

/// Volume mount directory on macOS
pub const MACOS_MOUNT_POINT: &str = "/Volumes/";

/// Device mount directory on other Unix systems
pub const UNIX_MOUNT_POINT: &str = "/mnt/";
