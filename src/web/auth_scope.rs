//! Authentication scopes a host's credentials are registered under

use crate::constants::{ALT_HTTPS_PORT, HTTPS_PORT};
use std::fmt;

/// HTTP authentication scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    Digest,
    Basic,
}

impl AuthScheme {
    /// Scheme token as it appears in `WWW-Authenticate` / `Authorization`
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Digest => "Digest",
            AuthScheme::Basic => "Basic",
        }
    }

    /// Case-insensitive match of a challenge's scheme token
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("digest") {
            Some(AuthScheme::Digest)
        } else if token.eq_ignore_ascii_case("basic") {
            Some(AuthScheme::Basic)
        } else {
            None
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host, port and scheme a credential may be presented to
///
/// `port == None` matches any port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthScope {
    host: String,
    port: Option<u16>,
    scheme: AuthScheme,
}

impl AuthScope {
    pub fn new(host: &str, port: Option<u16>, scheme: AuthScheme) -> Self {
        AuthScope {
            host: host.to_ascii_lowercase(),
            port,
            scheme,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Whether a request to `host:port` answering a `scheme` challenge falls in this scope
    pub fn matches(&self, host: &str, port: u16, scheme: AuthScheme) -> bool {
        self.scheme == scheme
            && self.host.eq_ignore_ascii_case(host)
            && self.port.map_or(true, |p| p == port)
    }
}

impl fmt::Display for AuthScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{} {}:{}", self.scheme, self.host, port),
            None => write!(f, "{} {}:*", self.scheme, self.host),
        }
    }
}

/// Scopes credentials for `host` are registered under, in order:
/// Digest on any port, then Basic on 443 and 8443.
///
/// Basic sends the password in the clear, so it is only allowed on TLS ports.
pub fn scopes_for(host: &str) -> [AuthScope; 3] {
    [
        AuthScope::new(host, None, AuthScheme::Digest),
        AuthScope::new(host, Some(HTTPS_PORT), AuthScheme::Basic),
        AuthScope::new(host, Some(ALT_HTTPS_PORT), AuthScheme::Basic),
    ]
}
