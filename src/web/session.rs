//! Per-work-session HTTP state
//!
//! A [`SessionContext`] bundles the cookie jar and the credential store that
//! every request of one work session shares. Create it once, pass it to every
//! [`OpenRosaClient::execute`](super::client::OpenRosaClient::execute) call and
//! drop it when the session ends. Creating a new one mid-session discards all
//! accumulated cookies and credentials.

use super::auth_scope::{scopes_for, AuthScheme};
use super::credential::{default_expiry, Clock, CredentialStore, SystemClock};
use crate::logger::log_info;
use crate::models::{Credentials, IssuedCredential, SecureString, Username};
use crate::utils::CredentialError;
use reqwest::cookie::{CookieStore as _, Jar};
use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
use reqwest::Url;
use std::sync::Arc;

/// Cookies and credentials for one work session
pub struct SessionContext {
    cookies: Arc<Jar>,
    credentials: CredentialStore,
}

impl SessionContext {
    /// Fresh jar and a credential store with the 7-minute expiry
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Same as [`new`](Self::new) but reading time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            cookies: Arc::new(Jar::default()),
            credentials: CredentialStore::with_clock(default_expiry(), clock),
        }
    }

    pub fn cookies(&self) -> &Arc<Jar> {
        &self.cookies
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Authorize `username` against every auth scope of `host`
    pub fn add_credentials(
        &self,
        username: &str,
        password: &str,
        host: &str,
    ) -> Result<(), CredentialError> {
        let credentials = Credentials::new(Username::new(username)?, SecureString::new(password));
        self.credentials.set_for_scopes(&scopes_for(host), credentials);
        log_info(&format!("Registered credentials for {} on {}", username, host));
        Ok(())
    }

    /// True only when every auth scope of `host` holds an unexpired credential
    pub fn has_credentials(&self, host: &str) -> bool {
        // every scope is visited so each stale entry gets evicted
        scopes_for(host)
            .iter()
            .map(|scope| self.credentials.get(scope).is_some())
            .fold(true, |all, present| all && present)
    }

    /// Forget the credentials of every host
    pub fn clear_all_credentials(&self) {
        self.credentials.clear();
        log_info("Cleared all session credentials");
    }

    /// Credential to answer a `scheme` challenge from `url`'s origin
    pub(crate) fn credential_for(
        &self,
        url: &Url,
        scheme: AuthScheme,
    ) -> Option<Arc<IssuedCredential>> {
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        self.credentials.lookup(host, port, scheme)
    }

    /// `Cookie` header value for a request to `url`, if any cookie applies
    pub fn cookie_header(&self, url: &Url) -> Option<HeaderValue> {
        self.cookies.cookies(url)
    }

    /// Record every `Set-Cookie` in `headers` as coming from `url`
    pub fn store_cookies(&self, headers: &HeaderMap, url: &Url) {
        let mut set_cookies = headers.get_all(SET_COOKIE).iter();
        self.cookies.set_cookies(&mut set_cookies, url);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CREDENTIAL_EXPIRY_SECS;
    use crate::web::credential::test_clock::ManualClock;
    use chrono::TimeDelta;

    #[test]
    fn credentials_present_until_window_elapses() {
        let clock = Arc::new(ManualClock::new());
        let session = SessionContext::with_clock(clock.clone());

        session.add_credentials("u", "p", "host").unwrap();
        assert!(session.has_credentials("host"));
        assert!(!session.has_credentials("elsewhere"));

        clock.advance(TimeDelta::seconds(CREDENTIAL_EXPIRY_SECS));
        assert!(!session.has_credentials("host"));
        assert!(session.credentials().is_empty());
    }

    #[test]
    fn one_missing_scope_fails_the_check() {
        let session = SessionContext::new();
        let [digest, basic, alt] = scopes_for("host");
        session.credentials().set_for_scopes(
            &[digest, alt],
            Credentials::new(Username::new("u").unwrap(), SecureString::new("p")),
        );

        assert!(session.credentials().get(&basic).is_none());
        assert!(!session.has_credentials("host"));
    }

    #[test]
    fn clear_all_credentials_affects_every_host() {
        let session = SessionContext::new();
        session.add_credentials("u", "p", "a.example").unwrap();
        session.add_credentials("u", "p", "b.example").unwrap();

        session.clear_all_credentials();
        assert!(!session.has_credentials("a.example"));
        assert!(!session.has_credentials("b.example"));
    }

    #[test]
    fn invalid_username_is_rejected() {
        let session = SessionContext::new();
        assert!(session.add_credentials("", "p", "host").is_err());
        assert!(!session.has_credentials("host"));
    }

    #[test]
    fn credential_for_uses_effective_port() {
        let session = SessionContext::new();
        session.add_credentials("u", "p", "secure.example").unwrap();

        let https = Url::parse("https://secure.example/formList").unwrap();
        let http = Url::parse("http://secure.example/formList").unwrap();
        assert!(session.credential_for(&https, AuthScheme::Basic).is_some());
        assert!(session.credential_for(&http, AuthScheme::Basic).is_none());
        assert!(session.credential_for(&http, AuthScheme::Digest).is_some());
    }

    #[test]
    fn cookies_round_trip_through_the_jar() {
        let session = SessionContext::new();
        let url = Url::parse("http://server.example/submission").unwrap();

        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("JSESSIONID=abc123; Path=/"));
        session.store_cookies(&headers, &url);

        let cookie = session.cookie_header(&url).unwrap();
        assert_eq!(cookie.to_str().unwrap(), "JSESSIONID=abc123");

        let other = Url::parse("http://other.example/").unwrap();
        assert!(session.cookie_header(&other).is_none());
    }

    #[test]
    fn separate_sessions_do_not_share_state() {
        let first = SessionContext::new();
        let second = SessionContext::new();
        first.add_credentials("u", "p", "host").unwrap();
        assert!(!second.has_credentials("host"));
    }
}
