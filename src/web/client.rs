//! OpenRosa HTTP client
//!
//! `reqwest` owns the wire (connections, TLS, pooling). Redirects, cookies and
//! authentication are driven here instead so that every hop goes through the
//! caller's [`SessionContext`]: cookies set on a redirect response are kept,
//! and credentials are chosen per target host, port and scheme.

use super::auth_scope::AuthScheme;
use super::challenge::{
    basic_authorization, digest_authorization, new_cnonce, parse_challenges, Challenge,
};
use super::request::OpenRosaRequest;
use super::session::SessionContext;
use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_MS, ENV_HTTP_TIMEOUT_MS, ENV_MAX_REDIRECTS, MAX_REDIRECTS,
};
use crate::logger::{log_debug, log_info, log_warn};
use crate::utils::SessionError;
use reqwest::header::{HeaderValue, AUTHORIZATION, COOKIE, LOCATION, WWW_AUTHENTICATE};
use reqwest::{Method, Response, StatusCode, Url};
use std::time::Duration;

/// Transport settings for an [`OpenRosaClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Applied to both connection establishment and each socket read
    pub timeout: Duration,
    /// Follow 3xx responses (needed for http to https upgrades)
    pub follow_redirects: bool,
    pub max_redirects: usize,
    /// Answer 401 challenges with session credentials
    pub authenticate: bool,
    /// Scheme used when a server offers several; earlier wins
    pub auth_scheme_preference: Vec<AuthScheme>,
    pub user_agent: String,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub use_system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            follow_redirects: true,
            max_redirects: MAX_REDIRECTS,
            authenticate: true,
            auth_scheme_preference: vec![AuthScheme::Digest, AuthScheme::Basic],
            user_agent: format!("formbridge/{}", env!("CARGO_PKG_VERSION")),
            use_system_proxy: true,
        }
    }
}

impl ClientConfig {
    pub fn with_timeout_millis(timeout_millis: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_millis),
            ..Self::default()
        }
    }

    /// Defaults overridden by `FORMBRIDGE_HTTP_TIMEOUT_MS` / `FORMBRIDGE_MAX_REDIRECTS`
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(ENV_HTTP_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.timeout = Duration::from_millis(ms),
                Err(_) => log_warn(&format!("Ignoring {}={:?}", ENV_HTTP_TIMEOUT_MS, raw)),
            }
        }
        if let Ok(raw) = std::env::var(ENV_MAX_REDIRECTS) {
            match raw.trim().parse::<usize>() {
                Ok(max) => config.max_redirects = max,
                Err(_) => log_warn(&format!("Ignoring {}={:?}", ENV_MAX_REDIRECTS, raw)),
            }
        }

        config
    }
}

/// Client with connect/read timeouts of `timeout_millis`, redirects and
/// authentication enabled, preferring Digest over Basic
pub fn new_client(timeout_millis: u64) -> Result<OpenRosaClient, SessionError> {
    OpenRosaClient::new(ClientConfig::with_timeout_millis(timeout_millis))
}

/// HTTP client that applies a [`SessionContext`] to each request
#[derive(Debug, Clone)]
pub struct OpenRosaClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl OpenRosaClient {
    pub fn new(config: ClientConfig) -> Result<Self, SessionError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            // hops are followed in `execute` so each one sees the session
            .redirect(reqwest::redirect::Policy::none());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let http = builder
            .build()
            .map_err(|e| SessionError::ClientBuild(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `request`, following redirects and answering auth challenges
    ///
    /// A 401 that cannot be answered (no matching credential, or the retry
    /// was refused again) is returned as a response, not an error. Nothing is
    /// retried on transport failure.
    pub async fn execute(
        &self,
        session: &SessionContext,
        request: OpenRosaRequest,
    ) -> Result<Response, SessionError> {
        let mut request = request;
        let mut redirects = 0usize;
        let mut authorization: Option<HeaderValue> = None;

        loop {
            let response = self.send(session, &request, authorization.as_ref()).await?;
            session.store_cookies(response.headers(), request.url());
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED
                && self.config.authenticate
                && authorization.is_none()
            {
                match self.answer_challenge(session, &request, &response)? {
                    Some(value) => {
                        log_debug(&format!("Answering auth challenge from {}", request.url()));
                        authorization = Some(value);
                        continue;
                    }
                    None => return Ok(response),
                }
            }

            if status.is_redirection() && self.config.follow_redirects {
                let next = match redirect_target(&request, &response)? {
                    Some(next) => next,
                    None => return Ok(response),
                };
                redirects += 1;
                if redirects > self.config.max_redirects {
                    return Err(SessionError::TooManyRedirects(self.config.max_redirects));
                }
                log_info(&format!(
                    "Following {} redirect {} -> {}",
                    status.as_u16(),
                    request.url(),
                    next.url()
                ));
                request = next;
                authorization = None;
                continue;
            }

            return Ok(response);
        }
    }

    async fn send(
        &self,
        session: &SessionContext,
        request: &OpenRosaRequest,
        authorization: Option<&HeaderValue>,
    ) -> Result<Response, SessionError> {
        let mut builder = self
            .http
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());

        if let Some(cookie) = session.cookie_header(request.url()) {
            builder = builder.header(COOKIE, cookie);
        }
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value.clone());
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        builder.send().await.map_err(|e| self.classify(e))
    }

    /// `Authorization` value for the first preferred scheme the server offers
    /// and the session holds a credential for
    ///
    /// Every challenge of a scheme is tried in order; one that cannot be
    /// answered (unknown digest algorithm, missing nonce) is skipped.
    fn answer_challenge(
        &self,
        session: &SessionContext,
        request: &OpenRosaRequest,
        response: &Response,
    ) -> Result<Option<HeaderValue>, SessionError> {
        let challenges: Vec<Challenge> = response
            .headers()
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(parse_challenges)
            .collect();

        for scheme in &self.config.auth_scheme_preference {
            let offered: Vec<&Challenge> = challenges
                .iter()
                .filter(|c| c.scheme() == Some(*scheme))
                .collect();
            if offered.is_empty() {
                continue;
            }
            let issued = match session.credential_for(request.url(), *scheme) {
                Some(issued) => issued,
                None => continue,
            };

            for challenge in offered {
                let value = match scheme {
                    AuthScheme::Basic => basic_authorization(issued.credentials()),
                    AuthScheme::Digest => match digest_authorization(
                        challenge,
                        issued.credentials(),
                        request.method().as_str(),
                        &request.request_target(),
                        &new_cnonce(),
                    ) {
                        Ok(value) => value,
                        Err(e) => {
                            log_warn(&format!(
                                "Skipping challenge from {}: {}",
                                request.url(),
                                e
                            ));
                            continue;
                        }
                    },
                };
                let header = HeaderValue::from_str(&value)
                    .map_err(|e| SessionError::InvalidHeader(format!("Authorization: {}", e)))?;
                return Ok(Some(header));
            }
        }

        log_warn(&format!(
            "No usable credentials for challenge from {}",
            request.url()
        ));
        Ok(None)
    }

    fn classify(&self, err: reqwest::Error) -> SessionError {
        if err.is_timeout() || timed_out(&err) {
            SessionError::Timeout(self.config.timeout)
        } else if err.is_connect() {
            SessionError::Connection(err.to_string())
        } else {
            SessionError::Transport(err.to_string())
        }
    }
}

/// Whether an I/O timeout sits anywhere in the error's source chain
fn timed_out(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        source = current.source();
    }
    false
}

/// Next request for a 3xx response, or `None` when it should not be followed
///
/// GET and HEAD are always re-issued with their own method. 307/308 keep the
/// method and body. A POST answered by 303 becomes a GET; a POST answered by
/// 301/302 is handed back to the caller.
fn redirect_target(
    request: &OpenRosaRequest,
    response: &Response,
) -> Result<Option<OpenRosaRequest>, SessionError> {
    let status = response.status();
    let location = match response.headers().get(LOCATION) {
        Some(location) => location,
        None => return Ok(None),
    };
    let location = location
        .to_str()
        .map_err(|e| SessionError::InvalidHeader(format!("Location: {}", e)))?;
    let url = resolve_location(request.url(), location)?;

    let method = request.method();
    let next = match status {
        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT => {
            Some(request.redirected(method.clone(), url, true))
        }
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
            if *method == Method::GET || *method == Method::HEAD =>
        {
            Some(request.redirected(method.clone(), url, false))
        }
        StatusCode::SEE_OTHER => Some(request.redirected(Method::GET, url, false)),
        _ => None,
    };
    Ok(next)
}

fn resolve_location(base: &Url, location: &str) -> Result<Url, SessionError> {
    let url = base
        .join(location)
        .map_err(|e| SessionError::InvalidUrl(format!("{}: {}", location, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SessionError::InvalidUrl(format!(
            "redirect to unsupported scheme {}",
            url
        )));
    }
    Ok(url)
}
