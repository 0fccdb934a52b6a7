//! OpenRosa request construction
//!
//! Every request carries `X-OpenRosa-Version: 1.0` and a `Date` header in
//! RFC-1036 layout. Servers treat a request missing either as non-compliant.

use crate::constants::{OPEN_ROSA_VERSION, OPEN_ROSA_VERSION_HEADER, RFC1036_DATE_FORMAT};
use crate::utils::SessionError;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, DATE};
use reqwest::{Method, Url};

/// Format `at` for the `Date` header, e.g. `Fri, 01-Mar-24 12:00:00 GMT`
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format(RFC1036_DATE_FORMAT).to_string()
}

/// A request stamped with the OpenRosa headers, ready for
/// [`OpenRosaClient::execute`](super::client::OpenRosaClient::execute)
#[derive(Debug, Clone)]
pub struct OpenRosaRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl OpenRosaRequest {
    pub fn head(url: Url) -> Result<Self, SessionError> {
        Self::new(Method::HEAD, url)
    }

    pub fn get(url: Url) -> Result<Self, SessionError> {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Result<Self, SessionError> {
        Self::new(Method::POST, url)
    }

    /// Parse `url` first; convenience for string-configured server addresses
    pub fn parse(method: Method, url: &str) -> Result<Self, SessionError> {
        let url =
            Url::parse(url).map_err(|e| SessionError::InvalidUrl(format!("{}: {}", url, e)))?;
        Self::new(method, url)
    }

    fn new(method: Method, url: Url) -> Result<Self, SessionError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SessionError::InvalidUrl(format!(
                "unsupported scheme in {}",
                url
            )));
        }

        let mut request = Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        };
        request.stamp(Utc::now())?;
        Ok(request)
    }

    fn stamp(&mut self, at: DateTime<Utc>) -> Result<(), SessionError> {
        let version = HeaderName::from_bytes(OPEN_ROSA_VERSION_HEADER.as_bytes()).map_err(|e| {
            SessionError::InvalidHeader(format!("{}: {}", OPEN_ROSA_VERSION_HEADER, e))
        })?;
        self.headers
            .insert(version, HeaderValue::from_static(OPEN_ROSA_VERSION));
        let date = HeaderValue::from_str(&http_date(at))
            .map_err(|e| SessionError::InvalidHeader(format!("Date: {}", e)))?;
        self.headers.insert(DATE, date);
        Ok(())
    }

    /// Add or replace a header
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, SessionError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SessionError::InvalidHeader(format!("{}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| SessionError::InvalidHeader(format!("{}: {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Attach a body, typically a multipart submission envelope
    pub fn with_body(mut self, content_type: &str, body: Vec<u8>) -> Result<Self, SessionError> {
        let value = HeaderValue::from_str(content_type)
            .map_err(|e| SessionError::InvalidHeader(format!("Content-Type: {}", e)))?;
        self.headers.insert(CONTENT_TYPE, value);
        self.body = Some(body);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Path and query, as used in the Digest `uri` field
    pub(crate) fn request_target(&self) -> String {
        let mut target = self.url.path().to_string();
        if let Some(query) = self.url.query() {
            target.push('?');
            target.push_str(query);
        }
        target
    }

    /// Same request re-aimed at a redirect target
    pub(crate) fn redirected(&self, method: Method, url: Url, keep_body: bool) -> Self {
        let mut headers = self.headers.clone();
        let body = if keep_body {
            self.body.clone()
        } else {
            headers.remove(CONTENT_TYPE);
            None
        };
        Self {
            method,
            url,
            headers,
            body,
        }
    }
}
