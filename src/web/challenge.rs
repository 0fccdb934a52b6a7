//! `WWW-Authenticate` parsing and `Authorization` construction (RFC 2617)

use super::auth_scope::AuthScheme;
use crate::models::Credentials;
use crate::utils::SessionError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use md5::{Digest as _, Md5};
use rand::Rng;
use std::collections::HashMap;

/// One challenge from a `WWW-Authenticate` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    scheme: String,
    params: HashMap<String, String>,
}

impl Challenge {
    /// Scheme token as sent by the server
    pub fn scheme_token(&self) -> &str {
        &self.scheme
    }

    /// Recognised scheme, if any
    pub fn scheme(&self) -> Option<AuthScheme> {
        AuthScheme::from_token(&self.scheme)
    }

    /// Parameter value; names are case-insensitive
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Parse a `WWW-Authenticate` value, which may hold several challenges
///
/// `Basic realm="a", Digest realm="b", nonce="n"` yields two challenges.
/// Unparseable trailing input is dropped.
pub fn parse_challenges(value: &str) -> Vec<Challenge> {
    let mut parser = Parser::new(value);
    let mut challenges = Vec::new();

    while let Some(scheme) = parser.token() {
        let mut params = HashMap::new();

        loop {
            parser.skip_whitespace();
            let checkpoint = parser.pos;
            let name = match parser.token() {
                Some(name) => name,
                None => {
                    // lone comma between challenges
                    if parser.eat(',') {
                        continue;
                    }
                    break;
                }
            };
            parser.skip_whitespace();
            if !parser.eat('=') {
                // a bare token starts the next challenge
                parser.pos = checkpoint;
                break;
            }
            parser.skip_whitespace();
            let value = parser.quoted().or_else(|| parser.token());
            params.insert(name.to_ascii_lowercase(), value.unwrap_or_default());
            parser.skip_whitespace();
            parser.eat(',');
        }

        challenges.push(Challenge { scheme, params });
    }

    challenges
}

/// `Basic base64(user:password)`
pub fn basic_authorization(credentials: &Credentials) -> String {
    let pair = format!(
        "{}:{}",
        credentials.username().as_str(),
        credentials.password().as_str()
    );
    format!("Basic {}", STANDARD.encode(pair))
}

/// Random client nonce for Digest `qop=auth`
pub fn new_cnonce() -> String {
    format!("{:016x}", rand::thread_rng().gen::<u64>())
}

/// Digest `Authorization` value answering `challenge`
///
/// `uri` is the request target (path and query). Supports `MD5` and
/// `MD5-sess`; when the server offers `qop=auth` the response uses nonce
/// count `00000001` and `cnonce`. A `qop` list without `auth` is refused.
pub fn digest_authorization(
    challenge: &Challenge,
    credentials: &Credentials,
    method: &str,
    uri: &str,
    cnonce: &str,
) -> Result<String, SessionError> {
    let realm = challenge
        .param("realm")
        .ok_or_else(|| SessionError::Challenge("Digest challenge without realm".to_string()))?;
    let nonce = challenge
        .param("nonce")
        .ok_or_else(|| SessionError::Challenge("Digest challenge without nonce".to_string()))?;
    let algorithm = challenge.param("algorithm").unwrap_or("MD5");
    let qop_auth = match challenge.param("qop") {
        None => false,
        Some(qop) if qop.split(',').any(|q| q.trim().eq_ignore_ascii_case("auth")) => true,
        Some(qop) => {
            return Err(SessionError::Challenge(format!(
                "Unsupported digest qop {}",
                qop
            )))
        }
    };

    let username = credentials.username().as_str();
    let nc = "00000001";

    let mut ha1 = md5_hex(&format!(
        "{}:{}:{}",
        username,
        realm,
        credentials.password().as_str()
    ));
    if algorithm.eq_ignore_ascii_case("MD5-sess") {
        ha1 = md5_hex(&format!("{}:{}:{}", ha1, nonce, cnonce));
    } else if !algorithm.eq_ignore_ascii_case("MD5") {
        return Err(SessionError::Challenge(format!(
            "Unsupported digest algorithm {}",
            algorithm
        )));
    }
    let ha2 = md5_hex(&format!("{}:{}", method, uri));

    let response = if qop_auth {
        md5_hex(&format!("{}:{}:{}:{}:auth:{}", ha1, nonce, nc, cnonce, ha2))
    } else {
        md5_hex(&format!("{}:{}:{}", ha1, nonce, ha2))
    };

    let mut header = format!(
        "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\", algorithm={}",
        quote_escape(username),
        quote_escape(realm),
        quote_escape(nonce),
        quote_escape(uri),
        response,
        algorithm
    );
    if let Some(opaque) = challenge.param("opaque") {
        header.push_str(&format!(", opaque=\"{}\"", quote_escape(opaque)));
    }
    if qop_auth {
        header.push_str(&format!(", qop=auth, nc={}, cnonce=\"{}\"", nc, cnonce));
    }

    Ok(header)
}

/// Backslash-escape `"` and `\` for a quoted-string
fn quote_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c as u8) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// RFC 7230 token (also accepts base64 `token68` padding)
    fn token(&mut self) -> Option<String> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            let is_tchar = c.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~/".contains(&c);
            if !is_tchar {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
    }

    /// Quoted string with backslash escapes, without the quotes
    fn quoted(&mut self) -> Option<String> {
        if !self.eat('"') {
            return None;
        }
        let mut out = Vec::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                b'"' => return Some(String::from_utf8_lossy(&out).into_owned()),
                b'\\' => {
                    if let Some(escaped) = self.peek() {
                        out.push(escaped);
                        self.pos += 1;
                    }
                }
                _ => out.push(c),
            }
        }
        // unterminated: keep what was read
        Some(String::from_utf8_lossy(&out).into_owned())
    }
}
