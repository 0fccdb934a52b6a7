//! Credential types for server authentication
//!
//! SECURITY: Credential types implement Drop to clear sensitive data.

use crate::utils::CredentialError;
use chrono::{DateTime, Utc};
use std::fmt;

/// Server account name
///
/// Aggregate-style servers accept either a bare user name or an e-mail
/// address, so only emptiness, length and control characters are checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    /// Create a new username after validation
    pub fn new(username: impl Into<String>) -> Result<Self, CredentialError> {
        let username = username.into();

        if username.is_empty() {
            return Err(CredentialError::InvalidUsername(
                "Username cannot be empty".to_string(),
            ));
        }

        if username.len() > 256 {
            return Err(CredentialError::InvalidUsername(
                "Username exceeds maximum length (256)".to_string(),
            ));
        }

        // ':' would split the Basic `user:password` pair in the wrong place
        if username.contains(':') || username.chars().any(char::is_control) {
            return Err(CredentialError::InvalidUsername(
                "Username contains ':' or control characters".to_string(),
            ));
        }

        Ok(Username(username))
    }

    /// Get the username as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Password that zeros memory on drop
///
/// SECURITY: This type never implements Display or Debug in a way that reveals the password.
pub struct SecureString(String);

impl Clone for SecureString {
    fn clone(&self) -> Self {
        SecureString(self.0.clone())
    }
}

impl SecureString {
    /// Create a new secure string
    pub fn new(password: impl Into<String>) -> Self {
        SecureString(password.into())
    }

    /// Get the password as a string slice
    ///
    /// Use this sparingly and only when building an `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for SecureString {
    fn drop(&mut self) {
        // SAFETY: We own this String and overwrite it with zeros, which is valid UTF-8
        unsafe {
            let bytes = self.0.as_bytes_mut();
            for byte in bytes {
                std::ptr::write_volatile(byte, 0);
            }
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString(*** {} bytes ***)", self.0.len())
    }
}

/// User name and password for a forms server
#[derive(Clone, Debug)]
pub struct Credentials {
    username: Username,
    password: SecureString,
}

impl Credentials {
    pub fn new(username: Username, password: SecureString) -> Self {
        Credentials { username, password }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password(&self) -> &SecureString {
        &self.password
    }
}

/// Credentials stamped with the moment they were registered
///
/// One instance is shared by every auth scope of a host, so the three scopes
/// age together.
#[derive(Debug)]
pub struct IssuedCredential {
    credentials: Credentials,
    issued_at: DateTime<Utc>,
}

impl IssuedCredential {
    pub fn new(credentials: Credentials, issued_at: DateTime<Utc>) -> Self {
        IssuedCredential {
            credentials,
            issued_at,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_validation() {
        assert!(Username::new("collector").is_ok());
        assert!(Username::new("collector@example.org").is_ok());
        assert!(Username::new("").is_err());
        assert!(Username::new("a".repeat(300)).is_err());
        assert!(Username::new("user:name").is_err());
        assert!(Username::new("user\nname").is_err());
    }

    #[test]
    fn test_secure_string_debug_no_leak() {
        let password = SecureString::new("secret123");
        let debug_output = format!("{:?}", password);
        assert!(!debug_output.contains("secret"));
        assert!(debug_output.contains("9 bytes"));
    }

    #[test]
    fn test_credentials_debug_no_leak() {
        let creds = Credentials::new(
            Username::new("collector").unwrap(),
            SecureString::new("hunter2"),
        );
        let debug_output = format!("{:?}", creds);
        assert!(debug_output.contains("collector"));
        assert!(!debug_output.contains("hunter2"));
    }
}
