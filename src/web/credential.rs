//! Aging credential storage keyed by auth scope
//!
//! Entries expire a fixed time after they were set. Expiry is checked on
//! every read; stale entries are evicted at that point and there is no
//! background sweep.

use super::auth_scope::{AuthScheme, AuthScope};
use crate::constants::CREDENTIAL_EXPIRY_SECS;
use crate::logger::log_debug_verbose;
use crate::models::{Credentials, IssuedCredential};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Credential map with lazy expiry
pub struct CredentialStore {
    entries: Mutex<HashMap<AuthScope, Arc<IssuedCredential>>>,
    expiry: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl CredentialStore {
    /// Store with the default 7-minute window and the system clock
    pub fn new() -> Self {
        Self::with_clock(default_expiry(), Arc::new(SystemClock))
    }

    pub fn with_clock(expiry: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            expiry,
            clock,
        }
    }

    /// Register one credential under every scope in `scopes`
    ///
    /// All scopes share a single issue timestamp and are written under one
    /// lock, so readers never observe a partially registered host.
    pub fn set_for_scopes(&self, scopes: &[AuthScope], credentials: Credentials) {
        let issued = Arc::new(IssuedCredential::new(credentials, self.clock.now()));
        let mut entries = self.lock();
        for scope in scopes {
            entries.insert(scope.clone(), Arc::clone(&issued));
        }
    }

    /// Credential registered for exactly `scope`, if still fresh
    pub fn get(&self, scope: &AuthScope) -> Option<Arc<IssuedCredential>> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let fresh = match entries.get(scope) {
            Some(entry) => self.is_fresh(entry, now),
            None => return None,
        };
        if fresh {
            entries.get(scope).cloned()
        } else {
            log_debug_verbose(&format!("Credential for {} expired", scope));
            entries.remove(scope);
            None
        }
    }

    /// Credential to answer a `scheme` challenge from `host:port`
    ///
    /// A scope bound to the exact port wins over an any-port scope.
    pub fn lookup(
        &self,
        host: &str,
        port: u16,
        scheme: AuthScheme,
    ) -> Option<Arc<IssuedCredential>> {
        let candidates: Vec<AuthScope> = {
            let entries = self.lock();
            let mut matching: Vec<AuthScope> = entries
                .keys()
                .filter(|scope| scope.matches(host, port, scheme))
                .cloned()
                .collect();
            matching.sort_by_key(|scope| scope.port().is_none());
            matching
        };

        candidates.iter().find_map(|scope| self.get(scope))
    }

    /// Drop every credential for every host
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of scope entries, fresh or not
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn is_fresh(&self, entry: &IssuedCredential, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.issued_at()) < self.expiry
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AuthScope, Arc<IssuedCredential>>> {
        // the map holds no invariant a panicking writer could break halfway
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 7-minute credential lifetime
pub fn default_expiry() -> TimeDelta {
    TimeDelta::seconds(CREDENTIAL_EXPIRY_SECS)
}

#[cfg(test)]
pub(crate) mod test_clock {
    use super::Clock;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use std::sync::Mutex;

    /// Clock that only moves when told to
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                now: Mutex::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
            }
        }

        pub fn advance(&self, by: TimeDelta) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_clock::ManualClock;
    use super::*;
    use crate::models::{SecureString, Username};
    use crate::web::auth_scope::scopes_for;

    fn creds(user: &str) -> Credentials {
        Credentials::new(Username::new(user).unwrap(), SecureString::new("pw"))
    }

    fn store_with_clock() -> (CredentialStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let store = CredentialStore::with_clock(default_expiry(), clock.clone());
        (store, clock)
    }

    #[test]
    fn one_credential_shared_across_scopes() {
        let (store, _clock) = store_with_clock();
        let scopes = scopes_for("server.example");
        store.set_for_scopes(&scopes, creds("alice"));

        let first = store.get(&scopes[0]).unwrap();
        let third = store.get(&scopes[2]).unwrap();
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(first.credentials().username().as_str(), "alice");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn entries_expire_and_are_evicted_on_read() {
        let (store, clock) = store_with_clock();
        let scopes = scopes_for("server.example");
        store.set_for_scopes(&scopes, creds("alice"));

        clock.advance(TimeDelta::seconds(CREDENTIAL_EXPIRY_SECS - 1));
        assert!(store.get(&scopes[0]).is_some());

        clock.advance(TimeDelta::seconds(1));
        assert!(store.get(&scopes[0]).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn renewal_restarts_the_window() {
        let (store, clock) = store_with_clock();
        let scopes = scopes_for("server.example");
        store.set_for_scopes(&scopes, creds("alice"));

        clock.advance(TimeDelta::minutes(5));
        store.set_for_scopes(&scopes, creds("alice"));
        clock.advance(TimeDelta::minutes(5));

        assert!(store.get(&scopes[1]).is_some());
    }

    #[test]
    fn lookup_respects_scheme_and_port() {
        let (store, _clock) = store_with_clock();
        store.set_for_scopes(&scopes_for("server.example"), creds("alice"));

        assert!(store.lookup("server.example", 8080, AuthScheme::Digest).is_some());
        assert!(store.lookup("SERVER.example", 443, AuthScheme::Basic).is_some());
        assert!(store.lookup("server.example", 8443, AuthScheme::Basic).is_some());
        assert!(store.lookup("server.example", 80, AuthScheme::Basic).is_none());
        assert!(store.lookup("other.example", 443, AuthScheme::Digest).is_none());
    }

    #[test]
    fn lookup_prefers_exact_port() {
        let (store, _clock) = store_with_clock();
        store.set_for_scopes(
            &[AuthScope::new("h", None, AuthScheme::Digest)],
            creds("anyport"),
        );
        store.set_for_scopes(
            &[AuthScope::new("h", Some(9000), AuthScheme::Digest)],
            creds("exact"),
        );

        let found = store.lookup("h", 9000, AuthScheme::Digest).unwrap();
        assert_eq!(found.credentials().username().as_str(), "exact");
        let found = store.lookup("h", 9001, AuthScheme::Digest).unwrap();
        assert_eq!(found.credentials().username().as_str(), "anyport");
    }

    #[test]
    fn clear_empties_every_host() {
        let (store, _clock) = store_with_clock();
        store.set_for_scopes(&scopes_for("a.example"), creds("alice"));
        store.set_for_scopes(&scopes_for("b.example"), creds("bob"));
        assert_eq!(store.len(), 6);

        store.clear();
        assert!(store.is_empty());
    }
}
