//! Session/identity capability for the HTTP layer.
//!
//! An explicit, injected store replaces client-side token fabrication:
//! the server issues opaque tokens bound to an identity and an expiry.
//! Credential verification against a real identity provider is a separate
//! concern and not performed here.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who the caller is: a known profile, or a guest identified by a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "user_type", rename_all = "snake_case")]
pub enum UserIdentity {
    Profile {
        email: String,
    },
    Guest {
        booking_number: String,
        last_name: String,
    },
}

/// An issued session: opaque token plus expiry.
#[derive(Debug, Clone, Serialize)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    identity: UserIdentity,
    expires_at: DateTime<Utc>,
}

/// In-memory session store. Tokens expire after `ttl`; expired entries are
/// dropped on read.
pub struct SessionStore {
    sessions: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::days(7))
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn issue(&self, identity: UserIdentity) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + self.ttl;
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                identity,
                expires_at,
            },
        );
        metrics::counter!("sessions.issued").increment(1);
        SessionToken { token, expires_at }
    }

    pub fn resolve(&self, token: &str) -> Option<UserIdentity> {
        let entry = self.sessions.get(token)?;
        if entry.expires_at < Utc::now() {
            drop(entry);
            self.sessions.remove(token);
            return None;
        }
        Some(entry.identity.clone())
    }

    pub fn revoke(&self, token: &str) {
        self.sessions.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserIdentity {
        UserIdentity::Profile {
            email: "guest@example.com".to_string(),
        }
    }

    #[test]
    fn test_issue_and_resolve() {
        let store = SessionStore::default();
        let session = store.issue(profile());
        assert_eq!(store.resolve(&session.token), Some(profile()));
    }

    #[test]
    fn test_unknown_token() {
        let store = SessionStore::default();
        assert_eq!(store.resolve("nope"), None);
    }

    #[test]
    fn test_expired_token_dropped_on_read() {
        let store = SessionStore::new(Duration::seconds(-1));
        let session = store.issue(profile());
        assert_eq!(store.resolve(&session.token), None);
        // A second read also misses: the entry is gone, not just hidden.
        assert_eq!(store.resolve(&session.token), None);
    }

    #[test]
    fn test_revoke() {
        let store = SessionStore::default();
        let session = store.issue(UserIdentity::Guest {
            booking_number: "BK-1001".to_string(),
            last_name: "Smith".to_string(),
        });
        store.revoke(&session.token);
        assert_eq!(store.resolve(&session.token), None);
    }

    #[test]
    fn test_identity_serialization_shape() {
        let json = serde_json::to_value(profile()).unwrap();
        assert_eq!(json["user_type"], "profile");
        assert_eq!(json["email"], "guest@example.com");
    }
}
