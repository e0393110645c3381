//! Visitor sessions.
//!
//! Each session owns its own cart, the logged-in identity (if any) and the
//! id of the last order it placed.

use crate::account::Identity;
use crate::AuthError;
use bookstore_commerce::cart::Cart;
use bookstore_commerce::ids::OrderId;
use bookstore_commerce::money::Currency;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random session ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// State kept for one visitor.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub cart: Cart,
    /// Logged-in account, if any.
    pub user: Option<Identity>,
    /// Order placed most recently from this session.
    pub last_order_id: Option<OrderId>,
    /// A checkout is between cart snapshot and commit.
    pub checkout_in_progress: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    fn new(currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::generate(),
            cart: Cart::new(currency),
            user: None,
            last_order_id: None,
            checkout_in_progress: false,
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Logged-in identity or `NotAuthenticated`.
    pub fn require_user(&self) -> Result<&Identity, AuthError> {
        self.user.as_ref().ok_or(AuthError::NotAuthenticated)
    }

    /// Update last activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// No activity for longer than `max_idle` as of `now`.
    pub fn is_idle(&self, max_idle: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_activity_at > max_idle
    }
}

/// All open sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
    currency: Currency,
}

impl SessionStore {
    /// Sessions whose carts are priced in `currency`.
    pub fn new(currency: Currency) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            currency,
        }
    }

    /// Start a new anonymous session with an empty cart.
    pub fn open(&self) -> SessionId {
        let mut sessions = self.sessions.lock();
        loop {
            let session = Session::new(self.currency);
            if !sessions.contains_key(&session.id) {
                let id = session.id.clone();
                sessions.insert(id.clone(), session);
                debug!(session = %id, "session opened");
                return id;
            }
        }
    }

    /// Run `f` against a session while holding the lock.
    ///
    /// Keep `f` short: no hashing or payment calls.
    pub fn with_session<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, AuthError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| AuthError::SessionNotFound(id.to_string()))?;
        session.touch();
        Ok(f(session))
    }

    /// Snapshot of a session.
    pub fn get(&self, id: &SessionId) -> Result<Session, AuthError> {
        self.sessions
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| AuthError::SessionNotFound(id.to_string()))
    }

    /// Mark a session as logged in.
    pub fn login(&self, id: &SessionId, identity: Identity) -> Result<(), AuthError> {
        self.with_session(id, |s| s.user = Some(identity))
    }

    /// Forget the logged-in identity. The cart is kept.
    pub fn logout(&self, id: &SessionId) -> Result<(), AuthError> {
        self.with_session(id, |s| s.user = None)
    }

    /// Drop a session entirely.
    pub fn close(&self, id: &SessionId) -> bool {
        let closed = self.sessions.lock().remove(id).is_some();
        if closed {
            debug!(session = %id, "session closed");
        }
        closed
    }

    /// Drop sessions idle for longer than `max_idle`. Returns how many went.
    ///
    /// Sessions with a checkout in progress are kept.
    pub fn expire_idle(&self, max_idle: Duration, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.checkout_in_progress || !s.is_idle(max_idle, now));
        let expired = before - sessions.len();
        if expired > 0 {
            debug!(expired, remaining = sessions.len(), "idle sessions expired");
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_commerce::catalog::Catalog;

    #[test]
    fn test_session_id_generation() {
        let id1 = SessionId::generate();
        let id2 = SessionId::generate();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("sess_"));
        assert_eq!(id1.as_str().len(), "sess_".len() + 24);
    }

    #[test]
    fn test_sessions_have_separate_carts() {
        let store = SessionStore::new(Currency::USD);
        let catalog = Catalog::demo();
        let a = store.open();
        let b = store.open();

        store
            .with_session(&a, |s| s.cart.add(catalog.get("1984").unwrap(), 2))
            .unwrap()
            .unwrap();

        assert_eq!(store.get(&a).unwrap().cart.total_item_count(), 2);
        assert!(store.get(&b).unwrap().cart.is_empty());
    }

    #[test]
    fn test_login_logout_keeps_cart() {
        let store = SessionStore::new(Currency::USD);
        let catalog = Catalog::demo();
        let id = store.open();
        store
            .with_session(&id, |s| s.cart.add(catalog.get("Moby Dick").unwrap(), 1))
            .unwrap()
            .unwrap();

        let identity = Identity {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
        };
        store.login(&id, identity.clone()).unwrap();
        assert_eq!(store.get(&id).unwrap().require_user(), Ok(&identity));

        store.logout(&id).unwrap();
        let session = store.get(&id).unwrap();
        assert_eq!(session.require_user(), Err(AuthError::NotAuthenticated));
        assert_eq!(session.cart.line_count(), 1);
    }

    #[test]
    fn test_expire_idle_sessions() {
        let store = SessionStore::new(Currency::USD);
        let stale = store.open();
        let busy = store.open();
        store.with_session(&busy, |s| s.checkout_in_progress = true).unwrap();

        let later = Utc::now() + Duration::minutes(45);
        let fresh = store.open();
        store.with_session(&fresh, |s| s.last_activity_at = later).unwrap();

        assert_eq!(store.expire_idle(Duration::minutes(30), later), 1);
        assert!(store.get(&stale).is_err());
        assert!(store.get(&busy).is_ok());
        assert!(store.get(&fresh).is_ok());
        assert_eq!(store.expire_idle(Duration::minutes(30), Utc::now()), 0);
    }

    #[test]
    fn test_close_session() {
        let store = SessionStore::new(Currency::USD);
        let id = store.open();
        assert!(store.close(&id));
        assert!(store.is_empty());
        assert!(!store.close(&id));
    }

    #[test]
    fn test_unknown_session() {
        let store = SessionStore::new(Currency::USD);
        let ghost = SessionId::new("sess_ghost");
        assert_eq!(
            store.get(&ghost),
            Err(AuthError::SessionNotFound("sess_ghost".to_string()))
        );
        assert!(!store.close(&ghost));
    }
}
