//! In-memory session context
//!
//! Holds the bearer token and the logged-in user for the lifetime of the
//! client. Every request reads the token through this single accessor, so
//! a login or logout is immediately visible to all clones of the client.

use shared::client::UserInfo;
use std::sync::{Arc, RwLock};

/// Session data stored in memory during the client's lifecycle.
#[derive(Debug, Default)]
struct SessionData {
    /// Bearer token for HTTP API authentication.
    token: Option<String>,
    /// Current user information after login.
    user: Option<UserInfo>,
}

/// Shared handle to the session context.
///
/// Cheap to clone; all clones observe the same login state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionData>>,
}

impl Session {
    /// Creates a new empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the session with a pre-issued token (no user info).
    pub fn set_token(&self, token: impl Into<String>) {
        let mut data = self.inner.write().expect("Failed to lock session");
        data.token = Some(token.into());
    }

    /// Sets the token and user info after successful login.
    pub fn set_login(&self, token: String, user: UserInfo) {
        let mut data = self.inner.write().expect("Failed to lock session");
        data.token = Some(token);
        data.user = Some(user);
    }

    /// Clears the session data on logout.
    pub fn clear(&self) {
        let mut data = self.inner.write().expect("Failed to lock session");
        data.token = None;
        data.user = None;
    }

    /// Returns the bearer token if available.
    pub fn token(&self) -> Option<String> {
        let data = self.inner.read().expect("Failed to lock session");
        data.token.clone()
    }

    /// Returns the current user info if available.
    pub fn user(&self) -> Option<UserInfo> {
        let data = self.inner.read().expect("Failed to lock session");
        data.user.clone()
    }

    /// Whether a token is present.
    pub fn is_authenticated(&self) -> bool {
        let data = self.inner.read().expect("Failed to lock session");
        data.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserInfo {
        UserInfo {
            id: "u-1".to_string(),
            email: "lena@example.edu".to_string(),
            full_name: "Lena Novak".to_string(),
            role: "student".to_string(),
            gender: None,
        }
    }

    #[test]
    fn test_login_logout_lifecycle() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());

        session.set_login("tok-123".to_string(), user());
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("tok-123"));
        assert_eq!(session.user().map(|u| u.email), Some("lena@example.edu".to_string()));

        session.clear();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::new();
        let other = session.clone();

        session.set_token("tok-456");
        assert_eq!(other.token().as_deref(), Some("tok-456"));

        other.clear();
        assert!(session.token().is_none());
    }
}
