//! Mock session helpers for integration tests.
//!
//! Protected routes read the caller from the session cookie. `MockSession`
//! signs a cookie for an arbitrary identity so tests can skip the login flow.

use axum::http::{HeaderName, HeaderValue, header};

use parklot_auth_types::cookie::SESSION_COOKIE;
use parklot_auth_types::token::{SessionKey, issue_session_token};
use parklot_domain::user::UserRole;

/// Configurable identity injected into test requests.
pub struct MockSession {
    pub user_id: i32,
    pub role: UserRole,
}

impl MockSession {
    pub fn new(user_id: i32, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn admin(user_id: i32) -> Self {
        Self::new(user_id, UserRole::Admin)
    }

    pub fn user(user_id: i32) -> Self {
        Self::new(user_id, UserRole::User)
    }

    /// `Cookie` header value (`name=token`) as a logged-in browser would send it.
    pub fn cookie(&self, key: &SessionKey) -> String {
        let (token, _) = issue_session_token(self.user_id, self.role, key)
            .unwrap_or_else(|e| panic!("failed to sign mock session: {e}"));
        format!("{SESSION_COOKIE}={token}")
    }

    /// Return the `Cookie` header pair.
    pub fn header(&self, key: &SessionKey) -> (HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&self.cookie(key))
            .unwrap_or_else(|e| panic!("invalid cookie header: {e}"));
        (header::COOKIE, value)
    }
}
