//! Signed session tokens.
//!
//! A session is a short HS256 JWT carrying the user id and role. It is stored
//! in the session cookie (see [`crate::cookie`]) and decoded once per request
//! by [`crate::identity::authenticate`].

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use parklot_domain::user::UserRole;

/// Session lifetime in seconds (24 hours). Also used as the cookie Max-Age.
pub const SESSION_TOKEN_EXP: u64 = 86_400;

/// HMAC secret used to sign and verify session tokens.
#[derive(Clone)]
pub struct SessionKey(Arc<str>);

impl SessionKey {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// Identity carried by a validated session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    pub user_id: i32,
    pub role: UserRole,
    pub exp: u64,
}

/// Errors returned by session token operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user id (decimal string) |
/// | `role` | custom | `"admin"` or `"user"` |
/// | `exp` | `exp` | expiration, seconds since epoch |
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: UserRole,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Issue a session token for `user_id`, returning the token and its expiry.
pub fn issue_session_token(
    user_id: i32,
    role: UserRole,
    key: &SessionKey,
) -> Result<(String, u64), AuthError> {
    let exp = now_secs() + SESSION_TOKEN_EXP;
    let claims = SessionClaims {
        sub: user_id.to_string(),
        role,
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(key.as_str().as_bytes()),
    )
    .map_err(AuthError::Signing)?;
    Ok((token, exp))
}

/// Validate a session cookie value, returning the identity it carries.
///
/// Validation: HS256, exp checked (default 60s leeway), required claims
/// `exp` + `sub`.
pub fn validate_session_token(token: &str, key: &SessionKey) -> Result<SessionInfo, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(key.as_str().as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    let user_id = data
        .claims
        .sub
        .parse::<i32>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(SessionInfo {
        user_id,
        role: data.claims.role,
        exp: data.claims.exp,
    })
}
