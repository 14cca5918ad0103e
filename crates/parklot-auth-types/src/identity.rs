//! Request-scoped caller identity.
//!
//! [`authenticate`] runs in front of every route: it decodes the session
//! cookie and, when valid, stores an [`Identity`] in the request extensions.
//! Handlers receive it through the [`Identity`] or [`MaybeIdentity`]
//! extractors; role enforcement lives in [`crate::guard`].

use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use http::request::Parts;

use parklot_domain::user::UserRole;

use crate::cookie::SESSION_COOKIE;
use crate::guard::GuardRejection;
use crate::token::{SessionKey, validate_session_token};

/// The authenticated caller of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub role: UserRole,
}

/// Middleware populating [`Identity`] from the session cookie.
///
/// Missing or invalid cookies leave the request anonymous; rejecting is the
/// guard's job.
pub async fn authenticate(
    State(key): State<SessionKey>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match validate_session_token(cookie.value(), &key) {
            Ok(info) => {
                request.extensions_mut().insert(Identity {
                    user_id: info.user_id,
                    role: info.role,
                });
            }
            Err(e) => tracing::debug!(error = %e, "ignoring invalid session cookie"),
        }
    }
    next.run(request).await
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parts.extensions.get::<Identity>().copied();
        async move { identity.ok_or(GuardRejection::Unauthenticated) }
    }
}

/// Extractor that yields the caller identity if there is one, never rejecting.
#[derive(Debug, Clone, Copy)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parts.extensions.get::<Identity>().copied();
        async move { Ok(Self(identity)) }
    }
}
