//! Role guard for route groups.
//!
//! Apply once per group instead of checking roles in every handler:
//!
//! ```ignore
//! Router::new()
//!     .route("/admin", get(admin_dashboard))
//!     .route_layer(from_fn_with_state(UserRole::Admin, require_role))
//! ```
//!
//! Requires [`crate::identity::authenticate`] to run first.

use axum::Json;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use parklot_domain::user::UserRole;

use crate::identity::Identity;

/// Why a request was turned away by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    /// No valid session.
    Unauthenticated,
    /// Valid session, wrong role for this route group.
    WrongRole { required: UserRole, actual: UserRole },
}

impl GuardRejection {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHORIZED",
            Self::WrongRole { .. } => "FORBIDDEN",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::WrongRole { .. } => StatusCode::FORBIDDEN,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthorized",
            Self::WrongRole { .. } => "forbidden",
        }
    }
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.message(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Check the caller against the role a route group requires.
pub fn check_role(identity: Option<&Identity>, required: UserRole) -> Result<(), GuardRejection> {
    let identity = identity.ok_or(GuardRejection::Unauthenticated)?;
    if identity.role != required {
        return Err(GuardRejection::WrongRole {
            required,
            actual: identity.role,
        });
    }
    Ok(())
}

/// Middleware admitting only callers holding the role given as layer state.
pub async fn require_role(
    State(required): State<UserRole>,
    request: Request,
    next: Next,
) -> Result<Response, GuardRejection> {
    if let Err(rejection) = check_role(request.extensions().get::<Identity>(), required) {
        tracing::debug!(
            path = %request.uri().path(),
            kind = rejection.kind(),
            "request rejected by role guard"
        );
        return Err(rejection);
    }
    Ok(next.run(request).await)
}
