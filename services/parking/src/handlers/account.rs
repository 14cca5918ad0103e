use axum::{Form, Json, extract::State, http::StatusCode};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use parklot_auth_types::cookie::{clear_session_cookie, set_session_cookie};
use parklot_domain::user::UserRole;

use crate::domain::types::User;
use crate::error::ParkingServiceError;
use crate::handlers::FormDescriptor;
use crate::state::AppState;
use crate::usecase::account::{LoginInput, LoginUseCase, RegisterInput, RegisterUseCase};

const CREDENTIAL_FIELDS: &[&str] = &["username", "password"];

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    /// Dashboard to continue to.
    pub redirect: &'static str,
    pub expires_at: u64,
}

// ── GET /register ────────────────────────────────────────────────────────────

pub async fn register_form() -> Json<FormDescriptor> {
    Json(FormDescriptor::post("/register", CREDENTIAL_FIELDS))
}

// ── POST /register ───────────────────────────────────────────────────────────

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<(StatusCode, Json<UserResponse>), ParkingServiceError> {
    let usecase = RegisterUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(RegisterInput {
            username: form.username,
            password: form.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /login ───────────────────────────────────────────────────────────────

pub async fn login_form() -> Json<FormDescriptor> {
    Json(FormDescriptor::post("/login", CREDENTIAL_FIELDS))
}

// ── POST /login ──────────────────────────────────────────────────────────────

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(CookieJar, Json<LoginResponse>), ParkingServiceError> {
    let usecase = LoginUseCase {
        repo: state.user_repo(),
        session_key: state.session_key.clone(),
    };
    let output = usecase
        .execute(LoginInput {
            username: form.username,
            password: form.password,
        })
        .await?;

    let jar = set_session_cookie(jar, output.token, state.cookie_secure);
    let redirect = output.user.role.dashboard_path();
    Ok((
        jar,
        Json(LoginResponse {
            user: output.user.into(),
            redirect,
            expires_at: output.expires_at,
        }),
    ))
}

// ── GET /logout ──────────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    let jar = clear_session_cookie(jar, state.cookie_secure);
    (jar, Json(serde_json::json!({ "redirect": "/" })))
}
