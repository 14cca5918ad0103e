use axum::{Json, extract::State};
use serde::Serialize;

use parklot_auth_types::identity::{Identity, MaybeIdentity};

use crate::error::ParkingServiceError;
use crate::handlers::account::UserResponse;
use crate::handlers::admin::LotSummaryResponse;
use crate::state::AppState;
use crate::usecase::account::{GetUserUseCase, ListUsersUseCase};
use crate::usecase::lot::ListLotsUseCase;

// ── GET / ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
    pub user: Option<UserResponse>,
}

pub async fn index(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
) -> Result<Json<IndexResponse>, ParkingServiceError> {
    let user = match identity {
        Some(identity) => {
            let usecase = GetUserUseCase {
                repo: state.user_repo(),
            };
            usecase.execute(identity.user_id).await?
        }
        None => None,
    };
    Ok(Json(IndexResponse {
        service: "parklot",
        user: user.map(Into::into),
    }))
}

// ── GET /admin ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AdminDashboardResponse {
    pub lots: Vec<LotSummaryResponse>,
    pub users: Vec<UserResponse>,
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
) -> Result<Json<AdminDashboardResponse>, ParkingServiceError> {
    let lots = ListLotsUseCase {
        repo: state.lot_repo(),
    }
    .execute()
    .await?;
    let users = ListUsersUseCase {
        repo: state.user_repo(),
    }
    .execute()
    .await?;
    Ok(Json(AdminDashboardResponse {
        lots: lots.into_iter().map(Into::into).collect(),
        users: users.into_iter().map(Into::into).collect(),
    }))
}

// ── GET /user ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserDashboardResponse {
    pub user_id: i32,
    pub lots: Vec<LotSummaryResponse>,
}

pub async fn user_dashboard(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<UserDashboardResponse>, ParkingServiceError> {
    let lots = ListLotsUseCase {
        repo: state.lot_repo(),
    }
    .execute()
    .await?;
    Ok(Json(UserDashboardResponse {
        user_id: identity.user_id,
        lots: lots.into_iter().map(Into::into).collect(),
    }))
}
