use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parklot_auth_types::identity::Identity;

use crate::domain::types::ReservationDetail;
use crate::error::ParkingServiceError;
use crate::handlers::admin::LotResponse;
use crate::state::AppState;
use crate::usecase::reservation::{
    ListReservationsUseCase, PreviewReservationUseCase, ReleaseReservationUseCase,
    ReserveSpotUseCase,
};

const RELEASE_ACTION: &str = "release";

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ReservationResponse {
    pub id: i32,
    pub spot_id: Option<i32>,
    pub lot_id: Option<i32>,
    pub lot_name: Option<String>,
    #[serde(serialize_with = "parklot_core::serde::to_rfc3339_ms")]
    pub parking_timestamp: DateTime<Utc>,
    #[serde(serialize_with = "parklot_core::serde::to_rfc3339_ms_opt")]
    pub leaving_timestamp: Option<DateTime<Utc>>,
    pub parking_cost_per_unit_time: f64,
    pub is_active: bool,
    pub duration_hours: f64,
    /// Running estimate while active.
    pub total_cost: f64,
}

impl ReservationResponse {
    fn new(detail: ReservationDetail, now: DateTime<Utc>) -> Self {
        let r = detail.reservation;
        Self {
            id: r.id,
            spot_id: r.spot_id,
            lot_id: detail.lot_id,
            lot_name: detail.lot_name,
            parking_timestamp: r.parking_timestamp,
            leaving_timestamp: r.leaving_timestamp,
            parking_cost_per_unit_time: r.parking_cost_per_unit_time,
            is_active: r.is_open(),
            duration_hours: r.duration_hours(now),
            total_cost: r.cost(now),
        }
    }
}

#[derive(Serialize)]
pub struct ReservationListResponse {
    pub reservations: Vec<ReservationResponse>,
}

#[derive(Deserialize)]
pub struct ReservationActionForm {
    #[serde(default)]
    pub res_id: String,
    #[serde(default)]
    pub action: String,
}

// ── GET /reserve/{lot_id} ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ReservePreviewResponse {
    pub lot: LotResponse,
    pub spot_id: i32,
}

pub async fn preview_reservation(
    identity: Identity,
    State(state): State<AppState>,
    Path(lot_id): Path<i32>,
) -> Result<Json<ReservePreviewResponse>, ParkingServiceError> {
    let usecase = PreviewReservationUseCase {
        lots: state.lot_repo(),
        allocator: state.allocator(),
    };
    let (lot, spot) = usecase.execute(identity, lot_id).await?;
    Ok(Json(ReservePreviewResponse {
        lot: lot.into(),
        spot_id: spot.id,
    }))
}

// ── POST /reserve/{lot_id} ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ReserveResponse {
    pub lot: LotResponse,
    pub reservation: ReservationResponse,
}

pub async fn reserve(
    identity: Identity,
    State(state): State<AppState>,
    Path(lot_id): Path<i32>,
) -> Result<(StatusCode, Json<ReserveResponse>), ParkingServiceError> {
    let usecase = ReserveSpotUseCase {
        lots: state.lot_repo(),
        allocator: state.allocator(),
        reservations: state.reservation_repo(),
    };
    let output = usecase.execute(identity, lot_id).await?;

    let detail = ReservationDetail {
        reservation: output.reservation,
        lot_id: Some(output.lot.id),
        lot_name: Some(output.lot.prime_location_name.clone()),
    };
    Ok((
        StatusCode::CREATED,
        Json(ReserveResponse {
            lot: output.lot.into(),
            reservation: ReservationResponse::new(detail, Utc::now()),
        }),
    ))
}

// ── GET /my_reservations ─────────────────────────────────────────────────────

pub async fn my_reservations(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ReservationListResponse>, ParkingServiceError> {
    let reservations = list(&state, identity.user_id).await?;
    Ok(Json(ReservationListResponse { reservations }))
}

// ── POST /my_reservations ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ReleaseResponse {
    pub released: bool,
    pub reservations: Vec<ReservationResponse>,
}

pub async fn reservation_action(
    identity: Identity,
    State(state): State<AppState>,
    Form(form): Form<ReservationActionForm>,
) -> Result<Json<ReleaseResponse>, ParkingServiceError> {
    match form.action.trim() {
        RELEASE_ACTION => {}
        "" => return Err(ParkingServiceError::MissingData),
        _ => return Err(ParkingServiceError::UnknownAction),
    }
    let reservation_id = form
        .res_id
        .trim()
        .parse::<i32>()
        .map_err(|_| ParkingServiceError::MissingData)?;

    let usecase = ReleaseReservationUseCase {
        reservations: state.reservation_repo(),
    };
    let released = usecase.execute(identity, reservation_id).await?;
    let reservations = list(&state, identity.user_id).await?;
    Ok(Json(ReleaseResponse {
        released,
        reservations,
    }))
}

async fn list(
    state: &AppState,
    user_id: i32,
) -> Result<Vec<ReservationResponse>, ParkingServiceError> {
    let usecase = ListReservationsUseCase {
        reservations: state.reservation_repo(),
    };
    let now = Utc::now();
    Ok(usecase
        .execute(user_id)
        .await?
        .into_iter()
        .map(|detail| ReservationResponse::new(detail, now))
        .collect())
}
