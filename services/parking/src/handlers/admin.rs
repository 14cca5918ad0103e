use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::domain::types::{Lot, LotDraft, LotSummary, parse_spot_count};
use crate::error::ParkingServiceError;
use crate::handlers::FormDescriptor;
use crate::state::AppState;
use crate::usecase::lot::{
    CreateLotInput, CreateLotUseCase, DeleteLotUseCase, EditLotUseCase, GetLotUseCase,
};

const CREATE_LOT_FIELDS: &[&str] = &[
    "prime_location_name",
    "price",
    "address",
    "pin_code",
    "maximum_number_of_spots",
];

const EDIT_LOT_FIELDS: &[&str] = &["prime_location_name", "price", "address", "pin_code"];

// ── Request / response types ─────────────────────────────────────────────────

/// Raw lot form. Values stay strings so bad input maps to a typed error.
#[derive(Deserialize)]
pub struct LotForm {
    #[serde(default)]
    pub prime_location_name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub pin_code: String,
    /// Only read on creation.
    #[serde(default)]
    pub maximum_number_of_spots: String,
}

impl LotForm {
    fn draft(&self) -> Result<LotDraft, ParkingServiceError> {
        LotDraft::parse(
            &self.prime_location_name,
            &self.price,
            &self.address,
            &self.pin_code,
        )
    }
}

#[derive(Serialize)]
pub struct LotResponse {
    pub id: i32,
    pub prime_location_name: String,
    pub price: f64,
    pub address: String,
    pub pin_code: i64,
    pub maximum_number_of_spots: i32,
}

impl From<Lot> for LotResponse {
    fn from(lot: Lot) -> Self {
        Self {
            id: lot.id,
            prime_location_name: lot.prime_location_name,
            price: lot.price,
            address: lot.address,
            pin_code: lot.pin_code,
            maximum_number_of_spots: lot.maximum_number_of_spots,
        }
    }
}

#[derive(Serialize)]
pub struct LotSummaryResponse {
    #[serde(flatten)]
    pub lot: LotResponse,
    pub available_spots: u32,
    pub occupied_spots: u32,
}

impl From<LotSummary> for LotSummaryResponse {
    fn from(summary: LotSummary) -> Self {
        Self {
            lot: summary.lot.into(),
            available_spots: summary.available_spots,
            occupied_spots: summary.occupied_spots,
        }
    }
}

// ── GET /admin/create_lot ────────────────────────────────────────────────────

pub async fn create_lot_form() -> Json<FormDescriptor> {
    Json(FormDescriptor::post("/admin/create_lot", CREATE_LOT_FIELDS))
}

// ── POST /admin/create_lot ───────────────────────────────────────────────────

pub async fn create_lot(
    State(state): State<AppState>,
    Form(form): Form<LotForm>,
) -> Result<(StatusCode, Json<LotSummaryResponse>), ParkingServiceError> {
    let draft = form.draft()?;
    let spot_count = parse_spot_count(&form.maximum_number_of_spots)?;

    let usecase = CreateLotUseCase {
        repo: state.lot_repo(),
    };
    let lot = usecase
        .execute(CreateLotInput { draft, spot_count })
        .await?;
    let summary = LotSummary {
        lot,
        available_spots: spot_count,
        occupied_spots: 0,
    };
    Ok((StatusCode::CREATED, Json(summary.into())))
}

// ── GET /admin/edit_lot/{lot_id} ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct EditLotResponse {
    pub lot: LotSummaryResponse,
    pub form: FormDescriptor,
}

pub async fn edit_lot_form(
    State(state): State<AppState>,
    Path(lot_id): Path<i32>,
) -> Result<Json<EditLotResponse>, ParkingServiceError> {
    let usecase = GetLotUseCase {
        repo: state.lot_repo(),
    };
    let summary = usecase.execute(lot_id).await?;
    Ok(Json(EditLotResponse {
        lot: summary.into(),
        form: FormDescriptor::post(format!("/admin/edit_lot/{lot_id}"), EDIT_LOT_FIELDS),
    }))
}

// ── POST /admin/edit_lot/{lot_id} ────────────────────────────────────────────

pub async fn edit_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<i32>,
    Form(form): Form<LotForm>,
) -> Result<Json<LotSummaryResponse>, ParkingServiceError> {
    let draft = form.draft()?;
    let usecase = EditLotUseCase {
        repo: state.lot_repo(),
    };
    let summary = usecase.execute(lot_id, draft).await?;
    Ok(Json(summary.into()))
}

// ── GET /admin/delete_lot/{lot_id} ───────────────────────────────────────────

pub async fn delete_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ParkingServiceError> {
    let usecase = DeleteLotUseCase {
        repo: state.lot_repo(),
    };
    usecase.execute(lot_id).await?;
    Ok(Json(serde_json::json!({ "deleted": lot_id })))
}
