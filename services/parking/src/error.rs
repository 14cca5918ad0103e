use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use parklot_auth_types::guard::GuardRejection;

/// Parking service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum ParkingServiceError {
    #[error("parking lot not found")]
    LotNotFound,
    #[error("reservation not found")]
    ReservationNotFound,
    #[error("parking lot has occupied spots")]
    LotHasOccupiedSpots,
    #[error("no available spot")]
    NoAvailableSpot,
    #[error("username already taken")]
    UsernameTaken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("invalid price")]
    InvalidPrice,
    #[error("invalid pin code")]
    InvalidPinCode,
    #[error("invalid number of spots")]
    InvalidSpotCount,
    #[error("missing data")]
    MissingData,
    #[error("unknown action")]
    UnknownAction,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ParkingServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LotNotFound => "LOT_NOT_FOUND",
            Self::ReservationNotFound => "RESERVATION_NOT_FOUND",
            Self::LotHasOccupiedSpots => "LOT_HAS_OCCUPIED_SPOTS",
            Self::NoAvailableSpot => "NO_AVAILABLE_SPOT",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidPrice => "INVALID_PRICE",
            Self::InvalidPinCode => "INVALID_PIN_CODE",
            Self::InvalidSpotCount => "INVALID_SPOT_COUNT",
            Self::MissingData => "MISSING_DATA",
            Self::UnknownAction => "UNKNOWN_ACTION",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<GuardRejection> for ParkingServiceError {
    fn from(rejection: GuardRejection) -> Self {
        match rejection {
            GuardRejection::Unauthenticated => Self::Unauthorized,
            GuardRejection::WrongRole { .. } => Self::Forbidden,
        }
    }
}

impl IntoResponse for ParkingServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::LotNotFound | Self::ReservationNotFound => StatusCode::NOT_FOUND,
            Self::LotHasOccupiedSpots | Self::NoAvailableSpot | Self::UsernameTaken => {
                StatusCode::CONFLICT
            }
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidPrice
            | Self::InvalidPinCode
            | Self::InvalidSpotCount
            | Self::MissingData
            | Self::UnknownAction => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
