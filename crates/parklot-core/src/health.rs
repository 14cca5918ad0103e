use axum::http::StatusCode;

/// Handler for `GET /healthz`: the process is up and serving HTTP.
///
/// Readiness depends on service resources (the database), so each service
/// provides its own `/readyz`.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
