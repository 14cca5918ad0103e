use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::trace::TraceLayer;

use parklot_auth_types::guard::require_role;
use parklot_auth_types::identity::authenticate;
use parklot_core::health::healthz;
use parklot_core::middleware::{propagate_request_id_layer, request_id_layer};
use parklot_domain::user::UserRole;

use crate::handlers::{
    account::{login, login_form, logout, register, register_form},
    admin::{create_lot, create_lot_form, delete_lot, edit_lot, edit_lot_form},
    dashboard::{admin_dashboard, index, user_dashboard},
    health::readyz,
    reservation::{my_reservations, preview_reservation, reservation_action, reserve},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin", get(admin_dashboard))
        .route("/admin/create_lot", get(create_lot_form).post(create_lot))
        .route("/admin/edit_lot/{lot_id}", get(edit_lot_form).post(edit_lot))
        .route("/admin/delete_lot/{lot_id}", get(delete_lot))
        .route_layer(from_fn_with_state(UserRole::Admin, require_role));

    let user = Router::new()
        .route("/user", get(user_dashboard))
        .route("/reserve/{lot_id}", get(preview_reservation).post(reserve))
        .route(
            "/my_reservations",
            get(my_reservations).post(reservation_action),
        )
        .route_layer(from_fn_with_state(UserRole::User, require_role));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Accounts
        .route("/", get(index))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        // Guarded groups
        .merge(admin)
        .merge(user)
        .layer(from_fn_with_state(state.session_key.clone(), authenticate))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
