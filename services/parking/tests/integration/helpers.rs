use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::path::PathBuf;

use sea_orm::{ConnectOptions, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;

use parklot_auth_types::token::SessionKey;
use parklot_domain::user::UserRole;
use parklot_parking::domain::repository::{LotRepository, UserRepository};
use parklot_parking::domain::types::{Lot, LotDraft, User};
use parklot_parking::infra::db::{DbLotRepository, DbUserRepository, connect};
use parklot_parking::router::build_router;
use parklot_parking::state::AppState;
use parklot_parking_migration::{Migrator, MigratorTrait};
use parklot_testing::request::read_json;
use parklot_testing::session::MockSession;

pub const TEST_SESSION_SECRET: &str = "integration-session-secret";

/// Fresh migrated in-memory database. A single pooled connection keeps the
/// in-memory database alive and shared by every query.
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// Migrated SQLite file shared by a pool of several connections, the way the
/// service runs in production. The file is removed on drop.
pub struct FileDb {
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl FileDb {
    pub async fn new(max_connections: u32) -> Self {
        let path = std::env::temp_dir().join(format!("parklot-{}.db", uuid::Uuid::new_v4()));
        let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
        options.max_connections(max_connections).sqlx_logging(false);
        let db = connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        Self { db, path }
    }
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub fn key() -> SessionKey {
    SessionKey::new(TEST_SESSION_SECRET)
}

pub fn app(db: &DatabaseConnection) -> Router {
    build_router(AppState {
        db: db.clone(),
        session_key: key(),
        cookie_secure: false,
    })
}

pub fn cookie_for(user: &User) -> String {
    MockSession::new(user.id, user.role).cookie(&key())
}

/// Insert an account directly. The stored hash is not a valid login.
pub async fn seed_user(db: &DatabaseConnection, username: &str, role: UserRole) -> User {
    DbUserRepository { db: db.clone() }
        .create(username, "not-a-phc-hash", role)
        .await
        .unwrap()
}

pub async fn seed_lot(db: &DatabaseConnection, name: &str, price: f64, spots: u32) -> Lot {
    let draft = LotDraft {
        prime_location_name: name.to_owned(),
        price,
        address: "1 Main St".to_owned(),
        pin_code: 600001,
    };
    DbLotRepository { db: db.clone() }
        .create_with_spots(&draft, spots)
        .await
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request).await.unwrap();
    read_json(resp).await
}
