use anyhow::Context as _;
use sea_orm::ConnectOptions;
use tracing::info;

use parklot_auth_types::token::SessionKey;
use parklot_core::config::Config as _;
use parklot_core::tracing::init_tracing;
use parklot_parking::config::ParkingConfig;
use parklot_parking::infra::db::{DbUserRepository, connect};
use parklot_parking::router::build_router;
use parklot_parking::state::AppState;
use parklot_parking::usecase::account::{BootstrapAdminUseCase, BootstrapOutcome};
use parklot_parking_migration::{Migrator, MigratorTrait};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ParkingConfig::from_env().context("load configuration")?;

    let db = connect(ConnectOptions::new(config.database_url.clone()))
        .await
        .context("connect to database")?;
    Migrator::up(&db, None).await.context("run migrations")?;

    let bootstrap = BootstrapAdminUseCase {
        repo: DbUserRepository { db: db.clone() },
    };
    let outcome = bootstrap
        .execute(&config.admin_password)
        .await
        .context("bootstrap admin account")?;
    if let BootstrapOutcome::AlreadyPresent = outcome {
        info!("admin account present");
    }

    let state = AppState {
        db,
        session_key: SessionKey::new(config.session_secret),
        cookie_secure: config.cookie_secure,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.parking_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("parking service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
