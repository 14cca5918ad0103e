use sea_orm::DatabaseConnection;

use parklot_auth_types::token::SessionKey;

use crate::infra::db::{
    DbLotRepository, DbReservationRepository, DbSpotRepository, DbUserRepository,
};
use crate::usecase::allocator::SpotAllocator;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub session_key: SessionKey,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn lot_repo(&self) -> DbLotRepository {
        DbLotRepository {
            db: self.db.clone(),
        }
    }

    pub fn reservation_repo(&self) -> DbReservationRepository {
        DbReservationRepository {
            db: self.db.clone(),
        }
    }

    pub fn allocator(&self) -> SpotAllocator<DbSpotRepository> {
        SpotAllocator {
            spots: DbSpotRepository {
                db: self.db.clone(),
            },
        }
    }
}
