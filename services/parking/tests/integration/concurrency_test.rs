//! Contention on a file-backed store with several pooled connections.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use parklot_auth_types::identity::Identity;
use parklot_domain::spot::SpotStatus;
use parklot_domain::user::UserRole;
use parklot_parking::domain::types::{Reservation, User};
use parklot_parking::error::ParkingServiceError;
use parklot_parking::state::AppState;
use parklot_parking::usecase::lot::DeleteLotUseCase;
use parklot_parking::usecase::reservation::{ReleaseReservationUseCase, ReserveSpotUseCase};
use parklot_parking_schema::{parking_lots, parking_spots, reservations};

use crate::helpers::{FileDb, key, seed_lot, seed_user};

const POOL_SIZE: u32 = 8;

fn state(file: &FileDb) -> AppState {
    AppState {
        db: file.db.clone(),
        session_key: key(),
        cookie_secure: false,
    }
}

fn caller(user: &User) -> Identity {
    Identity {
        user_id: user.id,
        role: UserRole::User,
    }
}

async fn reserve(
    state: &AppState,
    caller: Identity,
    lot_id: i32,
) -> Result<Reservation, ParkingServiceError> {
    ReserveSpotUseCase {
        lots: state.lot_repo(),
        allocator: state.allocator(),
        reservations: state.reservation_repo(),
    }
    .execute(caller, lot_id)
    .await
    .map(|output| output.reservation)
}

async fn release(
    state: &AppState,
    caller: Identity,
    id: i32,
) -> Result<bool, ParkingServiceError> {
    ReleaseReservationUseCase {
        reservations: state.reservation_repo(),
    }
    .execute(caller, id)
    .await
}

async fn seed_users(file: &FileDb, count: usize) -> Vec<User> {
    let mut users = Vec::with_capacity(count);
    for i in 0..count {
        users.push(seed_user(&file.db, &format!("driver{i}"), UserRole::User).await);
    }
    users
}

async fn spots_with_status(file: &FileDb, lot_id: i32, status: SpotStatus) -> u64 {
    parking_spots::Entity::find()
        .filter(parking_spots::Column::LotId.eq(lot_id))
        .filter(parking_spots::Column::Status.eq(status.code()))
        .count(&file.db)
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_hand_last_spot_to_exactly_one_concurrent_caller() {
    let file = FileDb::new(POOL_SIZE).await;
    let lot_id = seed_lot(&file.db, "Last", 1.0, 1).await.id;
    let users = seed_users(&file, 8).await;

    let handles: Vec<_> = users
        .iter()
        .map(|user| {
            let state = state(&file);
            let caller = caller(user);
            tokio::spawn(async move { reserve(&state, caller, lot_id).await })
        })
        .collect();

    let mut won = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => won += 1,
            Err(ParkingServiceError::NoAvailableSpot) => {}
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }
    assert_eq!(won, 1);
    assert_eq!(reservations::Entity::find().count(&file.db).await.unwrap(), 1);
    assert_eq!(spots_with_status(&file, lot_id, SpotStatus::Occupied).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_close_reservation_once_under_concurrent_release() {
    let file = FileDb::new(POOL_SIZE).await;
    let lot_id = seed_lot(&file.db, "Once", 2.0, 1).await.id;
    let owner = caller(&seed_user(&file.db, "owner", UserRole::User).await);
    let state = state(&file);
    let reservation_id = reserve(&state, owner, lot_id).await.unwrap().id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            tokio::spawn(async move { release(&state, owner, reservation_id).await })
        })
        .collect();

    let mut closed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() {
            closed += 1;
        }
    }
    assert_eq!(closed, 1);
    assert_eq!(spots_with_status(&file, lot_id, SpotStatus::Available).await, 1);
    let stored = reservations::Entity::find_by_id(reservation_id)
        .one(&file.db)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.leaving_timestamp.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_keep_lot_consistent_when_deleted_during_reservations() {
    let file = FileDb::new(POOL_SIZE).await;
    let users = seed_users(&file, 6).await;
    let state = state(&file);

    for round in 0..5 {
        let lot_id = seed_lot(&file.db, &format!("Doomed{round}"), 1.0, 3).await.id;

        let reservers: Vec<_> = users
            .iter()
            .map(|user| {
                let state = state.clone();
                let caller = caller(user);
                tokio::spawn(async move { reserve(&state, caller, lot_id).await })
            })
            .collect();
        let deleter = {
            let state = state.clone();
            tokio::spawn(async move {
                DeleteLotUseCase {
                    repo: state.lot_repo(),
                }
                .execute(lot_id)
                .await
            })
        };

        let mut reserved = 0;
        for handle in reservers {
            match handle.await.unwrap() {
                Ok(_) => reserved += 1,
                Err(ParkingServiceError::NoAvailableSpot | ParkingServiceError::LotNotFound) => {}
                Err(e) => panic!("unexpected reserve error: {e:?}"),
            }
        }
        let lot_exists = parking_lots::Entity::find_by_id(lot_id)
            .one(&file.db)
            .await
            .unwrap()
            .is_some();
        match deleter.await.unwrap() {
            Ok(()) => {
                assert!(!lot_exists);
                assert_eq!(reserved, 0, "no reservation may outlive a deleted lot");
                assert_eq!(spots_with_status(&file, lot_id, SpotStatus::Available).await, 0);
            }
            Err(ParkingServiceError::LotHasOccupiedSpots) => {
                assert!(lot_exists);
                assert!(reserved > 0);
                assert_eq!(
                    spots_with_status(&file, lot_id, SpotStatus::Occupied).await,
                    reserved
                );
            }
            Err(e) => panic!("unexpected delete error: {e:?}"),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_cycle_spots_without_store_errors() {
    let file = FileDb::new(POOL_SIZE).await;
    let lot_id = seed_lot(&file.db, "Busy", 3.0, 4).await.id;
    let users = seed_users(&file, 16).await;

    let handles: Vec<_> = users
        .iter()
        .map(|user| {
            let state = state(&file);
            let caller = caller(user);
            tokio::spawn(async move {
                let mut parked = 0;
                for _ in 0..20 {
                    match reserve(&state, caller, lot_id).await {
                        Ok(reservation) => {
                            assert!(release(&state, caller, reservation.id).await?);
                            parked += 1;
                        }
                        Err(ParkingServiceError::NoAvailableSpot) => {
                            tokio::task::yield_now().await
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok::<_, ParkingServiceError>(parked)
            })
        })
        .collect();

    let mut parked = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(n) => parked += n,
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }
    assert!(parked > 0);
    assert_eq!(spots_with_status(&file, lot_id, SpotStatus::Available).await, 4);
    let open = reservations::Entity::find()
        .filter(reservations::Column::LeavingTimestamp.is_null())
        .count(&file.db)
        .await
        .unwrap();
    assert_eq!(open, 0);
}
