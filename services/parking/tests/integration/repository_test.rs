use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use parklot_domain::spot::SpotStatus;
use parklot_domain::user::UserRole;
use parklot_parking::domain::repository::{
    LotRepository, ReservationRepository, SpotRepository, UserRepository,
};
use parklot_parking::domain::types::{LotDeletion, LotDraft, NewReservation};
use parklot_parking::error::ParkingServiceError;
use parklot_parking::infra::db::{
    DbLotRepository, DbReservationRepository, DbSpotRepository, DbUserRepository,
};
use parklot_parking::usecase::account::{BootstrapAdminUseCase, BootstrapOutcome};
use parklot_parking_schema::{parking_spots, reservations};

use crate::helpers::{seed_lot, seed_user, test_db};

fn new_reservation(spot_id: i32, user_id: i32) -> NewReservation {
    NewReservation {
        spot_id,
        user_id,
        parking_timestamp: Utc::now(),
        parking_cost_per_unit_time: 5.0,
    }
}

// ── Users ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_duplicate_username_at_insert() {
    let db = test_db().await;
    let repo = DbUserRepository { db: db.clone() };
    repo.create("alice", "h", UserRole::User).await.unwrap();

    let result = repo.create("alice", "h2", UserRole::User).await;
    assert!(matches!(result, Err(ParkingServiceError::UsernameTaken)));
    assert_eq!(repo.list_by_role(UserRole::User).await.unwrap().len(), 1);
}

#[tokio::test]
async fn should_seed_admin_exactly_once() {
    let db = test_db().await;
    let usecase = BootstrapAdminUseCase {
        repo: DbUserRepository { db: db.clone() },
    };

    let first = usecase.execute("adminpw").await.unwrap();
    assert!(matches!(first, BootstrapOutcome::Created(_)));
    let second = usecase.execute("adminpw").await.unwrap();
    assert!(matches!(second, BootstrapOutcome::AlreadyPresent));

    let repo = DbUserRepository { db: db.clone() };
    assert!(repo.exists_with_role(UserRole::Admin).await.unwrap());
    assert_eq!(repo.list_by_role(UserRole::Admin).await.unwrap().len(), 1);
    let admin = repo.find_by_username("admin").await.unwrap().unwrap();
    assert!(admin.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn should_refuse_bootstrap_when_admin_name_is_taken() {
    let db = test_db().await;
    seed_user(&db, "admin", UserRole::User).await;
    let result = BootstrapAdminUseCase {
        repo: DbUserRepository { db: db.clone() },
    }
    .execute("adminpw")
    .await;
    assert!(matches!(result, Err(ParkingServiceError::Internal(_))));
}

// ── Lots and spots ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_exact_spot_pool_across_insert_batches() {
    let db = test_db().await;
    for spots in [0, 1, 1000] {
        let lot = seed_lot(&db, "Batch", 1.0, spots).await;
        let stored = parking_spots::Entity::find()
            .filter(parking_spots::Column::LotId.eq(lot.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(stored, u64::from(spots));

        let summary = DbLotRepository { db: db.clone() }
            .find_summary(lot.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.available_spots, spots);
        assert_eq!(summary.occupied_spots, 0);
        assert_eq!(summary.lot.maximum_number_of_spots, spots as i32);
    }
}

#[tokio::test]
async fn should_update_metadata_but_not_pool() {
    let db = test_db().await;
    let repo = DbLotRepository { db: db.clone() };
    let lot = seed_lot(&db, "Old", 1.0, 3).await;
    let draft = LotDraft {
        prime_location_name: "New".into(),
        price: 2.5,
        address: "2 Side St".into(),
        pin_code: 42,
    };

    assert!(repo.update(lot.id, &draft).await.unwrap());
    assert!(!repo.update(lot.id + 100, &draft).await.unwrap());

    let summary = repo.find_summary(lot.id).await.unwrap().unwrap();
    assert_eq!(summary.lot.prime_location_name, "New");
    assert_eq!(summary.lot.price, 2.5);
    assert_eq!(summary.lot.pin_code, 42);
    assert_eq!(summary.lot.maximum_number_of_spots, 3);
    assert_eq!(summary.available_spots, 3);
}

#[tokio::test]
async fn should_allocate_lowest_available_spot() {
    let db = test_db().await;
    let user = seed_user(&db, "alice", UserRole::User).await;
    let lot = seed_lot(&db, "A", 1.0, 3).await;
    let spots = DbSpotRepository { db: db.clone() };
    let reservations = DbReservationRepository { db: db.clone() };

    let first = spots.first_available(lot.id).await.unwrap().unwrap();
    assert_eq!(first.status, SpotStatus::Available);
    reservations
        .claim(&new_reservation(first.id, user.id))
        .await
        .unwrap()
        .unwrap();

    let second = spots.first_available(lot.id).await.unwrap().unwrap();
    assert!(second.id > first.id);
}

// ── Claim / release ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_claim_spot_only_once() {
    let db = test_db().await;
    let user = seed_user(&db, "alice", UserRole::User).await;
    let lot = seed_lot(&db, "A", 1.0, 1).await;
    let spot = DbSpotRepository { db: db.clone() }
        .first_available(lot.id)
        .await
        .unwrap()
        .unwrap();
    let repo = DbReservationRepository { db: db.clone() };

    let won = repo.claim(&new_reservation(spot.id, user.id)).await.unwrap();
    let lost = repo.claim(&new_reservation(spot.id, user.id)).await.unwrap();

    let won = won.unwrap();
    assert_eq!(won.spot_id, Some(spot.id));
    assert!(won.is_open());
    assert!(lost.is_none());
    assert_eq!(reservations::Entity::find().count(&db).await.unwrap(), 1);

    let model = parking_spots::Entity::find_by_id(spot.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(model.status, SpotStatus::OCCUPIED_CODE);
}

#[tokio::test]
async fn should_release_once() {
    let db = test_db().await;
    let user = seed_user(&db, "alice", UserRole::User).await;
    let lot = seed_lot(&db, "A", 1.0, 1).await;
    let spots = DbSpotRepository { db: db.clone() };
    let spot = spots.first_available(lot.id).await.unwrap().unwrap();
    let repo = DbReservationRepository { db: db.clone() };
    let reservation = repo
        .claim(&new_reservation(spot.id, user.id))
        .await
        .unwrap()
        .unwrap();

    let leave = reservation.parking_timestamp + Duration::hours(2);
    assert!(repo.release(reservation.id, leave).await.unwrap());
    assert!(!repo.release(reservation.id, leave + Duration::hours(1)).await.unwrap());

    let stored = repo.find_by_id(reservation.id).await.unwrap().unwrap();
    let left = stored.leaving_timestamp.unwrap();
    assert!((left - leave).num_milliseconds().abs() < 1);
    assert!((stored.cost(Utc::now()) - 10.0).abs() < 1e-6);
    assert_eq!(spots.first_available(lot.id).await.unwrap(), Some(spot));
}

#[tokio::test]
async fn should_list_reservations_newest_first_with_lot_name() {
    let db = test_db().await;
    let user = seed_user(&db, "alice", UserRole::User).await;
    let other = seed_user(&db, "bob", UserRole::User).await;
    let lot = seed_lot(&db, "Harbor", 3.0, 3).await;
    let spots = DbSpotRepository { db: db.clone() };
    let repo = DbReservationRepository { db: db.clone() };

    let mut ids = Vec::new();
    for (offset, owner) in [(0, &user), (1, &other), (2, &user)] {
        let spot = spots.first_available(lot.id).await.unwrap().unwrap();
        let mut new = new_reservation(spot.id, owner.id);
        new.parking_timestamp = Utc::now() + Duration::minutes(offset);
        ids.push(repo.claim(&new).await.unwrap().unwrap().id);
    }

    let items = repo.list_for_user(user.id).await.unwrap();
    let listed: Vec<i32> = items.iter().map(|d| d.reservation.id).collect();
    assert_eq!(listed, vec![ids[2], ids[0]]);
    assert!(items.iter().all(|d| d.lot_id == Some(lot.id)));
    assert!(items.iter().all(|d| d.lot_name.as_deref() == Some("Harbor")));
}

// ── Deletion ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_only_vacant_lots_and_keep_history() {
    let db = test_db().await;
    let user = seed_user(&db, "alice", UserRole::User).await;
    let lot = seed_lot(&db, "A", 1.0, 2).await;
    let lots = DbLotRepository { db: db.clone() };
    let spot = DbSpotRepository { db: db.clone() }
        .first_available(lot.id)
        .await
        .unwrap()
        .unwrap();
    let repo = DbReservationRepository { db: db.clone() };
    let reservation = repo
        .claim(&new_reservation(spot.id, user.id))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        lots.delete_if_vacant(lot.id).await.unwrap(),
        LotDeletion::Occupied
    );
    assert!(lots.find_by_id(lot.id).await.unwrap().is_some());
    assert_eq!(
        parking_spots::Entity::find()
            .filter(parking_spots::Column::LotId.eq(lot.id))
            .count(&db)
            .await
            .unwrap(),
        2
    );

    repo.release(reservation.id, Utc::now()).await.unwrap();
    assert_eq!(
        lots.delete_if_vacant(lot.id).await.unwrap(),
        LotDeletion::Deleted
    );
    assert!(lots.find_by_id(lot.id).await.unwrap().is_none());
    assert_eq!(parking_spots::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(
        lots.delete_if_vacant(lot.id).await.unwrap(),
        LotDeletion::NotFound
    );

    let history = repo.list_for_user(user.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reservation.spot_id, None);
    assert_eq!(history[0].lot_id, None);
    assert_eq!(history[0].lot_name, None);
}
