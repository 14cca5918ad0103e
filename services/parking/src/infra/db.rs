use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr, TransactionTrait,
    sea_query::{Expr, Query, SelectStatement},
};

use parklot_domain::spot::SpotStatus;
use parklot_domain::user::UserRole;
use parklot_parking_schema::{parking_lots, parking_spots, reservations, users};

use crate::domain::repository::{
    LotRepository, ReservationRepository, SpotRepository, UserRepository,
};
use crate::domain::types::{
    Lot, LotDeletion, LotDraft, LotSummary, NewReservation, Reservation, ReservationDetail, Spot,
    User,
};
use crate::error::ParkingServiceError;

/// Rows per multi-row INSERT when creating a lot's spot pool. Keeps each
/// statement under SQLite's bound-parameter limit.
const SPOT_INSERT_BATCH: u32 = 400;

/// Open the pool and switch file-backed stores to WAL journaling. In-memory
/// databases keep their `memory` journal.
pub async fn connect(options: ConnectOptions) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let db = Database::connect(options).await?;
    db.execute_unprepared("PRAGMA journal_mode=WAL").await?;
    Ok(db)
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ParkingServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ParkingServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        model.map(user_from_model).transpose()
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, ParkingServiceError> {
        let result = users::ActiveModel {
            username: Set(username.to_owned()),
            password: Set(password_hash.to_owned()),
            role: Set(role.as_str().to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(model) => user_from_model(model),
            // A concurrent registration may win between the lookup and the insert.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(ParkingServiceError::UsernameTaken)
            }
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn exists_with_role(&self, role: UserRole) -> Result<bool, ParkingServiceError> {
        let count = users::Entity::find()
            .filter(users::Column::Role.eq(role.as_str()))
            .count(&self.db)
            .await
            .context("count users by role")?;
        Ok(count > 0)
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, ParkingServiceError> {
        let models = users::Entity::find()
            .filter(users::Column::Role.eq(role.as_str()))
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .context("list users by role")?;
        models.into_iter().map(user_from_model).collect()
    }
}

fn user_from_model(model: users::Model) -> Result<User, ParkingServiceError> {
    let role = model
        .role
        .parse::<UserRole>()
        .with_context(|| format!("decode role of user {}", model.id))?;
    Ok(User {
        id: model.id,
        username: model.username,
        password_hash: model.password,
        role,
    })
}

// ── Lot repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLotRepository {
    pub db: DatabaseConnection,
}

impl LotRepository for DbLotRepository {
    async fn create_with_spots(
        &self,
        draft: &LotDraft,
        spot_count: u32,
    ) -> Result<Lot, ParkingServiceError> {
        let model = self
            .db
            .transaction::<_, parking_lots::Model, sea_orm::DbErr>(|txn| {
                let draft = draft.clone();
                Box::pin(async move {
                    let lot = parking_lots::ActiveModel {
                        prime_location_name: Set(draft.prime_location_name),
                        price: Set(draft.price),
                        address: Set(draft.address),
                        pin_code: Set(draft.pin_code),
                        maximum_number_of_spots: Set(spot_count as i32),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    insert_spots(txn, lot.id, spot_count).await?;
                    Ok(lot)
                })
            })
            .await
            .context("create lot with spots")?;
        Ok(lot_from_model(model))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Lot>, ParkingServiceError> {
        let model = parking_lots::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find lot by id")?;
        Ok(model.map(lot_from_model))
    }

    async fn find_summary(&self, id: i32) -> Result<Option<LotSummary>, ParkingServiceError> {
        let Some(model) = parking_lots::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find lot by id")?
        else {
            return Ok(None);
        };
        let mut counts = spot_counts(&self.db, Some(id)).await?;
        Ok(Some(summarize(lot_from_model(model), &mut counts)))
    }

    async fn list_summaries(&self) -> Result<Vec<LotSummary>, ParkingServiceError> {
        let models = parking_lots::Entity::find()
            .order_by_asc(parking_lots::Column::Id)
            .all(&self.db)
            .await
            .context("list lots")?;
        let mut counts = spot_counts(&self.db, None).await?;
        Ok(models
            .into_iter()
            .map(|model| summarize(lot_from_model(model), &mut counts))
            .collect())
    }

    async fn update(&self, id: i32, draft: &LotDraft) -> Result<bool, ParkingServiceError> {
        let result = parking_lots::Entity::update_many()
            .col_expr(
                parking_lots::Column::PrimeLocationName,
                Expr::value(draft.prime_location_name.clone()),
            )
            .col_expr(parking_lots::Column::Price, Expr::value(draft.price))
            .col_expr(parking_lots::Column::Address, Expr::value(draft.address.clone()))
            .col_expr(parking_lots::Column::PinCode, Expr::value(draft.pin_code))
            .filter(parking_lots::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("update lot")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_if_vacant(&self, id: i32) -> Result<LotDeletion, ParkingServiceError> {
        let outcome = self
            .db
            .transaction::<_, LotDeletion, sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    // Both deletes carry the vacancy check so the transaction
                    // opens with a write and holds the lock for the reads below.
                    parking_spots::Entity::delete_many()
                        .filter(parking_spots::Column::LotId.eq(id))
                        .filter(Expr::exists(occupied_spots(id)).not())
                        .exec(txn)
                        .await?;
                    let deleted = parking_lots::Entity::delete_many()
                        .filter(parking_lots::Column::Id.eq(id))
                        .filter(Expr::exists(occupied_spots(id)).not())
                        .exec(txn)
                        .await?;
                    if deleted.rows_affected == 1 {
                        return Ok(LotDeletion::Deleted);
                    }
                    if parking_lots::Entity::find_by_id(id).one(txn).await?.is_none() {
                        return Ok(LotDeletion::NotFound);
                    }
                    Ok(LotDeletion::Occupied)
                })
            })
            .await
            .context("delete lot")?;
        Ok(outcome)
    }
}

fn occupied_spots(lot_id: i32) -> SelectStatement {
    Query::select()
        .expr(Expr::val(1))
        .from(parking_spots::Entity)
        .and_where(parking_spots::Column::LotId.eq(lot_id))
        .and_where(parking_spots::Column::Status.eq(SpotStatus::OCCUPIED_CODE))
        .to_owned()
}

async fn insert_spots(
    txn: &DatabaseTransaction,
    lot_id: i32,
    spot_count: u32,
) -> Result<(), sea_orm::DbErr> {
    let mut remaining = spot_count;
    while remaining > 0 {
        let batch = remaining.min(SPOT_INSERT_BATCH);
        parking_spots::Entity::insert_many((0..batch).map(|_| parking_spots::ActiveModel {
            lot_id: Set(lot_id),
            status: Set(SpotStatus::Available.code().to_owned()),
            ..Default::default()
        }))
        .exec(txn)
        .await?;
        remaining -= batch;
    }
    Ok(())
}

/// `(available, occupied)` spot counts per lot.
async fn spot_counts<C: ConnectionTrait>(
    db: &C,
    lot_id: Option<i32>,
) -> Result<HashMap<i32, (u32, u32)>, ParkingServiceError> {
    let mut query = parking_spots::Entity::find()
        .select_only()
        .column(parking_spots::Column::LotId)
        .column(parking_spots::Column::Status)
        .column_as(parking_spots::Column::Id.count(), "spots")
        .group_by(parking_spots::Column::LotId)
        .group_by(parking_spots::Column::Status);
    if let Some(id) = lot_id {
        query = query.filter(parking_spots::Column::LotId.eq(id));
    }
    let rows: Vec<(i32, String, i64)> = query
        .into_tuple()
        .all(db)
        .await
        .context("count spots by status")?;

    let mut counts: HashMap<i32, (u32, u32)> = HashMap::new();
    for (lot_id, status, n) in rows {
        let entry = counts.entry(lot_id).or_default();
        match SpotStatus::from_code(&status) {
            Some(SpotStatus::Available) => entry.0 += n as u32,
            Some(SpotStatus::Occupied) => entry.1 += n as u32,
            None => {
                return Err(anyhow::anyhow!("unknown spot status {status:?} in lot {lot_id}").into());
            }
        }
    }
    Ok(counts)
}

fn summarize(lot: Lot, counts: &mut HashMap<i32, (u32, u32)>) -> LotSummary {
    let (available_spots, occupied_spots) = counts.remove(&lot.id).unwrap_or_default();
    LotSummary {
        lot,
        available_spots,
        occupied_spots,
    }
}

fn lot_from_model(model: parking_lots::Model) -> Lot {
    Lot {
        id: model.id,
        prime_location_name: model.prime_location_name,
        price: model.price,
        address: model.address,
        pin_code: model.pin_code,
        maximum_number_of_spots: model.maximum_number_of_spots,
    }
}

// ── Spot repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSpotRepository {
    pub db: DatabaseConnection,
}

impl SpotRepository for DbSpotRepository {
    async fn first_available(&self, lot_id: i32) -> Result<Option<Spot>, ParkingServiceError> {
        let model = parking_spots::Entity::find()
            .filter(parking_spots::Column::LotId.eq(lot_id))
            .filter(parking_spots::Column::Status.eq(SpotStatus::AVAILABLE_CODE))
            .order_by_asc(parking_spots::Column::Id)
            .one(&self.db)
            .await
            .context("find first available spot")?;
        model.map(spot_from_model).transpose()
    }
}

fn spot_from_model(model: parking_spots::Model) -> Result<Spot, ParkingServiceError> {
    let status = SpotStatus::from_code(&model.status)
        .with_context(|| format!("unknown status {:?} of spot {}", model.status, model.id))?;
    Ok(Spot {
        id: model.id,
        lot_id: model.lot_id,
        status,
    })
}

// ── Reservation repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReservationRepository {
    pub db: DatabaseConnection,
}

impl ReservationRepository for DbReservationRepository {
    async fn claim(
        &self,
        reservation: &NewReservation,
    ) -> Result<Option<Reservation>, ParkingServiceError> {
        let model = self
            .db
            .transaction::<_, Option<reservations::Model>, sea_orm::DbErr>(|txn| {
                let new = reservation.clone();
                Box::pin(async move {
                    // Compare-and-swap: only an available spot may become occupied.
                    let claimed = parking_spots::Entity::update_many()
                        .col_expr(
                            parking_spots::Column::Status,
                            Expr::value(SpotStatus::OCCUPIED_CODE),
                        )
                        .filter(parking_spots::Column::Id.eq(new.spot_id))
                        .filter(parking_spots::Column::Status.eq(SpotStatus::AVAILABLE_CODE))
                        .exec(txn)
                        .await?;
                    if claimed.rows_affected != 1 {
                        return Ok(None);
                    }
                    let model = reservations::ActiveModel {
                        spot_id: Set(Some(new.spot_id)),
                        user_id: Set(new.user_id),
                        parking_timestamp: Set(new.parking_timestamp),
                        leaving_timestamp: Set(None),
                        parking_cost_per_unit_time: Set(new.parking_cost_per_unit_time),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    Ok(Some(model))
                })
            })
            .await
            .context("claim spot")?;
        Ok(model.map(reservation_from_model))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Reservation>, ParkingServiceError> {
        let model = reservations::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find reservation by id")?;
        Ok(model.map(reservation_from_model))
    }

    async fn release(&self, id: i32, at: DateTime<Utc>) -> Result<bool, ParkingServiceError> {
        let released = self
            .db
            .transaction::<_, bool, sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    // Write first: a deferred SQLite transaction that reads
                    // before writing cannot wait for the write lock.
                    let closed = reservations::Entity::update_many()
                        .col_expr(reservations::Column::LeavingTimestamp, Expr::value(at))
                        .filter(reservations::Column::Id.eq(id))
                        .filter(reservations::Column::LeavingTimestamp.is_null())
                        .exec(txn)
                        .await?;
                    if closed.rows_affected != 1 {
                        return Ok(false);
                    }
                    let spot_id = reservations::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .and_then(|model| model.spot_id);
                    if let Some(spot_id) = spot_id {
                        parking_spots::Entity::update_many()
                            .col_expr(
                                parking_spots::Column::Status,
                                Expr::value(SpotStatus::AVAILABLE_CODE),
                            )
                            .filter(parking_spots::Column::Id.eq(spot_id))
                            .exec(txn)
                            .await?;
                    }
                    Ok(true)
                })
            })
            .await
            .context("release reservation")?;
        Ok(released)
    }

    async fn list_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ReservationDetail>, ParkingServiceError> {
        let rows = reservations::Entity::find()
            .filter(reservations::Column::UserId.eq(user_id))
            .order_by_desc(reservations::Column::ParkingTimestamp)
            .order_by_desc(reservations::Column::Id)
            .find_also_related(parking_spots::Entity)
            .all(&self.db)
            .await
            .context("list reservations of user")?;

        let lot_ids: Vec<i32> = rows
            .iter()
            .filter_map(|(_, spot)| spot.as_ref().map(|s| s.lot_id))
            .collect();
        let lot_names: HashMap<i32, String> = if lot_ids.is_empty() {
            HashMap::new()
        } else {
            parking_lots::Entity::find()
                .filter(parking_lots::Column::Id.is_in(lot_ids))
                .all(&self.db)
                .await
                .context("load lots of reservations")?
                .into_iter()
                .map(|lot| (lot.id, lot.prime_location_name))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|(model, spot)| {
                let lot_id = spot.map(|s| s.lot_id);
                ReservationDetail {
                    reservation: reservation_from_model(model),
                    lot_id,
                    lot_name: lot_id.and_then(|id| lot_names.get(&id).cloned()),
                }
            })
            .collect())
    }
}

fn reservation_from_model(model: reservations::Model) -> Reservation {
    Reservation {
        id: model.id,
        spot_id: model.spot_id,
        user_id: model.user_id,
        parking_timestamp: model.parking_timestamp,
        leaving_timestamp: model.leaving_timestamp,
        parking_cost_per_unit_time: model.parking_cost_per_unit_time,
    }
}
