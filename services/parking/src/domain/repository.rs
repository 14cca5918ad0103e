#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use parklot_domain::user::UserRole;

use crate::domain::types::{
    Lot, LotDeletion, LotDraft, LotSummary, NewReservation, Reservation, ReservationDetail, Spot,
    User,
};
use crate::error::ParkingServiceError;

/// Repository for login accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ParkingServiceError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ParkingServiceError>;

    /// Insert an account. Fails with `UsernameTaken` if the username exists.
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, ParkingServiceError>;

    async fn exists_with_role(&self, role: UserRole) -> Result<bool, ParkingServiceError>;
    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, ParkingServiceError>;
}

/// Repository for parking lots and their spot pools.
pub trait LotRepository: Send + Sync {
    /// Insert the lot and `spot_count` available spots atomically.
    async fn create_with_spots(
        &self,
        draft: &LotDraft,
        spot_count: u32,
    ) -> Result<Lot, ParkingServiceError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Lot>, ParkingServiceError>;
    async fn find_summary(&self, id: i32) -> Result<Option<LotSummary>, ParkingServiceError>;
    async fn list_summaries(&self) -> Result<Vec<LotSummary>, ParkingServiceError>;

    /// Overwrite lot metadata. Returns `false` if the lot does not exist.
    async fn update(&self, id: i32, draft: &LotDraft) -> Result<bool, ParkingServiceError>;

    /// Delete the lot and its spots unless any spot is occupied.
    async fn delete_if_vacant(&self, id: i32) -> Result<LotDeletion, ParkingServiceError>;
}

/// Read side of the spot pool.
pub trait SpotRepository: Send + Sync {
    /// Lowest-id available spot of the lot.
    async fn first_available(&self, lot_id: i32) -> Result<Option<Spot>, ParkingServiceError>;
}

/// Repository for reservations. Claims and releases also flip spot status.
pub trait ReservationRepository: Send + Sync {
    /// Mark the spot occupied only if it is still available, and record the
    /// reservation in the same transaction. Returns `None` when the spot was
    /// taken in the meantime.
    async fn claim(
        &self,
        reservation: &NewReservation,
    ) -> Result<Option<Reservation>, ParkingServiceError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Reservation>, ParkingServiceError>;

    /// Close an open reservation and free its spot. Returns `true` if this
    /// call performed the transition.
    async fn release(&self, id: i32, at: DateTime<Utc>) -> Result<bool, ParkingServiceError>;

    /// All reservations of the user, newest first.
    async fn list_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ReservationDetail>, ParkingServiceError>;
}
