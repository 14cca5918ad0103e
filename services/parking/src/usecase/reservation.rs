use chrono::Utc;

use parklot_auth_types::guard::check_role;
use parklot_auth_types::identity::Identity;
use parklot_domain::user::UserRole;

use crate::domain::repository::{LotRepository, ReservationRepository, SpotRepository};
use crate::domain::types::{Lot, NewReservation, Reservation, ReservationDetail, Spot};
use crate::error::ParkingServiceError;
use crate::usecase::allocator::SpotAllocator;

/// Allocation rounds before a contended lot is reported as full.
pub const MAX_CLAIM_ATTEMPTS: usize = 5;

// ── ReserveSpot ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ReserveOutput {
    pub lot: Lot,
    pub reservation: Reservation,
}

pub struct ReserveSpotUseCase<L: LotRepository, S: SpotRepository, R: ReservationRepository> {
    pub lots: L,
    pub allocator: SpotAllocator<S>,
    pub reservations: R,
}

impl<L, S, R> ReserveSpotUseCase<L, S, R>
where
    L: LotRepository,
    S: SpotRepository,
    R: ReservationRepository,
{
    /// Claim the first available spot of the lot for the caller.
    ///
    /// A claim lost to a concurrent request sends the allocator back to the
    /// pool; after [`MAX_CLAIM_ATTEMPTS`] lost claims the lot is reported full.
    pub async fn execute(
        &self,
        caller: Identity,
        lot_id: i32,
    ) -> Result<ReserveOutput, ParkingServiceError> {
        check_role(Some(&caller), UserRole::User)?;
        let lot = self
            .lots
            .find_by_id(lot_id)
            .await?
            .ok_or(ParkingServiceError::LotNotFound)?;

        for attempt in 1..=MAX_CLAIM_ATTEMPTS {
            let spot = self.allocator.allocate(lot_id).await?;
            let new = NewReservation {
                spot_id: spot.id,
                user_id: caller.user_id,
                parking_timestamp: Utc::now(),
                parking_cost_per_unit_time: lot.price,
            };
            if let Some(reservation) = self.reservations.claim(&new).await? {
                tracing::info!(
                    lot_id,
                    spot_id = spot.id,
                    reservation_id = reservation.id,
                    user_id = caller.user_id,
                    "spot claimed"
                );
                return Ok(ReserveOutput { lot, reservation });
            }
            tracing::debug!(lot_id, spot_id = spot.id, attempt, "spot claimed concurrently, retrying");
        }

        tracing::warn!(lot_id, attempts = MAX_CLAIM_ATTEMPTS, "giving up on contended lot");
        Err(ParkingServiceError::NoAvailableSpot)
    }
}

// ── PreviewReservation ───────────────────────────────────────────────────────

pub struct PreviewReservationUseCase<L: LotRepository, S: SpotRepository> {
    pub lots: L,
    pub allocator: SpotAllocator<S>,
}

impl<L: LotRepository, S: SpotRepository> PreviewReservationUseCase<L, S> {
    /// The lot and the spot a reservation would get right now.
    pub async fn execute(
        &self,
        caller: Identity,
        lot_id: i32,
    ) -> Result<(Lot, Spot), ParkingServiceError> {
        check_role(Some(&caller), UserRole::User)?;
        let lot = self
            .lots
            .find_by_id(lot_id)
            .await?
            .ok_or(ParkingServiceError::LotNotFound)?;
        let spot = self.allocator.allocate(lot_id).await?;
        Ok((lot, spot))
    }
}

// ── ReleaseReservation ───────────────────────────────────────────────────────

pub struct ReleaseReservationUseCase<R: ReservationRepository> {
    pub reservations: R,
}

impl<R: ReservationRepository> ReleaseReservationUseCase<R> {
    /// Close the caller's reservation and free its spot.
    ///
    /// Returns `false` when the reservation was already released. Reservations
    /// of other users are reported as not found.
    pub async fn execute(
        &self,
        caller: Identity,
        reservation_id: i32,
    ) -> Result<bool, ParkingServiceError> {
        check_role(Some(&caller), UserRole::User)?;
        let reservation = self
            .reservations
            .find_by_id(reservation_id)
            .await?
            .filter(|r| r.user_id == caller.user_id)
            .ok_or(ParkingServiceError::ReservationNotFound)?;

        if !reservation.is_open() {
            tracing::debug!(reservation_id, "reservation already released");
            return Ok(false);
        }

        let released = self.reservations.release(reservation_id, Utc::now()).await?;
        if released {
            tracing::info!(
                reservation_id,
                spot_id = ?reservation.spot_id,
                user_id = caller.user_id,
                "reservation released"
            );
        }
        Ok(released)
    }
}

// ── ListReservations ─────────────────────────────────────────────────────────

pub struct ListReservationsUseCase<R: ReservationRepository> {
    pub reservations: R,
}

impl<R: ReservationRepository> ListReservationsUseCase<R> {
    pub async fn execute(&self, user_id: i32) -> Result<Vec<ReservationDetail>, ParkingServiceError> {
        self.reservations.list_for_user(user_id).await
    }
}
