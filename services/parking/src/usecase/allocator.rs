use crate::domain::repository::SpotRepository;
use crate::domain::types::Spot;
use crate::error::ParkingServiceError;

/// Chooses which spot of a lot a new reservation gets.
///
/// Deterministic: the available spot with the lowest id, i.e. the first one
/// created. Read-only; the Available → Occupied transition is the caller's
/// claim.
pub struct SpotAllocator<S: SpotRepository> {
    pub spots: S,
}

impl<S: SpotRepository> SpotAllocator<S> {
    pub async fn allocate(&self, lot_id: i32) -> Result<Spot, ParkingServiceError> {
        self.spots
            .first_available(lot_id)
            .await?
            .ok_or(ParkingServiceError::NoAvailableSpot)
    }
}
