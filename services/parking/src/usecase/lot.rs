use crate::domain::repository::LotRepository;
use crate::domain::types::{Lot, LotDeletion, LotDraft, LotSummary};
use crate::error::ParkingServiceError;

// ── CreateLot ────────────────────────────────────────────────────────────────

pub struct CreateLotInput {
    pub draft: LotDraft,
    pub spot_count: u32,
}

pub struct CreateLotUseCase<R: LotRepository> {
    pub repo: R,
}

impl<R: LotRepository> CreateLotUseCase<R> {
    pub async fn execute(&self, input: CreateLotInput) -> Result<Lot, ParkingServiceError> {
        let lot = self
            .repo
            .create_with_spots(&input.draft, input.spot_count)
            .await?;
        tracing::info!(lot_id = lot.id, spots = input.spot_count, "parking lot created");
        Ok(lot)
    }
}

// ── GetLot ───────────────────────────────────────────────────────────────────

pub struct GetLotUseCase<R: LotRepository> {
    pub repo: R,
}

impl<R: LotRepository> GetLotUseCase<R> {
    pub async fn execute(&self, lot_id: i32) -> Result<LotSummary, ParkingServiceError> {
        self.repo
            .find_summary(lot_id)
            .await?
            .ok_or(ParkingServiceError::LotNotFound)
    }
}

// ── ListLots ─────────────────────────────────────────────────────────────────

pub struct ListLotsUseCase<R: LotRepository> {
    pub repo: R,
}

impl<R: LotRepository> ListLotsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<LotSummary>, ParkingServiceError> {
        self.repo.list_summaries().await
    }
}

// ── EditLot ──────────────────────────────────────────────────────────────────

pub struct EditLotUseCase<R: LotRepository> {
    pub repo: R,
}

impl<R: LotRepository> EditLotUseCase<R> {
    /// Replace lot metadata. The spot pool keeps its size.
    pub async fn execute(
        &self,
        lot_id: i32,
        draft: LotDraft,
    ) -> Result<LotSummary, ParkingServiceError> {
        if !self.repo.update(lot_id, &draft).await? {
            return Err(ParkingServiceError::LotNotFound);
        }
        tracing::info!(lot_id, "parking lot updated");
        self.repo
            .find_summary(lot_id)
            .await?
            .ok_or(ParkingServiceError::LotNotFound)
    }
}

// ── DeleteLot ────────────────────────────────────────────────────────────────

pub struct DeleteLotUseCase<R: LotRepository> {
    pub repo: R,
}

impl<R: LotRepository> DeleteLotUseCase<R> {
    pub async fn execute(&self, lot_id: i32) -> Result<(), ParkingServiceError> {
        match self.repo.delete_if_vacant(lot_id).await? {
            LotDeletion::Deleted => {
                tracing::info!(lot_id, "parking lot deleted");
                Ok(())
            }
            LotDeletion::NotFound => Err(ParkingServiceError::LotNotFound),
            LotDeletion::Occupied => {
                tracing::debug!(lot_id, "refusing to delete lot with occupied spots");
                Err(ParkingServiceError::LotHasOccupiedSpots)
            }
        }
    }
}
