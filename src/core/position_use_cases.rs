use crate::domain::model::FlightPosition;
use crate::domain::ports::PositionRepository;
use crate::utils::error::Result;

/// Position operations on top of a [`PositionRepository`].
///
/// Mutations report plain success flags; store failures are logged and read as `false`.
pub struct PositionUseCase<R: PositionRepository> {
    repository: R,
}

impl<R: PositionRepository> PositionUseCase<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn add_positions_to_flight(&self, flight_id: i64, positions: &[FlightPosition]) -> bool {
        match self.repository.add_positions(flight_id, positions).await {
            Ok(added) => added,
            Err(e) => {
                tracing::warn!("Adding positions to flight {} failed: {}", flight_id, e);
                false
            }
        }
    }

    pub async fn get_positions_for_flight(&self, flight_id: i64) -> Result<Vec<FlightPosition>> {
        self.repository.get_positions_by_flight_id(flight_id).await
    }

    pub async fn delete_positions_for_flight(&self, flight_id: i64) -> bool {
        match self.repository.delete_positions_by_flight_id(flight_id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::warn!("Deleting positions of flight {} failed: {}", flight_id, e);
                false
            }
        }
    }
}
