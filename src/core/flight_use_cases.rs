use crate::domain::model::Flight;
use crate::domain::ports::{FlightFilters, FlightRepository};
use crate::utils::error::{Result, TrackerError};

/// Flight operations on top of a [`FlightRepository`].
pub struct FlightUseCase<R: FlightRepository> {
    repository: R,
}

impl<R: FlightRepository> FlightUseCase<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Store a new flight and return it with its assigned `flight_id`.
    pub async fn add_new_flight(&self, new_flight: &Flight) -> Result<Flight> {
        let cannot_persist = |reason: String| TrackerError::CannotPersist {
            fr24_id: new_flight.fr24_id.clone(),
            reason,
        };

        match self.repository.add(new_flight).await {
            Ok(Some(flight)) => {
                tracing::info!(
                    "Added flight '{}' with id {:?}",
                    flight.fr24_id,
                    flight.flight_id
                );
                Ok(flight)
            }
            Ok(None) => Err(cannot_persist("store returned no row".to_string())),
            Err(e) => Err(cannot_persist(e.to_string())),
        }
    }

    pub async fn get_flight_by_id(&self, flight_id: i64) -> Result<Flight> {
        self.repository
            .get_by_id(flight_id)
            .await?
            .ok_or_else(|| TrackerError::flight_id_not_found(flight_id))
    }

    pub async fn get_flight_by_fr24_id(&self, fr24_id: &str) -> Result<Flight> {
        self.repository
            .get_by_fr24_id(fr24_id)
            .await?
            .ok_or_else(|| TrackerError::fr24_id_not_found(fr24_id))
    }

    pub async fn get_all_flights(&self, filters: &FlightFilters) -> Result<Vec<Flight>> {
        self.repository.find_all(filters).await
    }
}
