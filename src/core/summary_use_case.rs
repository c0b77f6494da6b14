use crate::domain::model::FlightSummary;
use crate::domain::ports::FlightRepository;
use crate::utils::error::Result;

pub struct FlightSummaryUseCase<R: FlightRepository> {
    repository: R,
}

impl<R: FlightRepository> FlightSummaryUseCase<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Aggregate metrics over all flights, or `None` when there is nothing to summarize.
    pub async fn execute(&self) -> Result<Option<FlightSummary>> {
        let Some(metrics) = self.repository.get_summary_metrics().await? else {
            return Ok(None);
        };

        let summary = FlightSummary::from_metrics(&metrics);
        if summary.total_flights == 0 {
            tracing::debug!("Summary metrics report no flights");
            return Ok(None);
        }
        Ok(Some(summary))
    }
}
