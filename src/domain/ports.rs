use crate::domain::model::{Flight, FlightPosition, Row};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Metrics row returned by the store-side aggregation routine.
pub type SummaryMetrics = Row;

/// Filters for [`FlightRepository::find_all`].
///
/// Different fields combine with AND; `search` and `airport` each match
/// several columns with OR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightFilters {
    /// Substring of the flight number, fr24 id or callsign.
    pub search: Option<String>,
    /// Substring of the departure or arrival ICAO code.
    pub airport: Option<String>,
    pub aircraft_model: Option<String>,
    /// UTC calendar day the flight departed on.
    pub flight_date: Option<NaiveDate>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for FlightFilters {
    fn default() -> Self {
        Self {
            search: None,
            airport: None,
            aircraft_model: None,
            flight_date: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Storage contract for flights.
///
/// `Ok(None)` and empty vectors mean "nothing matched"; `Err` means the store
/// could not answer.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    /// Insert a new flight. Returns the stored row, with its assigned `flight_id`,
    /// or `None` if the store accepted the request but returned nothing.
    async fn add(&self, flight: &Flight) -> Result<Option<Flight>>;

    async fn get_by_id(&self, flight_id: i64) -> Result<Option<Flight>>;

    async fn get_by_fr24_id(&self, fr24_id: &str) -> Result<Option<Flight>>;

    async fn find_all(&self, filters: &FlightFilters) -> Result<Vec<Flight>>;

    async fn get_summary_metrics(&self) -> Result<Option<SummaryMetrics>>;
}

/// Storage contract for flight position samples.
#[async_trait]
pub trait PositionRepository: Send + Sync {
    /// Store a batch of positions under `flight_id`. `Ok(false)` if the store
    /// reported no inserted rows.
    async fn add_positions(&self, flight_id: i64, positions: &[FlightPosition]) -> Result<bool>;

    async fn get_positions_by_flight_id(&self, flight_id: i64) -> Result<Vec<FlightPosition>>;

    async fn delete_positions_by_flight_id(&self, flight_id: i64) -> Result<bool>;
}

pub trait ConfigProvider: Send + Sync {
    fn store_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn request_timeout(&self) -> Duration;
}
