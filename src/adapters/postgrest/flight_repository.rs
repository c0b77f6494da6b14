use crate::adapters::postgrest::client::StoreClient;
use crate::adapters::postgrest::query::{flight_search, Predicate, SelectQuery, FLIGHTS_TABLE};
use crate::domain::model::Flight;
use crate::domain::ports::{FlightFilters, FlightRepository, SummaryMetrics};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

pub const SUMMARY_FUNCTION: &str = "get_flight_summary_metrics";

/// [`FlightRepository`] over the `flights` table of a PostgREST store.
#[derive(Debug, Clone)]
pub struct PostgrestFlightRepository {
    store: StoreClient,
}

impl PostgrestFlightRepository {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    async fn get_one(&self, operation: &str, query: SelectQuery) -> Result<Option<Flight>> {
        match self.store.select_single(operation, &query).await? {
            Some(row) => Flight::from_row(row).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl FlightRepository for PostgrestFlightRepository {
    async fn add(&self, flight: &Flight) -> Result<Option<Flight>> {
        let row = flight.to_row()?;
        let inserted = self
            .store
            .insert("flights.add", FLIGHTS_TABLE, &Value::Object(row))
            .await
            .inspect_err(|e| tracing::error!("Error adding flight '{}': {}", flight.fr24_id, e))?;

        match inserted.into_iter().next() {
            Some(row) => Flight::from_row(row).map(Some),
            None => {
                tracing::warn!("Store returned no row for new flight '{}'", flight.fr24_id);
                Ok(None)
            }
        }
    }

    async fn get_by_id(&self, flight_id: i64) -> Result<Option<Flight>> {
        let query = SelectQuery::from(FLIGHTS_TABLE).and(Predicate::eq("flight_id", flight_id));
        self.get_one("flights.get_by_id", query)
            .await
            .inspect_err(|e| tracing::error!("Error retrieving flight by ID '{}': {}", flight_id, e))
    }

    async fn get_by_fr24_id(&self, fr24_id: &str) -> Result<Option<Flight>> {
        let query = SelectQuery::from(FLIGHTS_TABLE).and(Predicate::eq("fr24_id", fr24_id));
        self.get_one("flights.get_by_fr24_id", query)
            .await
            .inspect_err(|e| tracing::error!("Error retrieving flight by FR24 ID '{}': {}", fr24_id, e))
    }

    async fn find_all(&self, filters: &FlightFilters) -> Result<Vec<Flight>> {
        if filters.limit == 0 {
            return Ok(Vec::new());
        }

        let query = flight_search(filters);
        let rows = self
            .store
            .select("flights.find_all", &query)
            .await
            .inspect_err(|e| tracing::error!("Error retrieving flights with filters {:?}: {}", filters, e))?;

        tracing::debug!("find_all matched {} rows", rows.len());
        rows.into_iter().map(Flight::from_row).collect()
    }

    async fn get_summary_metrics(&self) -> Result<Option<SummaryMetrics>> {
        let rows = self
            .store
            .rpc("flights.summary", SUMMARY_FUNCTION, &json!({}))
            .await
            .inspect_err(|e| tracing::error!("Error retrieving summary metrics: {}", e))?;

        Ok(rows.into_iter().find_map(|row| match row {
            Value::Object(metrics) => Some(metrics),
            _ => None,
        }))
    }
}
