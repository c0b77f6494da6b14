use crate::adapters::postgrest::client::StoreClient;
use crate::adapters::postgrest::query::{Predicate, SelectQuery, POSITIONS_TABLE};
use crate::domain::model::FlightPosition;
use crate::domain::ports::PositionRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

/// [`PositionRepository`] over the `flight_positions` table.
#[derive(Debug, Clone)]
pub struct PostgrestPositionRepository {
    store: StoreClient,
}

impl PostgrestPositionRepository {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    fn by_flight(flight_id: i64) -> SelectQuery {
        SelectQuery::from(POSITIONS_TABLE).and(Predicate::eq("flight_id", flight_id))
    }
}

#[async_trait]
impl PositionRepository for PostgrestPositionRepository {
    async fn add_positions(&self, flight_id: i64, positions: &[FlightPosition]) -> Result<bool> {
        if positions.is_empty() {
            tracing::debug!("No positions to add for flight {}", flight_id);
            return Ok(false);
        }

        let rows = positions
            .iter()
            .map(|position| -> Result<Value> {
                let mut row = position.to_row()?;
                row.insert("flight_id".to_string(), json!(flight_id));
                Ok(Value::Object(row))
            })
            .collect::<Result<Vec<_>>>()?;

        let inserted = self
            .store
            .insert("positions.add", POSITIONS_TABLE, &Value::Array(rows))
            .await
            .inspect_err(|e| {
                tracing::error!("Error adding flight positions for flight ID '{}': {}", flight_id, e)
            })?;

        tracing::debug!("Stored {} positions for flight {}", inserted.len(), flight_id);
        Ok(!inserted.is_empty())
    }

    async fn get_positions_by_flight_id(&self, flight_id: i64) -> Result<Vec<FlightPosition>> {
        let rows = self
            .store
            .select("positions.get", &Self::by_flight(flight_id))
            .await
            .inspect_err(|e| {
                tracing::error!("Error retrieving flight positions for flight ID '{}': {}", flight_id, e)
            })?;

        rows.into_iter().map(FlightPosition::from_row).collect()
    }

    async fn delete_positions_by_flight_id(&self, flight_id: i64) -> Result<bool> {
        self.store
            .delete("positions.delete", &Self::by_flight(flight_id))
            .await
            .inspect_err(|e| {
                tracing::error!("Error deleting flight positions for flight ID '{}': {}", flight_id, e)
            })?;
        Ok(true)
    }
}
