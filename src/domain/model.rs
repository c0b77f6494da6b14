use crate::domain::codec;
use crate::utils::error::{Result, TrackerError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat JSON object as stored in, or returned by, the store.
pub type Row = Map<String, Value>;

/// Seconds spent in each phase of flight. Stored as the `phase_durations_s` JSON column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    #[serde(default, deserialize_with = "codec::zero_if_null")]
    pub takeoff: i64,
    #[serde(default, deserialize_with = "codec::zero_if_null")]
    pub climb: i64,
    #[serde(default, deserialize_with = "codec::zero_if_null")]
    pub cruise: i64,
    #[serde(default, deserialize_with = "codec::zero_if_null")]
    pub descent: i64,
    #[serde(default, deserialize_with = "codec::zero_if_null")]
    pub landing: i64,
}

impl PhaseDurations {
    pub fn total(&self) -> i64 {
        self.takeoff + self.climb + self.cruise + self.descent + self.landing
    }
}

/// Fuel and CO2 figures from the per-phase fuel model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedCalculation {
    pub total_fuel_kg: Option<f64>,
    pub co2_total_kg: Option<f64>,
    pub co2_per_passenger_kg: Option<f64>,
    pub total_climate_impact_co2e_per_pax_kg: Option<f64>,
    pub efficiency_kg_pax_km: Option<f64>,
}

/// Fuel and CO2 figures from the statistical reference model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticalSimulation {
    pub total_fuel_kg: Option<f64>,
    pub co2_per_passenger_kg: Option<f64>,
    pub total_climate_impact_co2e_per_pax_kg: Option<f64>,
    pub efficiency_kg_pax_km: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionComparison {
    #[serde(default, deserialize_with = "codec::nested_object")]
    pub detailed_calculation: Option<DetailedCalculation>,
    #[serde(default, deserialize_with = "codec::nested_object")]
    pub statistical_simulation: Option<StatisticalSimulation>,
}

impl EmissionComparison {
    /// Fuel saved by the detailed estimate relative to the statistical one, in kg.
    pub fn fuel_saving_kg(&self) -> Option<f64> {
        let detailed = self.detailed_calculation.as_ref()?.total_fuel_kg?;
        let statistical = self.statistical_simulation.as_ref()?.total_fuel_kg?;
        Some(statistical - detailed)
    }
}

/// A flight record.
///
/// `flight_id` is assigned by the store; its presence is what marks the
/// instance as persisted. `fr24_id` comes from the data source and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_id: Option<i64>,
    pub fr24_id: String,
    #[serde(default)]
    pub flight: Option<String>,
    #[serde(default)]
    pub callsign: Option<String>,
    #[serde(default)]
    pub aircraft_model: Option<String>,
    #[serde(default)]
    pub aircraft_reg: Option<String>,
    #[serde(default)]
    pub departure_icao: Option<String>,
    #[serde(default)]
    pub arrival_icao: Option<String>,
    #[serde(default)]
    pub distance_calculated_km: Option<f64>,
    #[serde(default)]
    pub great_circle_distance_km: Option<f64>,
    #[serde(default, with = "codec::iso8601_option")]
    pub departure_time_utc: Option<DateTime<Utc>>,
    #[serde(default, with = "codec::iso8601_option")]
    pub arrival_time_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub flight_duration_s: Option<i64>,
    #[serde(default, deserialize_with = "codec::nested_object")]
    pub phase_durations_s: Option<PhaseDurations>,
    #[serde(default, deserialize_with = "codec::nested_object")]
    pub emission_comparison: Option<EmissionComparison>,
    #[serde(default = "codec::now", with = "codec::iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "codec::now", with = "codec::iso8601")]
    pub last_updated: DateTime<Utc>,
}

impl Flight {
    /// A brand-new, not yet persisted flight. Store-managed timestamps start at now.
    pub fn new(fr24_id: impl Into<String>) -> Self {
        let now = codec::now();
        Self {
            flight_id: None,
            fr24_id: fr24_id.into(),
            flight: None,
            callsign: None,
            aircraft_model: None,
            aircraft_reg: None,
            departure_icao: None,
            arrival_icao: None,
            distance_calculated_km: None,
            great_circle_distance_km: None,
            departure_time_utc: None,
            arrival_time_utc: None,
            flight_duration_s: None,
            phase_durations_s: None,
            emission_comparison: None,
            created_at: now,
            last_updated: now,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.flight_id.is_some()
    }

    /// Flat storage representation. `flight_id` is omitted while unset.
    pub fn to_row(&self) -> Result<Row> {
        into_row(self)
    }

    pub fn from_row(row: Value) -> Result<Self> {
        serde_json::from_value(row).map_err(|e| TrackerError::RowMapping {
            message: format!("flight row: {}", e),
        })
    }
}

/// One GPS sample of a flight's track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPosition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_id: Option<i64>,
    /// Owning flight; filled in by the repository when the batch is stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_id: Option<i64>,
    #[serde(with = "codec::iso8601")]
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<i32>,
    #[serde(default)]
    pub ground_speed: Option<i32>,
    #[serde(default)]
    pub vertical_rate: Option<i32>,
}

impl FlightPosition {
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            position_id: None,
            flight_id: None,
            timestamp,
            latitude,
            longitude,
            altitude: None,
            ground_speed: None,
            vertical_rate: None,
        }
    }

    pub fn to_row(&self) -> Result<Row> {
        into_row(self)
    }

    pub fn from_row(row: Value) -> Result<Self> {
        serde_json::from_value(row).map_err(|e| TrackerError::RowMapping {
            message: format!("flight position row: {}", e),
        })
    }
}

/// Aggregate metrics over all stored flights. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub total_flights: i64,
    pub avg_distance: f64,
    pub total_fuel_saving: f64,
    pub total_co2_saving: f64,
}

impl FlightSummary {
    /// Shape the scalar map returned by the store's aggregation routine.
    ///
    /// Values may be JSON numbers or numeric strings; missing ones read as zero.
    pub fn from_metrics(metrics: &Row) -> Self {
        Self {
            total_flights: scalar(metrics, "total_flights").map(|v| v as i64).unwrap_or(0),
            avg_distance: scalar(metrics, "avg_distance").unwrap_or(0.0),
            total_fuel_saving: scalar(metrics, "total_fuel_saving").unwrap_or(0.0),
            total_co2_saving: scalar(metrics, "total_co2_saving").unwrap_or(0.0),
        }
    }
}

fn scalar(metrics: &Row, key: &str) -> Option<f64> {
    match metrics.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn into_row<T: Serialize>(value: &T) -> Result<Row> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(TrackerError::RowMapping {
            message: format!("expected a JSON object, got {}", other),
        }),
    }
}
