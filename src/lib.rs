pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::postgrest::{PostgrestFlightRepository, PostgrestPositionRepository, StoreClient};
pub use config::{StoreConfig, TomlConfig};
pub use core::{FlightSummaryUseCase, FlightUseCase, PositionUseCase};
pub use domain::model::{
    DetailedCalculation, EmissionComparison, Flight, FlightPosition, FlightSummary,
    PhaseDurations, StatisticalSimulation,
};
pub use domain::ports::{FlightFilters, FlightRepository, PositionRepository};
pub use utils::error::{Result, TrackerError};
