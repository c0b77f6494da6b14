pub mod flight_use_cases;
pub mod position_use_cases;
pub mod summary_use_case;

pub use crate::domain::model::{Flight, FlightPosition, FlightSummary};
pub use crate::domain::ports::{ConfigProvider, FlightFilters, FlightRepository, PositionRepository};
pub use crate::utils::error::Result;
pub use flight_use_cases::FlightUseCase;
pub use position_use_cases::PositionUseCase;
pub use summary_use_case::FlightSummaryUseCase;
