use crate::domain::model::{Flight, FlightPosition};
use crate::domain::ports::FlightFilters;
use crate::utils::error::{Result, TrackerError};
use url::Url;

pub const MAX_PAGE_LIMIT: u32 = 1000;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TrackerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TrackerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

fn invalid_input(field: &str, reason: impl std::fmt::Display) -> TrackerError {
    TrackerError::ValidationError {
        message: format!("{}: {}", field, reason),
    }
}

/// Four ASCII letters or digits, e.g. `KJFK`.
pub fn validate_icao_code(field_name: &str, code: &str) -> Result<()> {
    if code.len() == 4 && code.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(invalid_input(
            field_name,
            format!("'{}' is not a 4-character ICAO code", code),
        ))
    }
}

fn validate_non_negative(field_name: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(invalid_input(
            field_name,
            format!("{} must be a non-negative number", v),
        )),
        _ => Ok(()),
    }
}

/// Checks applied to user-supplied flights before they reach the use cases.
impl Validate for Flight {
    fn validate(&self) -> Result<()> {
        if self.fr24_id.trim().is_empty() {
            return Err(invalid_input("fr24_id", "is required"));
        }
        if let Some(code) = &self.departure_icao {
            validate_icao_code("departure_icao", code)?;
        }
        if let Some(code) = &self.arrival_icao {
            validate_icao_code("arrival_icao", code)?;
        }
        validate_non_negative("distance_calculated_km", self.distance_calculated_km)?;
        validate_non_negative("great_circle_distance_km", self.great_circle_distance_km)?;
        if let Some(seconds) = self.flight_duration_s {
            if seconds < 0 {
                return Err(invalid_input("flight_duration_s", "cannot be negative"));
            }
        }
        if let (Some(departure), Some(arrival)) = (self.departure_time_utc, self.arrival_time_utc) {
            if arrival < departure {
                return Err(invalid_input("arrival_time_utc", "is before departure_time_utc"));
            }
        }
        Ok(())
    }
}

impl Validate for FlightPosition {
    fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(invalid_input("latitude", format!("{} is out of range", self.latitude)));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(invalid_input(
                "longitude",
                format!("{} is out of range", self.longitude),
            ));
        }
        Ok(())
    }
}

impl Validate for FlightFilters {
    fn validate(&self) -> Result<()> {
        validate_range("limit", self.limit, 1, MAX_PAGE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_validate_url() {
        assert!(validate_url("store.url", "https://example.supabase.co").is_ok());
        assert!(validate_url("store.url", "http://localhost:54321").is_ok());
        assert!(validate_url("store.url", "").is_err());
        assert!(validate_url("store.url", "invalid-url").is_err());
        assert!(validate_url("store.url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("limit", 100u32, 1, 1000).is_ok());
        assert!(validate_range("limit", 0u32, 1, 1000).is_err());
        assert!(validate_range("limit", 1001u32, 1, 1000).is_err());
    }

    #[test]
    fn test_validate_icao_code() {
        assert!(validate_icao_code("arrival_icao", "KJFK").is_ok());
        assert!(validate_icao_code("arrival_icao", "JFK").is_err());
        assert!(validate_icao_code("arrival_icao", "K-FK").is_err());
    }

    #[test]
    fn test_validate_flight() {
        let mut flight = Flight::new("3a8f1c2d");
        flight.departure_icao = Some("LEMD".to_string());
        assert!(flight.validate().is_ok());

        flight.departure_time_utc = Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
        flight.arrival_time_utc = Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        assert!(flight.validate().is_err());

        assert!(Flight::new("  ").validate().is_err());

        let mut flight = Flight::new("x");
        flight.distance_calculated_km = Some(-1.0);
        assert!(flight.validate().is_err());
    }

    #[test]
    fn test_validate_position() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert!(FlightPosition::new(ts, 40.6, -73.8).validate().is_ok());
        assert!(FlightPosition::new(ts, 91.0, 0.0).validate().is_err());
        assert!(FlightPosition::new(ts, 0.0, 181.0).validate().is_err());
    }

    #[test]
    fn test_validate_filters() {
        assert!(FlightFilters::default().validate().is_ok());
        let filters = FlightFilters {
            limit: 0,
            ..Default::default()
        };
        assert!(filters.validate().is_err());
    }
}
