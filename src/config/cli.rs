use crate::config::store::StoreOverrides;
use crate::domain::ports::{FlightFilters, DEFAULT_PAGE_LIMIT};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "flight-tracker")]
#[command(about = "Query and record flights, positions and emission summaries")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Store base URL (overrides config and SUPABASE_URL)")]
    pub store_url: Option<String>,

    #[arg(long, global = true, help = "Store API key (overrides config and SUPABASE_KEY)")]
    pub store_key: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List flights matching the given filters
    List(ListArgs),
    /// Show one flight by its internal id
    Get { flight_id: i64 },
    /// Show one flight by its FlightRadar24 id
    GetFr24 { fr24_id: String },
    /// Add a flight read from a JSON file
    Add { file: PathBuf },
    /// Aggregate distance and emission savings over all flights
    Summary,
    /// Manage the GPS track of a flight
    Positions {
        #[command(subcommand)]
        action: PositionsCommand,
    },
    /// Check that the store answers
    Health,
}

#[derive(Debug, Clone, Subcommand)]
pub enum PositionsCommand {
    List { flight_id: i64 },
    /// Add positions read from a JSON array file
    Add { flight_id: i64, file: PathBuf },
    Delete { flight_id: i64 },
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[arg(long, help = "Match flight number, fr24 id or callsign")]
    pub search: Option<String>,

    #[arg(long, help = "Match departure or arrival ICAO code")]
    pub airport: Option<String>,

    #[arg(long)]
    pub aircraft_model: Option<String>,

    #[arg(long, value_name = "YYYY-MM-DD", help = "UTC departure date")]
    pub date: Option<NaiveDate>,

    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    pub limit: u32,

    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

impl From<&ListArgs> for FlightFilters {
    fn from(args: &ListArgs) -> Self {
        FlightFilters {
            search: args.search.clone(),
            airport: args.airport.clone(),
            aircraft_model: args.aircraft_model.clone(),
            flight_date: args.date,
            limit: args.limit,
            offset: args.offset,
        }
    }
}

impl CliConfig {
    pub fn overrides(&self) -> StoreOverrides {
        StoreOverrides {
            url: self.store_url.clone(),
            api_key: self.store_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_arguments_become_filters() {
        let cli = CliConfig::parse_from([
            "flight-tracker",
            "list",
            "--search",
            "UAL",
            "--date",
            "2024-05-01",
            "--limit",
            "20",
        ]);

        let Command::List(args) = &cli.command else {
            panic!("expected list command");
        };
        let filters = FlightFilters::from(args);
        assert_eq!(filters.search.as_deref(), Some("UAL"));
        assert_eq!(filters.flight_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(filters.limit, 20);
        assert_eq!(filters.offset, 0);
    }

    #[test]
    fn test_global_store_flags() {
        let cli = CliConfig::parse_from([
            "flight-tracker",
            "positions",
            "delete",
            "7",
            "--store-url",
            "http://localhost:54321",
        ]);

        assert!(matches!(
            cli.command,
            Command::Positions {
                action: PositionsCommand::Delete { flight_id: 7 }
            }
        ));
        assert_eq!(cli.overrides().url.as_deref(), Some("http://localhost:54321"));
        assert!(cli.overrides().api_key.is_none());
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(CliConfig::try_parse_from(["flight-tracker", "list", "--date", "01/05/2024"]).is_err());
    }
}
