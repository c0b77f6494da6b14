use clap::Parser;
use flight_tracker::config::cli::{Command, PositionsCommand};
use flight_tracker::utils::{logger, validation::Validate};
use flight_tracker::{
    CliConfig, Flight, FlightFilters, FlightPosition, FlightSummaryUseCase, FlightUseCase,
    PositionUseCase, PostgrestFlightRepository, PostgrestPositionRepository, Result, StoreClient,
    StoreConfig, TomlConfig, TrackerError,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let file_config = match cli.config.as_ref().map(TomlConfig::from_file).transpose() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    };

    let logging = file_config.as_ref().map(|c| c.logging()).unwrap_or_default();
    let verbose = cli.verbose || logging.verbose.unwrap_or(false);
    if cli.json_logs || logging.json.unwrap_or(false) {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::debug!("CLI config: {:?}", cli.command);

    if let Err(e) = run(&cli, file_config.as_ref()).await {
        tracing::error!("❌ Command failed: {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: &CliConfig, file_config: Option<&TomlConfig>) -> Result<()> {
    let config = StoreConfig::resolve(&cli.overrides(), file_config)?;
    tracing::debug!("Store config: {:?}", config);

    let store = StoreClient::new(&config)?;
    let flights = FlightUseCase::new(PostgrestFlightRepository::new(store.clone()));

    match &cli.command {
        Command::List(args) => {
            let filters = FlightFilters::from(args);
            filters.validate()?;
            print_json(&flights.get_all_flights(&filters).await?)
        }
        Command::Get { flight_id } => print_json(&flights.get_flight_by_id(*flight_id).await?),
        Command::GetFr24 { fr24_id } => print_json(&flights.get_flight_by_fr24_id(fr24_id).await?),
        Command::Add { file } => {
            let mut flight: Flight = read_json(file)?;
            flight.flight_id = None;
            flight.validate()?;

            let created = flights.add_new_flight(&flight).await?;
            tracing::info!("✅ Flight with ID {:?} created successfully!", created.flight_id);
            print_json(&created)
        }
        Command::Summary => {
            let summary_use_case = FlightSummaryUseCase::new(PostgrestFlightRepository::new(store.clone()));
            match summary_use_case.execute().await? {
                Some(summary) => print_json(&summary),
                None => {
                    tracing::info!("No flight metrics available yet");
                    print_json(&serde_json::Value::Null)
                }
            }
        }
        Command::Positions { action } => {
            let positions = PositionUseCase::new(PostgrestPositionRepository::new(store.clone()));
            run_positions(&flights, &positions, action).await
        }
        Command::Health => {
            if store.health_check().await {
                println!("OK");
                Ok(())
            } else {
                Err(TrackerError::store("health_check", "store did not answer with success"))
            }
        }
    }
}

async fn run_positions(
    flights: &FlightUseCase<PostgrestFlightRepository>,
    positions: &PositionUseCase<PostgrestPositionRepository>,
    action: &PositionsCommand,
) -> Result<()> {
    match action {
        PositionsCommand::List { flight_id } => {
            flights.get_flight_by_id(*flight_id).await?;
            print_json(&positions.get_positions_for_flight(*flight_id).await?)
        }
        PositionsCommand::Add { flight_id, file } => {
            let flight = flights.get_flight_by_id(*flight_id).await?;
            let batch: Vec<FlightPosition> = read_json(file)?;
            for position in &batch {
                position.validate()?;
            }

            if !positions.add_positions_to_flight(*flight_id, &batch).await {
                return Err(TrackerError::CannotPersist {
                    fr24_id: flight.fr24_id,
                    reason: "failed to add flight positions".to_string(),
                });
            }
            tracing::info!("✅ Added {} positions to flight {}", batch.len(), flight_id);
            Ok(())
        }
        PositionsCommand::Delete { flight_id } => {
            let flight = flights.get_flight_by_id(*flight_id).await?;
            if !positions.delete_positions_for_flight(*flight_id).await {
                return Err(TrackerError::CannotPersist {
                    fr24_id: flight.fr24_id,
                    reason: "failed to delete flight positions".to_string(),
                });
            }
            tracing::info!("✅ Deleted positions of flight {}", flight_id);
            Ok(())
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
