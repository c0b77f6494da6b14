//! Store adapter for a PostgREST (Supabase REST) endpoint.

pub mod client;
pub mod flight_repository;
pub mod position_repository;
pub mod query;

pub use client::StoreClient;
pub use flight_repository::PostgrestFlightRepository;
pub use position_repository::PostgrestPositionRepository;
