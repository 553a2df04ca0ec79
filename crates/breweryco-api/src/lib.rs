// breweryco-api: Async Rust client for the Open Brewery DB REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::BreweryClient;
pub use error::Error;
pub use models::BreweryDto;
pub use transport::TransportConfig;
