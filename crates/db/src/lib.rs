pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, DbPool};
pub use fixtures::{production_rate_card, RateCardSeed, SeedResult, VerificationResult};
pub use repositories::{RepositoryError, SqlCatalogRepository, SqlLeadRepository};
