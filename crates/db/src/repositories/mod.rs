use thiserror::Error;

pub mod catalog;
pub mod lead;

pub use catalog::SqlCatalogRepository;
pub use lead::SqlLeadRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid persisted data: {0}")]
    Invalid(#[from] tarifa_core::DomainError),
}
