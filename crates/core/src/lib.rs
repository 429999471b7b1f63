pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod i18n;
pub mod pricing;

pub use catalog::{CatalogSnapshot, CatalogViolation};
pub use domain::catalog::{
    Bundle, BundleId, FiberTier, FiberTierId, GbAllowance, MobileTier, MobileTierId, Technology,
    NORMALIZED_UNLIMITED_GB,
};
pub use domain::lead::{Lead, LeadId, LeadStatus, LeadSubmission};
pub use domain::selection::{MobileLineRequest, TariffSelection};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use i18n::{Language, LocalizedText};
pub use pricing::{recommend, GreedyRecommendationEngine, Recommendation, RecommendationEngine};
