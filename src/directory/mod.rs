//! Provider directory: the criterion catalog, the scoring engine, and the write path that
//! keeps every stored provider's score derived from its current selections.

pub mod criteria;
pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use criteria::{
    CriteriaCatalog, CriterionCategory, CriterionDefinition, CriterionKey, UnknownCriterionError,
};
pub use domain::{
    slugify, Category, CategoryId, Provider, ProviderDraft, ProviderId, ProviderListing,
    ProviderView,
};
pub use import::{ImportSummary, ProviderImportError, ProviderImporter};
pub use repository::{DirectoryRepository, InMemoryDirectory, RepositoryError};
pub use router::directory_router;
pub use scoring::{
    CriterionSelections, Grade, ScoreBreakdown, ScoreComponent, ScoringEngine, BASE_SCORE,
};
pub use service::{DirectoryService, DirectoryServiceError};
