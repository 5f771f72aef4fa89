use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::criteria::UnknownCriterionError;
use super::domain::{Category, CategoryId, Provider, ProviderDraft, ProviderId, ProviderListing};
use super::repository::{DirectoryRepository, RepositoryError};
use super::scoring::{CriterionSelections, ScoreBreakdown, ScoringEngine};

/// Service composing the repository and the scoring engine. Every provider write goes
/// through here so scores are always engine-derived.
pub struct DirectoryService<R> {
    repository: Arc<R>,
    engine: ScoringEngine,
}

static PROVIDER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CATEGORY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_provider_id() -> ProviderId {
    let id = PROVIDER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProviderId(format!("prov-{id:06}"))
}

fn next_category_id() -> CategoryId {
    let id = CATEGORY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CategoryId(format!("cat-{id:06}"))
}

impl<R> DirectoryService<R>
where
    R: DirectoryRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_engine(repository, ScoringEngine::default())
    }

    pub fn with_engine(repository: Arc<R>, engine: ScoringEngine) -> Self {
        Self { repository, engine }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Score a set of selections without persisting anything.
    pub fn preview(
        &self,
        selections: &CriterionSelections,
    ) -> Result<ScoreBreakdown, DirectoryServiceError> {
        Ok(self.engine.breakdown(selections)?)
    }

    pub fn create_category(
        &self,
        name: &str,
        slug: Option<&str>,
    ) -> Result<Category, DirectoryServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryServiceError::EmptyCategoryName);
        }

        let category = Category::new(next_category_id(), name, slug);
        let stored = self.repository.insert_category(category)?;
        info!(category = %stored.id, slug = %stored.slug, "category created");
        Ok(stored)
    }

    pub fn delete_category(&self, id: &CategoryId) -> Result<Category, DirectoryServiceError> {
        match self.repository.delete_category(id) {
            Ok(category) => {
                info!(category = %id, "category deleted");
                Ok(category)
            }
            Err(err @ RepositoryError::CategoryInUse { .. }) => {
                warn!(category = %id, error = %err, "category delete blocked");
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn categories(&self) -> Result<Vec<Category>, DirectoryServiceError> {
        Ok(self.repository.list_categories()?)
    }

    pub fn create_provider(&self, draft: ProviderDraft) -> Result<Provider, DirectoryServiceError> {
        let provider = Provider::create(next_provider_id(), draft, &self.engine, Utc::now())?;
        let stored = self.repository.insert_provider(provider)?;
        info!(
            provider = %stored.id(),
            score = stored.score(),
            grade = %stored.grade(),
            "provider created"
        );
        Ok(stored)
    }

    /// Apply an edit and persist; the score is recomputed and `updated` restamped.
    pub fn update_provider(
        &self,
        id: &ProviderId,
        draft: ProviderDraft,
    ) -> Result<Provider, DirectoryServiceError> {
        let mut provider = self
            .repository
            .fetch_provider(id)?
            .ok_or(RepositoryError::NotFound)?;

        let previous = provider.score();
        provider.apply(draft, &self.engine, Utc::now())?;
        self.repository.update_provider(provider.clone())?;

        info!(
            provider = %provider.id(),
            previous,
            score = provider.score(),
            grade = %provider.grade(),
            "provider updated"
        );
        Ok(provider)
    }

    pub fn provider(&self, id: &ProviderId) -> Result<Provider, DirectoryServiceError> {
        let provider = self
            .repository
            .fetch_provider(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(provider)
    }

    /// Active providers as shown on the public listing, best score first.
    pub fn active_listings(&self) -> Result<Vec<ProviderListing>, DirectoryServiceError> {
        self.listings(false)
    }

    pub fn listings(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<ProviderListing>, DirectoryServiceError> {
        let categories = self.repository.list_categories()?;
        let category_name = |id: &CategoryId| {
            categories
                .iter()
                .find(|category| &category.id == id)
                .map(|category| category.name.clone())
                .unwrap_or_else(|| id.to_string())
        };

        let mut listings: Vec<ProviderListing> = self
            .repository
            .list_providers()?
            .into_iter()
            .filter(|provider| include_inactive || provider.active())
            .map(|provider| provider.listing(category_name(provider.category())))
            .collect();

        listings.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        debug!(count = listings.len(), include_inactive, "listings assembled");
        Ok(listings)
    }
}

/// Error raised by the directory service.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryServiceError {
    #[error(transparent)]
    Criterion(#[from] UnknownCriterionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("category name must not be empty")]
    EmptyCategoryName,
}
