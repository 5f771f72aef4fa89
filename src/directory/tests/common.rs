use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::directory::domain::{Category, CategoryId, Provider, ProviderDraft, ProviderId};
use crate::directory::repository::{DirectoryRepository, InMemoryDirectory, RepositoryError};
use crate::directory::scoring::CriterionSelections;
use crate::directory::{directory_router, CriterionKey, DirectoryService};

pub(super) fn build_service() -> (DirectoryService<InMemoryDirectory>, Arc<InMemoryDirectory>) {
    let repository = Arc::new(InMemoryDirectory::default());
    let service = DirectoryService::new(repository.clone());
    (service, repository)
}

pub(super) fn seeded_category(service: &DirectoryService<InMemoryDirectory>) -> Category {
    service
        .create_category("Utilities", None)
        .expect("category created")
}

pub(super) fn draft(category: &CategoryId, name: &str) -> ProviderDraft {
    ProviderDraft {
        name: name.to_string(),
        active: true,
        category: category.clone(),
        url: format!("https://{}.example.tw", name.to_lowercase()),
        requires_id_validation: true,
        selections: CriterionSelections::full_support(),
        created: None,
    }
}

pub(super) fn partial_support() -> CriterionSelections {
    CriterionSelections::from_keys(
        CriterionKey::LegacyArcSeparateSupport,
        CriterionKey::NewArcFullSupport,
        CriterionKey::ServicePartial,
        CriterionKey::RegistrationOnline,
    )
}

pub(super) fn worst_case() -> CriterionSelections {
    CriterionSelections::from_keys(
        CriterionKey::LegacyArcNoSupport,
        CriterionKey::NewArcNoSupport,
        CriterionKey::ServiceNone,
        CriterionKey::RegistrationOffline,
    )
}

pub(super) fn router_with_service(service: DirectoryService<InMemoryDirectory>) -> axum::Router {
    directory_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableRepository;

impl DirectoryRepository for UnavailableRepository {
    fn insert_category(&self, _category: Category) -> Result<Category, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_category(&self, _id: &CategoryId) -> Result<Option<Category>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_category(&self, _id: &CategoryId) -> Result<Category, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_provider(&self, _provider: Provider) -> Result<Provider, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_provider(&self, _provider: Provider) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_provider(&self, _id: &ProviderId) -> Result<Option<Provider>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_providers(&self) -> Result<Vec<Provider>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
