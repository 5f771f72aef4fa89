use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{Category, CategoryId, Provider, ProviderId};

/// Storage abstraction owned by the persistence collaborator.
///
/// Implementations must refuse to delete a category while any provider references it.
pub trait DirectoryRepository: Send + Sync {
    fn insert_category(&self, category: Category) -> Result<Category, RepositoryError>;
    fn fetch_category(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError>;
    fn delete_category(&self, id: &CategoryId) -> Result<Category, RepositoryError>;
    fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;

    fn insert_provider(&self, provider: Provider) -> Result<Provider, RepositoryError>;
    fn update_provider(&self, provider: Provider) -> Result<(), RepositoryError>;
    fn fetch_provider(&self, id: &ProviderId) -> Result<Option<Provider>, RepositoryError>;
    fn list_providers(&self) -> Result<Vec<Provider>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("category {category} is referenced by {providers} provider(s)")]
    CategoryInUse {
        category: CategoryId,
        providers: usize,
    },
    #[error("category {0} does not exist")]
    MissingCategory(CategoryId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct DirectoryState {
    categories: BTreeMap<CategoryId, Category>,
    providers: BTreeMap<ProviderId, Provider>,
}

impl DirectoryState {
    fn references(&self, category: &CategoryId) -> usize {
        self.providers
            .values()
            .filter(|provider| provider.category() == category)
            .count()
    }
}

/// Mutex-guarded reference store used by the service binary and tests.
///
/// Categories and providers share one lock so reference checks and deletes are atomic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl InMemoryDirectory {
    fn lock(&self) -> Result<MutexGuard<'_, DirectoryState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("directory lock poisoned".to_string()))
    }
}

impl DirectoryRepository for InMemoryDirectory {
    fn insert_category(&self, category: Category) -> Result<Category, RepositoryError> {
        let mut state = self.lock()?;
        if state.categories.contains_key(&category.id) {
            return Err(RepositoryError::Conflict);
        }
        state.categories.insert(category.id.clone(), category.clone());
        Ok(category)
    }

    fn fetch_category(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(self.lock()?.categories.get(id).cloned())
    }

    fn delete_category(&self, id: &CategoryId) -> Result<Category, RepositoryError> {
        let mut state = self.lock()?;
        if !state.categories.contains_key(id) {
            return Err(RepositoryError::NotFound);
        }

        let providers = state.references(id);
        if providers > 0 {
            return Err(RepositoryError::CategoryInUse {
                category: id.clone(),
                providers,
            });
        }

        state.categories.remove(id).ok_or(RepositoryError::NotFound)
    }

    fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories: Vec<_> = self.lock()?.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn insert_provider(&self, provider: Provider) -> Result<Provider, RepositoryError> {
        let mut state = self.lock()?;
        if state.providers.contains_key(provider.id()) {
            return Err(RepositoryError::Conflict);
        }
        if !state.categories.contains_key(provider.category()) {
            return Err(RepositoryError::MissingCategory(provider.category().clone()));
        }
        state.providers.insert(provider.id().clone(), provider.clone());
        Ok(provider)
    }

    fn update_provider(&self, provider: Provider) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if !state.providers.contains_key(provider.id()) {
            return Err(RepositoryError::NotFound);
        }
        if !state.categories.contains_key(provider.category()) {
            return Err(RepositoryError::MissingCategory(provider.category().clone()));
        }
        state.providers.insert(provider.id().clone(), provider);
        Ok(())
    }

    fn fetch_provider(&self, id: &ProviderId) -> Result<Option<Provider>, RepositoryError> {
        Ok(self.lock()?.providers.get(id).cloned())
    }

    fn list_providers(&self) -> Result<Vec<Provider>, RepositoryError> {
        Ok(self.lock()?.providers.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::domain::ProviderDraft;
    use crate::directory::scoring::{CriterionSelections, ScoringEngine};
    use chrono::Utc;

    fn category(id: &str, name: &str) -> Category {
        Category::new(CategoryId(id.to_string()), name, None)
    }

    fn provider(id: &str, category: &str) -> Provider {
        let draft = ProviderDraft {
            name: format!("Provider {id}"),
            active: true,
            category: CategoryId(category.to_string()),
            url: "https://example.tw".to_string(),
            requires_id_validation: true,
            selections: CriterionSelections::full_support(),
            created: None,
        };
        Provider::create(
            ProviderId(id.to_string()),
            draft,
            &ScoringEngine::default(),
            Utc::now(),
        )
        .expect("valid provider")
    }

    #[test]
    fn delete_is_blocked_while_category_is_referenced() {
        let store = InMemoryDirectory::default();
        store.insert_category(category("cat-banks", "Banks")).unwrap();
        store.insert_provider(provider("prov-1", "cat-banks")).unwrap();
        store.insert_provider(provider("prov-2", "cat-banks")).unwrap();

        match store.delete_category(&CategoryId("cat-banks".to_string())) {
            Err(RepositoryError::CategoryInUse { category, providers }) => {
                assert_eq!(category.0, "cat-banks");
                assert_eq!(providers, 2);
            }
            other => panic!("expected category in use, got {other:?}"),
        }
        assert!(store
            .fetch_category(&CategoryId("cat-banks".to_string()))
            .unwrap()
            .is_some());
        assert_eq!(store.list_providers().unwrap().len(), 2);
    }

    #[test]
    fn delete_succeeds_once_unreferenced() {
        let store = InMemoryDirectory::default();
        store.insert_category(category("cat-banks", "Banks")).unwrap();
        store.insert_category(category("cat-telecom", "Telecom")).unwrap();
        let mut moved = provider("prov-1", "cat-banks");
        store.insert_provider(moved.clone()).unwrap();

        let mut edit = moved.to_draft();
        edit.category = CategoryId("cat-telecom".to_string());
        moved
            .apply(edit, &ScoringEngine::default(), Utc::now())
            .expect("valid edit");
        store.update_provider(moved).unwrap();

        let deleted = store
            .delete_category(&CategoryId("cat-banks".to_string()))
            .expect("unreferenced category deletes");
        assert_eq!(deleted.name, "Banks");
    }

    #[test]
    fn delete_unknown_category_is_not_found() {
        let store = InMemoryDirectory::default();
        assert!(matches!(
            store.delete_category(&CategoryId("missing".to_string())),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn providers_require_existing_category() {
        let store = InMemoryDirectory::default();
        match store.insert_provider(provider("prov-1", "cat-ghost")) {
            Err(RepositoryError::MissingCategory(id)) => assert_eq!(id.0, "cat-ghost"),
            other => panic!("expected missing category, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_inserts_conflict() {
        let store = InMemoryDirectory::default();
        store.insert_category(category("cat-banks", "Banks")).unwrap();
        assert!(matches!(
            store.insert_category(category("cat-banks", "Banks again")),
            Err(RepositoryError::Conflict)
        ));

        store.insert_provider(provider("prov-1", "cat-banks")).unwrap();
        assert!(matches!(
            store.insert_provider(provider("prov-1", "cat-banks")),
            Err(RepositoryError::Conflict)
        ));
    }

    #[test]
    fn update_requires_existing_provider() {
        let store = InMemoryDirectory::default();
        store.insert_category(category("cat-banks", "Banks")).unwrap();
        assert!(matches!(
            store.update_provider(provider("prov-9", "cat-banks")),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn categories_list_by_name() {
        let store = InMemoryDirectory::default();
        store.insert_category(category("cat-2", "Telecom")).unwrap();
        store.insert_category(category("cat-1", "Banks")).unwrap();
        let names: Vec<_> = store
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|category| category.name)
            .collect();
        assert_eq!(names, vec!["Banks", "Telecom"]);
    }
}
