use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::criteria::UnknownCriterionError;
use super::scoring::{CriterionSelections, Grade, ScoringEngine};

/// Identifier wrapper for provider categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub String);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for scored providers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(pub String);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Organizational grouping for providers. Plays no part in scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

impl Category {
    /// Build a category, deriving the slug from the name when none is given.
    pub fn new(id: CategoryId, name: impl Into<String>, slug: Option<&str>) -> Self {
        let name = name.into();
        let slug = slug
            .map(slugify)
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| slugify(&name));
        Self { id, name, slug }
    }
}

/// Lowercase ASCII alphanumerics joined by single hyphens.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

fn default_true() -> bool {
    true
}

/// Editable provider fields as supplied by the administrative collaborator.
///
/// Carries no score field; a `score` in an incoming payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDraft {
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    pub category: CategoryId,
    pub url: String,
    #[serde(default = "default_true", alias = "requires_id")]
    pub requires_id_validation: bool,
    #[serde(flatten)]
    pub selections: CriterionSelections,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

/// A scored provider. Every field changes only through the write path below, which
/// always recomputes from the current selections and restamps `updated`.
///
/// ```compile_fail
/// # use arc_directory::directory::Provider;
/// fn rename(provider: &mut Provider) {
///     provider.name = "Renamed".to_string();
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    id: ProviderId,
    name: String,
    active: bool,
    category: CategoryId,
    url: String,
    requires_id_validation: bool,
    selections: CriterionSelections,
    score: i32,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl Provider {
    pub fn create(
        id: ProviderId,
        draft: ProviderDraft,
        engine: &ScoringEngine,
        now: DateTime<Utc>,
    ) -> Result<Self, UnknownCriterionError> {
        let score = engine.score(&draft.selections)?;
        let ProviderDraft {
            name,
            active,
            category,
            url,
            requires_id_validation,
            selections,
            created,
        } = draft;

        Ok(Self {
            id,
            name,
            active,
            category,
            url,
            requires_id_validation,
            selections,
            score,
            created: created.unwrap_or(now),
            updated: now,
        })
    }

    /// Replace the editable fields and rescore. The provider is untouched on error.
    pub fn apply(
        &mut self,
        draft: ProviderDraft,
        engine: &ScoringEngine,
        now: DateTime<Utc>,
    ) -> Result<(), UnknownCriterionError> {
        let score = engine.score(&draft.selections)?;

        self.name = draft.name;
        self.active = draft.active;
        self.category = draft.category;
        self.url = draft.url;
        self.requires_id_validation = draft.requires_id_validation;
        self.selections = draft.selections;
        if let Some(created) = draft.created {
            self.created = created;
        }
        self.score = score;
        self.updated = now;
        Ok(())
    }

    pub fn recompute(
        &mut self,
        engine: &ScoringEngine,
        now: DateTime<Utc>,
    ) -> Result<i32, UnknownCriterionError> {
        self.score = engine.score(&self.selections)?;
        self.updated = now;
        Ok(self.score)
    }

    pub fn id(&self) -> &ProviderId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn category(&self) -> &CategoryId {
        &self.category
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requires_id_validation(&self) -> bool {
        self.requires_id_validation
    }

    pub fn selections(&self) -> &CriterionSelections {
        &self.selections
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn grade(&self) -> Grade {
        Grade::from_score(Some(self.score))
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// Draft carrying the current editable state, for round-tripping through admin forms.
    pub fn to_draft(&self) -> ProviderDraft {
        ProviderDraft {
            name: self.name.clone(),
            active: self.active,
            category: self.category.clone(),
            url: self.url.clone(),
            requires_id_validation: self.requires_id_validation,
            selections: self.selections.clone(),
            created: Some(self.created),
        }
    }

    pub fn view(&self) -> ProviderView {
        ProviderView {
            id: self.id.clone(),
            name: self.name.clone(),
            active: self.active,
            category: self.category.clone(),
            url: self.url.clone(),
            requires_id_validation: self.requires_id_validation,
            selections: self.selections.clone(),
            score: self.score,
            grade: self.grade(),
            created: self.created,
            updated: self.updated,
        }
    }

    /// Listing entry, with the category already resolved to its display name.
    pub fn listing(&self, category: impl Into<String>) -> ProviderListing {
        ProviderListing {
            id: self.id.clone(),
            name: self.name.clone(),
            category: category.into(),
            url: self.url.clone(),
            active: self.active,
            requires_id_validation: self.requires_id_validation,
            score: self.score,
            grade: self.grade(),
        }
    }
}

/// Read-only representation of a provider, with its engine-derived score and grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderView {
    pub id: ProviderId,
    pub name: String,
    pub active: bool,
    pub category: CategoryId,
    pub url: String,
    pub requires_id_validation: bool,
    #[serde(flatten)]
    pub selections: CriterionSelections,
    pub score: i32,
    pub grade: Grade,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Public directory entry as shown on the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderListing {
    pub id: ProviderId,
    pub name: String,
    pub category: String,
    pub url: String,
    pub active: bool,
    pub requires_id_validation: bool,
    pub score: i32,
    pub grade: Grade,
}
