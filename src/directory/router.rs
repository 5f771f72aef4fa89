use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::criteria::{CriterionCategory, CriterionDefinition};
use super::domain::{CategoryId, ProviderDraft, ProviderId};
use super::repository::{DirectoryRepository, RepositoryError};
use super::scoring::{CriterionSelections, Grade, ScoreBreakdown};
use super::service::{DirectoryService, DirectoryServiceError};

/// Router builder exposing the directory listing and administrative endpoints.
pub fn directory_router<R>(service: Arc<DirectoryService<R>>) -> Router
where
    R: DirectoryRepository + 'static,
{
    Router::new()
        .route("/api/v1/criteria", get(criteria_handler::<R>))
        .route("/api/v1/score", post(score_handler::<R>))
        .route(
            "/api/v1/providers",
            get(listings_handler::<R>).post(create_provider_handler::<R>),
        )
        .route(
            "/api/v1/providers/:provider_id",
            get(provider_handler::<R>).put(update_provider_handler::<R>),
        )
        .route("/api/v1/categories", post(create_category_handler::<R>))
        .route(
            "/api/v1/categories/:category_id",
            delete(delete_category_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub(crate) struct CriterionGroupView {
    pub(crate) category: CriterionCategory,
    pub(crate) title: &'static str,
    pub(crate) help_text: &'static str,
    pub(crate) options: Vec<CriterionDefinition>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreView {
    pub(crate) score: i32,
    pub(crate) grade: Grade,
    pub(crate) breakdown: ScoreBreakdown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryRequest {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) slug: Option<String>,
}

pub(crate) async fn criteria_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
) -> Response
where
    R: DirectoryRepository + 'static,
{
    let catalog = service.engine().catalog();
    let groups: Vec<CriterionGroupView> = CriterionCategory::ALL
        .into_iter()
        .map(|category| CriterionGroupView {
            category,
            title: category.title(),
            help_text: category.help_text(),
            options: catalog.for_category(category).cloned().collect(),
        })
        .collect();

    (StatusCode::OK, axum::Json(groups)).into_response()
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    axum::Json(selections): axum::Json<CriterionSelections>,
) -> Response
where
    R: DirectoryRepository + 'static,
{
    match service.preview(&selections) {
        Ok(breakdown) => {
            let view = ScoreView {
                score: breakdown.total,
                grade: breakdown.grade(),
                breakdown,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn listings_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
) -> Response
where
    R: DirectoryRepository + 'static,
{
    match service.active_listings() {
        Ok(listings) => (StatusCode::OK, axum::Json(listings)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_provider_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    axum::Json(draft): axum::Json<ProviderDraft>,
) -> Response
where
    R: DirectoryRepository + 'static,
{
    match service.create_provider(draft) {
        Ok(provider) => (StatusCode::CREATED, axum::Json(provider.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn provider_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    Path(provider_id): Path<String>,
) -> Response
where
    R: DirectoryRepository + 'static,
{
    match service.provider(&ProviderId(provider_id)) {
        Ok(provider) => (StatusCode::OK, axum::Json(provider.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_provider_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    Path(provider_id): Path<String>,
    axum::Json(draft): axum::Json<ProviderDraft>,
) -> Response
where
    R: DirectoryRepository + 'static,
{
    match service.update_provider(&ProviderId(provider_id), draft) {
        Ok(provider) => (StatusCode::OK, axum::Json(provider.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_category_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    axum::Json(request): axum::Json<CategoryRequest>,
) -> Response
where
    R: DirectoryRepository + 'static,
{
    match service.create_category(&request.name, request.slug.as_deref()) {
        Ok(category) => (StatusCode::CREATED, axum::Json(category)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_category_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    Path(category_id): Path<String>,
) -> Response
where
    R: DirectoryRepository + 'static,
{
    match service.delete_category(&CategoryId(category_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

/// HTTP status for a directory failure, shared by the routes and `AppError`.
pub(crate) fn error_status(err: &DirectoryServiceError) -> StatusCode {
    match err {
        DirectoryServiceError::Criterion(_)
        | DirectoryServiceError::EmptyCategoryName
        | DirectoryServiceError::Repository(RepositoryError::MissingCategory(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DirectoryServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        DirectoryServiceError::Repository(
            RepositoryError::Conflict | RepositoryError::CategoryInUse { .. },
        ) => StatusCode::CONFLICT,
        DirectoryServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: DirectoryServiceError) -> Response {
    let status = error_status(&err);
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
