use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    dto::{ListQuery, MessageResponse, PageParams, Pagination},
    error::{is_fk_violation, ApiError, ApiResult},
    kind::EntryKind,
    state::AppState,
};

use super::{
    dto::{
        CategoryResponse, CreateCategoryRequest, DeleteCategoryRequest, ListCategoriesResponse,
        UpdateCategoryRequest,
    },
    repo::Category,
};
use crate::auth::jwt::AuthUser;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories/create", post(create))
        .route("/categories/list-all-categories", get(list_all))
        .route("/categories/update", patch(update))
        .route("/categories/delete", delete(remove))
}

#[instrument(skip(state, payload))]
async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    let kind = EntryKind::parse(&payload.kind)
        .ok_or_else(|| ApiError::Validation("Unknown category type".into()))?;

    let category = Category::create(&state.db, user_id, &name, kind).await?;
    info!(%user_id, category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category.into())))
}

#[instrument(skip(state, query))]
async fn list_all(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListCategoriesResponse>> {
    let kind = match query.kind.as_deref() {
        Some(s) => Some(
            EntryKind::parse(s)
                .ok_or_else(|| ApiError::Validation("Unknown category type".into()))?,
        ),
        None => None,
    };
    let params = PageParams::from_query(query.page, query.limit);

    let total = Category::count_by_owner(&state.db, user_id, kind).await?;
    let categories = Category::list_by_owner(&state.db, user_id, kind, params.limit, params.offset)
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(Json(ListCategoriesResponse {
        categories,
        pagination: Pagination::new(params, total),
    }))
}

#[instrument(skip(state, payload))]
async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateCategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    let name = match payload.name.as_deref().map(str::trim) {
        Some("") => return Err(ApiError::Validation("Name is required".into())),
        other => other,
    };
    let kind = match payload.kind.as_deref() {
        Some(s) => Some(
            EntryKind::parse(s)
                .ok_or_else(|| ApiError::Validation("Unknown category type".into()))?,
        ),
        None => None,
    };

    let category = Category::update(&state.db, user_id, payload.id, name, kind)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;
    Ok(Json(category.into()))
}

#[instrument(skip(state, payload))]
async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<DeleteCategoryRequest>,
) -> ApiResult<Json<MessageResponse>> {
    match Category::delete(&state.db, user_id, payload.id).await {
        Ok(true) => {
            info!(%user_id, category_id = %payload.id, "category deleted");
            Ok(Json(MessageResponse::new("Category deleted")))
        }
        Ok(false) => Err(ApiError::NotFound("Category not found".into())),
        Err(e) if is_fk_violation(&e) => {
            warn!(%user_id, category_id = %payload.id, "category delete blocked by transactions");
            Err(ApiError::Conflict(
                "Category is referenced by existing transactions".into(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}
