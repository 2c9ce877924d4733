use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    categories::repo::Category,
    dto::{ListQuery, MessageResponse, PageParams, Pagination},
    error::{ApiError, ApiResult},
    kind::EntryKind,
    state::AppState,
};

use super::{
    dto::{
        CreateTransactionRequest, DeleteTransactionRequest, ListTransactionsResponse,
        TransactionResponse, UpdateTransactionRequest,
    },
    repo::Transaction,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions/create", post(create))
        .route("/transactions/list-all-transactions", get(list_all))
        .route("/transactions/update", patch(update))
        .route("/transactions/delete", delete(remove))
}

fn parse_kind(s: &str) -> ApiResult<EntryKind> {
    EntryKind::parse(s).ok_or_else(|| ApiError::Validation("Unknown transaction type".into()))
}

fn check_value(value: Decimal) -> ApiResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(ApiError::Validation("Value must be positive".into()));
    }
    Ok(value)
}

/// A category the caller does not own gets the same answer as one that does
/// not exist.
async fn check_category(state: &AppState, user_id: Uuid, category_id: Uuid) -> ApiResult<()> {
    Category::find_by_owner(&state.db, user_id, category_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::Validation("Unknown category".into()))
}

#[instrument(skip(state, payload))]
async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<TransactionResponse>)> {
    let description = payload.description.trim().to_string();
    if description.is_empty() {
        return Err(ApiError::Validation("Description is required".into()));
    }
    let value = check_value(payload.value)?;
    let kind = parse_kind(&payload.kind)?;
    check_category(&state, user_id, payload.category_id).await?;

    let tx = Transaction::create(
        &state.db,
        user_id,
        &description,
        value,
        kind,
        payload.category_id,
    )
    .await?;

    info!(%user_id, transaction_id = %tx.id, "transaction created");
    Ok((StatusCode::CREATED, Json(tx.into())))
}

#[instrument(skip(state, query))]
async fn list_all(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListTransactionsResponse>> {
    let kind = match query.kind.as_deref() {
        Some(s) => Some(parse_kind(s)?),
        None => None,
    };
    let params = PageParams::from_query(query.page, query.limit);

    let total = Transaction::count_by_owner(&state.db, user_id, kind).await?;
    let transactions =
        Transaction::list_by_owner(&state.db, user_id, kind, params.limit, params.offset)
            .await?
            .into_iter()
            .map(TransactionResponse::from)
            .collect();

    Ok(Json(ListTransactionsResponse {
        transactions,
        pagination: Pagination::new(params, total),
    }))
}

#[instrument(skip(state, payload))]
async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateTransactionRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    let description = match payload.description.as_deref().map(str::trim) {
        Some("") => return Err(ApiError::Validation("Description is required".into())),
        other => other,
    };
    let value = payload.value.map(check_value).transpose()?;
    let kind = payload.kind.as_deref().map(parse_kind).transpose()?;
    if let Some(category_id) = payload.category_id {
        check_category(&state, user_id, category_id).await?;
    }

    let tx = Transaction::update(
        &state.db,
        user_id,
        payload.id,
        description,
        value,
        kind,
        payload.category_id,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))?;

    Ok(Json(tx.into()))
}

#[instrument(skip(state, payload))]
async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<DeleteTransactionRequest>,
) -> ApiResult<Json<MessageResponse>> {
    // Deleting twice lands here as well: the second call sees zero rows.
    if !Transaction::delete(&state.db, user_id, payload.id).await? {
        return Err(ApiError::NotFound("Transaction not found".into()));
    }
    info!(%user_id, transaction_id = %payload.id, "transaction deleted");
    Ok(Json(MessageResponse::new("Transaction deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn value_must_be_strictly_positive() {
        assert!(check_value(dec!(150.50)).is_ok());
        assert!(check_value(Decimal::ZERO).is_err());
        assert!(check_value(dec!(-1)).is_err());
    }

    #[test]
    fn kind_parsing_maps_to_validation_error() {
        assert!(parse_kind("entrada").is_ok());
        let err = parse_kind("transferencia").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
