use axum::{extract::State, routing::get, Json, Router};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::{auth::jwt::AuthUser, error::ApiResult, state::AppState};

use super::{
    dto::{CategoryBalance, CategoryDebts, EntryItem},
    repo,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/balanceTotal", get(balance_total))
        .route("/balanceGains", get(balance_gains))
        .route("/balanceDebts", get(balance_debts))
        .route("/balanceCategories", get(balance_categories))
        .route("/balanceAllDebts", get(balance_all_debts))
        .route("/balanceAllGains", get(balance_all_gains))
        .route("/balanceCategoryDebts", get(balance_category_debts))
}

// The scalar endpoints answer 0, not an error, for a user with no
// transactions.

#[instrument(skip(state))]
async fn balance_total(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Decimal>> {
    let row = repo::balance(&state.db, user_id).await?;
    Ok(Json(row.map(|r| r.total).unwrap_or(Decimal::ZERO)))
}

#[instrument(skip(state))]
async fn balance_gains(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Decimal>> {
    let row = repo::balance(&state.db, user_id).await?;
    Ok(Json(row.map(|r| r.gains).unwrap_or(Decimal::ZERO)))
}

#[instrument(skip(state))]
async fn balance_debts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Decimal>> {
    let row = repo::balance(&state.db, user_id).await?;
    Ok(Json(row.map(|r| r.debts).unwrap_or(Decimal::ZERO)))
}

#[instrument(skip(state))]
async fn balance_categories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<CategoryBalance>>> {
    let rows = repo::balance_by_category(&state.db, user_id).await?;
    Ok(Json(rows.into_iter().map(CategoryBalance::from).collect()))
}

#[instrument(skip(state))]
async fn balance_all_debts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<EntryItem>>> {
    let rows = repo::all_debts(&state.db, user_id).await?;
    Ok(Json(rows.into_iter().map(EntryItem::from).collect()))
}

#[instrument(skip(state))]
async fn balance_all_gains(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<EntryItem>>> {
    let rows = repo::all_gains(&state.db, user_id).await?;
    Ok(Json(rows.into_iter().map(EntryItem::from).collect()))
}

#[instrument(skip(state))]
async fn balance_category_debts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<CategoryDebts>>> {
    let rows = repo::debts_by_category(&state.db, user_id).await?;
    Ok(Json(rows.into_iter().map(CategoryDebts::from).collect()))
}
