use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Per-user totals from `view_balance`. Absent row means the user has no
/// transactions yet; callers substitute zeros.
#[derive(Debug, Clone, FromRow)]
pub struct BalanceRow {
    pub total: Decimal,
    pub gains: Decimal,
    pub debts: Decimal,
}

pub async fn balance(db: &PgPool, user_id: Uuid) -> Result<Option<BalanceRow>, sqlx::Error> {
    sqlx::query_as::<_, BalanceRow>(
        "SELECT total, gains, debts FROM view_balance WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryBalanceRow {
    pub category: String,
    pub balance: Decimal,
}

pub async fn balance_by_category(
    db: &PgPool,
    user_id: Uuid,
) -> Result<Vec<CategoryBalanceRow>, sqlx::Error> {
    sqlx::query_as::<_, CategoryBalanceRow>(
        "SELECT category, balance FROM view_category WHERE user_id = $1 ORDER BY category",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// One row per transaction with its signed value; debts are the strictly
/// negative entries, gains the strictly positive ones.
#[derive(Debug, Clone, FromRow)]
pub struct EntryRow {
    pub title: String,
    pub balance: Decimal,
    pub created_at: OffsetDateTime,
}

pub async fn all_debts(db: &PgPool, user_id: Uuid) -> Result<Vec<EntryRow>, sqlx::Error> {
    sqlx::query_as::<_, EntryRow>(
        "SELECT title, balance, created_at FROM view_debts_n_gains
         WHERE user_id = $1 AND balance < 0",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn all_gains(db: &PgPool, user_id: Uuid) -> Result<Vec<EntryRow>, sqlx::Error> {
    sqlx::query_as::<_, EntryRow>(
        "SELECT title, balance, created_at FROM view_debts_n_gains
         WHERE user_id = $1 AND balance > 0",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryDebtsRow {
    pub category: String,
    pub debts: Decimal,
}

pub async fn debts_by_category(
    db: &PgPool,
    user_id: Uuid,
) -> Result<Vec<CategoryDebtsRow>, sqlx::Error> {
    sqlx::query_as::<_, CategoryDebtsRow>(
        "SELECT category, debts FROM view_category_debts WHERE user_id = $1 ORDER BY category",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}
