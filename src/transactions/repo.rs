use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::kind::EntryKind;

/// Ledger row. `value` is the positive magnitude; the reporting views apply
/// the sign convention.
#[derive(Debug, Clone, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub description: String,
    pub value: Decimal,
    pub kind: EntryKind,
    pub category_id: Uuid,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str = "id, description, value, kind, category_id, user_id, created_at, updated_at";

impl Transaction {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        description: &str,
        value: Decimal,
        kind: EntryKind,
        category_id: Uuid,
    ) -> Result<Transaction, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(&format!(
            "INSERT INTO transactions (description, value, kind, category_id, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(description)
        .bind(value)
        .bind(kind)
        .bind(category_id)
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    pub async fn count_by_owner(
        db: &PgPool,
        user_id: Uuid,
        kind: Option<EntryKind>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM transactions
             WHERE user_id = $1 AND ($2::varchar IS NULL OR kind = $2)",
        )
        .bind(user_id)
        .bind(kind.map(|k| k.as_str()))
        .fetch_one(db)
        .await?;
        Ok(count)
    }

    pub async fn list_by_owner(
        db: &PgPool,
        user_id: Uuid,
        kind: Option<EntryKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE user_id = $1 AND ($2::varchar IS NULL OR kind = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(kind.map(|k| k.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    /// Partial update with ownership folded into the predicate: zero rows
    /// back means "absent or not yours", reported identically upstream.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        description: Option<&str>,
        value: Option<Decimal>,
        kind: Option<EntryKind>,
        category_id: Option<Uuid>,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(&format!(
            "UPDATE transactions
             SET description = COALESCE($3, description),
                 value = COALESCE($4, value),
                 kind = COALESCE($5, kind),
                 category_id = COALESCE($6, category_id),
                 updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(description)
        .bind(value)
        .bind(kind)
        .bind(category_id)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
