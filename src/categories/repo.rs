use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::kind::EntryKind;

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: EntryKind,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
}

const COLUMNS: &str = "id, name, kind, user_id, created_at";

impl Category {
    /// Ownership-scoped lookup. A category belonging to another user is
    /// indistinguishable from a missing one.
    pub async fn find_by_owner(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        name: &str,
        kind: EntryKind,
    ) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name, kind, user_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        ))
        .bind(name)
        .bind(kind)
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        name: Option<&str>,
        kind: Option<EntryKind>,
    ) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories
             SET name = COALESCE($3, name),
                 kind = COALESCE($4, kind)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(kind)
        .fetch_optional(db)
        .await
    }

    /// Fails with a foreign-key violation while transactions still reference
    /// the category; the handler maps that to a conflict.
    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn count_by_owner(
        db: &PgPool,
        user_id: Uuid,
        kind: Option<EntryKind>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM categories
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
    ) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories
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
}
