use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dto::Pagination;
use crate::kind::EntryKind;

use super::repo::Transaction;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub description: String,
    pub value: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
    pub category_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    pub id: Uuid,
    pub description: Option<String>,
    pub value: Option<Decimal>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTransactionRequest {
    pub id: Uuid,
}

/// Decimal values serialize as strings ("150.50"), which round-trips the
/// exact scale; a float would not.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    pub description: String,
    pub value: Decimal,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub category_id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            description: tx.description,
            value: tx.value,
            kind: tx.kind,
            category_id: tx.category_id,
            user_id: tx.user_id,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    pub transactions: Vec<TransactionResponse>,
    pub pagination: Pagination,
}
