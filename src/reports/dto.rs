use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use super::repo::{CategoryBalanceRow, CategoryDebtsRow, EntryRow};

#[derive(Debug, Serialize)]
pub struct CategoryBalance {
    pub category: String,
    pub balance: Decimal,
}

impl From<CategoryBalanceRow> for CategoryBalance {
    fn from(row: CategoryBalanceRow) -> Self {
        Self {
            category: row.category,
            balance: row.balance,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryItem {
    pub title: String,
    pub balance: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<EntryRow> for EntryItem {
    fn from(row: EntryRow) -> Self {
        Self {
            title: row.title,
            balance: row.balance,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryDebts {
    pub category: String,
    pub debts: Decimal,
}

impl From<CategoryDebtsRow> for CategoryDebts {
    fn from(row: CategoryDebtsRow) -> Self {
        Self {
            category: row.category,
            debts: row.debts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn entry_item_keeps_signed_balance() {
        let row = EntryRow {
            title: "Cartão".into(),
            balance: dec!(-50),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&EntryItem::from(row)).unwrap();
        assert!(json.contains(r#""balance":"-50""#));
        assert!(json.contains(r#""createdAt""#));
    }
}
