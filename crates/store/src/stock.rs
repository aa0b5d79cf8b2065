use afx_core::account::entity::User;
use afx_core::common::Id;
use afx_core::portfolio::entity::{NewStock, Stock, StockPatch, Team};
use afx_core::store::error::StoreError;
use afx_core::store::port::{StockStore, TeamStore, UserStore};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;

use crate::db::{SqliteStore, column, db_err, expect_affected, optional_column, write_err};
use crate::migration::Preparation;

pub(crate) const PREPARATION: Preparation = Preparation {
    table: "stocks",
    create: r#"
        CREATE TABLE IF NOT EXISTS stocks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL REFERENCES users(id),
            team_id INTEGER NOT NULL REFERENCES teams(id),
            transaction_id INTEGER REFERENCES transactions(id) ON DELETE SET NULL
        );
        CREATE INDEX IF NOT EXISTS idx_stocks_owner_id ON stocks(owner_id);
        CREATE INDEX IF NOT EXISTS idx_stocks_team_id ON stocks(team_id);
        CREATE INDEX IF NOT EXISTS idx_stocks_transaction_id ON stocks(transaction_id);
    "#,
};

/// 连带查出 owner/team 是否存在，供解码时检测悬空引用。
pub(crate) const STOCK_SELECT: &str = r#"
    SELECT s.id, s.owner_id, s.team_id, s.transaction_id,
           u.id AS owner_ref, t.id AS team_ref
    FROM stocks s
    LEFT JOIN users u ON u.id = s.owner_id
    LEFT JOIN teams t ON t.id = s.team_id
"#;

const MISSING_REFERENCE: &str = "referenced owner, team or transaction does not exist";

/// # Summary
/// 将 `STOCK_SELECT` 的一行还原为 `Stock`。
///
/// # Logic
/// owner 或 team 在关联表中缺失时（外键被绕过写入的脏数据）返回 `Serialization`。
pub(crate) fn decode_stock(row: &SqliteRow) -> Result<Stock, StoreError> {
    let stock = Stock {
        id: column(row, "id")?,
        owner_id: column(row, "owner_id")?,
        team_id: column(row, "team_id")?,
        transaction_id: optional_column(row, "transaction_id")?,
    };

    let owner_ref: Option<Id> = optional_column(row, "owner_ref")?;
    if owner_ref.is_none() {
        return Err(StoreError::Serialization(format!(
            "stock {} references missing owner {}",
            stock.id, stock.owner_id
        )));
    }
    let team_ref: Option<Id> = optional_column(row, "team_ref")?;
    if team_ref.is_none() {
        return Err(StoreError::Serialization(format!(
            "stock {} references missing team {}",
            stock.id, stock.team_id
        )));
    }
    Ok(stock)
}

#[async_trait]
impl StockStore for SqliteStore {
    async fn create_stock(&self, stock: &NewStock) -> Result<Stock, StoreError> {
        let id = sqlx::query("INSERT INTO stocks (owner_id, team_id, transaction_id) VALUES (?, ?, ?)")
            .bind(stock.owner_id())
            .bind(stock.team_id())
            .bind(stock.transaction_id())
            .execute(self.pool())
            .await
            .map_err(|e| write_err(e, MISSING_REFERENCE))?
            .last_insert_rowid();
        Ok(Stock {
            id,
            owner_id: stock.owner_id(),
            team_id: stock.team_id(),
            transaction_id: stock.transaction_id(),
        })
    }

    async fn get_stock(&self, id: Id) -> Result<Stock, StoreError> {
        let sql = format!("{} WHERE s.id = ?", STOCK_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound(format!("stock {}", id)))?;
        decode_stock(&row)
    }

    async fn list_stocks(&self) -> Result<Vec<Stock>, StoreError> {
        let sql = format!("{} ORDER BY s.id", STOCK_SELECT);
        sqlx::query(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?
            .iter()
            .map(decode_stock)
            .collect()
    }

    async fn update_stock(&self, id: Id, patch: &StockPatch) -> Result<Stock, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE stocks
            SET owner_id = COALESCE(?, owner_id),
                team_id = COALESCE(?, team_id),
                transaction_id = CASE WHEN ? THEN ? ELSE transaction_id END
            WHERE id = ?
            "#,
        )
        .bind(patch.owner_id)
        .bind(patch.team_id)
        .bind(patch.transaction_id.is_some())
        .bind(patch.transaction_id.flatten())
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(|e| write_err(e, MISSING_REFERENCE))?;
        expect_affected(result.rows_affected(), "stock", id)?;
        self.get_stock(id).await
    }

    async fn delete_stock(&self, id: Id) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM stocks WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        expect_affected(result.rows_affected(), "stock", id)
    }

    async fn find_owner(&self, stock_id: Id) -> Result<User, StoreError> {
        let stock = self.get_stock(stock_id).await?;
        self.get_user(stock.owner_id).await
    }

    async fn find_team(&self, stock_id: Id) -> Result<Team, StoreError> {
        let stock = self.get_stock(stock_id).await?;
        self.get_team(stock.team_id).await
    }
}
