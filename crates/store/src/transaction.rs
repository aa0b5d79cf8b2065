use afx_core::account::entity::User;
use afx_core::common::Id;
use afx_core::portfolio::entity::{NewTransaction, Stock, Transaction, TransactionPatch};
use afx_core::store::error::StoreError;
use afx_core::store::port::{TransactionStore, UserStore};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;

use crate::db::{
    SqliteStore, column, db_err, delete_err, ensure_exists, expect_affected, optional_column,
    write_err,
};
use crate::migration::Preparation;
use crate::stock::{STOCK_SELECT, decode_stock};

pub(crate) const PREPARATION: Preparation = Preparation {
    table: "transactions",
    create: r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            seller_id INTEGER NOT NULL REFERENCES users(id),
            buyer_id INTEGER NOT NULL REFERENCES users(id),
            cost INTEGER NOT NULL CHECK (cost >= 0),
            expiry DATETIME
        );
    "#,
};

const TRANSACTION_SELECT: &str = "SELECT id, seller_id, buyer_id, cost, expiry FROM transactions";

fn decode_transaction(row: &SqliteRow) -> Result<Transaction, StoreError> {
    Ok(Transaction {
        id: column(row, "id")?,
        seller_id: column(row, "seller_id")?,
        buyer_id: column(row, "buyer_id")?,
        cost: column(row, "cost")?,
        expiry: optional_column(row, "expiry")?,
    })
}

#[async_trait]
impl TransactionStore for SqliteStore {
    async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction, StoreError> {
        let id = sqlx::query(
            "INSERT INTO transactions (seller_id, buyer_id, cost, expiry) VALUES (?, ?, ?, ?)",
        )
        .bind(tx.seller_id())
        .bind(tx.buyer_id())
        .bind(tx.cost())
        .bind(tx.expiry())
        .execute(self.pool())
        .await
        .map_err(|e| write_err(e, "seller or buyer does not exist"))?
        .last_insert_rowid();
        Ok(Transaction {
            id,
            seller_id: tx.seller_id(),
            buyer_id: tx.buyer_id(),
            cost: tx.cost(),
            expiry: tx.expiry(),
        })
    }

    async fn get_transaction(&self, id: Id) -> Result<Transaction, StoreError> {
        let sql = format!("{} WHERE id = ?", TRANSACTION_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound(format!("transaction {}", id)))?;
        decode_transaction(&row)
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        let sql = format!("{} ORDER BY id", TRANSACTION_SELECT);
        sqlx::query(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?
            .iter()
            .map(decode_transaction)
            .collect()
    }

    async fn update_transaction(
        &self,
        id: Id,
        patch: &TransactionPatch,
    ) -> Result<Transaction, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET seller_id = COALESCE(?, seller_id),
                buyer_id = COALESCE(?, buyer_id),
                cost = COALESCE(?, cost),
                expiry = CASE WHEN ? THEN ? ELSE expiry END
            WHERE id = ?
            "#,
        )
        .bind(patch.seller_id)
        .bind(patch.buyer_id)
        .bind(patch.cost)
        .bind(patch.expiry.is_some())
        .bind(patch.expiry.flatten())
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(|e| write_err(e, "seller or buyer does not exist"))?;
        expect_affected(result.rows_affected(), "transaction", id)?;
        self.get_transaction(id).await
    }

    async fn delete_transaction(&self, id: Id) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| delete_err(e, &format!("transaction {} is still referenced", id)))?;
        expect_affected(result.rows_affected(), "transaction", id)
    }

    async fn list_transaction_stocks(&self, transaction_id: Id) -> Result<Vec<Stock>, StoreError> {
        ensure_exists(self.pool(), "transactions", "transaction", transaction_id).await?;
        let sql = format!("{} WHERE s.transaction_id = ? ORDER BY s.id", STOCK_SELECT);
        sqlx::query(&sql)
            .bind(transaction_id)
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?
            .iter()
            .map(decode_stock)
            .collect()
    }

    async fn find_seller(&self, transaction_id: Id) -> Result<User, StoreError> {
        let tx = self.get_transaction(transaction_id).await?;
        self.get_user(tx.seller_id).await
    }

    async fn find_buyer(&self, transaction_id: Id) -> Result<User, StoreError> {
        let tx = self.get_transaction(transaction_id).await?;
        self.get_user(tx.buyer_id).await
    }
}
