//! 表结构的准备 (prepare) 与回滚 (revert)。

use afx_core::store::error::StoreError;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::db_err;
use crate::{post, stock, team, transaction, user};

/// 单张表的建表语句。`create` 必须使用 `IF NOT EXISTS`。
pub(crate) struct Preparation {
    pub table: &'static str,
    pub create: &'static str,
}

/// 按外键依赖排列：被引用的表在前。
const PREPARATIONS: [&Preparation; 6] = [
    &post::PREPARATION,
    &user::USERS_PREPARATION,
    &user::TOKENS_PREPARATION,
    &team::PREPARATION,
    &transaction::PREPARATION,
    &stock::PREPARATION,
];

pub(crate) async fn prepare_all(pool: &SqlitePool) -> Result<(), StoreError> {
    let mut tx = pool.begin().await.map_err(db_err)?;
    for prep in PREPARATIONS {
        sqlx::query(prep.create)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::InitError(format!("prepare {}: {}", prep.table, e)))?;
        debug!("Prepared table {}", prep.table);
    }
    tx.commit().await.map_err(db_err)?;
    info!("Schema prepared ({} tables)", PREPARATIONS.len());
    Ok(())
}

pub(crate) async fn revert_all(pool: &SqlitePool) -> Result<(), StoreError> {
    let mut tx = pool.begin().await.map_err(db_err)?;
    for prep in PREPARATIONS.iter().rev() {
        let sql = format!("DROP TABLE IF EXISTS {}", prep.table);
        sqlx::query(&sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::InitError(format!("revert {}: {}", prep.table, e)))?;
        debug!("Reverted table {}", prep.table);
    }
    tx.commit().await.map_err(db_err)?;
    info!("Schema reverted");
    Ok(())
}
