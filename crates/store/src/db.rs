use std::str::FromStr;
use std::time::Duration;

use afx_core::common::Id;
use afx_core::config::DatabaseConfig;
use afx_core::store::error::StoreError;
use sqlx::error::ErrorKind;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Decode, Row, Sqlite, SqlitePool, Type, ValueRef};
use tracing::info;

use crate::migration;

/// 所有存储端口的 SQLite 实现。
///
/// # Summary
/// 一个连接池承载全部业务表：`posts`、`users`、`tokens`、`teams`、
/// `transactions`、`stocks`。
///
/// # Invariants
/// * 每个连接都开启 `foreign_keys`，引用完整性由数据库保证。
/// * 表结构由 [`SqliteStore::prepare`] 创建，实例创建时不会自动建表。
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// 按配置打开（必要时创建）数据库文件并建立连接池。
    ///
    /// # Logic
    /// 1. 解析连接串，开启 `create_if_missing`、外键、WAL 与 busy timeout。
    /// 2. 确保数据库文件所在目录存在。
    /// 3. 以 `max_connections` 为上限建立连接池。
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| StoreError::InitError(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        if let Some(dir) = options.get_filename().parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| StoreError::InitError(e.to_string()))?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        info!("Connected to {}", config.url);
        Ok(Self { pool })
    }

    /// 单连接的内存数据库，连接不回收以免数据丢失。
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::InitError(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 按外键依赖顺序创建全部表，可重复执行。
    pub async fn prepare(&self) -> Result<(), StoreError> {
        migration::prepare_all(&self.pool).await
    }

    /// 逆序删除全部表，可重复执行。
    pub async fn revert(&self) -> Result<(), StoreError> {
        migration::revert_all(&self.pool).await
    }

    /// 当前数据库中的业务表名，按字母排序。
    pub async fn table_names(&self) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// ============================================================
//  行解码与错误映射
// ============================================================

const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

/// 读取必填列。列缺失、类型不符或值为 NULL 统一映射为 `Serialization`。
pub(crate) fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    let raw = row
        .try_get_raw(name)
        .map_err(|e| StoreError::Serialization(format!("column `{}`: {}", name, e)))?;
    // sqlx-sqlite 对 NULL 不做类型检查，会静默解码为零值
    if raw.is_null() {
        return Err(StoreError::Serialization(format!(
            "column `{}`: unexpected NULL",
            name
        )));
    }
    row.try_get(name)
        .map_err(|e| StoreError::Serialization(format!("column `{}`: {}", name, e)))
}

/// 读取可空列，NULL 解码为 `None`。
pub(crate) fn optional_column<'r, T>(
    row: &'r SqliteRow,
    name: &str,
) -> Result<Option<T>, StoreError>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get::<Option<T>, _>(name)
        .map_err(|e| StoreError::Serialization(format!("column `{}`: {}", name, e)))
}

/// 通用 sqlx 错误映射。
pub(crate) fn db_err(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        sqlx::Error::Database(db) if matches!(db.kind(), ErrorKind::CheckViolation) => {
            StoreError::Invalid(db.message().to_string())
        }
        sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_) => StoreError::Serialization(e.to_string()),
        _ => StoreError::Database(e.to_string()),
    }
}

/// 插入/更新时的外键失败意味着被引用的行不存在。
pub(crate) fn write_err(e: sqlx::Error, missing: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::NotFound(missing.to_string())
        }
        _ => db_err(e),
    }
}

/// 删除时的外键失败意味着该行仍被引用。
///
/// 外键默认 NO ACTION，违反时报 787；显式 RESTRICT 由 SQLite 以触发器约束 1811 报告。
pub(crate) fn delete_err(e: sqlx::Error, referenced: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db)
            if db.is_foreign_key_violation()
                || db.code().as_deref() == Some(SQLITE_CONSTRAINT_TRIGGER) =>
        {
            StoreError::Conflict(referenced.to_string())
        }
        _ => db_err(e),
    }
}

/// 受影响行数为 0 时返回 `NotFound`。
pub(crate) fn expect_affected(rows: u64, what: &str, id: Id) -> Result<(), StoreError> {
    if rows == 0 {
        return Err(StoreError::NotFound(format!("{} {}", what, id)));
    }
    Ok(())
}

/// 校验锚点行存在，`table` 只接受代码内的静态表名。
pub(crate) async fn ensure_exists(
    pool: &SqlitePool,
    table: &'static str,
    what: &str,
    id: Id,
) -> Result<(), StoreError> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?", table);
    sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_err)?
        .map(|_| ())
        .ok_or_else(|| StoreError::NotFound(format!("{} {}", what, id)))
}
