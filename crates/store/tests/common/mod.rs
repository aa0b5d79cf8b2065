use afx_core::config::DatabaseConfig;
use afx_store::SqliteStore;
use tempfile::TempDir;

/// 在临时目录中创建已建表的 SQLite 存储。
pub async fn prepared_store() -> (SqliteStore, TempDir) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", tmp_dir.path().join("afx.db").display()),
        max_connections: 4,
    };
    let store = SqliteStore::connect(&config)
        .await
        .expect("Failed to open store");
    store.prepare().await.expect("Failed to prepare schema");
    (store, tmp_dir)
}
