mod logging;
mod settings;

use std::sync::Arc;

use afx_api::server::{AppState, start_server};
use afx_store::{BcryptVerifier, SqliteStore};
use tracing::info;

/// # Summary
/// 应用启动入口，负责组装依赖。
///
/// # Logic
/// 1. 加载配置并初始化日志。
/// 2. 打开 SQLite 存储。
/// 3. 按子命令执行：`prepare` / `revert` 只处理表结构后退出；
///    缺省或 `serve` 先建表再启动 HTTP 服务，直到收到 Ctrl-C。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = settings::load()?;
    let _guard = logging::init_logging(&config.log);
    info!("AFX backend starting...");

    let store = Arc::new(SqliteStore::connect(&config.database).await?);

    let command = std::env::args().nth(1);
    match command.as_deref() {
        Some("prepare") => store.prepare().await?,
        Some("revert") => store.revert().await?,
        None | Some("serve") => {
            store.prepare().await?;
            let verifier = Arc::new(BcryptVerifier::new(config.auth.bcrypt_cost));
            let state = AppState::new(store.clone(), verifier);
            start_server(state, &config.server).await?;
        }
        Some(other) => {
            store.close().await;
            return Err(format!("unknown command `{}`, expected serve | prepare | revert", other).into());
        }
    }

    store.close().await;
    info!("AFX backend stopped");
    Ok(())
}
