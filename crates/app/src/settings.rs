//! 配置加载：内置默认值 → TOML 文件 → `AFX__` 环境变量，后者覆盖前者。

use std::collections::HashMap;

use afx_core::config::AppConfig;
use config::{Config, ConfigError, Environment, File, FileFormat};

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "AFX_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/afx.toml";

/// 从进程环境加载配置。配置文件不存在时不报错。
pub fn load() -> Result<AppConfig, ConfigError> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_from(&path, None)
}

/// # Summary
/// 按层叠顺序构建配置。
///
/// # Arguments
/// * `path`: TOML 配置文件路径，可不存在。
/// * `env`: 替代进程环境变量的键值表，为 `None` 时读取真实环境。
///
/// # Logic
/// 环境变量形如 `AFX_SERVER__PORT=9000`，前缀后以 `__` 分隔层级；数值与布尔值自动解析。
pub fn load_from(
    path: &str,
    env: Option<HashMap<String, String>>,
) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("AFX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()?
        .try_deserialize()
}
