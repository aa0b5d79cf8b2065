//! # `afx-store` - SQLite 持久化适配器
//!
//! 为 `afx-core` 中的各存储端口提供基于 `sqlx` 的 SQLite 实现，
//! 并提供 bcrypt 密码校验器。

pub mod db;
mod migration;
pub mod password;
mod post;
mod stock;
mod team;
mod transaction;
mod user;

pub use db::SqliteStore;
pub use password::BcryptVerifier;
