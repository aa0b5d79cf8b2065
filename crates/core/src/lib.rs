//! # `afx-core` - 领域核心
//!
//! 股票交易模拟后端的领域模型与端口定义。
//! 本 crate 不依赖任何数据库或 Web 框架，存储与 HTTP 适配器分别位于
//! `afx-store` 与 `afx-api`。

pub mod account;
pub mod auth;
pub mod common;
pub mod config;
pub mod portfolio;
pub mod post;
pub mod store;
