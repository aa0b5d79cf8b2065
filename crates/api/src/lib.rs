//! # `afx-api` - HTTP 路由层
//!
//! 股票交易模拟后端的 HTTP/REST 服务入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 校验 JSON 请求体，非法或缺失字段返回 400
//! - 对受保护路由执行 Bearer Token 鉴权
//! - 每个 Handler 只调用一次存储端口完成增删改查
//! - 将领域模型转换为 DTO 返回给客户端

pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod types;
