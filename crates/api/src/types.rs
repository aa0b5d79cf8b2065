//! # DTO (Data Transfer Object) 层
//!
//! 请求体与响应体的 JSON 结构。所有 DTO 派生 `utoipa::ToSchema` 以进入 Swagger 文档。
//! 请求 DTO 通过 `TryFrom` 转换为已校验的领域构造体，响应 DTO 通过 `From` 由实体生成。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use afx_core::account::entity::{Token, User};
use afx_core::common::{Id, ValidationError};
use afx_core::portfolio::entity::{NewStock, NewTeam, NewTransaction};
use afx_core::post::entity::NewPost;

// ============================================================
//  通用响应
// ============================================================

/// 失败响应体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

/// `GET /hello` 响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HelloResponse {
    #[schema(example = "world")]
    pub hello: String,
}

/// 批量删除的结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClearedResponse {
    /// 被删除的行数
    #[schema(example = 3)]
    pub deleted: u64,
}

// ============================================================
//  用户与鉴权 DTO
// ============================================================

/// 注册请求体。`password` 声明为可选，缺失时由鉴权服务返回 400 而非 JSON 解析错误。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "P@ssw0rd!")]
    pub password: Option<String>,
}

/// 用户响应体，不含密码哈希。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Id,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// 创建用户时签发的 Bearer Token，只在注册响应中返回
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "5f0c1a52-8a7e-4f43-9c3b-2d8e54b1f0a9")]
    pub token: Option<String>,
}

/// 登录请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "P@ssw0rd!")]
    pub password: String,
}

/// 登录成功响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

// ============================================================
//  组合与交易 DTO
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    #[schema(example = "Bulls")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateStockRequest {
    pub owner_id: Id,
    pub team_id: Id,
    #[serde(default)]
    pub transaction_id: Option<Id>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub seller_id: Id,
    pub buyer_id: Id,
    /// 成交价，最小货币单位
    #[schema(example = 1200)]
    pub cost: i64,
    /// 过期时间，仅作为数据保存
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

/// 创建或整体替换留言
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostRequest {
    #[schema(example = "hello afx")]
    pub content: String,
}

// ============================================================
//  领域模型 ↔ DTO 惯用转换
// ============================================================

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            token: user.token,
        }
    }
}

impl UserResponse {
    /// 供其他用户查看的资料，不含 Token。
    pub fn profile(user: User) -> Self {
        Self {
            token: None,
            ..user.into()
        }
    }
}

impl From<Token> for LoginResponse {
    fn from(token: Token) -> Self {
        Self { token: token.token }
    }
}

impl TryFrom<CreateTeamRequest> for NewTeam {
    type Error = ValidationError;

    fn try_from(req: CreateTeamRequest) -> Result<Self, Self::Error> {
        NewTeam::new(&req.name)
    }
}

impl TryFrom<CreateStockRequest> for NewStock {
    type Error = ValidationError;

    fn try_from(req: CreateStockRequest) -> Result<Self, Self::Error> {
        NewStock::new(req.owner_id, req.team_id, req.transaction_id)
    }
}

impl TryFrom<CreateTransactionRequest> for NewTransaction {
    type Error = ValidationError;

    fn try_from(req: CreateTransactionRequest) -> Result<Self, Self::Error> {
        NewTransaction::new(req.seller_id, req.buyer_id, req.cost, req.expiry)
    }
}

impl TryFrom<PostRequest> for NewPost {
    type Error = ValidationError;

    fn try_from(req: PostRequest) -> Result<Self, Self::Error> {
        NewPost::new(&req.content)
    }
}
