use thiserror::Error;

use crate::common::ValidationError;
use crate::store::error::StoreError;

/// # Summary
/// 鉴权流程错误：注册、密码登录与 Bearer Token 解析。
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 注册时邮箱已被占用
    #[error("A user with email {0} already exists")]
    EmailTaken(String),
    /// 邮箱不存在或密码错误，二者不做区分
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Missing Authorization header")]
    MissingToken,
    #[error("Invalid Bearer format")]
    MalformedHeader,
    #[error("Invalid or unknown token")]
    UnknownToken,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
