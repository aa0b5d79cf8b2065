//! # API 统一错误处理
//!
//! 将下层各 crate 的错误类型统一映射到 HTTP 状态码与 JSON 响应体。

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use afx_core::auth::error::AuthError;
use afx_core::common::ValidationError;
use afx_core::store::error::StoreError;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 请求体或参数不合法 (400)
    #[error("{0}")]
    BadRequest(String),

    /// 认证失败 (401)
    #[error("{0}")]
    Unauthorized(String),

    /// 已认证但无权操作该资源 (403)
    #[error("{0}")]
    Forbidden(String),

    /// 资源未找到 (404)
    #[error("{0}")]
    NotFound(String),

    /// 唯一性冲突或删除仍被引用的资源 (409)
    #[error("{0}")]
    Conflict(String),

    /// 存储故障或数据损坏 (500)
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                // 内部错误只记录日志，不向客户端透传细节
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiErrorResponse::from_msg(message))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Invalid(msg) => ApiError::BadRequest(msg),
            StoreError::Database(_) | StoreError::Serialization(_) | StoreError::InitError(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(e) => e.into(),
            AuthError::EmailTaken(_) => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::MalformedHeader
            | AuthError::UnknownToken => ApiError::Unauthorized(err.to_string()),
            AuthError::Hashing(_) => ApiError::Internal(err.to_string()),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_error_taxonomy_status_codes() {
        assert_eq!(
            status_of(ValidationError::missing("password")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AuthError::EmailTaken("a@b.c".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(StoreError::Conflict("team 1 still has stocks".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(AuthError::UnknownToken), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(StoreError::NotFound("team 9".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(StoreError::Serialization("column `name`".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(StoreError::Invalid("CHECK constraint failed: cost >= 0".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AuthError::Store(StoreError::NotFound("user 1".into()))),
            StatusCode::NOT_FOUND
        );
    }
}
