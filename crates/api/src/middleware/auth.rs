//! # 鉴权中间件
//!
//! 解析 `Authorization: Bearer <token>`，将 Token 对应的唯一用户注入请求上下文。

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use afx_core::account::entity::User;
use afx_core::auth::error::AuthError;

use crate::error::ApiError;
use crate::server::AppState;

/// 校验 Bearer Token，失败时直接返回 401。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
        None => None,
    };

    let user = match state.auth.authenticate(header).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
            return Err(e.into());
        }
    };

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 在 Handler 中获取当前用户。必须挂在 `auth_middleware` 之后。
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Missing user context".into()))?;
        Ok(CurrentUser(user))
    }
}
