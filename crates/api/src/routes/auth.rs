//! # 鉴权路由控制器

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::middleware::auth::CurrentUser;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, LoginRequest, LoginResponse};

/// 邮箱 + 密码登录
///
/// 返回用户创建时签发的 Token。
#[utoipa::path(
    post,
    path = "/login",
    tag = "鉴权 (Auth)",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = LoginResponse),
        (status = 401, description = "邮箱或密码错误", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(token.into()))
}

/// 当前用户的名字（纯文本）
#[utoipa::path(
    get,
    path = "/me",
    tag = "鉴权 (Auth)",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "用户名", body = String, content_type = "text/plain"),
        (status = 401, description = "缺失或无效的 Token", body = ApiErrorResponse)
    )
)]
pub async fn me(CurrentUser(user): CurrentUser) -> String {
    user.name
}
