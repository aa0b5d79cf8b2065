//! # 用户路由控制器
//!
//! 注册为公开接口；其余接口需要 Bearer Token，修改与删除只允许作用于本人。

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use afx_core::account::entity::UserPatch;
use afx_core::common::Id;
use afx_core::portfolio::entity::{Stock, Team};

use crate::error::ApiError;
use crate::extract::{IdPath, ValidJson};
use crate::middleware::auth::CurrentUser;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, CreateUserRequest, UserResponse};

/// 注册用户
///
/// 用户与其 Token 在同一事务中写入，响应中携带该 Token。
#[utoipa::path(
    post,
    path = "/users",
    tag = "用户 (Users)",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "注册成功", body = UserResponse),
        (status = 400, description = "字段缺失或不合法", body = ApiErrorResponse),
        (status = 409, description = "邮箱已被占用", body = ApiErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .auth
        .register(&req.name, &req.email, req.password.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "用户 (Users)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "用户 ID")),
    responses(
        (status = 200, description = "用户资料", body = UserResponse),
        (status = 404, description = "用户不存在", body = ApiErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse::profile(state.users.get_user(id).await?)))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "用户 (Users)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "用户 ID")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "更新后的资料", body = UserResponse),
        (status = 403, description = "不能修改他人资料", body = ApiErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    IdPath(id): IdPath<Id>,
    ValidJson(patch): ValidJson<UserPatch>,
) -> Result<Json<UserResponse>, ApiError> {
    require_self(me.id, id)?;
    let patch = patch.validate()?;
    Ok(Json(UserResponse::profile(state.users.update_user(id, &patch).await?)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "用户 (Users)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "用户 ID")),
    responses(
        (status = 204, description = "删除成功，Token 随之失效"),
        (status = 403, description = "不能删除他人", body = ApiErrorResponse),
        (status = 409, description = "仍持有股票或参与交易", body = ApiErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    IdPath(id): IdPath<Id>,
) -> Result<StatusCode, ApiError> {
    require_self(me.id, id)?;
    state.users.delete_user(id).await?;
    tracing::info!("User {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/users/{id}/stocks",
    tag = "用户 (Users)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "用户 ID")),
    responses((status = 200, description = "该用户持有的股票", body = Vec<Stock>))
)]
pub async fn list_user_stocks(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<Vec<Stock>>, ApiError> {
    Ok(Json(state.users.list_user_stocks(id).await?))
}

/// 经由所持股票关联到的组合（去重）
#[utoipa::path(
    get,
    path = "/users/{id}/teams",
    tag = "用户 (Users)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "用户 ID")),
    responses((status = 200, description = "该用户参与的组合", body = Vec<Team>))
)]
pub async fn list_user_teams(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<Vec<Team>>, ApiError> {
    Ok(Json(state.users.list_user_teams(id).await?))
}

fn require_self(me: Id, target: Id) -> Result<(), ApiError> {
    if me != target {
        tracing::warn!("User {} tried to modify user {}", me, target);
        return Err(ApiError::Forbidden(
            "Users may only modify their own account".into(),
        ));
    }
    Ok(())
}
