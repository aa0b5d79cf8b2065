//! # 留言路由控制器
//!
//! `/posts` 资源的完整增删改查，无需鉴权。

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use afx_core::common::Id;
use afx_core::post::entity::{NewPost, Post, PostPatch};

use crate::error::ApiError;
use crate::extract::{IdPath, ValidJson};
use crate::server::AppState;
use crate::types::{ApiErrorResponse, ClearedResponse, PostRequest};

#[utoipa::path(
    get,
    path = "/posts",
    tag = "留言 (Posts)",
    responses((status = 200, description = "全部留言", body = Vec<Post>))
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.posts.list_posts().await?))
}

#[utoipa::path(
    post,
    path = "/posts",
    tag = "留言 (Posts)",
    request_body = PostRequest,
    responses(
        (status = 201, description = "创建成功", body = Post),
        (status = 400, description = "内容为空或请求体不合法", body = ApiErrorResponse)
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<PostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state.posts.create_post(&NewPost::try_from(req)?).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    delete,
    path = "/posts",
    tag = "留言 (Posts)",
    responses((status = 200, description = "清空全部留言", body = ClearedResponse))
)]
pub async fn clear_posts(State(state): State<AppState>) -> Result<Json<ClearedResponse>, ApiError> {
    let deleted = state.posts.clear_posts().await?;
    tracing::info!("Cleared {} posts", deleted);
    Ok(Json(ClearedResponse { deleted }))
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    tag = "留言 (Posts)",
    params(("id" = i64, Path, description = "留言 ID")),
    responses(
        (status = 200, description = "留言详情", body = Post),
        (status = 404, description = "留言不存在", body = ApiErrorResponse)
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.posts.get_post(id).await?))
}

#[utoipa::path(
    patch,
    path = "/posts/{id}",
    tag = "留言 (Posts)",
    params(("id" = i64, Path, description = "留言 ID")),
    request_body = PostPatch,
    responses(
        (status = 200, description = "更新后的留言", body = Post),
        (status = 400, description = "内容为空", body = ApiErrorResponse),
        (status = 404, description = "留言不存在", body = ApiErrorResponse)
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
    ValidJson(patch): ValidJson<PostPatch>,
) -> Result<Json<Post>, ApiError> {
    let patch = patch.validate()?;
    Ok(Json(state.posts.update_post(id, &patch).await?))
}

#[utoipa::path(
    put,
    path = "/posts/{id}",
    tag = "留言 (Posts)",
    params(("id" = i64, Path, description = "留言 ID")),
    request_body = PostRequest,
    responses(
        (status = 200, description = "替换后的留言", body = Post),
        (status = 404, description = "留言不存在", body = ApiErrorResponse)
    )
)]
pub async fn replace_post(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
    ValidJson(req): ValidJson<PostRequest>,
) -> Result<Json<Post>, ApiError> {
    let post = NewPost::try_from(req)?;
    Ok(Json(state.posts.replace_post(id, &post).await?))
}

#[utoipa::path(
    delete,
    path = "/posts/{id}",
    tag = "留言 (Posts)",
    params(("id" = i64, Path, description = "留言 ID")),
    responses(
        (status = 204, description = "删除成功"),
        (status = 404, description = "留言不存在", body = ApiErrorResponse)
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<StatusCode, ApiError> {
    state.posts.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
