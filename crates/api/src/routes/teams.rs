//! # 组合路由控制器

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use afx_core::common::Id;
use afx_core::portfolio::entity::{NewTeam, Stock, Team, TeamPatch};

use crate::error::ApiError;
use crate::extract::{IdPath, ValidJson};
use crate::server::AppState;
use crate::types::{ApiErrorResponse, CreateTeamRequest};

#[utoipa::path(
    get,
    path = "/teams",
    tag = "组合 (Teams)",
    security(("bearer_token" = [])),
    responses((status = 200, description = "全部组合", body = Vec<Team>))
)]
pub async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<Team>>, ApiError> {
    Ok(Json(state.teams.list_teams().await?))
}

#[utoipa::path(
    post,
    path = "/teams",
    tag = "组合 (Teams)",
    security(("bearer_token" = [])),
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "创建成功", body = Team),
        (status = 400, description = "名称为空", body = ApiErrorResponse)
    )
)]
pub async fn create_team(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team = state.teams.create_team(&NewTeam::try_from(req)?).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "组合 (Teams)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "组合 ID")),
    responses(
        (status = 200, description = "组合详情", body = Team),
        (status = 404, description = "组合不存在", body = ApiErrorResponse)
    )
)]
pub async fn get_team(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<Team>, ApiError> {
    Ok(Json(state.teams.get_team(id).await?))
}

#[utoipa::path(
    patch,
    path = "/teams/{id}",
    tag = "组合 (Teams)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "组合 ID")),
    request_body = TeamPatch,
    responses(
        (status = 200, description = "更新后的组合", body = Team),
        (status = 404, description = "组合不存在", body = ApiErrorResponse)
    )
)]
pub async fn update_team(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
    ValidJson(patch): ValidJson<TeamPatch>,
) -> Result<Json<Team>, ApiError> {
    let patch = patch.validate()?;
    Ok(Json(state.teams.update_team(id, &patch).await?))
}

/// 删除组合
///
/// 组合下仍有股票时拒绝删除。
#[utoipa::path(
    delete,
    path = "/teams/{id}",
    tag = "组合 (Teams)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "组合 ID")),
    responses(
        (status = 204, description = "删除成功"),
        (status = 404, description = "组合不存在", body = ApiErrorResponse),
        (status = 409, description = "组合下仍有股票", body = ApiErrorResponse)
    )
)]
pub async fn delete_team(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<StatusCode, ApiError> {
    state.teams.delete_team(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/teams/{id}/stocks",
    tag = "组合 (Teams)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "组合 ID")),
    responses((status = 200, description = "组合内的股票", body = Vec<Stock>))
)]
pub async fn list_team_stocks(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<Vec<Stock>>, ApiError> {
    Ok(Json(state.teams.list_team_stocks(id).await?))
}
