//! # 股票路由控制器

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use afx_core::common::Id;
use afx_core::portfolio::entity::{NewStock, Stock, StockPatch, Team};

use crate::error::ApiError;
use crate::extract::{IdPath, ValidJson};
use crate::server::AppState;
use crate::types::{ApiErrorResponse, CreateStockRequest, UserResponse};

#[utoipa::path(
    get,
    path = "/stocks",
    tag = "股票 (Stocks)",
    security(("bearer_token" = [])),
    responses((status = 200, description = "全部股票", body = Vec<Stock>))
)]
pub async fn list_stocks(State(state): State<AppState>) -> Result<Json<Vec<Stock>>, ApiError> {
    Ok(Json(state.stocks.list_stocks().await?))
}

#[utoipa::path(
    post,
    path = "/stocks",
    tag = "股票 (Stocks)",
    security(("bearer_token" = [])),
    request_body = CreateStockRequest,
    responses(
        (status = 201, description = "创建成功", body = Stock),
        (status = 404, description = "持有人、组合或交易不存在", body = ApiErrorResponse)
    )
)]
pub async fn create_stock(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateStockRequest>,
) -> Result<(StatusCode, Json<Stock>), ApiError> {
    let stock = state.stocks.create_stock(&NewStock::try_from(req)?).await?;
    Ok((StatusCode::CREATED, Json(stock)))
}

#[utoipa::path(
    get,
    path = "/stocks/{id}",
    tag = "股票 (Stocks)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "股票 ID")),
    responses(
        (status = 200, description = "股票详情", body = Stock),
        (status = 404, description = "股票不存在", body = ApiErrorResponse)
    )
)]
pub async fn get_stock(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<Stock>, ApiError> {
    Ok(Json(state.stocks.get_stock(id).await?))
}

#[utoipa::path(
    patch,
    path = "/stocks/{id}",
    tag = "股票 (Stocks)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "股票 ID")),
    request_body = StockPatch,
    responses(
        (status = 200, description = "更新后的股票", body = Stock),
        (status = 404, description = "股票或新引用不存在", body = ApiErrorResponse)
    )
)]
pub async fn update_stock(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
    ValidJson(patch): ValidJson<StockPatch>,
) -> Result<Json<Stock>, ApiError> {
    let patch = patch.validate()?;
    Ok(Json(state.stocks.update_stock(id, &patch).await?))
}

#[utoipa::path(
    delete,
    path = "/stocks/{id}",
    tag = "股票 (Stocks)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "股票 ID")),
    responses(
        (status = 204, description = "删除成功"),
        (status = 404, description = "股票不存在", body = ApiErrorResponse)
    )
)]
pub async fn delete_stock(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<StatusCode, ApiError> {
    state.stocks.delete_stock(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/stocks/{id}/owner",
    tag = "股票 (Stocks)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "股票 ID")),
    responses((status = 200, description = "持有人", body = UserResponse))
)]
pub async fn get_stock_owner(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse::profile(state.stocks.find_owner(id).await?)))
}

#[utoipa::path(
    get,
    path = "/stocks/{id}/team",
    tag = "股票 (Stocks)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "股票 ID")),
    responses((status = 200, description = "所属组合", body = Team))
)]
pub async fn get_stock_team(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<Team>, ApiError> {
    Ok(Json(state.stocks.find_team(id).await?))
}
