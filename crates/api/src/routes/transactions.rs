//! # 交易路由控制器
//!
//! `expiry` 只作为数据读写，不会触发任何状态变化。

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use afx_core::common::Id;
use afx_core::portfolio::entity::{NewTransaction, Stock, Transaction, TransactionPatch};

use crate::error::ApiError;
use crate::extract::{IdPath, ValidJson};
use crate::server::AppState;
use crate::types::{ApiErrorResponse, CreateTransactionRequest, UserResponse};

#[utoipa::path(
    get,
    path = "/transactions",
    tag = "交易 (Transactions)",
    security(("bearer_token" = [])),
    responses((status = 200, description = "全部交易", body = Vec<Transaction>))
)]
pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(state.transactions.list_transactions().await?))
}

#[utoipa::path(
    post,
    path = "/transactions",
    tag = "交易 (Transactions)",
    security(("bearer_token" = [])),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "创建成功", body = Transaction),
        (status = 400, description = "成交价为负", body = ApiErrorResponse),
        (status = 404, description = "买方或卖方不存在", body = ApiErrorResponse)
    )
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let tx = NewTransaction::try_from(req)?;
    let created = state.transactions.create_transaction(&tx).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/transactions/{id}",
    tag = "交易 (Transactions)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "交易 ID")),
    responses(
        (status = 200, description = "交易详情", body = Transaction),
        (status = 404, description = "交易不存在", body = ApiErrorResponse)
    )
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<Transaction>, ApiError> {
    Ok(Json(state.transactions.get_transaction(id).await?))
}

#[utoipa::path(
    patch,
    path = "/transactions/{id}",
    tag = "交易 (Transactions)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "交易 ID")),
    request_body = TransactionPatch,
    responses(
        (status = 200, description = "更新后的交易", body = Transaction),
        (status = 404, description = "交易或新引用不存在", body = ApiErrorResponse)
    )
)]
pub async fn update_transaction(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
    ValidJson(patch): ValidJson<TransactionPatch>,
) -> Result<Json<Transaction>, ApiError> {
    let patch = patch.validate()?;
    Ok(Json(state.transactions.update_transaction(id, &patch).await?))
}

/// 删除交易
///
/// 关联股票保留，其 `transaction_id` 置空。
#[utoipa::path(
    delete,
    path = "/transactions/{id}",
    tag = "交易 (Transactions)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "交易 ID")),
    responses(
        (status = 204, description = "删除成功"),
        (status = 404, description = "交易不存在", body = ApiErrorResponse)
    )
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<StatusCode, ApiError> {
    state.transactions.delete_transaction(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/transactions/{id}/stocks",
    tag = "交易 (Transactions)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "交易 ID")),
    responses((status = 200, description = "交易涉及的股票", body = Vec<Stock>))
)]
pub async fn list_transaction_stocks(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<Vec<Stock>>, ApiError> {
    Ok(Json(state.transactions.list_transaction_stocks(id).await?))
}

#[utoipa::path(
    get,
    path = "/transactions/{id}/seller",
    tag = "交易 (Transactions)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "交易 ID")),
    responses((status = 200, description = "卖方", body = UserResponse))
)]
pub async fn get_seller(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse::profile(state.transactions.find_seller(id).await?)))
}

#[utoipa::path(
    get,
    path = "/transactions/{id}/buyer",
    tag = "交易 (Transactions)",
    security(("bearer_token" = [])),
    params(("id" = i64, Path, description = "交易 ID")),
    responses((status = 200, description = "买方", body = UserResponse))
)]
pub async fn get_buyer(
    State(state): State<AppState>,
    IdPath(id): IdPath<Id>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse::profile(state.transactions.find_buyer(id).await?)))
}
