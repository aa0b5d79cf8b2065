//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS / 超时 / 请求追踪并绑定 TCP 端口。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 组装好依赖后调用。

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use afx_core::auth::port::PasswordVerifier;
use afx_core::auth::service::Authenticator;
use afx_core::config::ServerConfig;
use afx_core::store::port::{
    PostStore, StockStore, TeamStore, TokenStore, TransactionStore, UserStore,
};

use crate::routes::{auth, posts, root, stocks, teams, transactions, users};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 所有端口在服务启动前由 `crates/app` 注入，生命周期与进程等同。
/// - 进程内除连接池外没有其他共享可变状态。
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub teams: Arc<dyn TeamStore>,
    pub stocks: Arc<dyn StockStore>,
    pub transactions: Arc<dyn TransactionStore>,
    pub posts: Arc<dyn PostStore>,
    pub auth: Arc<Authenticator>,
}

impl AppState {
    /// 由同时实现全部存储端口的单个后端构建状态。
    pub fn new<S>(store: Arc<S>, verifier: Arc<dyn PasswordVerifier>) -> Self
    where
        S: UserStore
            + TokenStore
            + TeamStore
            + StockStore
            + TransactionStore
            + PostStore
            + 'static,
    {
        let auth = Arc::new(Authenticator::new(store.clone(), store.clone(), verifier));
        Self {
            users: store.clone(),
            teams: store.clone(),
            stocks: store.clone(),
            transactions: store.clone(),
            posts: store,
            auth,
        }
    }
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AFX 股票交易模拟 API",
        version = "0.1.0",
        description = "用户、组合、股票、交易与 Token 鉴权的 RESTful 接口。"
    ),
    tags(
        (name = "基础 (Root)", description = "健康检查与请求回显"),
        (name = "留言 (Posts)", description = "留言资源的增删改查"),
        (name = "用户 (Users)", description = "注册与用户资料"),
        (name = "鉴权 (Auth)", description = "密码登录与 Token 校验"),
        (name = "组合 (Teams)", description = "组合及其持有的股票"),
        (name = "股票 (Stocks)", description = "股票及其持有人与所属组合"),
        (name = "交易 (Transactions)", description = "买卖双方之间的交易")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// 为 OpenAPI 文档注入 Bearer Token 鉴权方案。
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("注册或登录接口返回的 Token（无需 'Bearer ' 前缀）"))
                    .build(),
            ),
        );
    }
}

// ============================================================
//  服务构建与启动
// ============================================================

/// # Summary
/// 构建完整的路由树（含 Swagger UI）。
///
/// # Logic
/// 1. 公开路由：根路由、`/posts`、注册与登录。
/// 2. 受保护路由：`/me` 与 `/users/{id}`、`/teams`、`/stocks`、`/transactions` 整组路径，
///    统一挂载 Bearer Token 中间件。同一路径不会同时出现在两组中。
/// 3. 合并 OpenAPI 文档，附加 CORS、超时与请求追踪。
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let public_router = OpenApiRouter::new()
        .routes(routes!(root::hello))
        .routes(routes!(root::plaintext))
        .routes(routes!(root::info))
        .routes(routes!(root::description))
        .routes(routes!(posts::list_posts, posts::create_post, posts::clear_posts))
        .routes(routes!(
            posts::get_post,
            posts::update_post,
            posts::replace_post,
            posts::delete_post
        ))
        .routes(routes!(users::create_user))
        .routes(routes!(auth::login));

    let protected_router = OpenApiRouter::new()
        .routes(routes!(auth::me))
        .routes(routes!(users::get_user, users::update_user, users::delete_user))
        .routes(routes!(users::list_user_stocks))
        .routes(routes!(users::list_user_teams))
        .routes(routes!(teams::list_teams, teams::create_team))
        .routes(routes!(teams::get_team, teams::update_team, teams::delete_team))
        .routes(routes!(teams::list_team_stocks))
        .routes(routes!(stocks::list_stocks, stocks::create_stock))
        .routes(routes!(stocks::get_stock, stocks::update_stock, stocks::delete_stock))
        .routes(routes!(stocks::get_stock_owner))
        .routes(routes!(stocks::get_stock_team))
        .routes(routes!(
            transactions::list_transactions,
            transactions::create_transaction
        ))
        .routes(routes!(
            transactions::get_transaction,
            transactions::update_transaction,
            transactions::delete_transaction
        ))
        .routes(routes!(transactions::list_transaction_stocks))
        .routes(routes!(transactions::get_seller))
        .routes(routes!(transactions::get_buyer))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(public_router)
        .merge(protected_router)
        .with_state(state)
        .split_for_parts();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

/// 绑定端口并对外提供服务，收到 Ctrl-C 后优雅退出。
pub async fn start_server(
    state: AppState,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = config.bind_addr();
    let app = build_router(state, config);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("AFX API server listening on {}", bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("AFX API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
