//! # 基础路由
//!
//! 健康检查与请求回显，均无需鉴权。

use axum::Json;
use axum::extract::Request;

use crate::types::HelloResponse;

#[utoipa::path(
    get,
    path = "/hello",
    tag = "基础 (Root)",
    responses((status = 200, description = "固定 JSON", body = HelloResponse))
)]
pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        hello: "world".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/plaintext",
    tag = "基础 (Root)",
    responses((status = 200, description = "固定文本", body = String, content_type = "text/plain"))
)]
pub async fn plaintext() -> &'static str {
    "Hello, world!"
}

/// 请求回显
#[utoipa::path(
    get,
    path = "/info",
    tag = "基础 (Root)",
    responses((status = 200, description = "请求方法、URI、协议版本与请求头", body = String, content_type = "text/plain"))
)]
pub async fn info(req: Request) -> String {
    describe(&req)
}

/// 同 `/info`
#[utoipa::path(
    get,
    path = "/description",
    tag = "基础 (Root)",
    responses((status = 200, description = "请求方法、URI、协议版本与请求头", body = String, content_type = "text/plain"))
)]
pub async fn description(req: Request) -> String {
    describe(&req)
}

fn describe(req: &Request) -> String {
    let mut out = format!("{} {} {:?}\n", req.method(), req.uri(), req.version());
    for (name, value) in req.headers() {
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(value.to_str().unwrap_or("<binary>"));
        out.push('\n');
    }
    out
}
