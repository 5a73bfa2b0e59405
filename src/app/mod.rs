//! 应用层：路由与处理器

pub mod search;

use std::sync::Arc;

use axum::{
    http::Method,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::core::middleware::request_logging_middleware;
use crate::infrastructure::database::ProductStore;
use search::{handler::AppState, service::SearchService};

/// 构建完整路由
pub fn router(store: Arc<dyn ProductStore>) -> Router {
    let state = AppState {
        search_service: SearchService::new(store),
    };

    Router::new()
        .route("/api/search", get(search::handler::search_products))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET])
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
