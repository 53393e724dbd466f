//! HTTP API server

use std::any::Any;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod state;

pub use handlers::ErrorResponse;
pub use state::{AppState, DataState};

/// Build the API router using the provided application state
pub fn create_router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/data", get(handlers::get_data))
        .with_state(state);

    with_middleware(router, cors)
}

/// Request tracing, panic containment and optional CORS
pub fn with_middleware(router: Router, cors: bool) -> Router {
    let router = router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http());

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "request handler panicked".to_string()
    };

    tracing::error!(%message, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CACHE_CONTROL, "no-store")],
        Json(ErrorResponse::error(message)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn exploding_handler() -> &'static str {
        panic!("column exploded")
    }

    #[tokio::test]
    async fn test_panics_become_json_500() {
        let router = Router::new().route("/boom", get(exploding_handler));
        let app = with_middleware(router, false);

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "column exploded"}));
    }

    #[tokio::test]
    async fn test_cors_header_when_enabled() {
        let app = with_middleware(Router::new().route("/x", get(|| async { "ok" })), true);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/x")
                    .header(header::ORIGIN, "http://dashboard.local")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
