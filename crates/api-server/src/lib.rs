pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;

use application::UserApp;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;
pub use response::ApiResponse;

#[derive(Clone)]
pub struct AppState {
    pub user_app: Arc<UserApp>,
}

/// Routes only, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/user",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/api/user/search", get(handlers::users::search_users))
        .route("/api/user/:id", get(handlers::users::get_user))
        .route("/health", get(handlers::health::health_check))
        .fallback(error::not_found_fallback)
}

/// Wraps a router in the middleware stack: request tracing, panic-to-envelope
/// translation and CORS.
pub fn with_middleware(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(error::panic_response))
            .layer(CorsLayer::permissive()),
    )
}

pub fn app(user_app: Arc<UserApp>) -> Router {
    with_middleware(routes().with_state(AppState { user_app }))
}

pub async fn serve(listener: TcpListener, user_app: Arc<UserApp>) -> std::io::Result<()> {
    let address = listener.local_addr()?;
    info!("🌐 API Server listening on http://{}", address);
    info!("📖 API Documentation:");
    info!("   GET  /api/user            - List all users");
    info!("   POST /api/user            - Create a user");
    info!("   GET  /api/user/:id        - Get user details");
    info!("   GET  /api/user/search     - Search users (keyword, minLevel, maxLevel, page, pageSize)");
    info!("   GET  /health              - Health check");

    axum::serve(listener, app(user_app))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down API server");
    }
}
