use axum::{middleware::from_fn, routing::get, routing::post, Router};
use time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use web_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};

use crate::handlers::{
    app::{health_check, index},
    auth::{
        demo_login_handler, login_handler, login_page, logout_handler, signup_handler, signup_page,
    },
    one_tap::one_tap_callback,
    password::{
        forgot_password_handler, forgot_password_page, reset_password_handler, reset_password_page,
    },
    portfolio::{export_transactions, home_page, investments_page, transactions_page},
    profile::{avatar_upload_handler, password_change_handler, profile_page, profile_update_handler},
};
use crate::middleware::{metrics::metrics_middleware, route_guard::route_guard};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    // Session setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // Set to true in production with HTTPS
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(crate::handlers::metrics::metrics))
        .route("/login", get(login_page).post(login_handler))
        .route("/login/demo", post(demo_login_handler))
        .route("/signup", get(signup_page).post(signup_handler))
        .route("/logout", get(logout_handler))
        .route("/auth/one-tap", post(one_tap_callback))
        .route(
            "/forgot-password",
            get(forgot_password_page).post(forgot_password_handler),
        )
        .route(
            "/reset-password",
            get(reset_password_page).post(reset_password_handler),
        )
        .route("/home", get(home_page))
        .route("/investments", get(investments_page))
        .route("/transactions", get(transactions_page))
        .route("/transactions/export", get(export_transactions))
        .route("/profile", get(profile_page).post(profile_update_handler))
        .route("/profile/avatar", post(avatar_upload_handler))
        .route("/profile/password", post(password_change_handler))
        .nest_service("/static", ServeDir::new("trading-frontend/static"))
        // Route guard runs inside the session layer so it can see the session
        .layer(from_fn(route_guard))
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
