pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod policy;
pub mod state;
pub mod validation;

use axum::extract::State;
use axum::routing::get;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Assemble the full router: the public tier, the protected tier behind
/// the JWT guard, and the service banner/health endpoints.
pub fn app(state: AppState) -> Router {
    let public = Router::new()
        .route("/users/register", post(handlers::public::users::register))
        .route("/users/verify", post(handlers::public::users::verify))
        .route("/users/resend", post(handlers::public::users::resend))
        .route("/users/login", post(handlers::public::users::login));

    let protected = Router::new()
        .route("/profile", get(handlers::protected::profile::get_profile))
        .route("/users/profile", post(handlers::protected::profile::update_profile))
        .route(
            "/users/change-password",
            post(handlers::protected::profile::change_password),
        )
        .route(
            "/users",
            get(handlers::protected::users::list).post(handlers::protected::users::create),
        )
        .route(
            "/users/:id",
            get(handlers::protected::users::get)
                .put(handlers::protected::users::update)
                .delete(handlers::protected::users::delete),
        )
        .route(
            "/apartments",
            get(handlers::protected::apartments::list).post(handlers::protected::apartments::create),
        )
        .route(
            "/apartments/:id",
            get(handlers::protected::apartments::get)
                .put(handlers::protected::apartments::update)
                .delete(handlers::protected::apartments::delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", public.merge(protected))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": 1,
        "data": {
            "name": "Apartments API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "public": "/api/v1/users/{register,verify,resend,login}",
                "self": "/api/v1/profile, /api/v1/users/{profile,change-password}",
                "users": "/api/v1/users[/:id] (admin)",
                "apartments": "/api/v1/apartments[/:id]",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": 1,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": 0,
                    "data": { "status": "degraded", "timestamp": now, "database": "unavailable" }
                })),
            )
        }
    }
}
