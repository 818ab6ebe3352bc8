pub mod auth;
pub mod error;
pub mod middleware;
pub mod sign;
pub mod state;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::middleware::require_auth;
use crate::state::AppState;

/// Signing API routes. Everything except `/health` requires a service token.
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/brokers", get(sign::list_brokers))
        .route("/brokers/{name}/sign", post(sign::sign_params))
        .route("/brokers/{name}/requests", post(sign::signed_request))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(sign::health))
        .merge(protected_routes)
        .with_state(state)
}
