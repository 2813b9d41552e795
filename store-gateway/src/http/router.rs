use axum::Router;
use axum::http::HeaderName;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::{REQUEST_ID_HEADER, require_identity};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let storage = Router::new()
        .route("/store", post(handlers::create_store))
        .route(
            "/store/{id}",
            get(handlers::get_store).delete(handlers::delete_store),
        )
        .route("/store/{id}/history", get(handlers::get_history))
        .route("/store/{id}/version", post(handlers::create_version))
        .route(
            "/store/{id}/version/{versionId}",
            get(handlers::get_version).delete(handlers::delete_version),
        )
        .route_layer(from_fn_with_state(state.clone(), require_identity));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .nest("/storage", storage)
        .route("/auth/login", post(handlers::sign_in))
        .route("/response/", post(handlers::handle_response))
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
