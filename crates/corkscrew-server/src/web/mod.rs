pub mod callback;
pub mod pages;

use crate::session;
use crate::state::AppState;
use axum::routing::post;
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let state = Arc::new(state);

    // The callback writes cookies itself, so it sits outside the session layer
    let pages = pages::build_page_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        session::restore_session,
    ));

    Router::new()
        .merge(pages)
        .route("/auth/callback", post(callback::auth_callback))
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
