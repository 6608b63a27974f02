//! HTTP surface: router assembly, authentication, and shared middleware.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::get,
};

/// Assembles the application router. Every resource route sits behind API
/// key authentication; `/healthz` stays open for probes.
pub fn build_router(state: ApiState) -> Router {
    let auth_state = state.clone();

    let resources = Router::new()
        .route(
            "/authors",
            get(handlers::list_authors).post(handlers::create_author),
        )
        .route(
            "/authors/{id}",
            get(handlers::get_author)
                .put(handlers::update_author)
                .delete(handlers::delete_author),
        )
        .route(
            "/books",
            get(handlers::list_books).post(handlers::create_book),
        )
        .route(
            "/books/{id}",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .layer(axum_middleware::from_fn_with_state(
            auth_state,
            middleware::api_auth,
        ));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .merge(resources)
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
