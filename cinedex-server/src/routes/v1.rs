use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::{
    AppState,
    handlers::health,
    movies::{movie_handlers, stats_handlers},
    users::{
        auth::{
            handlers as auth_handlers,
            middleware::{admin_middleware, auth_middleware},
        },
        user_handlers,
    },
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        // Public authentication endpoints
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login))
        // Public catalog reads
        .route("/movies", get(movie_handlers::list_movies))
        .route("/movies/stats", get(stats_handlers::movie_stats))
        .route("/movies/{id}", get(movie_handlers::get_movie))
        .merge(create_protected_routes(state.clone()))
        .merge(create_admin_routes(state))
}

/// Routes for any signed-in account
fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth_handlers::me))
        .route("/users/me", patch(user_handlers::update_me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Catalog writes and account administration
fn create_admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/movies", post(movie_handlers::create_movie))
        .route(
            "/movies/{id}",
            patch(movie_handlers::update_movie)
                .delete(movie_handlers::delete_movie),
        )
        .route("/users", get(user_handlers::list_users))
        .route(
            "/users/{id}",
            get(user_handlers::get_user)
                .patch(user_handlers::update_user)
                .delete(user_handlers::delete_user),
        )
        // Layers run bottom-up: authenticate first, then check the role.
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
