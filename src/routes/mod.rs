use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod cart;
pub mod comments;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod premium;
pub mod products;
pub mod roles;
pub mod users;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/roles", roles::router())
        .nest("/products", products::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/comments", comments::router())
        .nest("/analytics", analytics::router())
        .nest("/admin", admin::router())
        .nest("/premium", premium::router())
}
