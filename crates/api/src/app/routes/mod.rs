use axum::Router;

pub mod market;
pub mod system;
pub mod users;

/// Router for every endpoint that acts on behalf of a market user.
pub fn router() -> Router {
    Router::new().nest("/market", market::router())
}
