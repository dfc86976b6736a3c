use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};

use bazaar_market::RegisterUser;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/users", post(register))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterUserRequest>,
) -> Response {
    let cmd = RegisterUser {
        username: body.username,
        email: body.email,
    };

    match services.register(&cmd) {
        Ok(user) => (StatusCode::CREATED, Json(dto::UserResponse::from(&user))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
