use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use bazaar_core::DomainError;
use bazaar_infra::DispatchError;
use bazaar_infra::projections::TradeHistoryError;
use bazaar_market::TradeError;

/// Failures of handlers that reach past the dispatcher.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    History(#[from] TradeHistoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Dispatch(e) => dispatch_error_to_response(e),
            ApiError::History(e) => {
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "projection_error", e.to_string())
            }
        }
    }
}

pub fn dispatch_error_to_response(err: DispatchError) -> Response {
    match err {
        DispatchError::Trade(e) => {
            let status = match &e {
                TradeError::ItemNotFound { .. } => StatusCode::NOT_FOUND,
                TradeError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                TradeError::AlreadyOwned { .. } => StatusCode::CONFLICT,
                TradeError::NotOwner { .. } => StatusCode::FORBIDDEN,
            };
            json_error(status, e.code(), e.to_string())
        }
        DispatchError::UnknownActor(user) => json_error(
            StatusCode::UNAUTHORIZED,
            "unknown_user",
            format!("unknown user: {user}"),
        ),
        DispatchError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DispatchError::Domain(DomainError::InvalidId(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", msg)
        }
        DispatchError::Domain(DomainError::Conflict(msg)) => {
            json_error(StatusCode::CONFLICT, "conflict", msg)
        }
        DispatchError::Store(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            e.to_string(),
        ),
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
