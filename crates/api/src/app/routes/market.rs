use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use bazaar_infra::TradeIntent;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_market))
        .route("/purchase", post(purchase))
        .route("/sell", post(sell))
        .route("/eligibility", get(get_eligibility))
        .route("/history", get(get_history))
}

pub async fn get_market(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> Response {
    match services.market_view(actor.username()) {
        Ok(view) => Json(dto::MarketResponse::from(&view)).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn purchase(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::TradeRequest>,
) -> Response {
    trade(&services, TradeIntent::purchase(actor.username(), body.item))
}

pub async fn sell(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::TradeRequest>,
) -> Response {
    trade(&services, TradeIntent::sale(actor.username(), body.item))
}

fn trade(services: &AppServices, intent: TradeIntent) -> Response {
    match services.trade(&intent) {
        Ok(receipt) => Json(dto::TradeResponse::new(intent.kind, &receipt)).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn get_eligibility(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<dto::EligibilityQuery>,
) -> Response {
    match services.eligibility(actor.username(), &query.item) {
        Ok((can_purchase, can_sell)) => Json(dto::EligibilityResponse {
            item: query.item,
            can_purchase,
            can_sell,
        })
        .into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn get_history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> Response {
    match services.history(actor.username()) {
        Ok(trades) => Json(dto::HistoryResponse {
            username: actor.username().to_string(),
            trades,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}
