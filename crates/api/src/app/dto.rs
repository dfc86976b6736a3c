use serde::{Deserialize, Serialize};

use bazaar_core::Money;
use bazaar_infra::projections::TradeRecord;
use bazaar_infra::{MarketView, TradeReceipt};
use bazaar_market::{Item, TradeKind, User, can_purchase, can_sell};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub item: String,
}

#[derive(Debug, Deserialize)]
pub struct EligibilityQuery {
    pub item: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub budget: Money,
    pub budget_display: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id_typed().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            budget: user.budget(),
            budget_display: user.budget().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub price_display: String,
    pub barcode: String,
    pub description: String,
    /// Whether the viewing user may act on the item: buy it when listed, sell it when owned.
    pub actionable: bool,
}

impl ItemResponse {
    fn new(item: &Item, actionable: bool) -> Self {
        Self {
            id: item.id_typed().to_string(),
            name: item.name().to_string(),
            price: item.price(),
            price_display: item.price().to_string(),
            barcode: item.barcode().to_string(),
            description: item.description().to_string(),
            actionable,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarketResponse {
    pub username: String,
    pub budget: Money,
    pub budget_display: String,
    pub item_count: usize,
    pub listed: Vec<ItemResponse>,
    pub owned: Vec<ItemResponse>,
}

impl From<&MarketView> for MarketResponse {
    fn from(view: &MarketView) -> Self {
        let user = &view.user;
        Self {
            username: user.username().to_string(),
            budget: user.budget(),
            budget_display: user.budget().to_string(),
            item_count: view.item_count,
            listed: view
                .listed
                .iter()
                .map(|item| ItemResponse::new(item, can_purchase(user, item)))
                .collect(),
            owned: view
                .owned
                .iter()
                .map(|item| ItemResponse::new(item, can_sell(user, item)))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TradeResponse {
    pub item: String,
    pub price: Money,
    pub new_budget: Money,
    pub message: String,
}

impl TradeResponse {
    pub fn new(kind: TradeKind, receipt: &TradeReceipt) -> Self {
        let message = match kind {
            TradeKind::Purchase => format!(
                "Congratulations! You purchased {} for {}",
                receipt.item_name, receipt.price
            ),
            TradeKind::Sale => format!(
                "Congratulations! You sold {} back to the market for {}",
                receipt.item_name, receipt.price
            ),
        };

        Self {
            item: receipt.item_name.clone(),
            price: receipt.price,
            new_budget: receipt.new_budget,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub item: String,
    pub can_purchase: bool,
    pub can_sell: bool,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub username: String,
    pub trades: Vec<TradeRecord>,
}
