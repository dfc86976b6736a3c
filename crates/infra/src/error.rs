//! Error surfaced by the marketplace request handlers.

use thiserror::Error;

use bazaar_core::DomainError;
use bazaar_market::TradeError;

use crate::store::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The trade rule (or item lookup) rejected the request.
    #[error(transparent)]
    Trade(#[from] TradeError),

    /// The acting user handle does not resolve to a registered user.
    #[error("unknown user: {0}")]
    UnknownActor(String),

    /// Registration/listing input was rejected.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store itself failed.
    #[error("store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DispatchError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::ItemNotFound(name) => DispatchError::Trade(TradeError::ItemNotFound { name }),
            StoreError::UserNotFound(user) => DispatchError::UnknownActor(user),
            StoreError::Duplicate { field, value } => {
                DispatchError::Domain(DomainError::conflict(format!("{field} {value:?} is already taken")))
            }
            other => DispatchError::Store(other),
        }
    }
}
