use serde::{Deserialize, Serialize};

use bazaar_core::{AggregateId, DomainError, DomainResult, Entity, Money, UserId};

const NAME_MAX: usize = 30;
const BARCODE_LEN: usize = 12;
const DESCRIPTION_MAX: usize = 1024;

/// Item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub AggregateId);

impl ItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Who holds an item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "owner", rename_all = "snake_case")]
pub enum Ownership {
    /// Held by the marketplace and available for purchase.
    Listed,
    /// Held by exactly one user; only they may sell it.
    OwnedBy(UserId),
}

impl Ownership {
    pub fn is_listed(self) -> bool {
        matches!(self, Ownership::Listed)
    }

    pub fn owner(self) -> Option<UserId> {
        match self {
            Ownership::Listed => None,
            Ownership::OwnedBy(user) => Some(user),
        }
    }

    pub fn is_owned_by(self, user: UserId) -> bool {
        self == Ownership::OwnedBy(user)
    }
}

/// Listing request for a new inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub price: Money,
    pub barcode: String,
    #[serde(default)]
    pub description: String,
}

impl NewItem {
    fn validate(&self) -> DomainResult<()> {
        let name_len = self.name.chars().count();
        if self.name.trim() != self.name || name_len == 0 || name_len > NAME_MAX {
            return Err(DomainError::validation(format!(
                "item name must be 1-{NAME_MAX} characters without surrounding whitespace"
            )));
        }
        if self.price.is_zero() {
            return Err(DomainError::validation("price must be positive"));
        }
        if self.barcode.len() != BARCODE_LEN || !self.barcode.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "barcode must be exactly {BARCODE_LEN} digits"
            )));
        }
        if self.description.chars().count() > DESCRIPTION_MAX {
            return Err(DomainError::validation(format!(
                "description cannot exceed {DESCRIPTION_MAX} characters"
            )));
        }
        Ok(())
    }
}

/// A uniquely named piece of inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    price: Money,
    barcode: String,
    description: String,
    ownership: Ownership,
    version: u64,
}

impl Item {
    /// Validate a listing and create the item, unowned.
    pub fn list(cmd: &NewItem) -> DomainResult<Self> {
        Self::list_with_id(ItemId::new(AggregateId::new()), cmd)
    }

    pub fn list_with_id(id: ItemId, cmd: &NewItem) -> DomainResult<Self> {
        cmd.validate()?;
        Ok(Self {
            id,
            name: cmd.name.clone(),
            price: cmd.price,
            barcode: cmd.barcode.clone(),
            description: cmd.description.clone(),
            ownership: Ownership::Listed,
            version: 1,
        })
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub(crate) fn set_ownership(&mut self, ownership: Ownership) {
        self.ownership = ownership;
        self.version += 1;
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
