//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ImageSource, Money, TransactionKind};

/// Create a transaction, or update an existing one.
///
/// On update, unset `category_id`, `description` and `image` keep the stored
/// values; `clear_category` and `clear_description` drop them instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionCmd {
    pub owner_id: String,
    pub wallet_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Money,
    pub date: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub image: Option<ImageSource>,
    #[serde(default)]
    pub clear_category: bool,
    #[serde(default)]
    pub clear_description: bool,
}

impl TransactionCmd {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        wallet_id: Uuid,
        kind: TransactionKind,
        amount: Money,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            wallet_id,
            kind,
            amount,
            date,
            category_id: None,
            description: None,
            image: None,
            clear_category: false,
            clear_description: false,
        }
    }

    #[must_use]
    pub fn income(owner_id: impl Into<String>, wallet_id: Uuid, amount: Money, date: DateTime<Utc>) -> Self {
        Self::new(owner_id, wallet_id, TransactionKind::Income, amount, date)
    }

    #[must_use]
    pub fn expense(owner_id: impl Into<String>, wallet_id: Uuid, amount: Money, date: DateTime<Utc>) -> Self {
        Self::new(owner_id, wallet_id, TransactionKind::Expense, amount, date)
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn image(mut self, image: ImageSource) -> Self {
        self.image = Some(image);
        self
    }

    #[must_use]
    pub fn clear_category(mut self) -> Self {
        self.category_id = None;
        self.clear_category = true;
        self
    }

    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = None;
        self.clear_description = true;
        self
    }

    #[must_use]
    pub fn wallet(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = wallet_id;
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }
}

/// Create a wallet (`id == None`) or rename / re-image an existing one.
///
/// `amount` is the opening balance and is only read on creation: balances of
/// existing wallets only move through transactions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletCmd {
    pub id: Option<Uuid>,
    pub owner_id: String,
    pub name: String,
    pub amount: Money,
    pub image: Option<ImageSource>,
}

impl WalletCmd {
    #[must_use]
    pub fn create(owner_id: impl Into<String>, name: impl Into<String>, amount: Money) -> Self {
        Self {
            id: None,
            owner_id: owner_id.into(),
            name: name.into(),
            amount,
            image: None,
        }
    }

    #[must_use]
    pub fn update(id: Uuid, owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            owner_id: owner_id.into(),
            name: name.into(),
            amount: Money::ZERO,
            image: None,
        }
    }

    #[must_use]
    pub fn image(mut self, image: ImageSource) -> Self {
        self.image = Some(image);
        self
    }
}

/// Create a category (`id == None`) or update its presentation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryCmd {
    pub id: Option<Uuid>,
    /// `None` creates a global category.
    pub owner_id: Option<String>,
    pub label: String,
    pub icon: String,
    pub bg_color: String,
    pub kind: TransactionKind,
}

impl CategoryCmd {
    #[must_use]
    pub fn new(
        owner_id: Option<String>,
        label: impl Into<String>,
        icon: impl Into<String>,
        bg_color: impl Into<String>,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: None,
            owner_id,
            label: label.into(),
            icon: icon.into(),
            bg_color: bg_color.into(),
            kind,
        }
    }

    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }
}
