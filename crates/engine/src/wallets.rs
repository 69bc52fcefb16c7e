//! The module contains `Wallet` struct and its storage model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine,
    util::{parse_uuid, version_from_db, version_to_db},
};

/// A wallet.
///
/// A wallet is a representation of a real wallet, a bank account or anything
/// else where money are kept.
///
/// `total_income` and `total_expenses` are running totals cached on the
/// record. Only the ledger functions change them, together with `amount`, so
/// `amount == opening balance + total_income - total_expenses` always holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub amount: Money,
    pub total_income: Money,
    pub total_expenses: Money,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency token.
    ///
    /// `0` means the wallet was never stored. Every committed write stores
    /// `version + 1`, and a write whose `version` no longer matches the stored
    /// one is rejected.
    pub version: u64,
}

impl Wallet {
    pub fn new(owner_id: String, name: String, amount: Money, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            amount,
            total_income: Money::ZERO,
            total_expenses: Money::ZERO,
            image: None,
            created_at,
            version: 0,
        }
    }

    /// Balance the wallet was opened with, `None` if the totals overflow.
    #[must_use]
    pub fn opening_amount(&self) -> Option<Money> {
        self.amount
            .checked_sub(self.total_income)?
            .checked_add(self.total_expenses)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub amount_minor: i64,
    pub total_income_minor: i64,
    pub total_expenses_minor: i64,
    pub image: Option<String>,
    pub created_at: DateTimeUtc,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Wallet> for ActiveModel {
    type Error = EngineError;

    fn try_from(value: &Wallet) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(value.id.to_string()),
            owner_id: ActiveValue::Set(value.owner_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            total_income_minor: ActiveValue::Set(value.total_income.cents()),
            total_expenses_minor: ActiveValue::Set(value.total_expenses.cents()),
            image: ActiveValue::Set(value.image.clone()),
            created_at: ActiveValue::Set(value.created_at),
            version: ActiveValue::Set(version_to_db(value.version)?),
        })
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "wallet")?,
            owner_id: model.owner_id,
            name: model.name,
            amount: Money::new(model.amount_minor),
            total_income: Money::new(model.total_income_minor),
            total_expenses: Money::new(model.total_expenses_minor),
            image: model.image,
            created_at: model.created_at,
            version: version_from_db(model.version)?,
        })
    }
}
