//! Transaction primitives.
//!
//! A `Transaction` is a single income or expense booked against one wallet.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored kinds are matched without regard to case: older records carry
/// `"Income"` while newer ones carry `"income"`.
impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("income") {
            Ok(Self::Income)
        } else if value.eq_ignore_ascii_case("expense") {
            Ok(Self::Expense)
        } else {
            Err(EngineError::InvalidData(format!(
                "invalid transaction kind: {value}"
            )))
        }
    }
}

impl FromStr for TransactionKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: String,
    pub kind: TransactionKind,
    pub amount: Money,
    pub wallet_id: Uuid,
    pub category_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl Transaction {
    /// Builds a new transaction with a freshly generated id.
    ///
    /// The id exists before anything is written, so persisting the record is
    /// an upsert that can be repeated safely.
    pub fn new(
        owner_id: String,
        kind: TransactionKind,
        amount: Money,
        wallet_id: Uuid,
        date: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            amount,
            wallet_id,
            category_id: None,
            date,
            description: None,
            image: None,
        })
    }

    /// Returns `true` when `kind`, `amount` or `wallet_id` differ from the stored ones.
    pub(crate) fn ledger_changed(&self, kind: TransactionKind, amount: Money, wallet_id: Uuid) -> bool {
        self.kind != kind || self.amount != amount || self.wallet_id != wallet_id
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub wallet_id: String,
    pub category_id: Option<String>,
    pub date: DateTimeUtc,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            owner_id: ActiveValue::Set(tx.owner_id.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            wallet_id: ActiveValue::Set(tx.wallet_id.to_string()),
            category_id: ActiveValue::Set(tx.category_id.map(|id| id.to_string())),
            date: ActiveValue::Set(tx.date),
            description: ActiveValue::Set(tx.description.clone()),
            image: ActiveValue::Set(tx.image.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            owner_id: model.owner_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount_minor),
            wallet_id: parse_uuid(&model.wallet_id, "wallet")?,
            category_id: model
                .category_id
                .as_deref()
                .map(|id| parse_uuid(id, "category"))
                .transpose()?,
            date: model.date,
            description: model.description,
            image: model.image,
        })
    }
}
