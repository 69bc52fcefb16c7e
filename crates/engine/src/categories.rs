//! Transaction categories.
//!
//! A category without an owner is global and visible to every user.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, TransactionKind, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub label: String,
    pub icon: String,
    pub bg_color: String,
    /// Fixed at creation time.
    pub kind: TransactionKind,
    pub owner_id: Option<String>,
}

impl Category {
    pub fn is_global(&self) -> bool {
        self.owner_id.is_none()
    }

    /// A user sees its own categories and the global ones.
    pub fn visible_to(&self, owner_id: &str) -> bool {
        self.owner_id.as_deref().is_none_or(|owner| owner == owner_id)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub label: String,
    pub icon: String,
    pub bg_color: String,
    pub kind: String,
    pub owner_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            label: ActiveValue::Set(value.label.clone()),
            icon: ActiveValue::Set(value.icon.clone()),
            bg_color: ActiveValue::Set(value.bg_color.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            owner_id: ActiveValue::Set(value.owner_id.clone()),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            label: model.label,
            icon: model.icon,
            bg_color: model.bg_color,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            owner_id: model.owner_id,
        })
    }
}
