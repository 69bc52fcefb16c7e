use uuid::Uuid;

use crate::{
    Category, CategoryCmd, EngineError, ResultEngine, util::normalize_required_name,
};

use super::{Engine, require_owner};

impl Engine {
    pub async fn category(&self, id: Uuid) -> ResultEngine<Category> {
        self.store
            .category(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("category {id}")))
    }

    /// Category `id` if `owner_id` may book transactions on it.
    pub(super) async fn visible_category(&self, id: Uuid, owner_id: &str) -> ResultEngine<Category> {
        let category = self.category(id).await?;
        if !category.visible_to(owner_id) {
            return Err(EngineError::NotFound(format!("category {id}")));
        }
        Ok(category)
    }

    /// Categories of `owner_id` followed, unless `only_owned`, by the global ones.
    pub async fn categories(&self, owner_id: &str, only_owned: bool) -> ResultEngine<Vec<Category>> {
        require_owner(owner_id)?;
        let mut categories = self.store.categories_for_owner(Some(owner_id)).await?;
        if !only_owned {
            categories.extend(self.store.categories_for_owner(None).await?);
        }
        Ok(categories)
    }

    /// Creates a category or updates its label, icon and color.
    ///
    /// The kind of an existing category cannot change.
    pub async fn create_or_update_category(&self, cmd: CategoryCmd) -> ResultEngine<Category> {
        if let Some(owner_id) = cmd.owner_id.as_deref() {
            require_owner(owner_id)?;
        }
        let label = normalize_required_name(&cmd.label, "category label")?;
        let icon = normalize_required_name(&cmd.icon, "category icon")?;
        let bg_color = normalize_required_name(&cmd.bg_color, "category color")?;

        let category = match cmd.id {
            None => Category {
                id: Uuid::new_v4(),
                label,
                icon,
                bg_color,
                kind: cmd.kind,
                owner_id: cmd.owner_id,
            },
            Some(id) => {
                let mut existing = self.owned_category(id, cmd.owner_id.as_deref()).await?;
                if existing.kind != cmd.kind {
                    return Err(EngineError::Validation(format!(
                        "category kind cannot change from {} to {}",
                        existing.kind, cmd.kind
                    )));
                }
                existing.label = label;
                existing.icon = icon;
                existing.bg_color = bg_color;
                existing
            }
        };

        self.store.upsert_category(&category).await?;
        tracing::info!("category {} ({}) saved", category.id, category.label);
        Ok(category)
    }

    /// Deletes a category no transaction refers to.
    pub async fn delete_category(&self, id: Uuid, owner_id: Option<&str>) -> ResultEngine<()> {
        let category = self.owned_category(id, owner_id).await?;
        if self.store.category_in_use(id).await? {
            return Err(EngineError::Validation(format!(
                "category '{}' is used by transactions",
                category.label
            )));
        }
        self.store.delete_category(id).await?;
        tracing::info!("category {id} deleted");
        Ok(())
    }

    /// Category `id` if `owner_id` is its owner (`None` for global ones).
    async fn owned_category(&self, id: Uuid, owner_id: Option<&str>) -> ResultEngine<Category> {
        let category = self.category(id).await?;
        if category.owner_id.as_deref() != owner_id {
            return Err(EngineError::NotFound(format!("category {id}")));
        }
        Ok(category)
    }
}
