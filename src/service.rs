//! Recipe service - create/update/delete rules and search delegation / 菜谱服务

use std::sync::Arc;

use crate::error::{RecipeError, Result};
use crate::filter::{self, SearchParams};
use crate::models::{NewRecipe, Recipe};
use crate::store::RecipeStore;

#[derive(Clone)]
pub struct RecipeService {
    store: Arc<dyn RecipeStore>,
}

impl RecipeService {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }

    /// Create a recipe; names must be unique at creation time / 新建菜谱
    pub async fn create(&self, recipe: NewRecipe) -> Result<Recipe> {
        if let Some(existing) = self.store.find_by_name(&recipe.name).await? {
            return Err(RecipeError::AlreadyExists(format!("Recipe {} already exists", existing.name)));
        }

        let saved = self.store.insert(recipe).await?;
        tracing::info!("Recipe of {} successfully created", saved.name);
        Ok(saved)
    }

    pub async fn get(&self, id: &str) -> Result<Recipe> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| RecipeError::NotFound("Recipe doesn't exist".to_string()))
    }

    /// Replace every field but the id. Name uniqueness is not re-checked / 更新菜谱
    pub async fn update(&self, id: &str, recipe: NewRecipe) -> Result<Recipe> {
        let existing = self.get(id).await?;

        let updated = self.store.save(recipe.with_id(existing.id)).await?;
        tracing::info!("Recipe {} successfully updated", updated.name);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if self.store.find_by_id(id).await?.is_none() {
            return Err(RecipeError::NotFound(format!("Recipe with id {} doesn't exist", id)));
        }

        self.store.delete_by_id(id).await?;
        tracing::info!("Recipe {} successfully deleted", id);
        Ok(())
    }

    /// Search by optional filters, sorted by name / 按条件搜索
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<Recipe>> {
        let query = filter::compose(params);
        tracing::debug!("Search {:?} -> {:?}", params, query);
        self.store.find(&query).await
    }
}
