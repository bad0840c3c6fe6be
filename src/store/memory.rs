//! In-memory recipe store, nothing survives a restart / 内存存储

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{new_id, RecipeStore};
use crate::error::Result;
use crate::filter::RecipeQuery;
use crate::models::{NewRecipe, Recipe};

#[derive(Default)]
pub struct MemoryRecipeStore {
    recipes: RwLock<HashMap<String, Recipe>>,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_by_name(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>> {
        Ok(self.recipes.read().get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Recipe>> {
        Ok(self
            .recipes
            .read()
            .values()
            .filter(|r| r.name == name)
            .min_by(|a, b| a.id.cmp(&b.id))
            .cloned())
    }

    async fn insert(&self, recipe: NewRecipe) -> Result<Recipe> {
        let recipe = recipe.with_id(new_id());
        self.recipes.write().insert(recipe.id.clone(), recipe.clone());
        Ok(recipe)
    }

    async fn save(&self, recipe: Recipe) -> Result<Recipe> {
        self.recipes.write().insert(recipe.id.clone(), recipe.clone());
        Ok(recipe)
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.recipes.write().remove(id);
        Ok(())
    }

    async fn find(&self, query: &RecipeQuery) -> Result<Vec<Recipe>> {
        let mut found: Vec<Recipe> = self
            .recipes
            .read()
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        sort_by_name(&mut found);
        Ok(found)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.recipes.read().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{compose, SearchParams};
    use crate::store::fixtures::{couscous_salad, quick_chilli, recipe};

    #[tokio::test]
    async fn test_crud_primitives() {
        let store = MemoryRecipeStore::new();
        let created = store.insert(quick_chilli()).await.unwrap();
        assert_eq!(store.find_by_id(&created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(store.find_by_name("Quick chilli").await.unwrap(), Some(created.clone()));

        let mut changed = created.clone();
        changed.servings = 4;
        store.save(changed.clone()).await.unwrap();
        assert_eq!(store.find_by_id(&created.id).await.unwrap(), Some(changed));

        store.delete_by_id(&created.id).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_sorts_by_name() {
        let store = MemoryRecipeStore::new();
        store.insert(quick_chilli()).await.unwrap();
        store.insert(recipe("Apple pie", "DESSERT", 8, &["apples"])).await.unwrap();
        store.insert(couscous_salad()).await.unwrap();

        let names: Vec<String> = store
            .find(&RecipeQuery::All)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["10-minute couscous salad", "Apple pie", "Quick chilli"]);
    }

    #[tokio::test]
    async fn test_find_applies_filter() {
        let store = MemoryRecipeStore::new();
        store.insert(quick_chilli()).await.unwrap();
        store.insert(couscous_salad()).await.unwrap();

        let query = compose(&SearchParams { exclude: Some("couscous".to_string()), ..Default::default() });
        let found = store.find(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Quick chilli");
    }
}
