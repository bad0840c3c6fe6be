//! Record store - persistence primitives for recipe documents / 菜谱存储
//!
//! The store only exposes primitive operations (lookup, save, delete, query).
//! Uniqueness and existence rules live in the service layer.

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::RecipeQuery;
use crate::models::{NewRecipe, Recipe};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryRecipeStore;
pub use sqlite::SqliteRecipeStore;

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>>;

    /// First recipe with exactly this name (lowest id when duplicated) / 按名称查找
    async fn find_by_name(&self, name: &str) -> Result<Option<Recipe>>;

    /// Persist a new recipe and assign its id / 新建并分配ID
    async fn insert(&self, recipe: NewRecipe) -> Result<Recipe>;

    /// Write every field of `recipe` under its id, creating the row if it vanished / 覆盖写入
    async fn save(&self, recipe: Recipe) -> Result<Recipe>;

    async fn delete_by_id(&self, id: &str) -> Result<()>;

    /// Run a query; results are sorted by name, then id / 查询（按名称排序）
    async fn find(&self, query: &RecipeQuery) -> Result<Vec<Recipe>>;

    async fn count(&self) -> Result<u64>;
}

/// Store-generated identifier / 生成ID
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::NewRecipe;

    pub fn recipe(name: &str, category: &str, servings: i64, ingredients: &[&str]) -> NewRecipe {
        NewRecipe {
            name: name.to_string(),
            instructions: format!("instructions {}", name),
            category: category.to_string(),
            servings,
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn couscous_salad() -> NewRecipe {
        recipe(
            "10-minute couscous salad",
            "VEGETARIAN",
            2,
            &["100g couscous", "2 spring onions", "100ml hot low salt vegetable stock (from a cube is fine)"],
        )
    }

    pub fn quick_chilli() -> NewRecipe {
        recipe("Quick chilli", "LOW_CARB", 6, &["100g chorizo", "400g can kidney beans", "2 spring onions"])
    }
}
