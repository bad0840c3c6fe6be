//! SQLite-backed recipe store
//!
//! One `recipes` table; ingredients are kept as a JSON array and searched with
//! `json_each`. `category_lower` is filled on every write so the
//! case-insensitive category match does not depend on SQLite's ASCII-only `lower()`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{new_id, RecipeStore};
use crate::error::{RecipeError, Result};
use crate::filter::RecipeQuery;
use crate::models::{NewRecipe, Recipe};

const SELECT_RECIPES: &str =
    "SELECT id, name, instructions, category, servings, ingredients FROM recipes";

#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: String,
    name: String,
    instructions: String,
    category: String,
    servings: i64,
    ingredients: String,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = RecipeError;

    fn try_from(row: RecipeRow) -> Result<Self> {
        Ok(Recipe {
            id: row.id,
            name: row.name,
            instructions: row.instructions,
            category: row.category,
            servings: row.servings,
            ingredients: serde_json::from_str(&row.ingredients)?,
        })
    }
}

#[derive(Clone)]
pub struct SqliteRecipeStore {
    db: SqlitePool,
}

impl SqliteRecipeStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create table and index if missing, keeps existing data / 初始化表结构
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                instructions TEXT NOT NULL,
                category TEXT NOT NULL,
                category_lower TEXT NOT NULL,
                servings INTEGER NOT NULL,
                ingredients TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        // Not UNIQUE: name uniqueness is an application rule checked on create only
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipes_name ON recipes(name)")
            .execute(&self.db)
            .await?;

        Ok(())
    }

    fn rows_to_recipes(rows: Vec<RecipeRow>) -> Result<Vec<Recipe>> {
        rows.into_iter().map(Recipe::try_from).collect()
    }
}

#[async_trait]
impl RecipeStore for SqliteRecipeStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>> {
        let row: Option<RecipeRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_RECIPES))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.map(Recipe::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Recipe>> {
        let row: Option<RecipeRow> =
            sqlx::query_as(&format!("{} WHERE name = ? ORDER BY id ASC LIMIT 1", SELECT_RECIPES))
                .bind(name)
                .fetch_optional(&self.db)
                .await?;
        row.map(Recipe::try_from).transpose()
    }

    async fn insert(&self, recipe: NewRecipe) -> Result<Recipe> {
        let recipe = recipe.with_id(new_id());
        let ingredients = serde_json::to_string(&recipe.ingredients)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO recipes (id, name, instructions, category, category_lower, servings, ingredients, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&recipe.id)
        .bind(&recipe.name)
        .bind(&recipe.instructions)
        .bind(&recipe.category)
        .bind(recipe.category.to_lowercase())
        .bind(recipe.servings)
        .bind(&ingredients)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        Ok(recipe)
    }

    async fn save(&self, recipe: Recipe) -> Result<Recipe> {
        let ingredients = serde_json::to_string(&recipe.ingredients)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO recipes (id, name, instructions, category, category_lower, servings, ingredients, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                instructions = excluded.instructions,
                category = excluded.category,
                category_lower = excluded.category_lower,
                servings = excluded.servings,
                ingredients = excluded.ingredients,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&recipe.id)
        .bind(&recipe.name)
        .bind(&recipe.instructions)
        .bind(&recipe.category)
        .bind(recipe.category.to_lowercase())
        .bind(recipe.servings)
        .bind(&ingredients)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        Ok(recipe)
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn find(&self, query: &RecipeQuery) -> Result<Vec<Recipe>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_RECIPES);
        if let RecipeQuery::Matching(filter) = query {
            qb.push(" WHERE ");
            filter.push_sql(&mut qb);
        }
        qb.push(" ORDER BY name ASC, id ASC");

        tracing::debug!("Recipe query: {}", qb.sql());

        let rows: Vec<RecipeRow> = qb.build_query_as().fetch_all(&self.db).await?;
        Self::rows_to_recipes(rows)
    }

    async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.db)
            .await?;
        Ok(count as u64)
    }
}
