use serde::{Deserialize, Serialize};

use crate::error::{FieldError, RecipeError};

/// Persisted recipe document / 菜谱文档
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub instructions: String,
    pub category: String,
    pub servings: i64,
    pub ingredients: Vec<String>,
}

/// Recipe fields before the store has assigned an id / 未分配ID的菜谱
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub name: String,
    pub instructions: String,
    pub category: String,
    pub servings: i64,
    pub ingredients: Vec<String>,
}

impl NewRecipe {
    /// Attach a store-assigned id / 附加存储分配的ID
    pub fn with_id(self, id: impl Into<String>) -> Recipe {
        Recipe {
            id: id.into(),
            name: self.name,
            instructions: self.instructions,
            category: self.category,
            servings: self.servings,
            ingredients: self.ingredients,
        }
    }
}

/// Request/response body for the recipe API / 菜谱接口请求体
///
/// Every field is optional on the wire so that a missing field is reported
/// by [`RecipeDto::validate`] rather than rejected by the JSON decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub servings: Option<i64>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

impl RecipeDto {
    /// Check required fields, reporting every violation / 校验必填字段
    pub fn validate(&self) -> Result<(), RecipeError> {
        let mut errors = Vec::new();

        if is_blank(&self.name) {
            errors.push(FieldError::new("name", "must not be blank"));
        }
        if is_blank(&self.instructions) {
            errors.push(FieldError::new("instructions", "must not be blank"));
        }
        if self.category.is_none() {
            errors.push(FieldError::new("category", "must not be null"));
        }
        match self.servings {
            None => errors.push(FieldError::new("servings", "must not be null")),
            Some(n) if n <= 0 => errors.push(FieldError::new("servings", "must be greater than 0")),
            Some(_) => {}
        }
        if self.ingredients.as_ref().map_or(true, |list| list.is_empty()) {
            errors.push(FieldError::new("ingredients", "must not be empty"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RecipeError::Validation(errors))
        }
    }
}

impl TryFrom<RecipeDto> for NewRecipe {
    type Error = RecipeError;

    /// Validate and map to the domain shape; any client-supplied id is dropped
    fn try_from(dto: RecipeDto) -> Result<Self, Self::Error> {
        dto.validate()?;
        Ok(Self {
            name: dto.name.unwrap_or_default(),
            instructions: dto.instructions.unwrap_or_default(),
            category: dto.category.unwrap_or_default(),
            servings: dto.servings.unwrap_or_default(),
            ingredients: dto.ingredients.unwrap_or_default(),
        })
    }
}

impl From<Recipe> for RecipeDto {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: Some(recipe.id),
            name: Some(recipe.name),
            instructions: Some(recipe.instructions),
            category: Some(recipe.category),
            servings: Some(recipe.servings),
            ingredients: Some(recipe.ingredients),
        }
    }
}
