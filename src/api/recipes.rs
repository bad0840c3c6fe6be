use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use std::sync::Arc;

use super::ApiResult;
use crate::state::AppState;
use recipes_backend::filter::SearchParams;
use recipes_backend::models::{NewRecipe, RecipeDto};

/// POST /v1/recipe - 新建菜谱
pub async fn add_recipe(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RecipeDto>, JsonRejection>,
) -> ApiResult<Json<RecipeDto>> {
    let Json(dto) = payload?;
    let created = state.recipes.create(NewRecipe::try_from(dto)?).await?;
    Ok(Json(created.into()))
}

/// GET /v1/recipe/:id - 获取菜谱
pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<RecipeDto>> {
    let recipe = state.recipes.get(&id).await?;
    Ok(Json(recipe.into()))
}

/// PUT /v1/recipe/:id - 更新菜谱
pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<RecipeDto>, JsonRejection>,
) -> ApiResult<Json<RecipeDto>> {
    let Json(dto) = payload?;
    let updated = state.recipes.update(&id, NewRecipe::try_from(dto)?).await?;
    Ok(Json(updated.into()))
}

/// DELETE /v1/recipe/:id - 删除菜谱
pub async fn remove_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    state.recipes.delete(&id).await?;
    Ok(format!("successfully deleted {}", id))
}

/// GET /v1/recipe - 按条件搜索菜谱
pub async fn find_recipes(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<RecipeDto>>> {
    let Query(params) = query?;
    let recipes = state.recipes.search(&params).await?;
    Ok(Json(recipes.into_iter().map(RecipeDto::from).collect()))
}
