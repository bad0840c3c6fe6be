use recipes_backend::RecipeService;

/// Shared application state / 应用共享状态
pub struct AppState {
    pub recipes: RecipeService,
}
