pub mod recipes;
pub mod server;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;
use recipes_backend::RecipeError;

/// Error body returned for every failed request / 错误响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Handler error, mapped to a status code at the boundary / 接口错误
#[derive(Debug)]
pub enum ApiError {
    Recipe(RecipeError),
    /// Body or query string could not be decoded / 请求解析失败
    BadRequest(String),
}

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        ApiError::Recipe(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Recipe(err) => match err {
                RecipeError::AlreadyExists(_) => (StatusCode::CONFLICT, err.to_string()),
                RecipeError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                RecipeError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                RecipeError::Database(_) | RecipeError::Serialization(_) => {
                    tracing::error!("recipes error: {:?}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
                }
            },
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Routes relative to the context path / 路由表（不含前缀）
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(server::health_check))
        .route(
            "/v1/recipe",
            get(recipes::find_recipes).post(recipes::add_recipe),
        )
        .route(
            "/v1/recipe/:id",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::remove_recipe),
        )
        .with_state(state)
}
