pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod service;
pub mod store;

pub use error::{RecipeError, Result};
pub use service::RecipeService;
