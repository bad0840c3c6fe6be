use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

use recipes_backend::config::{AppConfig, StoreBackend};
use recipes_backend::store::{MemoryRecipeStore, RecipeStore, SqliteRecipeStore};

/// Open the configured record store and make sure its schema exists / 打开存储并初始化表结构
pub async fn open_store(app_config: &AppConfig) -> Result<Arc<dyn RecipeStore>> {
    match app_config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory recipe store, data is lost on restart");
            Ok(Arc::new(MemoryRecipeStore::new()))
        }
        StoreBackend::Sqlite => {
            let store = SqliteRecipeStore::new(connect(app_config).await?);
            store.init().await?;
            Ok(Arc::new(store))
        }
    }
}

async fn connect(app_config: &AppConfig) -> Result<sqlx::SqlitePool> {
    // Create data directory if not exists / 创建数据目录
    let data_dir = app_config.get_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| app_config.get_database_url());

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&database_url)
        .await?;

    // WAL mode for concurrent readers / 启用WAL模式，提高并发性能
    sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout=5000").execute(&pool).await?;
    sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;

    tracing::info!("Recipe database opened: {} (WAL mode)", database_url);
    Ok(pool)
}
