use color_eyre::{eyre::Context, Result};
use sqlx::postgres::PgPoolOptions;

pub mod ingredients;
pub mod recipes;

pub use sqlx;
pub use sqlx::PgPool;

pub use ingredients::{Ingredient, IngredientStore, MemoryIngredients, PgIngredients};
pub use recipes::{MemoryRecipes, PgRecipes, RecipeStore, SavedRecipe};

#[tracing::instrument(err, skip(database_url))]
pub async fn setup_db_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .wrap_err("Failed to connect to DATABASE_URL")?;

    const MIGRATION_LOCK_ID: i64 = 0xF1_D6_E7_0F_1A_7E;
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_ID)
        .execute(&pool)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    let unlocked: bool = sqlx::query_scalar("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_ID)
        .fetch_one(&pool)
        .await?;

    if unlocked {
        tracing::info!("Migration lock unlocked");
    } else {
        tracing::warn!("Failed to unlock migration lock");
    }

    Ok(pool)
}
