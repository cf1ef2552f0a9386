use async_trait::async_trait;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    #[serde(rename = "id")]
    pub ingredient_id: Uuid,
    pub name: String,
    pub quantity: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The ingredients currently on hand.
///
/// Names are unique. Adding a name that is already stored leaves the stored
/// row untouched and returns it.
#[async_trait]
pub trait IngredientStore: std::fmt::Debug + Send + Sync {
    async fn list(&self) -> Result<Vec<Ingredient>>;

    async fn add(&self, name: &str, quantity: Option<&str>) -> Result<Ingredient>;

    /// Removes the ingredient, returning it if it existed.
    async fn delete(&self, ingredient_id: Uuid) -> Result<Option<Ingredient>>;

    async fn names(&self) -> Result<Vec<String>> {
        Ok(self.list().await?.into_iter().map(|i| i.name).collect())
    }
}

#[derive(Debug, Clone)]
pub struct PgIngredients(pub PgPool);

#[async_trait]
impl IngredientStore for PgIngredients {
    #[tracing::instrument(err, skip(self))]
    async fn list(&self) -> Result<Vec<Ingredient>> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            "
            SELECT ingredient_id, name, quantity, created_at
            FROM ingredients
            ORDER BY created_at, name
            ",
        )
        .fetch_all(&self.0)
        .await?;

        Ok(ingredients)
    }

    #[tracing::instrument(err, skip(self))]
    async fn add(&self, name: &str, quantity: Option<&str>) -> Result<Ingredient> {
        let inserted = sqlx::query_as::<_, Ingredient>(
            "
            INSERT INTO ingredients (name, quantity)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            RETURNING ingredient_id, name, quantity, created_at
            ",
        )
        .bind(name)
        .bind(quantity)
        .fetch_optional(&self.0)
        .await?;

        if let Some(inserted) = inserted {
            return Ok(inserted);
        }

        tracing::debug!(name, "Ingredient already stored");
        let existing = sqlx::query_as::<_, Ingredient>(
            "
            SELECT ingredient_id, name, quantity, created_at
            FROM ingredients
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_one(&self.0)
        .await?;

        Ok(existing)
    }

    #[tracing::instrument(err, skip(self))]
    async fn delete(&self, ingredient_id: Uuid) -> Result<Option<Ingredient>> {
        let deleted = sqlx::query_as::<_, Ingredient>(
            "
            DELETE FROM ingredients
            WHERE ingredient_id = $1
            RETURNING ingredient_id, name, quantity, created_at
            ",
        )
        .bind(ingredient_id)
        .fetch_optional(&self.0)
        .await?;

        Ok(deleted)
    }
}

/// Ingredient store for running without a database.
#[derive(Debug, Default)]
pub struct MemoryIngredients {
    rows: RwLock<Vec<Ingredient>>,
}

#[async_trait]
impl IngredientStore for MemoryIngredients {
    async fn list(&self) -> Result<Vec<Ingredient>> {
        Ok(self.rows.read().await.clone())
    }

    async fn add(&self, name: &str, quantity: Option<&str>) -> Result<Ingredient> {
        let mut rows = self.rows.write().await;

        if let Some(existing) = rows.iter().find(|i| i.name == name) {
            return Ok(existing.clone());
        }

        let ingredient = Ingredient {
            ingredient_id: Uuid::new_v4(),
            name: name.to_string(),
            quantity: quantity.map(ToString::to_string),
            created_at: Utc::now(),
        };
        rows.push(ingredient.clone());

        Ok(ingredient)
    }

    async fn delete(&self, ingredient_id: Uuid) -> Result<Option<Ingredient>> {
        let mut rows = self.rows.write().await;

        let position = rows.iter().position(|i| i.ingredient_id == ingredient_id);

        Ok(position.map(|p| rows.remove(p)))
    }
}
